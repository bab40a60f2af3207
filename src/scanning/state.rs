use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::page::NodeId;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ControllerState {
    Idle,
    ResolvingTarget,
    Scanning,
    Delivered,
    Dismissed,
    /// Sticky until the page reloads.
    Disabled,
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState::Idle
    }
}

impl ControllerState {
    /// Delivered and Dismissed behave like Idle for the next trigger.
    pub fn accepts_invocation(&self) -> bool {
        matches!(
            self,
            ControllerState::Idle | ControllerState::Delivered | ControllerState::Dismissed
        )
    }
}

/// Context for one trigger activation, threaded through the loop and the
/// dismissal listeners instead of living in shared widget state.
#[derive(Debug, Clone)]
pub struct ScanInvocation {
    pub id: Uuid,
    pub trigger: NodeId,
    pub started_at: DateTime<Utc>,
}

impl ScanInvocation {
    pub fn new(trigger: NodeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger,
            started_at: Utc::now(),
        }
    }
}
