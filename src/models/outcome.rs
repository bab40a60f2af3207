use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ScanError;
use crate::page::NodeId;

/// How one invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Found(String),
    Cancelled,
    Failed(ScanError),
}

impl ScanOutcome {
    pub fn value(&self) -> Option<&str> {
        match self {
            ScanOutcome::Found(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReportOutcome {
    Found { value: String },
    Cancelled,
    Failed { kind: String, message: String },
}

impl From<&ScanOutcome> for ReportOutcome {
    fn from(outcome: &ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Found(value) => ReportOutcome::Found {
                value: value.clone(),
            },
            ScanOutcome::Cancelled => ReportOutcome::Cancelled,
            ScanOutcome::Failed(err) => ReportOutcome::Failed {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// Summary of one invocation, emitted to the host when it finishes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub invocation_id: Uuid,
    pub trigger: NodeId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub frames_polled: u32,
    pub outcome: ReportOutcome,
}
