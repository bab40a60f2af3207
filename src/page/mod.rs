//! The page the widget lives in, as seen by the scanner.
//!
//! Hosts implement [`Document`] over their real element tree. Everything the
//! scanner does to the page (showing the preview, filling the field, pressing
//! submit, disabling the trigger) goes through it.

pub mod memory;
pub mod target;

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use memory::MemoryDocument;
pub use target::{resolve_target, ScanTarget, TargetStrategy};

/// Upper bound on parent hops when walking the tree; a malformed host tree
/// with a cycle must not hang the page.
const MAX_TREE_DEPTH: usize = 512;

/// Opaque handle for one element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// What an element is, as far as target resolution cares.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// A text input that can receive a scanned value.
    Input,
    /// A control whose activation submits the form.
    Submit,
    /// Any other button, including scan triggers.
    Button,
    Container,
    Other,
}

pub trait Document: Send + Sync {
    /// `None` when the node is not in the document.
    fn kind(&self, node: &NodeId) -> Option<NodeKind>;

    fn parent(&self, node: &NodeId) -> Option<NodeId>;

    /// Direct children in document order.
    fn children(&self, node: &NodeId) -> Vec<NodeId>;

    fn set_value(&self, node: &NodeId, value: &str) -> Result<()>;

    /// Programmatic click.
    fn activate(&self, node: &NodeId) -> Result<()>;

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<()>;

    fn style(&self, node: &NodeId, property: &str) -> Option<String>;

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> Result<()>;

    /// Whether `node` is `ancestor` or lies inside it.
    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(node.clone());
        for _ in 0..MAX_TREE_DEPTH {
            match current {
                Some(ref id) if id == ancestor => return true,
                Some(ref id) => current = self.parent(id),
                None => return false,
            }
        }
        false
    }
}
