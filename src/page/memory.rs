use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};

use super::{Document, NodeId, NodeKind};

#[derive(Debug, Default, Clone)]
struct MemoryNode {
    kind: Option<NodeKind>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: String,
    activations: u32,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
}

/// In-memory element tree for headless hosts.
///
/// Records every write the scanner makes so a host (or a test) can inspect
/// what happened to the page.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    nodes: Mutex<HashMap<NodeId, MemoryNode>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent` (or as a root). Re-inserting an existing
    /// id is an error.
    pub fn insert(
        &self,
        id: impl Into<NodeId>,
        kind: NodeKind,
        parent: Option<&NodeId>,
    ) -> Result<NodeId> {
        let id = id.into();
        let mut nodes = self.lock();
        if nodes.contains_key(&id) {
            return Err(anyhow!("node '{id}' already exists"));
        }
        if let Some(parent) = parent {
            let parent_node = nodes
                .get_mut(parent)
                .ok_or_else(|| anyhow!("parent '{parent}' does not exist"))?;
            parent_node.children.push(id.clone());
        }
        nodes.insert(
            id.clone(),
            MemoryNode {
                kind: Some(kind),
                parent: parent.cloned(),
                ..MemoryNode::default()
            },
        );
        Ok(id)
    }

    /// Detach a node and its subtree.
    pub fn remove(&self, id: &NodeId) {
        let mut nodes = self.lock();
        let Some(node) = nodes.remove(id) else {
            return;
        };
        if let Some(parent) = node.parent.as_ref().and_then(|p| nodes.get_mut(p)) {
            parent.children.retain(|child| child != id);
        }
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = nodes.remove(&child) {
                pending.extend(removed.children);
            }
        }
    }

    pub fn value(&self, id: &NodeId) -> Option<String> {
        self.lock().get(id).map(|node| node.value.clone())
    }

    pub fn activations(&self, id: &NodeId) -> u32 {
        self.lock().get(id).map(|node| node.activations).unwrap_or(0)
    }

    pub fn attribute(&self, id: &NodeId, name: &str) -> Option<String> {
        self.lock()
            .get(id)
            .and_then(|node| node.attributes.get(name).cloned())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NodeId, MemoryNode>> {
        match self.nodes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn with_node<T>(&self, id: &NodeId, f: impl FnOnce(&mut MemoryNode) -> T) -> Result<T> {
        let mut nodes = self.lock();
        let node = nodes
            .get_mut(id)
            .ok_or_else(|| anyhow!("node '{id}' is not in the document"))?;
        Ok(f(node))
    }
}

impl Document for MemoryDocument {
    fn kind(&self, node: &NodeId) -> Option<NodeKind> {
        self.lock().get(node).and_then(|n| n.kind)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.lock().get(node).and_then(|n| n.parent.clone())
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.lock()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, node: &NodeId, value: &str) -> Result<()> {
        self.with_node(node, |n| n.value = value.to_string())
    }

    fn activate(&self, node: &NodeId) -> Result<()> {
        self.with_node(node, |n| n.activations += 1)
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<()> {
        self.with_node(node, |n| {
            n.attributes.insert(name.to_string(), value.to_string());
        })
    }

    fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.lock()
            .get(node)
            .and_then(|n| n.styles.get(property).cloned())
    }

    fn set_style(&self, node: &NodeId, property: &str, value: &str) -> Result<()> {
        self.with_node(node, |n| {
            n.styles.insert(property.to_string(), value.to_string());
        })
    }
}
