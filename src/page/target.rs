use serde::{Deserialize, Serialize};

use crate::error::ScanError;

use super::{Document, NodeId, NodeKind};

/// Where a successful scan lands: the field that receives the value and the
/// control that submits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTarget {
    pub field: NodeId,
    pub submit: NodeId,
}

/// How an invocation finds its [`ScanTarget`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum TargetStrategy {
    /// A known pair, e.g. the global search bar and its submit input.
    Fixed { field: NodeId, submit: NodeId },
    /// The closest input/submit pair around the activated trigger, searching
    /// at most `max_depth` ancestors up.
    Nearest { max_depth: usize },
}

/// Resolve the target for one invocation, or explain why the page around the
/// trigger does not have one.
pub fn resolve_target(
    document: &dyn Document,
    trigger: &NodeId,
    strategy: &TargetStrategy,
) -> Result<ScanTarget, ScanError> {
    if document.kind(trigger).is_none() {
        return Err(ScanError::target(format!(
            "trigger '{trigger}' is not in the page"
        )));
    }

    match strategy {
        TargetStrategy::Fixed { field, submit } => {
            expect_kind(document, field, NodeKind::Input)?;
            expect_kind(document, submit, NodeKind::Submit)?;
            Ok(ScanTarget {
                field: field.clone(),
                submit: submit.clone(),
            })
        }
        TargetStrategy::Nearest { max_depth } => nearest_pair(document, trigger, *max_depth),
    }
}

fn expect_kind(document: &dyn Document, node: &NodeId, expected: NodeKind) -> Result<(), ScanError> {
    match document.kind(node) {
        Some(kind) if kind == expected => Ok(()),
        Some(kind) => Err(ScanError::target(format!(
            "'{node}' is {kind:?}, expected {expected:?}"
        ))),
        None => Err(ScanError::target(format!("'{node}' is not in the page"))),
    }
}

/// Walk up from the trigger one ancestor at a time. At each level only the
/// ancestor's direct children are considered, so the first level holding an
/// input or a submit control decides: exactly one of each resolves, anything
/// else is an error rather than a guess.
fn nearest_pair(
    document: &dyn Document,
    trigger: &NodeId,
    max_depth: usize,
) -> Result<ScanTarget, ScanError> {
    let mut level = document.parent(trigger);

    for _ in 0..max_depth {
        let Some(ancestor) = level else {
            break;
        };

        let mut inputs = Vec::new();
        let mut submits = Vec::new();
        for child in document.children(&ancestor) {
            if &child == trigger {
                continue;
            }
            match document.kind(&child) {
                Some(NodeKind::Input) => inputs.push(child),
                Some(NodeKind::Submit) => submits.push(child),
                _ => {}
            }
        }

        match (inputs.len(), submits.len()) {
            (0, 0) => level = document.parent(&ancestor),
            (1, 1) => {
                return Ok(ScanTarget {
                    field: inputs.remove(0),
                    submit: submits.remove(0),
                })
            }
            (i, s) => {
                return Err(ScanError::target(format!(
                    "expected one input and one submit under '{ancestor}', found {i} and {s}"
                )))
            }
        }
    }

    Err(ScanError::target(format!(
        "no input/submit pair within {max_depth} levels of '{trigger}'"
    )))
}
