use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::page::{Document, NodeId};

const ENABLE_LOGS: bool = true;

use crate::log_debug;

const ESCAPE: &str = "Escape";

/// Page input events the host forwards while a scan may be running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PointerDown { target: NodeId },
    KeyDown { key: String },
}

impl UiEvent {
    pub fn pointer_down(target: impl Into<NodeId>) -> Self {
        UiEvent::PointerDown {
            target: target.into(),
        }
    }

    pub fn key_down(key: impl Into<String>) -> Self {
        UiEvent::KeyDown { key: key.into() }
    }
}

pub type DismissCallback = Arc<dyn Fn() + Send + Sync>;

struct Registration {
    id: u64,
    document: Arc<dyn Document>,
    surface: NodeId,
    trigger: NodeId,
    on_dismiss: DismissCallback,
}

impl Registration {
    fn is_outside(&self, target: &NodeId) -> bool {
        !self.document.contains(&self.surface, target) && !self.document.contains(&self.trigger, target)
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    registrations: Vec<Registration>,
}

/// Watches for the user backing out of a scan: a pointer-down outside the
/// widget, or Escape.
///
/// The outside click fires once and removes the registration. Escape fires
/// on every press until then, or until the registration is disarmed.
#[derive(Clone, Default)]
pub struct DismissalController {
    registry: Arc<Mutex<Registry>>,
}

impl DismissalController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(
        &self,
        document: Arc<dyn Document>,
        surface: NodeId,
        trigger: NodeId,
        on_dismiss: DismissCallback,
    ) -> ArmedDismissal {
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.registrations.push(Registration {
            id,
            document,
            surface,
            trigger,
            on_dismiss,
        });
        log_debug!("dismissal armed (registration {id})");

        ArmedDismissal {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Route one page event. Returns how many dismiss callbacks ran.
    pub fn dispatch(&self, event: &UiEvent) -> usize {
        let callbacks: Vec<DismissCallback> = {
            let mut registry = self.lock();
            match event {
                UiEvent::PointerDown { target } => {
                    let (outside, inside): (Vec<_>, Vec<_>) = registry
                        .registrations
                        .drain(..)
                        .partition(|registration| registration.is_outside(target));
                    registry.registrations = inside;
                    outside
                        .into_iter()
                        .map(|registration| {
                            log_debug!("outside click on {target} dismisses registration {}", registration.id);
                            registration.on_dismiss
                        })
                        .collect()
                }
                UiEvent::KeyDown { key } if key == ESCAPE => registry
                    .registrations
                    .iter()
                    .map(|registration| registration.on_dismiss.clone())
                    .collect(),
                UiEvent::KeyDown { .. } => Vec::new(),
            }
        };

        // Callbacks close capture sessions; run them with the registry unlocked.
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn armed_count(&self) -> usize {
        self.lock().registrations.len()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        lock_registry(&self.registry)
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    match registry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Keeps one registration alive. Dropping it removes both listeners.
pub struct ArmedDismissal {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl ArmedDismissal {
    pub fn is_armed(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            lock_registry(&registry)
                .registrations
                .iter()
                .any(|registration| registration.id == self.id)
        })
    }

    pub fn disarm(self) {}
}

impl Drop for ArmedDismissal {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock_registry(&registry)
                .registrations
                .retain(|registration| registration.id != self.id);
        }
    }
}
