use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::capture::CaptureSession;
use crate::error::ScanError;
use crate::models::{ReportOutcome, ScanOutcome, ScanReport};
use crate::page::{resolve_target, NodeId, ScanTarget, TargetStrategy};
use crate::platform::ScanPlatform;
use crate::settings::ScannerSettings;

use super::dismissal::{DismissalController, UiEvent};
use super::loop_worker::{scan_loop, LoopConfig, LoopExit};
use super::state::{ControllerState, ScanInvocation};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const STATE_CHANGED_EVENT: &str = "scan-state-changed";
const COMPLETED_EVENT: &str = "scan-completed";

/// The page elements one scanner widget is bound to.
#[derive(Debug, Clone)]
pub struct ScanWidget {
    /// Container of the camera preview; its `display` style toggles the
    /// preview.
    pub surface: NodeId,
    /// A known field/submit pair. `None` searches around each trigger.
    pub fixed: Option<ScanTarget>,
}

impl ScanWidget {
    /// Fill whichever input/submit pair sits closest to the activated trigger.
    pub fn nearest(surface: NodeId) -> Self {
        Self {
            surface,
            fixed: None,
        }
    }

    /// Always fill `field` and press `submit`, e.g. the global search bar.
    pub fn fixed(surface: NodeId, field: NodeId, submit: NodeId) -> Self {
        Self {
            surface,
            fixed: Some(ScanTarget { field, submit }),
        }
    }

    fn strategy(&self, settings: &ScannerSettings) -> TargetStrategy {
        match &self.fixed {
            Some(target) => TargetStrategy::Fixed {
                field: target.field.clone(),
                submit: target.submit.clone(),
            },
            None => TargetStrategy::Nearest {
                max_depth: settings.target_search_depth,
            },
        }
    }
}

/// Tears an invocation down when the `trigger` future is dropped before it
/// settles, e.g. by a host timeout or a cancelled task.
struct InvocationGuard<'a> {
    controller: &'a ScanController,
    invocation: &'a ScanInvocation,
    session: CaptureSession,
    settled: bool,
}

impl Drop for InvocationGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        log_warn!("scan {} abandoned by the host, tearing down", self.invocation.id);
        self.session.close();
        self.controller.set_state(ControllerState::Dismissed);
        self.controller.emit_state(self.invocation, ControllerState::Dismissed);
    }
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct ScanStateChangedEvent {
    invocation_id: Uuid,
    state: ControllerState,
}

#[derive(Default)]
struct ControllerInner {
    state: ControllerState,
    disabled: Option<ScanError>,
}

/// Runs one scan per trigger activation and decides what happens to the
/// page afterwards.
///
/// Fatal failures disable the trigger for good; later activations return the
/// same failure without touching the camera. Clones share state.
#[derive(Clone)]
pub struct ScanController {
    platform: ScanPlatform,
    widget: ScanWidget,
    settings: ScannerSettings,
    inner: Arc<Mutex<ControllerInner>>,
    dismissal: DismissalController,
    shutdown: CancellationToken,
}

impl ScanController {
    /// The detector is narrowed to `settings.formats`; a detector that covers
    /// none of them counts as missing.
    pub fn new(mut platform: ScanPlatform, widget: ScanWidget, settings: ScannerSettings) -> Self {
        platform.detector = platform
            .detector
            .take()
            .and_then(|capability| capability.restricted_to(&settings.formats));
        Self {
            platform,
            widget,
            settings,
            inner: Arc::new(Mutex::new(ControllerInner::default())),
            dismissal: DismissalController::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.lock().state
    }

    pub fn disabled_reason(&self) -> Option<ScanError> {
        self.lock().disabled.clone()
    }

    pub fn dismissal(&self) -> &DismissalController {
        &self.dismissal
    }

    /// Forward a page event to the dismissal listeners.
    pub fn handle_event(&self, event: &UiEvent) -> usize {
        self.dismissal.dispatch(event)
    }

    /// Page teardown: end any running scan as a dismissal and ignore later
    /// triggers.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            log_info!("scan controller shutting down");
            self.shutdown.cancel();
        }
    }

    /// Entry point for a trigger activation.
    pub async fn trigger(&self, trigger: NodeId) -> ScanOutcome {
        let invocation = ScanInvocation::new(trigger);

        {
            let mut inner = self.lock();
            if let Some(reason) = &inner.disabled {
                log_warn!("scanning disabled, ignoring trigger {}: {reason}", invocation.trigger);
                return ScanOutcome::Failed(reason.clone());
            }
            if self.shutdown.is_cancelled() {
                return ScanOutcome::Cancelled;
            }
            if !inner.state.accepts_invocation() {
                log_warn!("scan already in progress, ignoring trigger {}", invocation.trigger);
                return ScanOutcome::Cancelled;
            }
            inner.state = ControllerState::ResolvingTarget;
        }
        self.emit_state(&invocation, ControllerState::ResolvingTarget);
        log_info!("scan {} started from {}", invocation.id, invocation.trigger);

        let session = CaptureSession::new(
            self.platform.document.clone(),
            self.platform.camera.clone(),
            self.widget.surface.clone(),
        );

        let mut guard = InvocationGuard {
            controller: self,
            invocation: &invocation,
            session: session.clone(),
            settled: false,
        };

        let exit = match self.run(&invocation, &session).await {
            Ok(exit) => exit,
            Err(err) => LoopExit {
                outcome: ScanOutcome::Failed(err),
                frames_polled: 0,
            },
        };
        guard.settled = true;
        drop(guard);
        session.close();

        let terminal = match &exit.outcome {
            ScanOutcome::Found(_) => ControllerState::Delivered,
            ScanOutcome::Cancelled => ControllerState::Dismissed,
            ScanOutcome::Failed(err) => {
                self.disable(&invocation.trigger, err);
                ControllerState::Disabled
            }
        };

        {
            let mut inner = self.lock();
            inner.state = terminal;
            if let ScanOutcome::Failed(err) = &exit.outcome {
                inner.disabled = Some(err.clone());
            }
        }
        self.emit_state(&invocation, terminal);
        self.emit_report(&invocation, &exit);

        exit.outcome
    }

    async fn run(
        &self,
        invocation: &ScanInvocation,
        session: &CaptureSession,
    ) -> Result<LoopExit, ScanError> {
        let detector = self
            .platform
            .detector
            .as_ref()
            .ok_or(ScanError::CapabilityMissing)?;

        let target = resolve_target(
            self.platform.document.as_ref(),
            &invocation.trigger,
            &self.widget.strategy(&self.settings),
        )?;
        log_info!(
            "scan {} targets field {} / submit {}",
            invocation.id,
            target.field,
            target.submit
        );

        self.set_state(ControllerState::Scanning);
        self.emit_state(invocation, ControllerState::Scanning);

        let armed = {
            let session = session.clone();
            self.dismissal.arm(
                self.platform.document.clone(),
                self.widget.surface.clone(),
                invocation.trigger.clone(),
                Arc::new(move || session.close()),
            )
        };

        session.open(self.settings.facing_mode).await?;

        let exit = scan_loop(
            invocation,
            session,
            detector,
            self.platform.haptics.as_deref(),
            &LoopConfig::from(&self.settings),
            &self.shutdown,
        )
        .await;

        armed.disarm();
        session.close();

        if let ScanOutcome::Found(value) = &exit.outcome {
            if let Err(err) = self.deliver(&target, value) {
                return Ok(LoopExit {
                    outcome: ScanOutcome::Failed(err),
                    frames_polled: exit.frames_polled,
                });
            }
        }

        Ok(exit)
    }

    fn deliver(&self, target: &ScanTarget, value: &str) -> Result<(), ScanError> {
        let document = &self.platform.document;
        document.set_value(&target.field, value).map_err(|err| {
            ScanError::target(format!("could not write to '{}': {err:#}", target.field))
        })?;
        document.activate(&target.submit).map_err(|err| {
            ScanError::target(format!("could not activate '{}': {err:#}", target.submit))
        })?;
        log_info!("delivered {value} to {}", target.field);
        Ok(())
    }

    fn disable(&self, trigger: &NodeId, reason: &ScanError) {
        log_error!("disabling scanning on {trigger}: {reason}");
        let document = &self.platform.document;
        let message = reason.to_string();
        if let Err(err) = document.set_attribute(trigger, "disabled", "disabled") {
            log_error!("could not disable trigger {trigger}: {err:#}");
        }
        if let Err(err) = document.set_attribute(trigger, "title", &message) {
            log_error!("could not set tooltip on trigger {trigger}: {err:#}");
        }
    }

    fn set_state(&self, state: ControllerState) {
        self.lock().state = state;
    }

    fn emit_state(&self, invocation: &ScanInvocation, state: ControllerState) {
        self.emit(
            STATE_CHANGED_EVENT,
            &ScanStateChangedEvent {
                invocation_id: invocation.id,
                state,
            },
        );
    }

    fn emit_report(&self, invocation: &ScanInvocation, exit: &LoopExit) {
        let report = ScanReport {
            invocation_id: invocation.id,
            trigger: invocation.trigger.clone(),
            started_at: invocation.started_at,
            finished_at: Utc::now(),
            frames_polled: exit.frames_polled,
            outcome: ReportOutcome::from(&exit.outcome),
        };
        self.emit(COMPLETED_EVENT, &report);
    }

    fn emit<T: Serialize>(&self, event: &str, payload: &T) {
        let Some(sink) = &self.platform.events else {
            return;
        };
        match serde_json::to_value(payload) {
            Ok(value) => {
                if let Err(err) = sink.emit(event, value) {
                    log_warn!("failed to emit {event}: {err:#}");
                }
            }
            Err(err) => log_warn!("failed to serialize {event}: {err}"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
