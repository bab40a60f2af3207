use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::error::{CameraError, ScanError};
use crate::page::{Document, NodeId};

use super::camera::{Camera, FacingMode, Frame, MediaStream};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

const DISPLAY: &str = "display";
const SHOWN: &str = "flex";
const HIDDEN: &str = "none";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Requesting,
    Active,
    Closed,
}

struct SessionInner {
    state: SessionState,
    stream: Option<Box<dyn MediaStream>>,
}

/// Owns the camera stream and the preview container's visibility for one
/// invocation.
///
/// The container's `display` style is the only record of whether the preview
/// is up; the scan loop and the dismissal path both go through it. Clones
/// share the same session.
#[derive(Clone)]
pub struct CaptureSession {
    document: Arc<dyn Document>,
    camera: Arc<dyn Camera>,
    container: NodeId,
    inner: Arc<Mutex<SessionInner>>,
}

impl CaptureSession {
    pub fn new(document: Arc<dyn Document>, camera: Arc<dyn Camera>, container: NodeId) -> Self {
        Self {
            document,
            camera,
            container,
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Idle,
                stream: None,
            })),
        }
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn container(&self) -> &NodeId {
        &self.container
    }

    /// Show the preview and acquire a stream, preferring `facing` and falling
    /// back to any camera when no device matches it.
    pub async fn open(&self, facing: FacingMode) -> Result<(), ScanError> {
        {
            let mut inner = self.lock();
            if inner.state != SessionState::Idle {
                return Err(ScanError::camera(format!(
                    "capture session cannot reopen from {:?}",
                    inner.state
                )));
            }
            inner.state = SessionState::Requesting;
        }

        self.set_display(SHOWN);

        let mut stream = match self.acquire(facing).await {
            Ok(stream) => stream,
            Err(err) => {
                log_warn!("camera request failed: {err}");
                self.close();
                return Err(err.into());
            }
        };

        let mut inner = self.lock();
        if inner.state == SessionState::Closed {
            // Dismissed while the permission prompt was up.
            drop(inner);
            stream.stop();
            log_info!("capture session closed before the stream arrived; released it");
            return Ok(());
        }
        inner.stream = Some(stream);
        inner.state = SessionState::Active;
        log_debug!("capture session active on container {}", self.container);
        Ok(())
    }

    async fn acquire(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, CameraError> {
        match self.camera.request_stream(facing).await {
            Err(CameraError::Overconstrained(_)) if facing != FacingMode::Any => {
                log_info!("no {facing} camera, falling back to any camera");
                self.camera.request_stream(FacingMode::Any).await
            }
            result => result,
        }
    }

    /// Release the stream and hide the preview. Repeated calls are harmless.
    pub fn close(&self) {
        let (stream, already_closed) = {
            let mut inner = self.lock();
            let already_closed = inner.state == SessionState::Closed;
            inner.state = SessionState::Closed;
            (inner.stream.take(), already_closed)
        };

        if let Some(mut stream) = stream {
            stream.stop();
            log_info!("camera stream released");
        }
        self.set_display(HIDDEN);

        if !already_closed {
            log_debug!("capture session closed");
        }
    }

    pub fn is_visible(&self) -> bool {
        self.document
            .style(&self.container, DISPLAY)
            .is_some_and(|value| value == SHOWN)
    }

    pub fn current_frame(&self) -> Option<Frame> {
        self.lock()
            .stream
            .as_mut()
            .and_then(|stream| stream.current_frame())
    }

    fn set_display(&self, value: &str) {
        if let Err(err) = self.document.set_style(&self.container, DISPLAY, value) {
            log_warn!("could not set preview display to {value}: {err:#}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
