use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::capture::Camera;
use crate::detection::DetectionCapability;
use crate::page::Document;

/// Device vibration. Callers never look at the result.
pub trait Haptics: Send + Sync {
    fn vibrate(&self, duration: Duration) -> Result<()>;
}

/// Where scan lifecycle events go, e.g. a webview bridge.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value) -> Result<()>;
}

/// Everything the host page lends to the scanner.
#[derive(Clone)]
pub struct ScanPlatform {
    pub document: Arc<dyn Document>,
    pub camera: Arc<dyn Camera>,
    /// `None` when neither a native detector nor a polyfill could be loaded.
    pub detector: Option<DetectionCapability>,
    pub haptics: Option<Arc<dyn Haptics>>,
    pub events: Option<Arc<dyn EventSink>>,
}

impl ScanPlatform {
    pub fn new(
        document: Arc<dyn Document>,
        camera: Arc<dyn Camera>,
        detector: Option<DetectionCapability>,
    ) -> Self {
        Self {
            document,
            camera,
            detector,
            haptics: None,
            events: None,
        }
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }
}
