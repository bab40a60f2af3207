//! Scripted stand-ins for the host capabilities, shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use image::DynamicImage;
use serde_json::Value;

use crate::capture::{Camera, FacingMode, Frame, MediaStream};
use crate::detection::BarcodeDetector;
use crate::error::CameraError;
use crate::models::{DetectedCode, Symbology};
use crate::platform::{EventSink, Haptics};

pub fn blank_frame() -> Frame {
    Frame::new(DynamicImage::new_luma8(8, 8))
}

pub struct FakeCamera {
    requests: Mutex<Vec<FacingMode>>,
    failures: Mutex<VecDeque<CameraError>>,
    stops: Arc<AtomicU32>,
    delay: Option<Duration>,
}

impl FakeCamera {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            stops: Arc::new(AtomicU32::new(0)),
            delay: None,
        }
    }

    /// Hold each request open for `delay`, like a permission prompt.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_first(self, err: CameraError) -> Self {
        self.failures.lock().unwrap().push_back(err);
        self
    }

    pub fn requests(&self) -> Vec<FacingMode> {
        self.requests.lock().unwrap().clone()
    }

    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn request_stream(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, CameraError> {
        self.requests.lock().unwrap().push(facing);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(Box::new(FakeStream {
            stops: self.stops.clone(),
            stopped: false,
        }))
    }
}

struct FakeStream {
    stops: Arc<AtomicU32>,
    stopped: bool,
}

impl MediaStream for FakeStream {
    fn current_frame(&mut self) -> Option<Frame> {
        (!self.stopped).then(blank_frame)
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

type DetectHook = Arc<dyn Fn(u32) + Send + Sync>;

/// Plays back one scripted result per `detect` call, then empty frames.
pub struct ScriptedDetector {
    script: Mutex<VecDeque<Result<Vec<DetectedCode>, String>>>,
    supported: Option<Vec<Symbology>>,
    calls: AtomicU32,
    on_detect: Mutex<Option<DetectHook>>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            supported: Some(Symbology::RETAIL.to_vec()),
            calls: AtomicU32::new(0),
            on_detect: Mutex::new(None),
        }
    }

    pub fn supporting(mut self, formats: Vec<Symbology>) -> Self {
        self.supported = Some(formats);
        self
    }

    pub fn unprobeable(mut self) -> Self {
        self.supported = None;
        self
    }

    pub fn frame(self, codes: Vec<DetectedCode>) -> Self {
        self.push_frame(codes);
        self
    }

    pub fn failing_frame(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn push_frame(&self, codes: Vec<DetectedCode>) {
        self.script.lock().unwrap().push_back(Ok(codes));
    }

    /// Run `hook` with the call number inside every `detect`, before it
    /// returns.
    pub fn set_on_detect(&self, hook: impl Fn(u32) + Send + Sync + 'static) {
        *self.on_detect.lock().unwrap() = Some(Arc::new(hook));
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BarcodeDetector for ScriptedDetector {
    fn supported_formats(&self) -> Result<Vec<Symbology>> {
        self.supported
            .clone()
            .ok_or_else(|| anyhow!("getSupportedFormats is not implemented"))
    }

    async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedCode>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let next = self.script.lock().unwrap().pop_front();
        tokio::task::yield_now().await;

        let hook = self.on_detect.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(call);
        }

        match next {
            Some(Ok(codes)) => Ok(codes),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
pub struct RecordingHaptics {
    pulses: Mutex<Vec<Duration>>,
    broken: bool,
}

impl RecordingHaptics {
    pub fn broken() -> Self {
        Self {
            pulses: Mutex::new(Vec::new()),
            broken: true,
        }
    }

    pub fn pulses(&self) -> Vec<Duration> {
        self.pulses.lock().unwrap().clone()
    }
}

impl Haptics for RecordingHaptics {
    fn vibrate(&self, duration: Duration) -> Result<()> {
        if self.broken {
            return Err(anyhow!("vibration is not supported"));
        }
        self.pulses.lock().unwrap().push(duration);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &str, payload: Value) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
        Ok(())
    }
}
