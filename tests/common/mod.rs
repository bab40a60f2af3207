#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use fieldscan::{
    BarcodeDetector, Camera, CameraError, DetectedCode, FacingMode, Frame, MediaStream,
    MemoryDocument, NodeId, NodeKind, Symbology,
};
use image::DynamicImage;

/// Counts stream requests and releases; every stream serves blank frames.
#[derive(Default)]
pub struct CountingCamera {
    pub requests: AtomicU32,
    pub stops: Arc<AtomicU32>,
    pub denied: bool,
}

impl CountingCamera {
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for CountingCamera {
    async fn request_stream(&self, _facing: FacingMode) -> Result<Box<dyn MediaStream>, CameraError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.denied {
            return Err(CameraError::PermissionDenied);
        }
        Ok(Box::new(BlankStream {
            stops: self.stops.clone(),
        }))
    }
}

struct BlankStream {
    stops: Arc<AtomicU32>,
}

impl MediaStream for BlankStream {
    fn current_frame(&mut self) -> Option<Frame> {
        Some(Frame::new(DynamicImage::new_rgb8(32, 16)))
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Returns the queued frames in order, then nothing.
pub struct FrameScript {
    frames: Mutex<VecDeque<Vec<DetectedCode>>>,
    probe_ok: bool,
    pub calls: AtomicU32,
}

impl FrameScript {
    pub fn new(frames: Vec<Vec<DetectedCode>>) -> Self {
        Self {
            frames: Mutex::new(frames.into()),
            probe_ok: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn without_probe(mut self) -> Self {
        self.probe_ok = false;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BarcodeDetector for FrameScript {
    fn supported_formats(&self) -> Result<Vec<Symbology>> {
        if self.probe_ok {
            Ok(Symbology::RETAIL.to_vec())
        } else {
            Err(anyhow!("BarcodeDetector is not defined"))
        }
    }

    async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedCode>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.frames.lock().unwrap().pop_front();
        tokio::task::yield_now().await;
        Ok(next.unwrap_or_default())
    }
}

pub fn empty_frames(n: usize) -> Vec<Vec<DetectedCode>> {
    vec![Vec::new(); n]
}

/// An admin change list: a global search bar plus one inline row per item.
///
/// body
/// ├── header
/// ├── preview > video
/// ├── search: [searchbar, search-submit, search-scan]
/// └── rowA: [fieldA, scanA, submitButtonB]
pub fn admin_page() -> Arc<MemoryDocument> {
    let doc = Arc::new(MemoryDocument::new());
    let body = doc.insert("body", NodeKind::Container, None).unwrap();
    doc.insert("header", NodeKind::Other, Some(&body)).unwrap();
    let preview = doc.insert("preview", NodeKind::Container, Some(&body)).unwrap();
    doc.insert("video", NodeKind::Other, Some(&preview)).unwrap();

    let search = doc.insert("search", NodeKind::Container, Some(&body)).unwrap();
    doc.insert("searchbar", NodeKind::Input, Some(&search)).unwrap();
    doc.insert("search-submit", NodeKind::Submit, Some(&search)).unwrap();
    doc.insert("search-scan", NodeKind::Button, Some(&search)).unwrap();

    let row = doc.insert("rowA", NodeKind::Container, Some(&body)).unwrap();
    doc.insert("fieldA", NodeKind::Input, Some(&row)).unwrap();
    doc.insert("scanA", NodeKind::Button, Some(&row)).unwrap();
    doc.insert("submitButtonB", NodeKind::Submit, Some(&row)).unwrap();
    doc
}

pub fn node(id: &str) -> NodeId {
    NodeId::from(id)
}
