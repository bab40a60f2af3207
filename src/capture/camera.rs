use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::CameraError;

/// Which way the requested camera should point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    /// Rear camera on phones and tablets.
    Environment,
    User,
    /// Whatever the platform grants.
    Any,
}

impl Default for FacingMode {
    fn default() -> Self {
        FacingMode::Environment
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
            FacingMode::Any => "any",
        };
        f.write_str(name)
    }
}

/// One still from the camera stream. Cloning shares the pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<DynamicImage>,
    captured_at: Instant,
}

impl Frame {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
            captured_at: Instant::now(),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// A live camera stream handed out by [`Camera::request_stream`].
pub trait MediaStream: Send {
    /// Latest frame, `None` while the stream is still warming up.
    fn current_frame(&mut self) -> Option<Frame>;

    /// Release the device. Called at most once per stream.
    fn stop(&mut self);
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn request_stream(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, CameraError>;
}
