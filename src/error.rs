use thiserror::Error;

use crate::capture::FacingMode;

/// Fatal scan failures. These are the only errors that leave the scan
/// controller; each one disables the trigger for the rest of the page
/// lifetime, and its `Display` text becomes the trigger's tooltip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("Barcode detection is not available on this device")]
    CapabilityMissing,
    #[error("Camera unavailable: {reason}")]
    CameraUnavailable { reason: String },
    #[error("Could not find the field to fill: {reason}")]
    TargetResolution { reason: String },
}

impl ScanError {
    pub fn camera(reason: impl ToString) -> Self {
        ScanError::CameraUnavailable {
            reason: reason.to_string(),
        }
    }

    pub fn target(reason: impl ToString) -> Self {
        ScanError::TargetResolution {
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable tag used in emitted events.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::CapabilityMissing => "capabilityMissing",
            ScanError::CameraUnavailable { .. } => "cameraUnavailable",
            ScanError::TargetResolution { .. } => "targetResolution",
        }
    }
}

/// Why the platform refused to hand out a camera stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDevice,
    #[error("no camera satisfies facing mode {0}")]
    Overconstrained(FacingMode),
    #[error("{0}")]
    Other(String),
}

impl From<CameraError> for ScanError {
    fn from(err: CameraError) -> Self {
        ScanError::camera(err)
    }
}
