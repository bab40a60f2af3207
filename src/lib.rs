//! Camera barcode scanning for form fields.
//!
//! A [`ScanController`] is bound to one scanner widget (a trigger button and a
//! preview container). Each trigger activation resolves which field to fill,
//! opens the camera, polls frames through the host's barcode detector and
//! either delivers one value and presses submit, or tears down on dismissal.
//! Fatal problems disable the trigger with an explanatory tooltip.
//!
//! The host page supplies the platform pieces through [`ScanPlatform`]:
//! a [`page::Document`], a [`capture::Camera`], the resolved
//! [`detection::DetectionCapability`], and optional haptics and event sink.

pub mod capture;
pub mod detection;
pub mod error;
pub mod models;
pub mod page;
pub mod platform;
pub mod scanning;
pub mod settings;
mod utils;

#[cfg(test)]
mod test_support;

pub use capture::{Camera, CaptureSession, FacingMode, Frame, MediaStream, SessionState};
pub use detection::{choose_preferred, BarcodeDetector, DetectionCapability, DetectorBackend};
pub use error::{CameraError, ScanError};
pub use models::{DetectedCode, ReportOutcome, ScanOutcome, ScanReport, Symbology};
pub use page::{Document, MemoryDocument, NodeId, NodeKind, ScanTarget, TargetStrategy};
pub use platform::{EventSink, Haptics, ScanPlatform};
pub use scanning::{ControllerState, DismissalController, ScanController, ScanWidget, UiEvent};
pub use settings::{ScannerSettings, SettingsStore};
pub use utils::init_logging;
