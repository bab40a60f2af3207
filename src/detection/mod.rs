pub mod detector;
pub mod preference;

pub use detector::{BarcodeDetector, DetectionCapability, DetectorBackend};
pub use preference::choose_preferred;
