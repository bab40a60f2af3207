pub mod code;
pub mod outcome;

pub use code::{DetectedCode, Symbology};
pub use outcome::{ReportOutcome, ScanOutcome, ScanReport};
