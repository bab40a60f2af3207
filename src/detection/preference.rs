use crate::models::{DetectedCode, Symbology};

/// Pick the one code to deliver from a frame's detections.
///
/// A lone code wins outright. With several, the first one in `preferred`
/// symbology wins, otherwise the first in detection order.
pub fn choose_preferred(codes: &[DetectedCode], preferred: Symbology) -> Option<&DetectedCode> {
    match codes {
        [] => None,
        [only] => Some(only),
        [first, ..] => codes
            .iter()
            .find(|code| code.symbology == preferred)
            .or(Some(first)),
    }
}
