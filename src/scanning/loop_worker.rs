use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::capture::CaptureSession;
use crate::detection::{choose_preferred, DetectionCapability};
use crate::models::{DetectedCode, ScanOutcome, Symbology};
use crate::platform::Haptics;
use crate::settings::ScannerSettings;

use super::state::ScanInvocation;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub poll_interval: Duration,
    pub vibrate: Duration,
    pub preferred: Symbology,
}

impl From<&ScannerSettings> for LoopConfig {
    fn from(settings: &ScannerSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            vibrate: settings.vibrate_duration(),
            preferred: settings.preferred_symbology,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopExit {
    pub outcome: ScanOutcome,
    /// Detection attempts made, including the one that found the code.
    pub frames_polled: u32,
}

/// Poll frames until a code is found or the preview goes away.
///
/// Visibility is checked before every detection so a dismissal lands within
/// one detection call. A detection that already returned a code is delivered
/// even if the preview was hidden while it ran; only the haptic pulse is
/// skipped then. `shutdown` cuts the inter-poll sleep short but never an
/// in-flight detection.
pub async fn scan_loop(
    invocation: &ScanInvocation,
    session: &CaptureSession,
    detector: &DetectionCapability,
    haptics: Option<&dyn Haptics>,
    config: &LoopConfig,
    shutdown: &CancellationToken,
) -> LoopExit {
    let mut frames_polled: u32 = 0;

    loop {
        if shutdown.is_cancelled() {
            log_info!("scan {} stopped by shutdown", invocation.id);
            return LoopExit {
                outcome: ScanOutcome::Cancelled,
                frames_polled,
            };
        }
        if !session.is_visible() {
            log_info!("scan {} dismissed after {frames_polled} frames", invocation.id);
            return LoopExit {
                outcome: ScanOutcome::Cancelled,
                frames_polled,
            };
        }

        frames_polled = frames_polled.saturating_add(1);
        let codes = detect_frame(session, detector).await;

        if let Some(code) = choose_preferred(&codes, config.preferred) {
            let value = code.raw_value.clone();
            if session.is_visible() {
                if let Some(haptics) = haptics {
                    let _ = haptics.vibrate(config.vibrate);
                }
            } else {
                log_info!("preview hidden during detection; delivering the detected code anyway");
            }
            log_info!(
                "scan {} found {} ({} candidates) on frame {frames_polled}",
                invocation.id,
                code.symbology,
                codes.len()
            );
            return LoopExit {
                outcome: ScanOutcome::Found(value),
                frames_polled,
            };
        }

        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = shutdown.cancelled() => {}
        }
    }
}

/// Detection errors and missing frames count as an empty frame.
async fn detect_frame(session: &CaptureSession, detector: &DetectionCapability) -> Vec<DetectedCode> {
    let Some(frame) = session.current_frame() else {
        log_debug!("no frame available yet");
        return Vec::new();
    };

    match detector.detect(&frame).await {
        Ok(codes) => codes,
        Err(err) => {
            log_debug!("detection failed on a {:?} frame, skipping: {err:#}", frame.dimensions());
            Vec::new()
        }
    }
}
