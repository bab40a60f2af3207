use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::capture::Frame;
use crate::models::{DetectedCode, Symbology};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// A barcode detector the host can provide, either the platform's own or a
/// bundled polyfill.
#[async_trait]
pub trait BarcodeDetector: Send + Sync {
    /// Formats this detector can decode. An error means the implementation is
    /// present but unusable.
    fn supported_formats(&self) -> Result<Vec<Symbology>>;

    async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedCode>>;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DetectorBackend {
    Native,
    Polyfill,
}

/// The detector picked at load time, narrowed to the formats the widget
/// cares about.
#[derive(Clone)]
pub struct DetectionCapability {
    backend: DetectorBackend,
    detector: Arc<dyn BarcodeDetector>,
    formats: Vec<Symbology>,
}

impl DetectionCapability {
    /// Prefer a native detector whose format probe succeeds and covers at
    /// least one requested format, then the polyfill. `None` means no
    /// implementation is available at all.
    pub fn resolve(
        native: Option<Arc<dyn BarcodeDetector>>,
        polyfill: Option<Arc<dyn BarcodeDetector>>,
        formats: &[Symbology],
    ) -> Option<Self> {
        if let Some(native) = native {
            match native.supported_formats() {
                Ok(supported) => {
                    let usable = narrow(formats, &supported);
                    if !usable.is_empty() {
                        log_info!("using native barcode detector for {usable:?}");
                        return Some(Self {
                            backend: DetectorBackend::Native,
                            detector: native,
                            formats: usable,
                        });
                    }
                    log_warn!("native barcode detector supports none of {formats:?}");
                }
                Err(err) => log_warn!("native barcode detector unusable: {err:#}"),
            }
        }

        let Some(polyfill) = polyfill else {
            log_warn!("no barcode detector implementation available");
            return None;
        };

        let usable = match polyfill.supported_formats() {
            Ok(supported) if !narrow(formats, &supported).is_empty() => narrow(formats, &supported),
            _ => formats.to_vec(),
        };
        log_info!("using polyfill barcode detector for {usable:?}");
        Some(Self {
            backend: DetectorBackend::Polyfill,
            detector: polyfill,
            formats: usable,
        })
    }

    pub fn backend(&self) -> DetectorBackend {
        self.backend
    }

    pub fn formats(&self) -> &[Symbology] {
        &self.formats
    }

    /// Keep only the formats in `wanted`. `None` when nothing is left.
    pub fn restricted_to(self, wanted: &[Symbology]) -> Option<Self> {
        let formats = narrow(&self.formats, wanted);
        if formats.is_empty() {
            log_warn!(
                "{:?} barcode detector covers none of the configured formats {wanted:?}",
                self.backend
            );
            return None;
        }
        Some(Self { formats, ..self })
    }

    /// Detect on one frame, dropping codes outside the configured formats.
    pub async fn detect(&self, frame: &Frame) -> Result<Vec<DetectedCode>> {
        let codes = self.detector.detect(frame).await?;
        Ok(codes
            .into_iter()
            .filter(|code| self.formats.contains(&code.symbology))
            .collect())
    }
}

impl fmt::Debug for DetectionCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectionCapability")
            .field("backend", &self.backend)
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

fn narrow(requested: &[Symbology], supported: &[Symbology]) -> Vec<Symbology> {
    requested
        .iter()
        .copied()
        .filter(|format| supported.contains(format))
        .collect()
}
