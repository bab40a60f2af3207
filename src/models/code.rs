use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Barcode encoding standard, named the way platform detectors report it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Symbology {
    #[serde(rename = "ean_13")]
    Ean13,
    #[serde(rename = "ean_8")]
    Ean8,
    #[serde(rename = "upc_a")]
    UpcA,
    #[serde(rename = "upc_e")]
    UpcE,
    #[serde(rename = "code_128")]
    Code128,
    #[serde(rename = "code_39")]
    Code39,
    #[serde(rename = "code_93")]
    Code93,
    #[serde(rename = "codabar")]
    Codabar,
    #[serde(rename = "itf")]
    Itf,
    #[serde(rename = "qr_code")]
    QrCode,
    #[serde(rename = "data_matrix")]
    DataMatrix,
    #[serde(rename = "aztec")]
    Aztec,
    #[serde(rename = "pdf417")]
    Pdf417,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Symbology {
    /// The retail formats a field scanner asks for by default.
    pub const RETAIL: [Symbology; 4] = [
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
        Symbology::UpcE,
    ];

    pub const ALL: [Symbology; 14] = [
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Codabar,
        Symbology::Itf,
        Symbology::QrCode,
        Symbology::DataMatrix,
        Symbology::Aztec,
        Symbology::Pdf417,
        Symbology::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "ean_13",
            Symbology::Ean8 => "ean_8",
            Symbology::UpcA => "upc_a",
            Symbology::UpcE => "upc_e",
            Symbology::Code128 => "code_128",
            Symbology::Code39 => "code_39",
            Symbology::Code93 => "code_93",
            Symbology::Codabar => "codabar",
            Symbology::Itf => "itf",
            Symbology::QrCode => "qr_code",
            Symbology::DataMatrix => "data_matrix",
            Symbology::Aztec => "aztec",
            Symbology::Pdf417 => "pdf417",
            Symbology::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbology {
    type Err = anyhow::Error;

    /// Accepts the same names serde does.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(value.to_string()))
            .map_err(|_| anyhow!("unknown barcode format '{value}'"))
    }
}

/// One code found in one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetectedCode {
    pub symbology: Symbology,
    pub raw_value: String,
}

impl DetectedCode {
    pub fn new(symbology: Symbology, raw_value: impl Into<String>) -> Self {
        Self {
            symbology,
            raw_value: raw_value.into(),
        }
    }
}
