use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::capture::FacingMode;
use crate::models::Symbology;

const POLL_OVERRIDE_ENV: &str = "FIELDSCAN_POLL_MS";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerSettings {
    /// Delay between detection attempts on empty frames. Longer saves
    /// battery, shorter feels snappier.
    pub poll_interval_ms: u64,
    pub vibrate_ms: u64,
    pub formats: Vec<Symbology>,
    pub preferred_symbology: Symbology,
    pub facing_mode: FacingMode,
    /// Ancestor levels searched for an input/submit pair around a trigger.
    pub target_search_depth: usize,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            vibrate_ms: 200,
            formats: Symbology::RETAIL.to_vec(),
            preferred_symbology: Symbology::Ean13,
            facing_mode: FacingMode::Environment,
            target_search_depth: 3,
        }
    }
}

impl ScannerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn vibrate_duration(&self) -> Duration {
        Duration::from_millis(self.vibrate_ms)
    }

    /// Apply `FIELDSCAN_POLL_MS` when set to a positive integer.
    pub fn with_env_overrides(self) -> Self {
        let poll = std::env::var(POLL_OVERRIDE_ENV).ok();
        self.with_poll_override(poll.as_deref())
    }

    fn with_poll_override(mut self, raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().parse::<u64>()) {
            Some(Ok(ms)) if ms > 0 => self.poll_interval_ms = ms,
            Some(_) => log::warn!("Ignoring {POLL_OVERRIDE_ENV}: expected a positive integer"),
            None => {}
        }
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    #[serde(default)]
    scanner: ScannerSettings,
}

/// JSON-file backed settings, read once at startup.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings in {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Stored scanner settings with environment overrides applied.
    pub fn scanner(&self) -> ScannerSettings {
        let stored = match self.data.read() {
            Ok(guard) => guard.scanner.clone(),
            Err(poisoned) => poisoned.into_inner().scanner.clone(),
        };
        stored.with_env_overrides()
    }

    pub fn update_scanner(&self, settings: ScannerSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        guard.scanner = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
