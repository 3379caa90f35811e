use crate::{Error, Result, RoxyFinder};
use roxy_core::DEFAULT_POLL_INTERVAL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User preferences persisted in `settings.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "roxyExePath", default)]
    pub roxy_exe_path: Option<PathBuf>,

    #[serde(
        rename = "autoDetectEnabled",
        alias = "auto_detect_enabled",
        default = "default_auto_detect"
    )]
    pub auto_detect_enabled: bool,

    #[serde(rename = "pollIntervalSecs", default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_auto_detect() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roxy_exe_path: None,
            auto_detect_enabled: default_auto_detect(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Settings {
    /// Status poll period, never shorter than one second
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Reads and writes [`Settings`] at a fixed path
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config dir>/roxybrowser-manager/settings.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("roxybrowser-manager").join("settings.json"))
            .ok_or_else(|| Error::Settings("Could not determine config directory".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields the defaults
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Settings(format!("Invalid settings file {}: {}", self.path.display(), e))
        })
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Validate and persist a custom RoxyBrowser executable path
    pub fn set_exe_path(&self, path: &Path) -> Result<PathBuf> {
        let path = RoxyFinder::validate(path)
            .map_err(|e| Error::Settings(format!("Invalid RoxyBrowser path: {}", e)))?;

        let mut settings = self.load().unwrap_or_else(|e| {
            tracing::warn!("Replacing unreadable settings: {}", e);
            Settings::default()
        });
        settings.roxy_exe_path = Some(path.clone());
        self.save(&settings)?;

        tracing::info!("RoxyBrowser path set to {}", path.display());
        Ok(path)
    }

    pub fn clear_exe_path(&self) -> Result<()> {
        let mut settings = self.load()?;
        settings.roxy_exe_path = None;
        self.save(&settings)
    }
}
