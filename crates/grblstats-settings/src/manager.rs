//! Settings Manager
//!
//! Resolves the platform directories used by GrblStats and loads the
//! telemetry settings file, falling back to defaults when it is absent or
//! unusable.

use crate::config::TelemetrySettings;
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};

/// Directory name used under the platform config/data roots
pub const APP_DIR_NAME: &str = "grblstats";

/// File name of the settings file inside the config directory
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// File name of the persisted usage record inside the data directory
pub const STATS_FILE_NAME: &str = "usage_stats.json";

/// Owns the loaded settings and the paths derived from them
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings: TelemetrySettings,
    source: Option<PathBuf>,
}

impl SettingsManager {
    /// Wrap already-loaded settings
    pub fn new(settings: TelemetrySettings) -> Self {
        Self {
            settings,
            source: None,
        }
    }

    /// Load from `path`, or from the platform settings file when `path` is `None`
    pub fn load(path: Option<&Path>) -> Self {
        let source = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::config_file_path().ok(),
        };

        let settings = match &source {
            Some(p) => Self::load_or_default(p),
            None => {
                tracing::warn!("No config directory available, using default telemetry settings");
                TelemetrySettings::default()
            }
        };

        Self { settings, source }
    }

    /// Load settings from `path`, logging and returning defaults on failure
    pub fn load_or_default(path: &Path) -> TelemetrySettings {
        if !path.exists() {
            tracing::debug!("Settings file {} not found, using defaults", path.display());
            return TelemetrySettings::default();
        }

        match TelemetrySettings::load_from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
                TelemetrySettings::default()
            }
        }
    }

    /// Platform configuration directory for GrblStats
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("platform config directory unavailable".into())
            })
    }

    /// Platform settings file path
    pub fn config_file_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(SETTINGS_FILE_NAME))
    }

    /// Create the platform configuration directory if needed
    pub fn ensure_config_dir() -> SettingsResult<PathBuf> {
        let dir = Self::config_dir()?;
        ensure_dir(&dir)?;
        Ok(dir)
    }

    /// Loaded settings
    pub fn settings(&self) -> &TelemetrySettings {
        &self.settings
    }

    /// Mutable access to the loaded settings
    pub fn settings_mut(&mut self) -> &mut TelemetrySettings {
        &mut self.settings
    }

    /// File the settings were loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Application-data directory: the configured override or the platform default
    pub fn data_dir(&self) -> SettingsResult<PathBuf> {
        if let Some(dir) = &self.settings.data_dir {
            return Ok(dir.clone());
        }

        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("platform data directory unavailable".into())
            })
    }

    /// Location of the persisted usage record
    pub fn stats_file_path(&self) -> SettingsResult<PathBuf> {
        Ok(self.data_dir()?.join(STATS_FILE_NAME))
    }

    /// Save the settings back to the file they came from
    pub fn save(&self) -> SettingsResult<()> {
        let path = self.source.as_deref().ok_or_else(|| {
            SettingsError::SaveError("settings were not loaded from a file".into())
        })?;
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        self.settings.save_to_file(path)
    }
}

/// Create `dir` and its parents if they do not exist
pub fn ensure_dir(dir: &Path) -> SettingsResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e)))
}
