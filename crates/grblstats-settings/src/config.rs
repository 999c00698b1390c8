//! Telemetry configuration
//!
//! Provides the settings that drive usage reporting: where reports go, how
//! long a submission may take, how often reports are sent, and the
//! communication/firmware categories the application is configured for.
//! Supports JSON and TOML files, selected by file extension.

use crate::error::{SettingsError, SettingsResult};
use grblstats_core::{FirmwareKind, TransportKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Request timeout used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

/// Minimum spacing between two reports when versions are unchanged
pub const DEFAULT_SEND_INTERVAL_HOURS: u32 = 24;

/// On-disk format of a settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Usage telemetry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Collection endpoint; `None` disables sending
    pub endpoint: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Hours that must pass before an unchanged installation reports again
    pub send_interval_hours: u32,
    /// Configured communication channel
    pub transport: TransportKind,
    /// Configured firmware family
    pub firmware: FirmwareKind,
    /// Overrides the platform application-data directory
    pub data_dir: Option<PathBuf>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            send_interval_hours: DEFAULT_SEND_INTERVAL_HOURS,
            transport: TransportKind::default(),
            firmware: FirmwareKind::default(),
            data_dir: None,
        }
    }
}

impl TelemetrySettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the application-data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Configured endpoint, ignoring blank values
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Whether a collection endpoint is configured
    pub fn is_collection_enabled(&self) -> bool {
        self.endpoint().is_some()
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Throttle window as a duration
    pub fn send_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.send_interval_hours) * 3600)
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = SettingsFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let settings: Self = match format {
            SettingsFormat::Json => serde_json::from_str(&content)?,
            SettingsFormat::Toml => toml::from_str(&content)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match SettingsFormat::from_path(path)? {
            SettingsFormat::Json => serde_json::to_string_pretty(self)?,
            SettingsFormat::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content).map_err(|e| {
            SettingsError::SaveError(format!("{}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if let Some(url) = self.endpoint() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SettingsError::invalid(
                    "endpoint",
                    format!("'{}' is not an http(s) URL", url),
                ));
            }
        }

        if self.request_timeout_ms == 0 {
            return Err(SettingsError::invalid("request_timeout_ms", "must be > 0"));
        }

        if self.send_interval_hours == 0 {
            return Err(SettingsError::invalid("send_interval_hours", "must be > 0"));
        }

        Ok(())
    }
}
