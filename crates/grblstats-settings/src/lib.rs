//! GrblStats Settings Crate
//!
//! Handles telemetry configuration, settings files and platform paths.

pub mod config;
pub mod error;
pub mod manager;

pub use config::{SettingsFormat, TelemetrySettings};
pub use error::{SettingsError, SettingsResult};
pub use manager::SettingsManager;
