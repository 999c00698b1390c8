//! # GrblStats
//!
//! Anonymous usage statistics for a GRBL laser/CNC sender.
//!
//! ## Architecture
//!
//! GrblStats is organized as a workspace with multiple crates:
//!
//! 1. **grblstats-core** - Version and kind types, host environment probes
//! 2. **grblstats-settings** - Telemetry configuration and file locations
//! 3. **grblstats-telemetry** - Counters, persisted record, throttle policy, transport
//! 4. **grblstats** - Composition root: logging and service wiring
//!
//! ## Usage
//!
//! ```no_run
//! use grblstats::{start_usage_stats, current_app_version, Feature};
//!
//! let stats = start_usage_stats(None)?;
//! stats.counters().increment(Feature::GCodeFile);
//!
//! let facts = stats.facts(current_app_version());
//! stats.shutdown(facts)?;
//! # Ok::<(), grblstats::TelemetryError>(())
//! ```

use std::path::Path;

pub use grblstats_core::{
    AppVersion, FirmwareKind, FirmwareVersion, LocaleId, TransportKind, VersionError,
};

pub use grblstats_settings::{SettingsError, SettingsManager, TelemetrySettings};

pub use grblstats_telemetry::{
    CycleOutcome, Feature, HostFacts, HttpTransport, RecordStore, Report, ReportTransport,
    SendDecision, SessionCounters, SkipReason, TelemetryError, TelemetryRecord, TelemetryResult,
    ThrottlePolicy, TransportError, UsageCounters, UsageStats,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Version reported as the application version
pub fn current_app_version() -> AppVersion {
    AppVersion::parse(VERSION).unwrap_or_default()
}

/// Load settings and start the usage stats service.
///
/// `settings_path` overrides the platform config file. A missing or unreadable
/// file yields defaults, which leave reporting disabled.
pub fn start_usage_stats(settings_path: Option<&Path>) -> TelemetryResult<UsageStats> {
    let manager = SettingsManager::load(settings_path);
    let stats = UsageStats::from_settings(&manager)?;
    tracing::debug!(
        "Usage stats started (session {}, reporting {})",
        stats.record().session_count(),
        if stats.is_collection_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(stats)
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::util::TryInitError;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    let result: Result<(), TryInitError> = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    if result.is_err() {
        tracing::debug!("Logging already initialised");
    }

    Ok(())
}
