//! Host-supplied facts consumed by the enrichment step.

use crate::counters::UsageCounters;
use chrono::TimeDelta;
use grblstats_core::{
    detect_locale, AppVersion, FirmwareKind, FirmwareVersion, LocaleId, TransportKind,
};
use grblstats_settings::TelemetrySettings;

/// Snapshot of the host application's state at checkpoint time
#[derive(Debug, Clone, PartialEq)]
pub struct HostFacts {
    /// Version of the running application
    pub app_version: AppVersion,
    /// Firmware version of the connected controller, if one was seen
    pub firmware_version: Option<FirmwareVersion>,
    /// Formatting locale
    pub locale: LocaleId,
    /// User interface language
    pub ui_language: LocaleId,
    /// Active session time; negative values count as zero.
    ///
    /// [`ThrottlePolicy::enrich`](crate::ThrottlePolicy::enrich) adds it to
    /// the record as given. [`UsageStats`](crate::UsageStats) checkpoints read
    /// it as time since startup and add only what earlier checkpoints have
    /// not.
    pub session_elapsed: TimeDelta,
    /// An application update is being installed
    pub update_in_progress: bool,
    /// Configured communication channel
    pub transport: TransportKind,
    /// Configured firmware family
    pub firmware: FirmwareKind,
    /// Feature counts gathered during this session
    pub session_counters: UsageCounters,
}

impl HostFacts {
    pub fn new(app_version: AppVersion) -> Self {
        Self {
            app_version,
            firmware_version: None,
            locale: LocaleId::INVARIANT,
            ui_language: LocaleId::INVARIANT,
            session_elapsed: TimeDelta::zero(),
            update_in_progress: false,
            transport: TransportKind::default(),
            firmware: FirmwareKind::default(),
            session_counters: UsageCounters::default(),
        }
    }

    /// Facts with the configured kinds and the system locale filled in
    pub fn from_settings(app_version: AppVersion, settings: &TelemetrySettings) -> Self {
        let locale = detect_locale();
        Self {
            locale,
            ui_language: locale,
            transport: settings.transport,
            firmware: settings.firmware,
            ..Self::new(app_version)
        }
    }

    pub fn with_firmware_version(mut self, version: FirmwareVersion) -> Self {
        self.firmware_version = Some(version);
        self
    }

    pub fn with_locales(mut self, locale: LocaleId, ui_language: LocaleId) -> Self {
        self.locale = locale;
        self.ui_language = ui_language;
        self
    }

    pub fn with_session_elapsed(mut self, elapsed: TimeDelta) -> Self {
        self.session_elapsed = elapsed;
        self
    }

    pub fn with_update_in_progress(mut self, updating: bool) -> Self {
        self.update_in_progress = updating;
        self
    }

    pub fn with_kinds(mut self, transport: TransportKind, firmware: FirmwareKind) -> Self {
        self.transport = transport;
        self.firmware = firmware;
        self
    }

    pub fn with_session_counters(mut self, counters: UsageCounters) -> Self {
        self.session_counters = counters;
        self
    }
}
