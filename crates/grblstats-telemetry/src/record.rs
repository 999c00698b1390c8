//! The persisted telemetry record
//!
//! Fields are private: the installation identity is fixed at creation,
//! `last_sent_at` only moves forward, counters only grow, and usage time is
//! an unsigned duration. The crate mutates the record through the narrow
//! methods below so those properties hold by construction.

use crate::counters::UsageCounters;
use chrono::{DateTime, Utc};
use grblstats_core::{AppVersion, FirmwareKind, FirmwareVersion, LocaleId, TransportKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Lifetime usage record for one installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    installation_id: Uuid,
    installed_at: DateTime<Utc>,
    #[serde(default)]
    last_sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    app_version: AppVersion,
    #[serde(default)]
    firmware_version: FirmwareVersion,
    #[serde(default)]
    locale: LocaleId,
    #[serde(default)]
    ui_language: LocaleId,
    #[serde(default)]
    session_count: u64,
    #[serde(default)]
    usage_time: Duration,
    #[serde(default)]
    transport: TransportKind,
    #[serde(default)]
    firmware: FirmwareKind,
    #[serde(default)]
    counters: UsageCounters,
}

impl TelemetryRecord {
    /// Fresh record for a new installation, stamped with the current time
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    /// Fresh record for a new installation, stamped with `installed_at`
    pub fn new_at(installed_at: DateTime<Utc>) -> Self {
        Self {
            installation_id: Uuid::new_v4(),
            installed_at,
            last_sent_at: None,
            app_version: AppVersion::default(),
            firmware_version: FirmwareVersion::default(),
            locale: LocaleId::default(),
            ui_language: LocaleId::default(),
            session_count: 0,
            usage_time: Duration::ZERO,
            transport: TransportKind::default(),
            firmware: FirmwareKind::default(),
            counters: UsageCounters::default(),
        }
    }

    pub fn installation_id(&self) -> Uuid {
        self.installation_id
    }

    pub fn installed_at(&self) -> DateTime<Utc> {
        self.installed_at
    }

    /// Time of the last confirmed delivery, `None` if never sent
    pub fn last_sent_at(&self) -> Option<DateTime<Utc>> {
        self.last_sent_at
    }

    pub fn app_version(&self) -> AppVersion {
        self.app_version
    }

    pub fn firmware_version(&self) -> FirmwareVersion {
        self.firmware_version
    }

    pub fn locale(&self) -> LocaleId {
        self.locale
    }

    pub fn ui_language(&self) -> LocaleId {
        self.ui_language
    }

    pub fn session_count(&self) -> u64 {
        self.session_count
    }

    /// Accumulated active usage time
    pub fn usage_time(&self) -> Duration {
        self.usage_time
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn firmware(&self) -> FirmwareKind {
        self.firmware
    }

    /// Lifetime feature counters
    pub fn counters(&self) -> &UsageCounters {
        &self.counters
    }

    pub(crate) fn begin_session(&mut self) {
        self.session_count = self.session_count.saturating_add(1);
    }

    /// Record a confirmed delivery. Never moves the timestamp backwards.
    pub(crate) fn mark_sent(&mut self, at: DateTime<Utc>) {
        if self.last_sent_at.map_or(true, |prev| at > prev) {
            self.last_sent_at = Some(at);
        }
    }

    pub(crate) fn add_usage_time(&mut self, delta: Duration) {
        self.usage_time = self.usage_time.saturating_add(delta);
    }

    pub(crate) fn merge_counters(&mut self, delta: &UsageCounters) {
        self.counters.merge(delta);
    }

    pub(crate) fn set_versions(&mut self, app: AppVersion, firmware: Option<FirmwareVersion>) {
        self.app_version = app;
        if let Some(firmware) = firmware {
            self.firmware_version = firmware;
        }
    }

    pub(crate) fn set_locales(&mut self, locale: LocaleId, ui_language: LocaleId) {
        self.locale = locale;
        self.ui_language = ui_language;
    }

    pub(crate) fn set_kinds(&mut self, transport: TransportKind, firmware: FirmwareKind) {
        self.transport = transport;
        self.firmware = firmware;
    }
}

impl Default for TelemetryRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_fresh_record() {
        let now = Utc::now();
        let record = TelemetryRecord::new_at(now);
        assert_eq!(record.installed_at(), now);
        assert_eq!(record.last_sent_at(), None);
        assert_eq!(record.session_count(), 0);
        assert_eq!(record.usage_time(), Duration::ZERO);
        assert!(record.counters().is_empty());
    }

    #[test]
    fn test_fresh_records_have_distinct_ids() {
        assert_ne!(
            TelemetryRecord::new().installation_id(),
            TelemetryRecord::new().installation_id()
        );
    }

    #[test]
    fn test_mark_sent_never_regresses() {
        let now = Utc::now();
        let mut record = TelemetryRecord::new_at(now);

        record.mark_sent(now);
        assert_eq!(record.last_sent_at(), Some(now));

        record.mark_sent(now - TimeDelta::hours(3));
        assert_eq!(record.last_sent_at(), Some(now));

        let later = now + TimeDelta::minutes(5);
        record.mark_sent(later);
        assert_eq!(record.last_sent_at(), Some(later));
    }

    #[test]
    fn test_missing_firmware_version_keeps_previous() {
        let mut record = TelemetryRecord::new();
        let fw = FirmwareVersion::new(1, 1).with_build('h');

        record.set_versions(AppVersion::new(1, 0, 0), Some(fw));
        record.set_versions(AppVersion::new(1, 0, 1), None);

        assert_eq!(record.app_version(), AppVersion::new(1, 0, 1));
        assert_eq!(record.firmware_version(), fw);
    }
}
