//! Usage stats service
//!
//! Owned by the application's top-level composition. Construction loads the
//! record and counts the session; shutdown runs the final cycle and saves.

use crate::counters::SessionCounters;
use crate::error::{TelemetryError, TelemetryResult};
use crate::facts::HostFacts;
use crate::policy::{CycleOutcome, ThrottlePolicy};
use crate::record::TelemetryRecord;
use crate::store::RecordStore;
use crate::transport::{HttpTransport, ReportTransport};
use chrono::{DateTime, TimeDelta, Utc};
use grblstats_core::AppVersion;
use grblstats_settings::{SettingsManager, TelemetrySettings};
use std::thread::JoinHandle;
use std::time::Instant;

/// Name of the thread used by [`UsageStats::shutdown_in_background`]
pub const WORKER_THREAD_NAME: &str = "usage-stats";

/// Per-process owner of the telemetry record
pub struct UsageStats {
    store: RecordStore,
    record: TelemetryRecord,
    policy: ThrottlePolicy,
    transport: Option<Box<dyn ReportTransport>>,
    settings: TelemetrySettings,
    session: SessionCounters,
    started: Instant,
    accounted: TimeDelta,
}

impl UsageStats {
    /// Load the record and count this process run.
    ///
    /// Construct once per process; each construction counts a session.
    pub fn start(
        store: RecordStore,
        policy: ThrottlePolicy,
        transport: Option<Box<dyn ReportTransport>>,
    ) -> Self {
        let record = store.load();
        Self {
            store,
            record,
            policy,
            transport,
            settings: TelemetrySettings::default(),
            session: SessionCounters::new(),
            started: Instant::now(),
            accounted: TimeDelta::zero(),
        }
    }

    /// Build the service from loaded settings.
    ///
    /// An unusable endpoint disables sending rather than failing startup.
    pub fn from_settings(manager: &SettingsManager) -> TelemetryResult<Self> {
        let settings = manager.settings();
        let store = RecordStore::new(manager.stats_file_path()?);

        let transport: Option<Box<dyn ReportTransport>> = match settings.endpoint() {
            Some(_) => match HttpTransport::from_settings(settings) {
                Ok(transport) => Some(Box::new(transport)),
                Err(e) => {
                    tracing::warn!("Usage reporting disabled: {}", e);
                    None
                }
            },
            None => None,
        };

        let mut stats = Self::start(store, ThrottlePolicy::from_settings(settings), transport);
        stats.settings = settings.clone();
        Ok(stats)
    }

    /// Handle for counting feature use during this session
    pub fn counters(&self) -> SessionCounters {
        self.session.clone()
    }

    /// The in-memory record
    pub fn record(&self) -> &TelemetryRecord {
        &self.record
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Whether reports can be sent at all
    pub fn is_collection_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Time since the service started
    pub fn elapsed(&self) -> TimeDelta {
        TimeDelta::from_std(self.started.elapsed()).unwrap_or_default()
    }

    /// Facts prefilled from settings, the system locale and the session clock
    pub fn facts(&self, app_version: AppVersion) -> HostFacts {
        HostFacts::from_settings(app_version, &self.settings).with_session_elapsed(self.elapsed())
    }

    /// Run a cycle now and save the record
    pub fn checkpoint(&mut self, facts: HostFacts) -> TelemetryResult<CycleOutcome> {
        self.checkpoint_at(facts, Utc::now())
    }

    /// Run a cycle at `now` and save the record.
    ///
    /// Here `facts.session_elapsed` is time since startup, not a delta: only
    /// the part not yet accumulated by an earlier checkpoint is added, and a
    /// negative reading adds nothing. Counts held by the session handle are
    /// drained into the cycle. The record is saved whether or not a report
    /// went out.
    pub fn checkpoint_at(
        &mut self,
        mut facts: HostFacts,
        now: DateTime<Utc>,
    ) -> TelemetryResult<CycleOutcome> {
        facts.session_elapsed = self.unaccounted(facts.session_elapsed);

        let drained = self.session.take();
        facts.session_counters.merge(&drained);

        let outcome = self
            .policy
            .run_cycle(&mut self.record, &facts, self.transport.as_deref(), now);

        if let Err(e) = self.store.save(&self.record) {
            tracing::warn!("Failed to save usage record: {}", e);
            return Err(e.into());
        }

        Ok(outcome)
    }

    /// Part of `elapsed` (time since startup) not yet added to the record.
    /// `accounted` never goes negative.
    fn unaccounted(&mut self, elapsed: TimeDelta) -> TimeDelta {
        let elapsed = elapsed.max(TimeDelta::zero());
        if elapsed <= self.accounted {
            return TimeDelta::zero();
        }
        let delta = elapsed - self.accounted;
        self.accounted = elapsed;
        delta
    }

    /// Final cycle for this process
    pub fn shutdown(mut self, facts: HostFacts) -> TelemetryResult<CycleOutcome> {
        self.checkpoint(facts)
    }

    /// Run the final cycle on a worker thread so a slow endpoint cannot
    /// stall the caller.
    pub fn shutdown_in_background(
        self,
        facts: HostFacts,
    ) -> TelemetryResult<JoinHandle<TelemetryResult<CycleOutcome>>> {
        std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || self.shutdown(facts))
            .map_err(|e| TelemetryError::Worker(e.to_string()))
    }
}

impl std::fmt::Debug for UsageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageStats")
            .field("store", &self.store)
            .field("record", &self.record)
            .field("policy", &self.policy)
            .field("collection_enabled", &self.is_collection_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::Feature;
    use std::time::Duration;

    const APP: AppVersion = AppVersion::new(1, 0, 0);

    fn offline_stats(dir: &std::path::Path) -> UsageStats {
        UsageStats::start(
            RecordStore::new(dir.join("usage_stats.json")),
            ThrottlePolicy::default(),
            None,
        )
    }

    #[test]
    fn test_repeated_checkpoints_do_not_double_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = offline_stats(dir.path());
        let counters = stats.counters();

        counters.increment(Feature::RasterFile);
        stats
            .checkpoint(HostFacts::new(APP).with_session_elapsed(TimeDelta::minutes(10)))
            .unwrap();

        counters.increment(Feature::RasterFile);
        stats
            .checkpoint(HostFacts::new(APP).with_session_elapsed(TimeDelta::minutes(25)))
            .unwrap();

        assert_eq!(stats.record().counters().raster_file, 2);
        assert_eq!(stats.record().usage_time(), Duration::from_secs(25 * 60));
    }

    #[test]
    fn test_elapsed_going_backwards_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = offline_stats(dir.path());

        stats
            .checkpoint(HostFacts::new(APP).with_session_elapsed(TimeDelta::minutes(30)))
            .unwrap();
        stats
            .checkpoint(HostFacts::new(APP).with_session_elapsed(TimeDelta::minutes(5)))
            .unwrap();

        assert_eq!(stats.record().usage_time(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_extreme_negative_elapsed_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = offline_stats(dir.path());

        stats
            .checkpoint(HostFacts::new(APP).with_session_elapsed(TimeDelta::minutes(1)))
            .unwrap();
        stats
            .checkpoint(HostFacts::new(APP).with_session_elapsed(TimeDelta::MIN))
            .unwrap();
        stats
            .checkpoint(HostFacts::new(APP).with_session_elapsed(TimeDelta::minutes(3)))
            .unwrap();

        assert_eq!(stats.record().usage_time(), Duration::from_secs(3 * 60));
    }

    #[test]
    fn test_facts_use_configured_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = offline_stats(dir.path());
        stats.settings.transport = grblstats_core::TransportKind::Emulator;

        let facts = stats.facts(APP);
        assert_eq!(facts.transport, grblstats_core::TransportKind::Emulator);
        assert!(facts.session_elapsed >= TimeDelta::zero());
    }
}
