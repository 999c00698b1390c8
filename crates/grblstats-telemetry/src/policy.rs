//! Throttle & enrichment policy
//!
//! A cycle decides whether a report is due, refreshes the record from the
//! host facts, and sends when due. The decision is taken against the record
//! as it was before enrichment, since enrichment overwrites the versions the
//! gate compares. Enrichment always happens; only the send is gated.

use crate::error::TransportError;
use crate::facts::HostFacts;
use crate::record::TelemetryRecord;
use crate::report::Report;
use crate::transport::ReportTransport;
use chrono::{DateTime, TimeDelta, Utc};
use grblstats_settings::TelemetrySettings;

/// Why a cycle did not attempt a send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// An application update is being installed
    UpdateInProgress,
    /// No collection endpoint is configured
    NoEndpoint,
}

/// Which gate conditions fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReasons {
    /// The last delivery is older than the throttle window (or never happened)
    pub stale: bool,
    /// The application version differs from the recorded one
    pub app_version_changed: bool,
    /// The firmware version differs from the recorded one
    pub firmware_changed: bool,
}

impl SendReasons {
    pub fn any(&self) -> bool {
        self.stale || self.app_version_changed || self.firmware_changed
    }
}

/// Outcome of the throttle gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendDecision {
    /// Sending is disabled for this cycle
    Skipped(SkipReason),
    /// Nothing changed and the last report is recent
    NotDue,
    /// A report should be sent
    Due(SendReasons),
}

impl SendDecision {
    pub fn must_send(&self) -> bool {
        matches!(self, SendDecision::Due(_))
    }
}

/// Result of a send attempt
#[derive(Debug)]
pub enum Delivery {
    /// The endpoint confirmed receipt
    Sent { at: DateTime<Utc> },
    /// The attempt failed; the record was left unchanged
    Failed(TransportError),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent { .. })
    }
}

/// What a cycle did
#[derive(Debug)]
pub struct CycleOutcome {
    pub decision: SendDecision,
    /// `None` when no send was attempted
    pub delivery: Option<Delivery>,
}

impl CycleOutcome {
    pub fn was_sent(&self) -> bool {
        self.delivery.as_ref().is_some_and(Delivery::is_sent)
    }
}

/// Throttle gate plus enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    interval: TimeDelta,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            interval: TimeDelta::days(1),
        }
    }
}

impl ThrottlePolicy {
    pub fn new(interval: TimeDelta) -> Self {
        Self { interval }
    }

    /// Policy using the configured send interval
    pub fn from_settings(settings: &TelemetrySettings) -> Self {
        TimeDelta::from_std(settings.send_interval())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// Evaluate the gate conditions against the record as stored
    pub fn send_reasons(
        &self,
        record: &TelemetryRecord,
        facts: &HostFacts,
        now: DateTime<Utc>,
    ) -> SendReasons {
        SendReasons {
            stale: record
                .last_sent_at()
                .map_or(true, |last| now - last > self.interval),
            app_version_changed: record.app_version() != facts.app_version,
            firmware_changed: facts
                .firmware_version
                .is_some_and(|fw| fw != record.firmware_version()),
        }
    }

    /// Decide whether this cycle should send
    pub fn decide(
        &self,
        record: &TelemetryRecord,
        facts: &HostFacts,
        endpoint_configured: bool,
        now: DateTime<Utc>,
    ) -> SendDecision {
        if facts.update_in_progress {
            return SendDecision::Skipped(SkipReason::UpdateInProgress);
        }
        if !endpoint_configured {
            return SendDecision::Skipped(SkipReason::NoEndpoint);
        }

        let reasons = self.send_reasons(record, facts, now);
        if reasons.any() {
            SendDecision::Due(reasons)
        } else {
            SendDecision::NotDue
        }
    }

    /// Refresh environment fields and fold the session into the lifetime totals
    pub fn enrich(record: &mut TelemetryRecord, facts: &HostFacts) {
        record.set_versions(facts.app_version, facts.firmware_version);
        record.set_locales(facts.locale, facts.ui_language);
        record.set_kinds(facts.transport, facts.firmware);

        // Negative readings come from clock adjustments; they add nothing.
        let delta = facts.session_elapsed.to_std().unwrap_or_default();
        record.add_usage_time(delta);

        record.merge_counters(&facts.session_counters);
    }

    /// Run one decide/enrich/send cycle. Never fails: transport errors are
    /// logged and reported in the outcome only.
    pub fn run_cycle(
        &self,
        record: &mut TelemetryRecord,
        facts: &HostFacts,
        transport: Option<&dyn ReportTransport>,
        now: DateTime<Utc>,
    ) -> CycleOutcome {
        let decision = self.decide(record, facts, transport.is_some(), now);
        tracing::debug!("Usage report decision: {:?}", decision);

        Self::enrich(record, facts);

        let delivery = match (decision, transport) {
            (SendDecision::Due(_), Some(transport)) => {
                let report = Report::from_record(record);
                Some(match transport.send(&report) {
                    Ok(()) => {
                        record.mark_sent(now);
                        tracing::info!("Usage report delivered");
                        Delivery::Sent { at: now }
                    }
                    Err(e) => {
                        tracing::warn!("Usage report not delivered: {}", e);
                        Delivery::Failed(e)
                    }
                })
            }
            _ => None,
        };

        CycleOutcome { decision, delivery }
    }
}
