//! # GrblStats Telemetry
//!
//! Anonymous usage telemetry: per-session feature counters are merged into a
//! persisted lifetime record, which is periodically reported to a collection
//! endpoint.
//!
//! ## Lifecycle
//!
//! 1. [`UsageStats::start`] loads (or creates) the record and counts a session.
//! 2. The host bumps [`SessionCounters`] while the application runs.
//! 3. [`UsageStats::shutdown`] (or [`UsageStats::checkpoint`]) enriches the
//!    record, sends a [`Report`] when the throttle gate allows it, and saves.
//!
//! Telemetry is best effort: delivery failures are logged and dropped, never
//! surfaced to the host.

pub mod counters;
pub mod error;
pub mod facts;
pub mod policy;
pub mod record;
pub mod report;
pub mod service;
pub mod store;
pub mod transport;

pub use counters::{Feature, SessionCounters, UsageCounters};
pub use error::{StoreError, StoreResult, TelemetryError, TelemetryResult, TransportError};
pub use facts::HostFacts;
pub use policy::{CycleOutcome, Delivery, SendDecision, SendReasons, SkipReason, ThrottlePolicy};
pub use record::TelemetryRecord;
pub use report::Report;
pub use service::UsageStats;
pub use store::RecordStore;
pub use transport::{HttpTransport, ReportTransport, SUCCESS_MARKER};
