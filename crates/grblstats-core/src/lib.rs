//! # GrblStats Core
//!
//! Core value types shared by the GrblStats crates.
//! Provides version identifiers for the application and the attached
//! firmware, the categorical transport/firmware tags, locale identifiers
//! and the host environment probes used when a usage report is built.

pub mod error;
pub mod host;
pub mod kinds;
pub mod types;
pub mod version;

pub use error::VersionError;
pub use host::{bit_flag, detect_locale, os_descriptor, LocaleId};
pub use kinds::{FirmwareKind, TransportKind};
pub use types::{thread_safe, ThreadSafe};
pub use version::{AppVersion, FirmwareVersion};
