//! Report payload
//!
//! A report is an ordered list of field/value pairs, submitted as an HTML
//! form. Field names and value formats are what the collection endpoint
//! expects and must not change.

use crate::counters::Feature;
use crate::record::TelemetryRecord;
use grblstats_core::{bit_flag, os_descriptor};

/// Timestamp format of the `installed` field
pub const INSTALLED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flat, ordered key/value payload built from a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    fields: Vec<(&'static str, String)>,
}

impl Report {
    /// Build a report describing the current host
    pub fn from_record(record: &TelemetryRecord) -> Self {
        Self::with_host(record, &os_descriptor(), bit_flag())
    }

    /// Build a report with explicit host descriptors
    pub fn with_host(record: &TelemetryRecord, os_info: &str, bit_flag: u8) -> Self {
        let counters = record.counters();
        let usage_minutes = record.usage_time().as_secs() / 60;

        let mut fields = vec![
            ("guid", record.installation_id().simple().to_string()),
            (
                "installed",
                record.installed_at().format(INSTALLED_FORMAT).to_string(),
            ),
            ("version", record.app_version().to_string()),
            ("grblVersion", record.firmware_version().to_string()),
            ("locale", record.locale().to_string()),
            ("uiLang", record.ui_language().to_string()),
            ("usageCount", record.session_count().to_string()),
            ("usageTime", usage_minutes.to_string()),
            ("wrapperType", record.transport().to_string()),
        ];

        fields.extend(
            Feature::REPORT_ORDER
                .iter()
                .map(|f| (f.report_key(), counters.get(*f).to_string())),
        );

        fields.extend([
            ("firmware", record.firmware().to_string()),
            ("osinfo", os_info.to_string()),
            ("bitflag", bit_flag.to_string()),
        ]);

        Self { fields }
    }

    /// All fields in submission order
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Value of a single field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
