//! Persistent record store
//!
//! The whole record lives in one JSON file. Writes go to a temporary file in
//! the same directory which then replaces the record, so a reader never sees
//! a half-written file. Reads that fail for any reason start a new
//! installation rather than failing the host.

use crate::error::{StoreError, StoreResult};
use crate::record::TelemetryRecord;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Loads and saves the telemetry record at a fixed path
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record as stored, without counting a session.
    ///
    /// Returns `Ok(None)` when no record has been saved yet.
    pub fn read(&self) -> StoreResult<Option<TelemetryRecord>> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Load the record for a new process run and count the session.
    ///
    /// Call once per process: every call counts another session. A missing
    /// or unreadable file yields a fresh record with a new identifier.
    pub fn load(&self) -> TelemetryRecord {
        let mut record = match self.read() {
            Ok(Some(record)) => record,
            Ok(None) => {
                let record = TelemetryRecord::new();
                tracing::info!(
                    "No usage record at {}, starting installation {}",
                    self.path.display(),
                    record.installation_id()
                );
                record
            }
            Err(e) => {
                let record = TelemetryRecord::new();
                tracing::warn!(
                    "Discarding unreadable usage record ({}), starting installation {}",
                    e,
                    record.installation_id()
                );
                record
            }
        };

        record.begin_session();
        tracing::debug!("Usage record loaded: session {}", record.session_count());
        record
    }

    /// Write the full record, replacing any previous content atomically
    pub fn save(&self, record: &TelemetryRecord) -> StoreResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, record)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        tracing::debug!("Usage record saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::Feature;
    use chrono::Utc;
    use grblstats_core::{AppVersion, FirmwareKind, FirmwareVersion, LocaleId, TransportKind};
    use std::time::Duration;

    fn populated_record() -> TelemetryRecord {
        let mut record = TelemetryRecord::new();
        record.begin_session();
        record.begin_session();
        record.mark_sent(Utc::now());
        record.set_versions(
            AppVersion::new(4, 9, 2),
            Some(FirmwareVersion::new(1, 1).with_build('h')),
        );
        record.set_locales(LocaleId(0x0410), LocaleId(0x0409));
        record.set_kinds(TransportKind::Telnet, FirmwareKind::Smoothie);
        record.add_usage_time(Duration::from_secs(5400));
        let mut delta = crate::counters::UsageCounters::new();
        delta.add(Feature::RasterFile, 3);
        delta.add(Feature::Centerline, 1);
        record.merge_counters(&delta);
        record
    }

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("usage_stats.json"));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn test_read_corrupt_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage_stats.json");
        std::fs::write(&path, b"\x00\x01 not json").unwrap();

        let store = RecordStore::new(&path);
        assert!(matches!(store.read(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_save_then_read_is_field_equal() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("usage_stats.json"));
        let record = populated_record();

        store.save(&record).unwrap();
        assert_eq!(store.read().unwrap(), Some(record));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("a").join("b").join("usage_stats.json"));
        store.save(&TelemetryRecord::new()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("usage_stats.json"));
        store.save(&TelemetryRecord::new()).unwrap();
        store.save(&populated_record()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
