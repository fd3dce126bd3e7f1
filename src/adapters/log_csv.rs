//! Audit log: an append-only CSV, the sole source of truth for idempotency.

use crate::domain::model::ApplicationAttempt;
use crate::domain::ports::AttemptLog;
use crate::utils::error::{ApplyError, Result};
use std::fs::OpenOptions;
use std::path::Path;

const HEADER: [&str; 5] = ["timestamp", "company", "channel", "status", "detail"];

/// CSV-backed attempt log. Every append is flushed to disk before the engine
/// moves on, so an interruption loses at most the attempt in flight.
#[derive(Debug)]
pub struct CsvAttemptLog {
    writer: csv::Writer<std::fs::File>,
}

impl CsvAttemptLog {
    /// Open (or create) the log and return it together with all prior
    /// records. The header row is written once at creation; reruns append
    /// below it.
    pub fn open(path: &Path) -> Result<(Self, Vec<ApplicationAttempt>)> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let history = if path.is_file() && std::fs::metadata(path)?.len() > 0 {
            let mut reader = csv::Reader::from_path(path)?;
            let mut records = Vec::new();
            for record in reader.deserialize() {
                let attempt: ApplicationAttempt = record.map_err(|e| ApplyError::AuditLog {
                    message: format!("corrupt record in '{}': {}", path.display(), e),
                })?;
                records.push(attempt);
            }
            records
        } else {
            Vec::new()
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
            writer.flush()?;
        }

        Ok((Self { writer }, history))
    }
}

impl AttemptLog for CsvAttemptLog {
    fn append(&mut self, attempt: &ApplicationAttempt) -> Result<()> {
        self.writer
            .serialize(attempt)
            .map_err(|e| ApplyError::AuditLog {
                message: format!("cannot append record: {e}"),
            })?;
        self.flush()
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| ApplyError::AuditLog {
            message: format!("cannot flush log: {e}"),
        })
    }
}
