//! Persistence behind the report store.
//!
//! The default journal keeps nothing, so reports live only as long as the
//! session. A JSON-lines journal can be configured to make them survive a
//! restart.

use crate::error::WatchResult;
use crate::models::Report;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Append-only record of admitted reports.
pub trait Journal {
    /// Durably record one report. Called before the store admits it.
    fn record(&mut self, report: &Report) -> WatchResult<()>;

    /// Record several reports. Called before the store admits any of them.
    fn record_batch(&mut self, reports: &[Report]) -> WatchResult<()> {
        for report in reports {
            self.record(report)?;
        }
        Ok(())
    }

    /// Return every previously recorded report, oldest first.
    fn replay(&self) -> WatchResult<Vec<Report>>;
}

/// Journal that forgets everything when the process exits.
#[derive(Debug, Default)]
pub struct MemoryJournal;

impl Journal for MemoryJournal {
    fn record(&mut self, _report: &Report) -> WatchResult<()> {
        Ok(())
    }

    fn replay(&self) -> WatchResult<Vec<Report>> {
        Ok(Vec::new())
    }
}

/// Journal writing one JSON document per line.
#[derive(Debug)]
pub struct JsonLinesJournal {
    path: PathBuf,
}

impl JsonLinesJournal {
    /// Create a journal at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JsonLinesJournal {
    /// Append pre-rendered lines with a single write.
    fn append_lines(&self, lines: &str) -> WatchResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(lines.as_bytes())?;
        Ok(())
    }
}

impl Journal for JsonLinesJournal {
    fn record(&mut self, report: &Report) -> WatchResult<()> {
        let mut line = serde_json::to_string(report)?;
        line.push('\n');
        self.append_lines(&line)?;

        debug!("Journaled report #{} to {}", report.seq, self.path.display());
        Ok(())
    }

    fn record_batch(&mut self, reports: &[Report]) -> WatchResult<()> {
        let mut lines = String::new();
        for report in reports {
            lines.push_str(&serde_json::to_string(report)?);
            lines.push('\n');
        }
        self.append_lines(&lines)?;

        debug!("Journaled {} reports to {}", reports.len(), self.path.display());
        Ok(())
    }

    fn replay(&self) -> WatchResult<Vec<Report>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)?;
        let mut reports = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Report>(&line) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    // A torn final line from an interrupted write is skipped.
                    warn!(
                        "Skipping unreadable journal line {} in {}: {}",
                        index + 1,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(reports)
    }
}
