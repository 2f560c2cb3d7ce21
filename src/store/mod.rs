//! The in-memory report store.
//!
//! Reports are appended in order and never changed or removed. Each
//! append goes through the configured [`Journal`] first; a journal failure
//! leaves the store as it was.

pub mod journal;

pub use journal::{Journal, JsonLinesJournal, MemoryJournal};

use crate::error::WatchResult;
use crate::models::Report;
use tracing::{debug, info};

/// Append-only collection of reports for one session.
pub struct ReportStore {
    reports: Vec<Report>,
    journal: Box<dyn Journal>,
    next_seq: u64,
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ReportStore {
    /// Store with no persistence.
    pub fn in_memory() -> Self {
        Self {
            reports: Vec::new(),
            journal: Box::new(MemoryJournal),
            next_seq: 1,
        }
    }

    /// Open a store backed by `journal`, replaying whatever it already holds.
    pub fn open(journal: Box<dyn Journal>) -> WatchResult<Self> {
        let reports = journal.replay()?;
        let next_seq = reports.iter().map(|r| r.seq).max().unwrap_or(0) + 1;

        if !reports.is_empty() {
            info!("Replayed {} reports from journal", reports.len());
        }

        Ok(Self {
            reports,
            journal,
            next_seq,
        })
    }

    /// Append one report, assigning its sequence number.
    pub fn append(&mut self, mut report: Report) -> WatchResult<&Report> {
        report.seq = self.next_seq;
        self.journal.record(&report)?;

        debug!("Appended report #{} for zip {}", report.seq, report.zipcode);
        self.reports.push(report);
        self.next_seq += 1;
        Ok(&self.reports[self.reports.len() - 1])
    }

    /// Append several reports as one unit.
    ///
    /// The whole batch is journaled before any report is admitted, so a
    /// journal failure leaves the store exactly as it was.
    pub fn extend(&mut self, mut reports: Vec<Report>) -> WatchResult<usize> {
        if reports.is_empty() {
            return Ok(0);
        }
        for (offset, report) in reports.iter_mut().enumerate() {
            report.seq = self.next_seq + offset as u64;
        }
        self.journal.record_batch(&reports)?;

        let added = reports.len();
        debug!("Appended {} reports starting at #{}", added, self.next_seq);
        self.next_seq += added as u64;
        self.reports.extend(reports);
        Ok(added)
    }

    /// Snapshot of every report in insertion order.
    pub fn all(&self) -> Vec<Report> {
        self.reports.clone()
    }

    /// Borrowed view of every report in insertion order.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatchError;
    use crate::models::{SourceType, Usage};

    fn sample(zipcode: &str) -> Report {
        Report {
            seq: 0,
            timestamp: None,
            address: String::new(),
            zipcode: zipcode.to_string(),
            description: String::new(),
            concerns: Vec::new(),
            source_type: SourceType::Other,
            used: Usage::Yes,
            symptoms: None,
            alert: false,
            photo_path: None,
        }
    }

    struct FailingJournal;

    impl Journal for FailingJournal {
        fn record(&mut self, _report: &Report) -> WatchResult<()> {
            Err(WatchError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        fn replay(&self) -> WatchResult<Vec<Report>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_append_preserves_order_and_assigns_seq() {
        let mut store = ReportStore::in_memory();
        store.append(sample("10001")).unwrap();
        store.append(sample("02134")).unwrap();
        store.append(sample("10001")).unwrap();

        let all = store.all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].zipcode, "02134");
        assert_eq!(
            all.iter().map(|r| r.seq).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_all_is_independent_snapshot() {
        let mut store = ReportStore::in_memory();
        store.append(sample("10001")).unwrap();

        let mut snapshot = store.all();
        snapshot.clear();
        snapshot.push(sample("99999"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.all()[0].zipcode, "10001");
    }

    #[test]
    fn test_journal_failure_leaves_store_untouched() {
        let mut store = ReportStore::open(Box::new(FailingJournal)).unwrap();
        assert!(store.append(sample("10001")).is_err());
        assert!(store.is_empty());
    }

    /// Accepts the first record, fails every later one.
    struct FailAfterFirst {
        recorded: usize,
    }

    impl Journal for FailAfterFirst {
        fn record(&mut self, _report: &Report) -> WatchResult<()> {
            self.recorded += 1;
            if self.recorded > 1 {
                return Err(WatchError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            Ok(())
        }

        fn replay(&self) -> WatchResult<Vec<Report>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_extend_is_all_or_nothing() {
        let mut store = ReportStore::open(Box::new(FailAfterFirst { recorded: 0 })).unwrap();

        let batch = vec![sample("10001"), sample("10002"), sample("10003")];
        assert!(store.extend(batch).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_extend_assigns_consecutive_seq() {
        let mut store = ReportStore::in_memory();
        store.append(sample("10001")).unwrap();

        let added = store.extend(vec![sample("10002"), sample("10003")]).unwrap();
        assert_eq!(added, 2);
        assert_eq!(
            store.all().iter().map(|r| r.seq).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        store.append(sample("10004")).unwrap();
        assert_eq!(store.all()[3].seq, 4);
    }

    #[test]
    fn test_open_replays_and_continues_seq() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("reports.jsonl");

        {
            let mut store = ReportStore::open(Box::new(JsonLinesJournal::new(&path))).unwrap();
            store.append(sample("10001")).unwrap();
            store.append(sample("10002")).unwrap();
        }

        let mut store = ReportStore::open(Box::new(JsonLinesJournal::new(&path))).unwrap();
        assert_eq!(store.len(), 2);
        store.append(sample("10003")).unwrap();
        assert_eq!(store.all()[2].seq, 3);
    }
}
