//! Report ingestion.
//!
//! Two ways in: an interactive [`submit`] with typed fields, and a
//! [`import_bulk`] of CSV rows authored elsewhere. Submission values are
//! already restricted to the fixed vocabularies by their types. Bulk rows
//! are only checked for the required columns; anything else is admitted
//! as written.

pub mod timestamp;

use crate::error::{WatchError, WatchResult};
use crate::files::FileStore;
use crate::models::{split_concerns, Report, SourceType, Submission, Usage, MAX_DESCRIPTION_CHARS};
use crate::store::ReportStore;
use chrono::{NaiveDateTime, Timelike};
use csv::StringRecord;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub use timestamp::{parse_flag, parse_timestamp, EXPORT_FORMAT};

/// Columns every bulk import document must carry.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "timestamp",
    "address",
    "zipcode",
    "description",
    "concerns",
    "type",
    "used",
    "symptoms",
    "alert",
    "photo_path",
];

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// Rows appended to the store.
    pub admitted: usize,
    /// Rows whose timestamp could not be parsed and was left empty.
    pub null_timestamps: usize,
}

/// Record an interactive submission.
///
/// The report is stamped with `now` truncated to the minute. An attached
/// photo is saved first under `<YYYYmmdd_HHMMSS>_<file name>`; if that
/// fails nothing is appended.
pub fn submit(
    store: &mut ReportStore,
    files: &dyn FileStore,
    submission: Submission,
    now: NaiveDateTime,
) -> WatchResult<Report> {
    let photo_path = match submission.photo {
        Some(ref photo) => {
            let name = format!("{}_{}", now.format("%Y%m%d_%H%M%S"), photo.file_name);
            Some(files.save(&photo.bytes, &name)?)
        }
        None => None,
    };

    let mut description = submission.description;
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        warn!(
            "Description truncated to {} characters",
            MAX_DESCRIPTION_CHARS
        );
        description = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
    }

    let stamped = now
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let report = Report {
        seq: 0,
        timestamp: Some(stamped),
        address: submission.address,
        zipcode: submission.zipcode,
        description,
        concerns: submission.concerns,
        source_type: submission.source_type,
        used: submission.used,
        symptoms: submission.symptoms.filter(|s| !s.trim().is_empty()),
        alert: submission.alert,
        photo_path,
    };

    let admitted = store.append(report)?.clone();
    info!(
        "Report #{} submitted for zip {}",
        admitted.seq, admitted.zipcode
    );
    Ok(admitted)
}

/// Import every row of a CSV document.
///
/// Fails with [`WatchError::Schema`] when required columns are missing, and
/// with a CSV error when the document itself is malformed. In both cases
/// the store is unchanged. Unparseable timestamps are recovered by leaving
/// the field empty; the row is still admitted.
pub fn import_bulk<R: Read>(store: &mut ReportStore, reader: R) -> WatchResult<ImportSummary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    // A repeated header name resolves to its first occurrence.
    let mut columns: HashMap<&str, usize> = HashMap::new();
    for (i, h) in headers.iter().enumerate() {
        columns.entry(h.as_str()).or_insert(i);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(*c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        warn!("Rejected import, missing columns: {}", missing.join(", "));
        return Err(WatchError::Schema { missing });
    }

    let mut summary = ImportSummary::default();
    let mut reports = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let cell = |name: &str| field(&record, &columns, name);

        let raw_ts = cell("timestamp");
        let timestamp = match parse_timestamp(raw_ts) {
            Ok(ts) => Some(ts),
            Err(e) => {
                if !raw_ts.trim().is_empty() {
                    warn!("Row {}: {}; keeping row without a timestamp", row, e);
                }
                summary.null_timestamps += 1;
                None
            }
        };

        let raw_alert = cell("alert");
        let alert = parse_flag(raw_alert).unwrap_or_else(|| {
            warn!("Row {}: unrecognized alert value {:?}, reading as false", row, raw_alert);
            false
        });

        let source_type = SourceType::from(cell("type"));
        if let SourceType::Unlisted(ref raw) = source_type {
            debug!("Row {}: source type {:?} is outside the vocabulary", row, raw);
        }

        reports.push(Report {
            seq: 0,
            timestamp,
            address: cell("address").to_string(),
            zipcode: cell("zipcode").to_string(),
            description: cell("description").to_string(),
            concerns: split_concerns(cell("concerns")),
            source_type,
            used: Usage::from(cell("used")),
            symptoms: non_empty(cell("symptoms")),
            alert,
            photo_path: non_empty(cell("photo_path")).map(PathBuf::from),
        });
    }

    summary.admitted = store.extend(reports)?;
    info!(
        "Imported {} reports ({} without a parseable timestamp)",
        summary.admitted, summary.null_timestamps
    );
    Ok(summary)
}

fn field<'r>(record: &'r StringRecord, columns: &HashMap<&str, usize>, name: &str) -> &'r str {
    columns
        .get(name)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
