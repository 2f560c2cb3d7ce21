//! Tabular projection and CSV export.

use crate::error::WatchResult;
use crate::ingest::EXPORT_FORMAT;
use crate::models::Report;
use serde::Serialize;
use std::io::Write;

/// Export columns, in order. Everything but `photo_path`.
pub const TABLE_COLUMNS: [&str; 9] = [
    "timestamp",
    "address",
    "zipcode",
    "description",
    "concerns",
    "type",
    "used",
    "symptoms",
    "alert",
];

/// One report flattened to text cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub timestamp: String,
    pub address: String,
    pub zipcode: String,
    pub description: String,
    pub concerns: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub used: String,
    pub symptoms: String,
    pub alert: bool,
}

impl From<&Report> for TableRow {
    fn from(report: &Report) -> Self {
        Self {
            timestamp: report
                .timestamp
                .map(|ts| ts.format(EXPORT_FORMAT).to_string())
                .unwrap_or_default(),
            address: report.address.clone(),
            zipcode: report.zipcode.clone(),
            description: report.description.clone(),
            concerns: report.concerns_text(),
            source_type: report.source_type.label().to_string(),
            used: report.used.label().to_string(),
            symptoms: report.symptoms.clone().unwrap_or_default(),
            alert: report.alert,
        }
    }
}

impl TableRow {
    fn cells(&self) -> [String; 9] {
        [
            self.timestamp.clone(),
            self.address.clone(),
            self.zipcode.clone(),
            self.description.clone(),
            self.concerns.clone(),
            self.source_type.clone(),
            self.used.clone(),
            self.symptoms.clone(),
            self.alert.to_string(),
        ]
    }
}

/// Every report as a table row, in store order.
pub fn table(reports: &[Report]) -> Vec<TableRow> {
    reports.iter().map(TableRow::from).collect()
}

/// Write rows as UTF-8 CSV with a header row.
///
/// With `importable` an empty `photo_path` column is appended so the file
/// can be fed straight back into a bulk import.
pub fn write_csv<W: Write>(rows: &[TableRow], writer: W, importable: bool) -> WatchResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = TABLE_COLUMNS.to_vec();
    if importable {
        header.push("photo_path");
    }
    csv_writer.write_record(&header)?;

    for row in rows {
        let mut cells = row.cells().to_vec();
        if importable {
            cells.push(String::new());
        }
        csv_writer.write_record(&cells)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::import_bulk;
    use crate::models::{Concern, SourceType, Usage};
    use crate::store::ReportStore;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn sample() -> Vec<Report> {
        vec![
            Report {
                seq: 1,
                timestamp: NaiveDate::from_ymd_opt(2024, 2, 29)
                    .unwrap()
                    .and_hms_opt(17, 5, 0),
                address: "12 \"Old\" Mill Rd, Apt 3".to_string(),
                zipcode: "02134".to_string(),
                description: "Smells of sulfur,\nfoamy edges".to_string(),
                concerns: vec![Concern::FoulSmell, Concern::Foam],
                source_type: SourceType::RainwaterPool,
                used: Usage::Yes,
                symptoms: Some("headache".to_string()),
                alert: true,
                photo_path: Some(PathBuf::from("uploaded_images/a.png")),
            },
            Report {
                seq: 2,
                timestamp: None,
                address: "Library fountain".to_string(),
                zipcode: "10001".to_string(),
                description: String::new(),
                concerns: Vec::new(),
                source_type: SourceType::Fountain,
                used: Usage::No,
                symptoms: None,
                alert: false,
                photo_path: None,
            },
            Report {
                seq: 3,
                timestamp: NaiveDate::from_ymd_opt(2024, 3, 5)
                    .unwrap()
                    .and_hms_milli_opt(14, 30, 15, 250),
                address: "Canal St".to_string(),
                zipcode: "10001".to_string(),
                description: "Oily sheen".to_string(),
                concerns: vec![Concern::Unlisted("Oil sheen".to_string())],
                source_type: SourceType::Other,
                used: Usage::No,
                symptoms: None,
                alert: false,
                photo_path: None,
            },
        ]
    }

    fn export(rows: &[TableRow], importable: bool) -> String {
        let mut buf = Vec::new();
        write_csv(rows, &mut buf, importable).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_table_drops_photo_path() {
        let csv = export(&table(&sample()), false);
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "timestamp,address,zipcode,description,concerns,type,used,symptoms,alert"
        );
        assert!(!csv.contains("uploaded_images"));
    }

    #[test]
    fn test_export_reimport_round_trip() {
        let rows = table(&sample());
        let exported = export(&rows, true);

        let mut store = ReportStore::in_memory();
        let summary = import_bulk(&mut store, exported.as_bytes()).unwrap();
        assert_eq!(summary.admitted, 3);
        assert!(exported.contains("2024-03-05 14:30:15.250"));
        assert!(exported.contains("2024-02-29 17:05:00,"));

        let reimported = table(&store.all());
        assert_eq!(store.all()[2].timestamp, sample()[2].timestamp);
        assert_eq!(reimported, rows);
        assert_eq!(export(&reimported, true), exported);
    }

    #[test]
    fn test_export_without_photo_column_is_not_importable() {
        let exported = export(&table(&sample()), false);
        let mut store = ReportStore::in_memory();
        assert!(import_bulk(&mut store, exported.as_bytes()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_table() {
        assert!(table(&[]).is_empty());
        assert_eq!(export(&[], false).lines().count(), 1);
    }
}
