//! Markdown rendering of the dashboard views.

use crate::files::FileStore;
use crate::ingest::ImportSummary;
use crate::models::Report;
use crate::views::{GalleryView, TableRow, TrendView};

/// Placeholder shown by the gallery for an empty store.
pub const EMPTY_GALLERY: &str = "No reports to display yet.";
/// Placeholder shown by the trend view for an empty store.
pub const EMPTY_TRENDS: &str = "Submit some reports to see trends.";
/// Placeholder shown by the analysis view for an empty store.
pub const EMPTY_ANALYSIS: &str = "No data yet to analyze.";

/// Render the gallery as Markdown.
///
/// `zip_options` lists the zip codes a reader can filter by.
pub fn gallery_markdown(view: &GalleryView, zip_options: &[String], files: &dyn FileStore) -> String {
    let mut output = String::new();
    output.push_str("# 🖼️ Community Gallery of Reports\n\n");

    if !zip_options.is_empty() {
        output.push_str(&format!("Filter by zip code: all, {}\n\n", zip_options.join(", ")));
    }

    if view.is_empty() {
        output.push_str(EMPTY_GALLERY);
        output.push('\n');
        return output;
    }

    match view {
        GalleryView::Grid(rows) => {
            for row in rows {
                output.push_str(&generate_grid_row(row, files));
            }
        }
        GalleryView::Detailed(reports) => {
            for report in reports {
                output.push_str(&generate_detail_block(report, files));
            }
        }
    }

    output
}

/// One grid row as a Markdown table with a column per report.
fn generate_grid_row(row: &[Report], files: &dyn FileStore) -> String {
    let mut section = String::new();

    let headers: Vec<String> = row
        .iter()
        .map(|r| format!("📍 {}", escape_cell(&r.address)))
        .collect();
    section.push_str(&format!("| {} |\n", headers.join(" | ")));
    section.push_str(&format!("|{}\n", ":---|".repeat(row.len())));

    let cards: Vec<String> = row.iter().map(|r| generate_card(r, files)).collect();
    section.push_str(&format!("| {} |\n\n", cards.join(" | ")));

    section
}

fn generate_card(report: &Report, files: &dyn FileStore) -> String {
    let mut lines = vec![format!("🕒 {}", report.display_timestamp())];

    if let Some(photo) = visible_photo(report, files) {
        lines.push(format!("📷 `{}`", photo));
    }

    lines.push(format!(
        "**Type:** {} \\| **Used:** {}",
        escape_cell(report.source_type.label()),
        escape_cell(report.used.label())
    ));

    if let Some(ref symptoms) = report.symptoms {
        lines.push(format!("*Symptoms:* {}", escape_cell(symptoms)));
    }

    lines.join("<br>")
}

/// One expanded report section.
fn generate_detail_block(report: &Report, files: &dyn FileStore) -> String {
    let mut block = String::new();

    block.push_str(&format!(
        "## 📍 {} ({})\n\n",
        report.address,
        report.display_timestamp()
    ));
    block.push_str(&format!(
        "- **Source Type:** {} | **Used:** {}\n",
        report.source_type, report.used
    ));
    block.push_str(&format!("- **Zip Code:** {}\n", report.zipcode));

    if !report.concerns.is_empty() {
        block.push_str(&format!("- **Concerns:** {}\n", report.concerns_text()));
    }
    if let Some(ref symptoms) = report.symptoms {
        block.push_str(&format!("- **Symptoms after use:** {}\n", symptoms));
    }
    block.push_str(&format!("- **Description:** {}\n", report.description));
    if report.alert {
        block.push_str("- 🔔 Community alert requested\n");
    }
    if let Some(photo) = visible_photo(report, files) {
        block.push_str(&format!("- **Reported Photo:** `{}`\n", photo));
    }
    block.push('\n');

    block
}

/// The photo path, but only when the blob still exists.
fn visible_photo(report: &Report, files: &dyn FileStore) -> Option<String> {
    report
        .photo_path
        .as_ref()
        .filter(|p| files.exists(p))
        .map(|p| p.display().to_string())
}

/// Render the tabular view as a Markdown table.
pub fn table_markdown(rows: &[TableRow]) -> String {
    let mut output = String::new();
    output.push_str("# 📊 Tabular View of Reports\n\n");

    if rows.is_empty() {
        output.push_str(EMPTY_GALLERY);
        output.push('\n');
        return output;
    }

    output.push_str("| Timestamp | Address | Zip | Description | Concerns | Type | Used | Symptoms | Alert |\n");
    output.push_str("|:---|:---|:---:|:---|:---|:---|:---:|:---|:---:|\n");

    for row in rows {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&row.timestamp),
            escape_cell(&row.address),
            escape_cell(&row.zipcode),
            escape_cell(&row.description),
            escape_cell(&row.concerns),
            escape_cell(&row.source_type),
            escape_cell(&row.used),
            escape_cell(&row.symptoms),
            if row.alert { "✅" } else { "" },
        ));
    }
    output.push('\n');

    output
}

/// Render weekly trends, for every zip code or a single one.
pub fn trends_markdown(view: &TrendView, zipcode: Option<&str>) -> String {
    let mut output = String::new();
    output.push_str("# 📈 Community Trends by Zip Code\n\n");

    if view.is_empty() {
        output.push_str(EMPTY_TRENDS);
        output.push('\n');
        return output;
    }

    let zips: Vec<&str> = match zipcode {
        Some(zip) => vec![zip],
        None => view.zipcodes(),
    };

    for zip in zips {
        let series = view.series(zip);
        output.push_str(&format!("## 📍 Reports Over Time for Zip Code: {}\n\n", zip));

        if series.is_empty() {
            output.push_str("No weekly data for this zip code.\n\n");
            continue;
        }

        let peak = series.iter().map(|a| a.report_count).max().unwrap_or(1);
        output.push_str("| Week | Period | Reports | |\n");
        output.push_str("|:---|:---|:---:|:---|\n");
        for aggregate in series {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                aggregate.week,
                aggregate.week.period_label(),
                aggregate.report_count,
                bar(aggregate.report_count, peak),
            ));
        }
        output.push('\n');
    }

    if !view.top_zips.is_empty() {
        output.push_str("## Top Zip Codes by Total Reports\n\n");
        output.push_str("| Zip Code | Reports |\n");
        output.push_str("|:---|:---:|\n");
        for zip in &view.top_zips {
            output.push_str(&format!("| {} | {} |\n", zip.zipcode, zip.total));
        }
        output.push('\n');
    }

    output
}

/// Render a returned summary. The text is shown exactly as received.
pub fn summary_markdown(zipcode: &str, summary: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("# 🤖 AI Analysis of Reports: {}\n\n", zipcode));
    output.push_str(summary);
    if !summary.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Confirmation for a submitted report.
pub fn submitted_markdown(report: &Report) -> String {
    format!(
        "✅ Your report has been submitted. Thank you! (#{} for zip {} at {})\n",
        report.seq,
        report.zipcode,
        report.display_timestamp()
    )
}

/// Confirmation for a bulk import.
pub fn imported_markdown(summary: &ImportSummary) -> String {
    let mut output = format!(
        "✅ CSV uploaded and merged successfully! {} reports added.\n",
        summary.admitted
    );
    if summary.null_timestamps > 0 {
        output.push_str(&format!(
            "⚠️  {} rows had no readable timestamp and were kept without one.\n",
            summary.null_timestamps
        ));
    }
    output
}

fn bar(count: usize, peak: usize) -> String {
    const WIDTH: usize = 20;
    let filled = (count * WIDTH).div_ceil(peak.max(1));
    "█".repeat(filled.min(WIDTH))
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::DiskFileStore;
    use crate::models::{Concern, SourceType, Usage};
    use crate::views::{gallery, table, trends, GalleryLayout, GalleryQuery};
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn report(address: &str, photo: Option<PathBuf>) -> Report {
        Report {
            seq: 1,
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(7, 45, 0),
            address: address.to_string(),
            zipcode: "10001".to_string(),
            description: "Cloudy | gritty".to_string(),
            concerns: vec![Concern::Discoloration],
            source_type: SourceType::PipeLeak,
            used: Usage::Yes,
            symptoms: Some("rash".to_string()),
            alert: true,
            photo_path: photo,
        }
    }

    #[test]
    fn test_empty_views_show_placeholders() {
        let temp_dir = TempDir::new().unwrap();
        let files = DiskFileStore::new(temp_dir.path());

        let view = gallery(&[], &GalleryQuery::default(), 3);
        assert!(gallery_markdown(&view, &[], &files).contains(EMPTY_GALLERY));
        assert!(trends_markdown(&trends(&[], 5), None).contains(EMPTY_TRENDS));
        assert!(table_markdown(&[]).contains(EMPTY_GALLERY));
    }

    #[test]
    fn test_dangling_photo_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let files = DiskFileStore::new(temp_dir.path());
        let stored = files.save(b"img", "kept.png").unwrap();

        let reports = vec![
            report("Kept St", Some(stored)),
            report("Gone St", Some(temp_dir.path().join("deleted.png"))),
        ];
        let query = GalleryQuery {
            layout: GalleryLayout::Detailed,
            ..Default::default()
        };
        let markdown = gallery_markdown(&gallery(&reports, &query, 3), &[], &files);

        assert!(markdown.contains("kept.png"));
        assert!(!markdown.contains("deleted.png"));
        assert!(markdown.contains("Gone St"));
    }

    #[test]
    fn test_grid_row_escapes_cells() {
        let temp_dir = TempDir::new().unwrap();
        let files = DiskFileStore::new(temp_dir.path());
        let reports = vec![report("A|B", None), report("C", None)];

        let zips = vec!["10001".to_string()];
        let markdown = gallery_markdown(&gallery(&reports, &GalleryQuery::default(), 3), &zips, &files);
        assert!(markdown.contains("Filter by zip code: all, 10001"));
        assert!(markdown.contains("📍 A\\|B"));
        assert!(markdown.contains("|:---|:---|"));
        assert!(markdown.contains("*Symptoms:* rash"));
    }

    #[test]
    fn test_table_markdown_rows() {
        let markdown = table_markdown(&table(&[report("1 Main", None)]));
        assert!(markdown.contains("Cloudy \\| gritty"));
        assert!(markdown.contains("2024-06-03 07:45:00"));
    }

    #[test]
    fn test_trends_markdown_single_zip() {
        let reports = vec![report("a", None), report("b", None)];
        let markdown = trends_markdown(&trends(&reports, 5), Some("10001"));
        assert!(markdown.contains("Zip Code: 10001"));
        assert!(markdown.contains("2024-W23"));
        assert!(markdown.contains("2024-06-03/2024-06-09"));
        assert!(markdown.contains("Top Zip Codes"));
    }

    #[test]
    fn test_summary_is_verbatim() {
        let markdown = summary_markdown("10001", "Line one\n\n- point");
        assert!(markdown.ends_with("Line one\n\n- point\n"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(5, 5).chars().count(), 20);
        assert_eq!(bar(1, 20).chars().count(), 1);
        assert_eq!(bar(0, 3), "");
    }
}
