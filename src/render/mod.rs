//! Text renderings of the dashboard views.
//!
//! Markdown is meant for people at a terminal; JSON for piping into other
//! tools.

pub mod generator;

pub use generator::*;

use crate::error::WatchResult;
use crate::files::FileStore;
use crate::views::{GalleryView, TableRow, TrendView};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Output format for rendered views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

pub fn render_gallery(
    view: &GalleryView,
    zip_options: &[String],
    files: &dyn FileStore,
    format: OutputFormat,
) -> WatchResult<String> {
    match format {
        OutputFormat::Markdown => Ok(gallery_markdown(view, zip_options, files)),
        OutputFormat::Json => {
            let value = match view {
                GalleryView::Grid(rows) => json!({ "layout": "grid", "zip_options": zip_options, "rows": rows }),
                GalleryView::Detailed(reports) => json!({ "layout": "detailed", "zip_options": zip_options, "reports": reports }),
            };
            Ok(serde_json::to_string_pretty(&value)?)
        }
    }
}

pub fn render_table(rows: &[TableRow], format: OutputFormat) -> WatchResult<String> {
    match format {
        OutputFormat::Markdown => Ok(table_markdown(rows)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
    }
}

pub fn render_trends(view: &TrendView, zipcode: Option<&str>, format: OutputFormat) -> WatchResult<String> {
    match format {
        OutputFormat::Markdown => Ok(trends_markdown(view, zipcode)),
        OutputFormat::Json => {
            let weekly: Vec<_> = match zipcode {
                Some(zip) => view.series(zip),
                None => view.weekly.iter().collect(),
            };
            Ok(serde_json::to_string_pretty(&json!({
                "weekly": weekly,
                "top_zips": view.top_zips,
            }))?)
        }
    }
}

pub fn render_summary(zipcode: &str, summary: &str, format: OutputFormat) -> WatchResult<String> {
    match format {
        OutputFormat::Markdown => Ok(summary_markdown(zipcode, summary)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
            "zipcode": zipcode,
            "summary": summary,
        }))?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::trends;

    #[test]
    fn test_json_trends_on_empty_store() {
        let text = render_trends(&trends(&[], 5), None, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["weekly"], json!([]));
        assert_eq!(value["top_zips"], json!([]));
    }

    #[test]
    fn test_json_summary_is_verbatim() {
        let text = render_summary("10001", "a \"quoted\" reply", OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["summary"], "a \"quoted\" reply");
    }

    #[test]
    fn test_output_format_from_config_text() {
        #[derive(Deserialize)]
        struct Holder {
            format: OutputFormat,
        }
        let holder: Holder = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(holder.format, OutputFormat::Json);
    }
}
