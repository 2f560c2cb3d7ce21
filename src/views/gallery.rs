//! Gallery projection: filtered, time-sorted reports for browsing.

use crate::models::Report;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Which reports to include by zip code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ZipFilter {
    #[default]
    All,
    Only(String),
}

impl From<Option<String>> for ZipFilter {
    fn from(zip: Option<String>) -> Self {
        match zip {
            Some(z) if !z.eq_ignore_ascii_case("all") => ZipFilter::Only(z),
            _ => ZipFilter::All,
        }
    }
}

impl ZipFilter {
    fn admits(&self, report: &Report) -> bool {
        match self {
            ZipFilter::All => true,
            ZipFilter::Only(zip) => report.zipcode == *zip,
        }
    }
}

/// Sort direction on the report timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Newest First
    #[default]
    Newest,
    /// Oldest First
    Oldest,
}

/// How the gallery is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum GalleryLayout {
    /// Rows of cards
    #[default]
    Grid,
    /// One expanded entry per report
    Detailed,
}

/// Parameters of a gallery request.
#[derive(Debug, Clone, Default)]
pub struct GalleryQuery {
    pub zip: ZipFilter,
    pub order: SortOrder,
    pub layout: GalleryLayout,
}

/// Gallery output, either batched into rows or flat.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryView {
    Grid(Vec<Vec<Report>>),
    Detailed(Vec<Report>),
}

impl GalleryView {
    /// Number of reports shown.
    pub fn len(&self) -> usize {
        match self {
            GalleryView::Grid(rows) => rows.iter().map(Vec::len).sum(),
            GalleryView::Detailed(reports) => reports.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All reports in display order.
    pub fn reports(&self) -> Vec<&Report> {
        match self {
            GalleryView::Grid(rows) => rows.iter().flatten().collect(),
            GalleryView::Detailed(reports) => reports.iter().collect(),
        }
    }
}

/// Filter and sort `reports` for the gallery.
///
/// The sort is stable, so reports with equal timestamps keep store order.
/// Reports without a timestamp go last in either direction.
pub fn gallery(reports: &[Report], query: &GalleryQuery, columns: usize) -> GalleryView {
    let mut selected: Vec<Report> = reports
        .iter()
        .filter(|r| query.zip.admits(r))
        .cloned()
        .collect();

    selected.sort_by(|a, b| compare_timestamps(a, b, query.order));

    match query.layout {
        GalleryLayout::Grid => GalleryView::Grid(
            selected
                .chunks(columns.max(1))
                .map(<[Report]>::to_vec)
                .collect(),
        ),
        GalleryLayout::Detailed => GalleryView::Detailed(selected),
    }
}

fn compare_timestamps(a: &Report, b: &Report, order: SortOrder) -> Ordering {
    match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => match order {
            SortOrder::Oldest => x.cmp(&y),
            SortOrder::Newest => y.cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Distinct zip codes, sorted, for building a filter choice.
pub fn zip_options(reports: &[Report]) -> Vec<String> {
    reports
        .iter()
        .map(|r| r.zipcode.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
