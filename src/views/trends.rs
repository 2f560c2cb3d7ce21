//! Trend projection: weekly report counts per zip code.

use crate::models::{Report, WeekBucket, WeeklyAggregate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Total number of reports for one zip code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZipTotal {
    pub zipcode: String,
    pub total: usize,
}

/// Weekly aggregates plus the busiest zip codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendView {
    /// Observed (zipcode, week) buckets, ordered by zip code then week.
    pub weekly: Vec<WeeklyAggregate>,
    /// Zip codes with the most reports, busiest first.
    pub top_zips: Vec<ZipTotal>,
}

impl TrendView {
    pub fn is_empty(&self) -> bool {
        self.weekly.is_empty()
    }

    /// Weekly series of one zip code, oldest week first.
    pub fn series(&self, zipcode: &str) -> Vec<&WeeklyAggregate> {
        self.weekly
            .iter()
            .filter(|a| a.zipcode == zipcode)
            .collect()
    }

    /// The last `weeks` buckets of one zip code's series.
    pub fn recent(&self, zipcode: &str, weeks: usize) -> Vec<WeeklyAggregate> {
        let series = self.series(zipcode);
        let skip = series.len().saturating_sub(weeks);
        series.into_iter().skip(skip).cloned().collect()
    }

    /// Zip codes that have at least one bucket, in order.
    pub fn zipcodes(&self) -> Vec<&str> {
        let mut zips: Vec<&str> = Vec::new();
        for aggregate in &self.weekly {
            if zips.last() != Some(&aggregate.zipcode.as_str()) {
                zips.push(&aggregate.zipcode);
            }
        }
        zips
    }
}

/// Count reports per (zip code, ISO week).
///
/// Only observed buckets appear; weeks without reports are not filled in.
/// Reports without a timestamp are left out. Ties in the top list keep the
/// order in which zip codes first appear in the store.
pub fn trends(reports: &[Report], top_n: usize) -> TrendView {
    let mut buckets: BTreeMap<(String, WeekBucket), usize> = BTreeMap::new();
    let mut first_seen: Vec<String> = Vec::new();
    let mut totals: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;

    for report in reports {
        let Some(week) = report.week() else {
            skipped += 1;
            continue;
        };

        *buckets
            .entry((report.zipcode.clone(), week))
            .or_default() += 1;

        let total = totals.entry(report.zipcode.clone()).or_default();
        if *total == 0 {
            first_seen.push(report.zipcode.clone());
        }
        *total += 1;
    }

    if skipped > 0 {
        debug!("Left {} reports without a timestamp out of trends", skipped);
    }

    let weekly = buckets
        .into_iter()
        .map(|((zipcode, week), report_count)| WeeklyAggregate {
            zipcode,
            week,
            report_count,
        })
        .collect();

    let mut top_zips: Vec<ZipTotal> = first_seen
        .into_iter()
        .map(|zipcode| {
            let total = totals.get(&zipcode).copied().unwrap_or(0);
            ZipTotal { zipcode, total }
        })
        .collect();
    top_zips.sort_by_key(|z| std::cmp::Reverse(z.total));
    top_zips.truncate(top_n);

    TrendView { weekly, top_zips }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SourceType, Usage};
    use chrono::{NaiveDate, NaiveDateTime};

    fn on(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(12, 0, 0)
    }

    fn report(zipcode: &str, timestamp: Option<NaiveDateTime>) -> Report {
        Report {
            seq: 0,
            timestamp,
            address: String::new(),
            zipcode: zipcode.to_string(),
            description: String::new(),
            concerns: Vec::new(),
            source_type: SourceType::Faucet,
            used: Usage::Yes,
            symptoms: None,
            alert: false,
            photo_path: None,
        }
    }

    #[test]
    fn test_two_weeks_single_zip() {
        // 2024-01-01..07 is ISO week 1, 2024-01-08..14 is week 2.
        let reports = vec![
            report("10001", on(2024, 1, 1)),
            report("10001", on(2024, 1, 3)),
            report("10001", on(2024, 1, 7)),
            report("10001", on(2024, 1, 8)),
            report("10001", on(2024, 1, 14)),
        ];

        let view = trends(&reports, 5);
        let w1 = WeekBucket { year: 2024, week: 1 };
        let w2 = WeekBucket { year: 2024, week: 2 };
        assert_eq!(
            view.weekly,
            vec![
                WeeklyAggregate {
                    zipcode: "10001".to_string(),
                    week: w1,
                    report_count: 3
                },
                WeeklyAggregate {
                    zipcode: "10001".to_string(),
                    week: w2,
                    report_count: 2
                },
            ]
        );
    }

    #[test]
    fn test_gaps_are_not_filled() {
        let reports = vec![
            report("10001", on(2024, 1, 2)),
            report("10001", on(2024, 3, 5)),
        ];
        let view = trends(&reports, 5);
        assert_eq!(view.weekly.len(), 2);
        assert!(view.weekly.iter().all(|a| a.report_count == 1));
    }

    #[test]
    fn test_ordering_and_missing_timestamps() {
        let reports = vec![
            report("94110", on(2024, 2, 1)),
            report("02134", on(2024, 2, 1)),
            report("02134", None),
            report("02134", on(2024, 1, 1)),
        ];
        let view = trends(&reports, 5);

        let keys: Vec<_> = view
            .weekly
            .iter()
            .map(|a| format!("{} {}", a.zipcode, a.week))
            .collect();
        assert_eq!(keys, vec!["02134 2024-W01", "02134 2024-W05", "94110 2024-W05"]);
        assert_eq!(view.zipcodes(), vec!["02134", "94110"]);
    }

    #[test]
    fn test_top_zips_ties_by_first_appearance() {
        let mut reports = Vec::new();
        for zip in ["30301", "10001", "60601", "10001", "73301", "94110", "02134", "60601"] {
            reports.push(report(zip, on(2024, 4, 2)));
        }

        let view = trends(&reports, 5);
        let order: Vec<_> = view.top_zips.iter().map(|z| z.zipcode.as_str()).collect();
        assert_eq!(order, vec!["10001", "60601", "30301", "73301", "94110"]);
        assert_eq!(view.top_zips[0].total, 2);
    }

    #[test]
    fn test_recent_takes_last_weeks() {
        let reports: Vec<_> = (1..=20)
            .map(|i| report("10001", on(2024, 1, 1).map(|t| t + chrono::Duration::weeks(i))))
            .collect();
        let view = trends(&reports, 5);

        let recent = view.recent("10001", 12);
        assert_eq!(recent.len(), 12);
        assert_eq!(recent.last().unwrap().week, view.weekly.last().unwrap().week);
        assert_eq!(view.recent("10001", 50).len(), 20);
        assert!(view.recent("99999", 12).is_empty());
    }

    #[test]
    fn test_empty_store() {
        let view = trends(&[], 5);
        assert!(view.is_empty());
        assert!(view.top_zips.is_empty());
    }
}
