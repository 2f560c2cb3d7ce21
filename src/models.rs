//! Data models for community water reports.
//!
//! This module contains the report record, its closed vocabularies and the
//! derived weekly aggregate used by the trend views.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Maximum description length accepted from an interactive submission.
pub const MAX_DESCRIPTION_CHARS: usize = 300;

/// An observed issue at a water source.
///
/// Values outside the fixed vocabulary can only enter through bulk import
/// and are kept verbatim in [`Concern::Unlisted`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Concern {
    Discoloration,
    FoulSmell,
    Foam,
    Bugs,
    IndustrialArea,
    TrashNearby,
    Unlisted(String),
}

impl Concern {
    /// The fixed vocabulary, in form order.
    pub const LISTED: [Concern; 6] = [
        Concern::Discoloration,
        Concern::FoulSmell,
        Concern::Foam,
        Concern::Bugs,
        Concern::IndustrialArea,
        Concern::TrashNearby,
    ];

    /// Returns the display label.
    pub fn label(&self) -> &str {
        match self {
            Concern::Discoloration => "Discoloration",
            Concern::FoulSmell => "Foul smell",
            Concern::Foam => "Foam",
            Concern::Bugs => "Bugs",
            Concern::IndustrialArea => "Industrial area",
            Concern::TrashNearby => "Trash nearby",
            Concern::Unlisted(raw) => raw,
        }
    }

    /// Parses a vocabulary member, rejecting anything unlisted.
    pub fn parse_listed(s: &str) -> Result<Self, String> {
        match Concern::from(s) {
            Concern::Unlisted(raw) => Err(format!(
                "unknown concern '{}' (expected one of: {})",
                raw,
                Concern::LISTED
                    .iter()
                    .map(Concern::label)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            listed => Ok(listed),
        }
    }
}

impl From<&str> for Concern {
    fn from(s: &str) -> Self {
        match normalize_label(s).as_str() {
            "discoloration" => Concern::Discoloration,
            "foul smell" => Concern::FoulSmell,
            "foam" => Concern::Foam,
            "bugs" => Concern::Bugs,
            "industrial area" => Concern::IndustrialArea,
            "trash nearby" => Concern::TrashNearby,
            _ => Concern::Unlisted(s.trim().to_string()),
        }
    }
}

impl From<String> for Concern {
    fn from(s: String) -> Self {
        Concern::from(s.as_str())
    }
}

impl From<Concern> for String {
    fn from(c: Concern) -> Self {
        c.label().to_string()
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Category of the reported water source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceType {
    Faucet,
    RiverStream,
    PipeLeak,
    Fountain,
    RainwaterPool,
    Other,
    Unlisted(String),
}

impl SourceType {
    /// The fixed vocabulary, in form order.
    pub const LISTED: [SourceType; 6] = [
        SourceType::Faucet,
        SourceType::RiverStream,
        SourceType::PipeLeak,
        SourceType::Fountain,
        SourceType::RainwaterPool,
        SourceType::Other,
    ];

    /// Returns the display label.
    pub fn label(&self) -> &str {
        match self {
            SourceType::Faucet => "Faucet",
            SourceType::RiverStream => "River/Stream",
            SourceType::PipeLeak => "Pipe Leak",
            SourceType::Fountain => "Fountain",
            SourceType::RainwaterPool => "Rainwater Pool",
            SourceType::Other => "Other",
            SourceType::Unlisted(raw) => raw,
        }
    }

    /// Parses a vocabulary member, rejecting anything unlisted.
    pub fn parse_listed(s: &str) -> Result<Self, String> {
        match SourceType::from(s) {
            SourceType::Unlisted(raw) => Err(format!(
                "unknown source type '{}' (expected one of: {})",
                raw,
                SourceType::LISTED
                    .iter()
                    .map(SourceType::label)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            listed => Ok(listed),
        }
    }
}

impl From<&str> for SourceType {
    fn from(s: &str) -> Self {
        match normalize_label(s).as_str() {
            "faucet" => SourceType::Faucet,
            "river/stream" | "river stream" | "river" | "stream" => SourceType::RiverStream,
            "pipe leak" => SourceType::PipeLeak,
            "fountain" => SourceType::Fountain,
            "rainwater pool" => SourceType::RainwaterPool,
            "other" => SourceType::Other,
            _ => SourceType::Unlisted(s.trim().to_string()),
        }
    }
}

impl From<String> for SourceType {
    fn from(s: String) -> Self {
        SourceType::from(s.as_str())
    }
}

impl From<SourceType> for String {
    fn from(t: SourceType) -> Self {
        t.label().to_string()
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether the reporter used the water.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Usage {
    Yes,
    No,
    Unlisted(String),
}

impl Usage {
    /// Returns the display label.
    pub fn label(&self) -> &str {
        match self {
            Usage::Yes => "Yes",
            Usage::No => "No",
            Usage::Unlisted(raw) => raw,
        }
    }

    /// Parses `Yes` or `No`, rejecting anything else.
    pub fn parse_listed(s: &str) -> Result<Self, String> {
        match Usage::from(s) {
            Usage::Unlisted(raw) => Err(format!("expected Yes or No, got '{}'", raw)),
            listed => Ok(listed),
        }
    }
}

impl From<&str> for Usage {
    fn from(s: &str) -> Self {
        match normalize_label(s).as_str() {
            "yes" => Usage::Yes,
            "no" => Usage::No,
            _ => Usage::Unlisted(s.trim().to_string()),
        }
    }
}

impl From<String> for Usage {
    fn from(s: String) -> Self {
        Usage::from(s.as_str())
    }
}

impl From<Usage> for String {
    fn from(u: Usage) -> Self {
        u.label().to_string()
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn normalize_label(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', '_'], " ")
}

/// One community-submitted observation about a water source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Append order assigned by the store (1-based).
    #[serde(default)]
    pub seq: u64,
    /// Creation time; absent when an imported value did not parse.
    pub timestamp: Option<NaiveDateTime>,
    /// Free-text location description.
    pub address: String,
    /// Postal code, kept as text.
    pub zipcode: String,
    /// Free-text description.
    pub description: String,
    /// Observed issues, in the order they were given.
    pub concerns: Vec<Concern>,
    /// Source category.
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// Whether the water was used.
    pub used: Usage,
    /// Symptoms after use, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    /// Advisory community alert flag. Triggers nothing.
    pub alert: bool,
    /// Stored photo, if one was attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<PathBuf>,
}

impl Report {
    /// Returns the concerns as the comma-joined text used for display and export.
    pub fn concerns_text(&self) -> String {
        join_concerns(&self.concerns)
    }

    /// Returns the timestamp formatted for display.
    pub fn display_timestamp(&self) -> String {
        match self.timestamp {
            Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
            None => "unknown time".to_string(),
        }
    }

    /// Returns the ISO week this report falls into, if it has a timestamp.
    pub fn week(&self) -> Option<WeekBucket> {
        self.timestamp.map(|ts| WeekBucket::of(ts.date()))
    }
}

/// Joins concerns with `", "`.
///
/// Together with [`split_concerns`] this normalizes spacing, so `Foam,Bugs`
/// comes back as `Foam, Bugs`. A tag that itself contains a comma does not
/// survive the round trip; it is split into separate tags.
pub fn join_concerns(concerns: &[Concern]) -> String {
    concerns
        .iter()
        .map(Concern::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Splits comma-joined concern text back into tags.
///
/// Tags are trimmed and empty pieces dropped; commas are always separators.
pub fn split_concerns(text: &str) -> Vec<Concern> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Concern::from)
        .collect()
}

/// An attached photo as received from the submitter.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Original file name, used to derive the stored name.
    pub file_name: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// Structured fields of an interactive submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub address: String,
    pub zipcode: String,
    pub description: String,
    pub concerns: Vec<Concern>,
    pub source_type: SourceType,
    pub used: Usage,
    pub symptoms: Option<String>,
    pub alert: bool,
    pub photo: Option<PhotoUpload>,
}

/// An ISO-8601 calendar week (Monday to Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekBucket {
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week number (1-53).
    pub week: u32,
}

impl WeekBucket {
    /// Returns the week containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// Monday of this week.
    pub fn start(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }

    /// Sunday of this week.
    pub fn end(&self) -> Option<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Sun)
    }

    /// Returns the `start/end` date range label, e.g. `2024-01-01/2024-01-07`.
    pub fn period_label(&self) -> String {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => format!("{}/{}", start, end),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for WeekBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl Serialize for WeekBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Number of reports observed for one zip code in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyAggregate {
    pub zipcode: String,
    pub week: WeekBucket,
    pub report_count: usize,
}
