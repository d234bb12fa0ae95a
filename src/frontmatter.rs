//! Front-matter parsing for article files.
//!
//! Every article is a text file with a YAML key-value header fenced by `---`
//! lines, followed by the markdown body:
//!
//! ```text
//! ---
//! title: On Liquid Glass
//! date: 2024-03-01
//! time: auto
//! ---
//! Body starts here.
//! ```
//!
//! Recognized keys: `title`, `description`, `date`, `time`, `updated`,
//! `author`, `category`. Unknown keys are ignored so authors can carry
//! private keys (drafts, tags) without breaking the build.
//!
//! ## Typed sentinels
//!
//! The `date`, `time`, and `updated` fields overload their string values:
//! `time` may be a clock (`"09:30"`), the literal `"auto"`, or a day-period
//! token (`"morning"`); `updated` may be a date or `"auto"`. Each overload is
//! decided **once here**, at parse time, into a tagged variant ([`TimeSpec`],
//! [`UpdatedSpec`], [`DateSpec`]) — downstream resolution never re-interprets
//! raw strings.
//!
//! ## Date encodings
//!
//! YAML loaders disagree on whether an unquoted `2024-03-01` is a string or a
//! native date; native dates round-trip as full RFC 3339 timestamps. [`DateSpec`]
//! accepts both encodings (plus a bare `YYYY-MM-DDTHH:MM:SS`) and normalizes
//! to a calendar date, so quoting style in the front-matter never changes the
//! resolved date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("article must begin with a `---` fence: {0}")]
    MissingOpeningFence(PathBuf),
    #[error("unterminated front-matter block (no closing `---`): {0}")]
    MissingClosingFence(PathBuf),
    #[error("invalid front-matter in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One of the five fixed time-of-day labels used in place of a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayPeriod {
    LateNight,
    Morning,
    Noon,
    Afternoon,
    Evening,
}

impl DayPeriod {
    /// Map an hour of day (0-23) to its period.
    pub fn from_hour(hour: u32) -> DayPeriod {
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=13 => DayPeriod::Noon,
            14..=17 => DayPeriod::Afternoon,
            18..=22 => DayPeriod::Evening,
            // 23:00 through 05:59
            _ => DayPeriod::LateNight,
        }
    }

    /// Representative hour used when ordering period-timed articles
    /// against clock-timed ones within the same date.
    pub fn anchor_hour(self) -> u32 {
        match self {
            DayPeriod::LateNight => 0,
            DayPeriod::Morning => 6,
            DayPeriod::Noon => 12,
            DayPeriod::Afternoon => 14,
            DayPeriod::Evening => 18,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayPeriod::LateNight => "late-night",
            DayPeriod::Morning => "morning",
            DayPeriod::Noon => "noon",
            DayPeriod::Afternoon => "afternoon",
            DayPeriod::Evening => "evening",
        }
    }

    pub fn from_label(label: &str) -> Option<DayPeriod> {
        match label {
            "late-night" => Some(DayPeriod::LateNight),
            "morning" => Some(DayPeriod::Morning),
            "noon" => Some(DayPeriod::Noon),
            "afternoon" => Some(DayPeriod::Afternoon),
            "evening" => Some(DayPeriod::Evening),
            _ => None,
        }
    }
}

/// A front-matter `date` (or `updated` date), normalized to a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpec(pub NaiveDate);

impl<'de> Deserialize<'de> for DateSpec {
    fn deserialize<D>(deserializer: D) -> Result<DateSpec, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_date(&s)
            .map(DateSpec)
            .ok_or_else(|| de::Error::custom(format!("unrecognized date `{s}`")))
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    None
}

/// A front-matter `time` value, decided at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpec {
    /// Literal `"auto"`: derive from the file's modification time.
    Auto,
    /// An explicit `HH:MM` clock time.
    Clock(NaiveTime),
    /// A literal day-period token such as `"morning"`.
    Period(DayPeriod),
}

impl<'de> Deserialize<'de> for TimeSpec {
    fn deserialize<D>(deserializer: D) -> Result<TimeSpec, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.trim();
        if trimmed == "auto" {
            return Ok(TimeSpec::Auto);
        }
        if let Some(period) = DayPeriod::from_label(trimmed) {
            return Ok(TimeSpec::Period(period));
        }
        if let Ok(t) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
            return Ok(TimeSpec::Clock(t));
        }
        Err(de::Error::custom(format!(
            "unrecognized time `{s}` (expected `HH:MM`, `auto`, or a day-period label)"
        )))
    }
}

/// A front-matter `updated` value, decided at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatedSpec {
    /// Literal `"auto"`: use the file's modification date.
    Auto,
    Date(NaiveDate),
}

impl<'de> Deserialize<'de> for UpdatedSpec {
    fn deserialize<D>(deserializer: D) -> Result<UpdatedSpec, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let trimmed = s.trim();
        if trimmed == "auto" {
            return Ok(UpdatedSpec::Auto);
        }
        parse_date(trimmed)
            .map(UpdatedSpec::Date)
            .ok_or_else(|| de::Error::custom(format!("unrecognized updated date `{s}`")))
    }
}

/// The typed front-matter header of one article. All fields optional; an
/// untitled essay legitimately carries nothing but a body.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawFrontmatter {
    pub title: String,
    pub description: String,
    pub date: Option<DateSpec>,
    pub time: Option<TimeSpec>,
    pub updated: Option<UpdatedSpec>,
    pub author: Option<String>,
    pub category: Option<String>,
}

const FENCE: &str = "---";

/// Split an article into its raw YAML header and body without parsing the YAML.
///
/// Returns `(header, body)` slices into the input.
pub fn split<'a>(path: &Path, input: &'a str) -> Result<(&'a str, &'a str), FrontmatterError> {
    if !input.starts_with(FENCE) {
        return Err(FrontmatterError::MissingOpeningFence(path.to_owned()));
    }
    match input[FENCE.len()..].find(FENCE) {
        None => Err(FrontmatterError::MissingClosingFence(path.to_owned())),
        Some(offset) => {
            let header = &input[FENCE.len()..FENCE.len() + offset];
            let body = &input[FENCE.len() + offset + FENCE.len()..];
            Ok((header, body.trim_start_matches(['\r', '\n'])))
        }
    }
}

/// Parse an article into typed front-matter and its body.
pub fn parse<'a>(
    path: &Path,
    input: &'a str,
) -> Result<(RawFrontmatter, &'a str), FrontmatterError> {
    let (header, body) = split(path, input)?;
    // An empty header is legal (untitled essays); YAML refuses to read a
    // struct out of a null document, so short-circuit it.
    let raw = if header.trim().is_empty() {
        RawFrontmatter::default()
    } else {
        serde_yaml::from_str(header).map_err(|source| FrontmatterError::Yaml {
            path: path.to_owned(),
            source,
        })?
    };
    Ok((raw, body))
}
