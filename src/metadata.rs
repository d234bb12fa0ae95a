//! Per-article metadata resolution.
//!
//! Turns a discovered source file plus its parsed front-matter into the
//! canonical [`ArticleMeta`] record. Resolution applies, in order:
//!
//! 1. **Category precedence** — the folder category wins over any
//!    front-matter `category`; both are canonicalized to lowercase.
//! 2. **Date fallback** — explicit front-matter date, else the file's
//!    creation timestamp (modification timestamp on filesystems without
//!    birth times). The date is therefore always resolvable.
//! 3. **Essay time-of-day derivation** — articles in the `essay` category
//!    (case-insensitive) display a day-period label instead of a clock:
//!    an absent or `auto` time derives the period from the modification
//!    hour, and an explicit clock is converted to its period. Other
//!    categories keep clocks (`auto` resolves to the modification time)
//!    and keep literal period tokens verbatim.
//! 4. **Update suppression** — `updated` (explicit or `auto` → mtime date)
//!    is dropped entirely when it equals the resolved date, so touching a
//!    file without changing content never shows a stale "updated" badge.
//! 5. **Author default** — front-matter author, else the configured site
//!    default, else empty.
//!
//! Resolution is a pure function: filesystem timestamps arrive through
//! [`FileTimes`], captured once by the corpus loader. Unit tests construct
//! `FileTimes` directly instead of manipulating real file clocks.

use crate::config::SiteConfig;
use crate::frontmatter::{DayPeriod, RawFrontmatter, TimeSpec, UpdatedSpec};
use crate::scan::ArticleSource;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::io;
use std::path::Path;

/// The category rendered as a chronological timeline of untitled entries.
pub const ESSAY_CATEGORY: &str = "essay";

/// Filesystem timestamps of an article file, localized.
#[derive(Debug, Clone, Copy)]
pub struct FileTimes {
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
}

impl FileTimes {
    /// Capture timestamps from disk. Creation time falls back to the
    /// modification time where the filesystem does not record birth times.
    pub fn read(path: &Path) -> io::Result<FileTimes> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified()?;
        let created = metadata.created().unwrap_or(modified);
        Ok(FileTimes {
            created: created.into(),
            modified: modified.into(),
        })
    }
}

/// An article's resolved publication time: either a clock or a day-period
/// label, never the raw `auto`/string forms from the front-matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTime {
    Clock(NaiveTime),
    Period(DayPeriod),
}

impl ResolvedTime {
    /// The time used for ordering within a date. Periods order by their
    /// anchor hour; articles without any time sort as midnight.
    pub fn sort_time(self) -> NaiveTime {
        match self {
            ResolvedTime::Clock(t) => t,
            ResolvedTime::Period(p) => NaiveTime::from_hms_opt(p.anchor_hour(), 0, 0)
                .unwrap_or(NaiveTime::MIN),
        }
    }
}

impl fmt::Display for ResolvedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedTime::Clock(t) => write!(f, "{}", t.format("%H:%M")),
            ResolvedTime::Period(p) => f.write_str(p.label()),
        }
    }
}

// Serialized as its display string ("09:30" or "morning") so the manifest
// stays readable and matches the front-matter vocabulary.
impl Serialize for ResolvedTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResolvedTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ResolvedTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        if let Some(period) = DayPeriod::from_label(&s) {
            return Ok(ResolvedTime::Period(period));
        }
        NaiveTime::parse_from_str(&s, "%H:%M")
            .map(ResolvedTime::Clock)
            .map_err(|_| de::Error::custom(format!("unrecognized resolved time `{s}`")))
    }
}

/// Canonical, fully resolved metadata for one article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleMeta {
    pub slug: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<ResolvedTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ArticleMeta {
    pub fn is_essay(&self) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(ESSAY_CATEGORY))
    }

    /// Composite listing key: date, then resolved time (absent = midnight).
    pub fn sort_key(&self) -> (NaiveDate, NaiveTime) {
        (
            self.date,
            self.time.map(ResolvedTime::sort_time).unwrap_or(NaiveTime::MIN),
        )
    }
}

/// Resolve canonical metadata for one article.
pub fn resolve(
    source: &ArticleSource,
    raw: &RawFrontmatter,
    times: &FileTimes,
    config: &SiteConfig,
) -> ArticleMeta {
    let category = source
        .folder_category
        .clone()
        .or_else(|| raw.category.as_ref().map(|c| c.to_ascii_lowercase()));
    let is_essay = category
        .as_deref()
        .is_some_and(|c| c.eq_ignore_ascii_case(ESSAY_CATEGORY));

    let date = raw
        .date
        .map(|d| d.0)
        .unwrap_or_else(|| times.created.date_naive());

    let time = resolve_time(raw.time, is_essay, times);

    let updated = match raw.updated {
        None => None,
        Some(UpdatedSpec::Auto) => Some(times.modified.date_naive()),
        Some(UpdatedSpec::Date(d)) => Some(d),
    }
    // An update on the publication day is not an update worth badging.
    .filter(|u| *u != date);

    let author = raw
        .author
        .clone()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| config.author.name.clone());

    ArticleMeta {
        slug: source.slug.clone(),
        title: raw.title.clone(),
        description: raw.description.clone(),
        date,
        time,
        updated,
        author,
        category,
    }
}

fn resolve_time(spec: Option<TimeSpec>, is_essay: bool, times: &FileTimes) -> Option<ResolvedTime> {
    if is_essay {
        let period = match spec {
            None | Some(TimeSpec::Auto) => DayPeriod::from_hour(times.modified.hour()),
            Some(TimeSpec::Clock(t)) => DayPeriod::from_hour(t.hour()),
            Some(TimeSpec::Period(p)) => p,
        };
        return Some(ResolvedTime::Period(period));
    }
    match spec {
        None => None,
        Some(TimeSpec::Auto) => {
            let t = times.modified.time();
            Some(ResolvedTime::Clock(
                NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t),
            ))
        }
        Some(TimeSpec::Clock(t)) => Some(ResolvedTime::Clock(t)),
        Some(TimeSpec::Period(p)) => Some(ResolvedTime::Period(p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::{self, DateSpec};
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn source(slug: &str, folder_category: Option<&str>) -> ArticleSource {
        ArticleSource {
            path: PathBuf::from(format!("/content/{slug}.mdx")),
            slug: slug.to_string(),
            folder_category: folder_category.map(String::from),
        }
    }

    fn times(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> FileTimes {
        let t = Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap();
        FileTimes {
            created: t,
            modified: t,
        }
    }

    fn raw(header: &str) -> RawFrontmatter {
        let input = format!("---\n{header}\n---\nbody");
        let (raw, _) = frontmatter::parse(Path::new("t.mdx"), &input).unwrap();
        raw
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn explicit_date_wins_over_filesystem() {
        let meta = resolve(
            &source("a", None),
            &raw("date: 2024-01-01"),
            &times(2025, 6, 1, 12, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.date, date(2024, 1, 1));
    }

    #[test]
    fn native_date_encoding_resolves_same_as_string() {
        let quoted = resolve(
            &source("a", None),
            &raw("date: \"2024-01-01\""),
            &times(2025, 6, 1, 12, 0),
            &SiteConfig::default(),
        );
        let native = resolve(
            &source("a", None),
            &raw("date: \"2024-01-01T10:20:30.000Z\""),
            &times(2025, 6, 1, 12, 0),
            &SiteConfig::default(),
        );
        assert_eq!(quoted.date, native.date);
    }

    #[test]
    fn missing_date_falls_back_to_creation_time_stably() {
        let fs_times = times(2023, 11, 5, 8, 30);
        let first = resolve(&source("a", None), &raw(""), &fs_times, &SiteConfig::default());
        let second = resolve(&source("a", None), &raw(""), &fs_times, &SiteConfig::default());
        assert_eq!(first.date, date(2023, 11, 5));
        assert_eq!(first.date, second.date);
    }

    #[test]
    fn date_spec_is_exposed_for_reuse() {
        // DateSpec is the parse-time type; resolution only unwraps it.
        let mut fm = RawFrontmatter::default();
        fm.date = Some(DateSpec(date(2022, 2, 2)));
        let meta = resolve(
            &source("a", None),
            &fm,
            &times(2025, 1, 1, 0, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.date, date(2022, 2, 2));
    }

    // =========================================================================
    // Category precedence
    // =========================================================================

    #[test]
    fn folder_category_wins_over_frontmatter() {
        let meta = resolve(
            &source("a", Some("tech")),
            &raw("category: life"),
            &times(2024, 1, 1, 0, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.category.as_deref(), Some("tech"));
    }

    #[test]
    fn frontmatter_category_used_for_root_files() {
        let meta = resolve(
            &source("a", None),
            &raw("category: Life"),
            &times(2024, 1, 1, 0, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.category.as_deref(), Some("life"));
    }

    // =========================================================================
    // Time resolution
    // =========================================================================

    #[test]
    fn non_essay_explicit_clock_kept() {
        let meta = resolve(
            &source("a", Some("tech")),
            &raw("time: \"09:30\""),
            &times(2024, 1, 1, 23, 59),
            &SiteConfig::default(),
        );
        assert_eq!(meta.time.unwrap().to_string(), "09:30");
    }

    #[test]
    fn non_essay_auto_resolves_to_mtime_clock() {
        let meta = resolve(
            &source("a", Some("tech")),
            &raw("time: auto"),
            &times(2024, 1, 1, 14, 5),
            &SiteConfig::default(),
        );
        assert_eq!(meta.time.unwrap().to_string(), "14:05");
    }

    #[test]
    fn non_essay_period_token_kept_verbatim() {
        let meta = resolve(
            &source("a", Some("tech")),
            &raw("time: evening"),
            &times(2024, 1, 1, 3, 0),
            &SiteConfig::default(),
        );
        assert_eq!(
            meta.time,
            Some(ResolvedTime::Period(DayPeriod::Evening))
        );
    }

    #[test]
    fn non_essay_without_time_has_none() {
        let meta = resolve(
            &source("a", Some("tech")),
            &raw(""),
            &times(2024, 1, 1, 9, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.time, None);
    }

    #[test]
    fn essay_missing_time_derives_period_from_mtime_hour() {
        let morning = resolve(
            &source("a", Some("essay")),
            &raw(""),
            &times(2024, 1, 1, 9, 0),
            &SiteConfig::default(),
        );
        assert_eq!(
            morning.time,
            Some(ResolvedTime::Period(DayPeriod::Morning))
        );

        let late = resolve(
            &source("a", Some("essay")),
            &raw(""),
            &times(2024, 1, 1, 23, 0),
            &SiteConfig::default(),
        );
        assert_eq!(
            late.time,
            Some(ResolvedTime::Period(DayPeriod::LateNight))
        );
    }

    #[test]
    fn essay_clock_converts_to_period() {
        let meta = resolve(
            &source("a", Some("essay")),
            &raw("time: \"15:30\""),
            &times(2024, 1, 1, 9, 0),
            &SiteConfig::default(),
        );
        assert_eq!(
            meta.time,
            Some(ResolvedTime::Period(DayPeriod::Afternoon))
        );
    }

    #[test]
    fn essay_detection_is_case_insensitive() {
        let meta = resolve(
            &source("a", None),
            &raw("category: Essay\ntime: \"09:00\""),
            &times(2024, 1, 1, 0, 0),
            &SiteConfig::default(),
        );
        assert_eq!(
            meta.time,
            Some(ResolvedTime::Period(DayPeriod::Morning))
        );
    }

    // =========================================================================
    // Updated resolution
    // =========================================================================

    #[test]
    fn updated_equal_to_date_is_suppressed() {
        let meta = resolve(
            &source("a", None),
            &raw("date: 2024-01-01\nupdated: 2024-01-01"),
            &times(2024, 1, 1, 0, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.updated, None);
    }

    #[test]
    fn updated_differing_from_date_is_kept() {
        let meta = resolve(
            &source("a", None),
            &raw("date: 2024-01-01\nupdated: 2024-02-15"),
            &times(2024, 1, 1, 0, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.updated, Some(date(2024, 2, 15)));
    }

    #[test]
    fn updated_auto_uses_mtime_date() {
        let meta = resolve(
            &source("a", None),
            &raw("date: 2024-01-01\nupdated: auto"),
            &times(2024, 3, 9, 10, 0),
            &SiteConfig::default(),
        );
        assert_eq!(meta.updated, Some(date(2024, 3, 9)));
    }

    #[test]
    fn updated_auto_on_publication_day_is_suppressed() {
        let meta = resolve(
            &source("a", None),
            &raw("updated: auto"),
            &times(2024, 3, 9, 10, 0),
            &SiteConfig::default(),
        );
        // date falls back to creation = same day as mtime
        assert_eq!(meta.updated, None);
    }

    // =========================================================================
    // Author default
    // =========================================================================

    #[test]
    fn frontmatter_author_wins() {
        let mut config = SiteConfig::default();
        config.author.name = "default".to_string();
        let meta = resolve(
            &source("a", None),
            &raw("author: alice"),
            &times(2024, 1, 1, 0, 0),
            &config,
        );
        assert_eq!(meta.author, "alice");
    }

    #[test]
    fn configured_default_fills_missing_author() {
        let mut config = SiteConfig::default();
        config.author.name = "default".to_string();
        let meta = resolve(&source("a", None), &raw(""), &times(2024, 1, 1, 0, 0), &config);
        assert_eq!(meta.author, "default");
    }

    #[test]
    fn author_empty_when_nothing_configured() {
        let meta = resolve(
            &source("a", None),
            &raw(""),
            &times(2024, 1, 1, 0, 0),
            &SiteConfig::default(),
        );
        assert!(meta.author.is_empty());
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[test]
    fn resolved_time_serializes_as_display_string() {
        let clock = ResolvedTime::Clock(NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(serde_json::to_string(&clock).unwrap(), "\"09:30\"");

        let period = ResolvedTime::Period(DayPeriod::LateNight);
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"late-night\"");

        let back: ResolvedTime = serde_json::from_str("\"late-night\"").unwrap();
        assert_eq!(back, period);
    }
}
