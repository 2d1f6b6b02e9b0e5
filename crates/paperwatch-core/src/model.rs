//! Data model shared by sources, the catalog and renderers

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inclusive date window. An absent bound leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Both bounds absent: the range imposes no constraint.
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    /// Overlap of two ranges, `None` when they are disjoint.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        match (start, end) {
            (Some(s), Some(e)) if s > e => None,
            _ => Some(Self { start, end }),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(s), Some(e)) => write!(f, "{s} to {e}"),
            (Some(s), None) => write!(f, "from {s}"),
            (None, Some(e)) => write!(f, "until {e}"),
            (None, None) => f.write_str("all dates"),
        }
    }
}

/// Case-insensitive keyword pattern matched against titles and abstracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    pattern: String,
    /// Lowercased pattern, computed once.
    needle: String,
    whole_word: bool,
}

impl KeywordFilter {
    /// Match anywhere inside the text.
    pub fn substring(pattern: impl Into<String>) -> Self {
        Self::build(pattern.into(), false)
    }

    /// Match only when not glued to surrounding letters or digits.
    pub fn whole_word(pattern: impl Into<String>) -> Self {
        Self::build(pattern.into(), true)
    }

    fn build(pattern: String, whole_word: bool) -> Self {
        let pattern = pattern.trim().to_string();
        let needle = pattern.to_lowercase();
        Self {
            pattern,
            needle,
            whole_word,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub const fn is_whole_word(&self) -> bool {
        self.whole_word
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.needle.is_empty() {
            return false;
        }
        let haystack = text.to_lowercase();
        if !self.whole_word {
            return haystack.contains(&self.needle);
        }

        let mut from = 0;
        while let Some(pos) = haystack[from..].find(&self.needle) {
            let start = from + pos;
            let end = start + self.needle.len();
            let before = haystack[..start].chars().next_back();
            let after = haystack[end..].chars().next();
            if !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
            {
                return true;
            }
            // Advance one char past this candidate so overlapping matches are still seen.
            from = start
                + haystack[start..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        false
    }
}

impl fmt::Display for KeywordFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.whole_word {
            write!(f, "\\b{}\\b", self.pattern)
        } else {
            f.write_str(&self.pattern)
        }
    }
}

/// A named set of keyword filters with an optional date window.
///
/// Built from validated configuration at process start; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub name: String,
    pub filters: Vec<KeywordFilter>,
    pub date_range: Option<DateRange>,
}

/// Well-known keys of [`PaperRecord::links`] and [`PaperRecord::metadata`].
pub mod field {
    pub const LINK_ABS: &str = "abs";
    pub const LINK_PDF: &str = "pdf";
    pub const AUTHORS: &str = "authors";
    pub const LAST_AUTHOR: &str = "last_author";
    pub const CATEGORIES: &str = "categories";
    pub const PRIMARY_CATEGORY: &str = "primary_category";
    pub const COMMENT: &str = "comment";
    pub const UPDATED: &str = "updated";
}

/// One paper as returned by a source.
///
/// `id` is the source's stable identity; every other field may be refreshed
/// by a later fetch of the same paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub published: Option<NaiveDate>,
    /// Named links, e.g. `abs` and `pdf`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
    /// Source-provided fields such as authors, categories, comments.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl PaperRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: None,
            published: None,
            links: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = Some(text.into());
        self
    }

    pub const fn with_published(mut self, date: NaiveDate) -> Self {
        self.published = Some(date);
        self
    }

    pub fn has_abstract(&self) -> bool {
        self.abstract_text
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty())
    }

    /// Check the fields every catalog entry relies on.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("missing identity");
        }
        if self.title.trim().is_empty() {
            return Err("missing title");
        }
        Ok(())
    }
}

/// A paper record plus catalog bookkeeping.
///
/// Invariant: `last_updated >= first_seen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub record: PaperRecord,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl CatalogEntry {
    pub fn new(record: PaperRecord, now: DateTime<Utc>) -> Self {
        Self {
            record,
            first_seen: now,
            last_updated: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub const fn published(&self) -> Option<NaiveDate> {
        self.record.published
    }

    /// Overwrite the record fields from a newer fetch of the same paper.
    ///
    /// Identity and `first_seen` are kept.
    pub fn refresh(&mut self, record: PaperRecord, now: DateTime<Utc>) {
        debug_assert_eq!(self.record.id, record.id, "identity is immutable");
        let id = std::mem::take(&mut self.record.id);
        self.record = PaperRecord { id, ..record };
        self.last_updated = now.max(self.first_seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn range_contains_inclusive_bounds() {
        let r = DateRange::new(Some(d("2023-03-01")), Some(d("2023-03-31")));
        assert!(r.contains(d("2023-03-01")));
        assert!(r.contains(d("2023-03-31")));
        assert!(!r.contains(d("2023-02-28")));
        assert!(!r.contains(d("2023-04-01")));
    }

    #[test]
    fn range_open_sides() {
        let from = DateRange::new(Some(d("2024-01-01")), None);
        assert!(from.contains(d("2099-01-01")));
        assert!(!from.contains(d("2023-12-31")));
        assert!(DateRange::default().contains(d("1991-01-01")));
        assert!(DateRange::default().is_unbounded());
    }

    #[test]
    fn range_intersection() {
        let a = DateRange::new(Some(d("2023-01-01")), Some(d("2023-06-30")));
        let b = DateRange::new(Some(d("2023-03-01")), None);
        assert_eq!(
            a.intersect(&b),
            Some(DateRange::new(Some(d("2023-03-01")), Some(d("2023-06-30"))))
        );
        let c = DateRange::new(Some(d("2024-01-01")), None);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn range_display() {
        let r = DateRange::new(Some(d("2023-03-01")), None);
        assert_eq!(r.to_string(), "from 2023-03-01");
        assert_eq!(DateRange::default().to_string(), "all dates");
    }

    #[test]
    fn substring_filter_is_case_insensitive() {
        let f = KeywordFilter::substring("Agent");
        assert!(f.matches("Multi-AGENT systems"));
        assert!(f.matches("agentic workflows"));
        assert!(!f.matches("reagant"));
    }

    #[test]
    fn whole_word_filter_respects_boundaries() {
        let f = KeywordFilter::whole_word("agent");
        assert!(f.matches("An agent that plans"));
        assert!(f.matches("multi-agent"));
        assert!(!f.matches("agentic workflows"));
        assert!(!f.matches("reagent"));
        assert!(f.matches("reagent and agent"));
    }

    #[test]
    fn blank_filter_never_matches() {
        assert!(!KeywordFilter::substring("   ").matches("anything"));
    }

    #[test]
    fn record_validation() {
        assert!(PaperRecord::new("2301.001", "Title").validate().is_ok());
        assert_eq!(
            PaperRecord::new("", "Title").validate(),
            Err("missing identity")
        );
        assert_eq!(
            PaperRecord::new("2301.001", " ").validate(),
            Err("missing title")
        );
    }

    #[test]
    fn refresh_keeps_identity_and_first_seen() {
        let t0 = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let t1 = DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut entry = CatalogEntry::new(PaperRecord::new("2301.001", "Old"), t0);
        entry.refresh(
            PaperRecord::new("2301.001", "New").with_abstract("updated"),
            t1,
        );
        assert_eq!(entry.id(), "2301.001");
        assert_eq!(entry.record.title, "New");
        assert_eq!(entry.first_seen, t0);
        assert_eq!(entry.last_updated, t1);
    }

    #[test]
    fn entry_json_is_flat() {
        let t0 = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = PaperRecord::new("2301.001", "T").with_published(d("2023-01-15"));
        let json = serde_json::to_value(CatalogEntry::new(record, t0)).unwrap();
        assert_eq!(json["id"], "2301.001");
        assert_eq!(json["published"], "2023-01-15");
        assert!(json.get("record").is_none());
    }
}
