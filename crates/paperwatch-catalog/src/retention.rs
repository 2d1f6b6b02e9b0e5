//! Retention cleanup of stale catalog entries

use chrono::{Days, NaiveDate};
use paperwatch_core::{CatalogEntry, DateRange};
use rustc_hash::FxHashSet;

/// Which entries a cleanup pass removes.
#[derive(Debug, Clone)]
pub enum RetentionPolicy<'a> {
    /// Drop entries published more than `keep_days` before `today`.
    /// Undated entries are kept.
    Rolling { keep_days: u32, today: NaiveDate },
    /// Drop entries dated inside `range` whose id was not fetched this run.
    Window {
        range: DateRange,
        fetched: &'a FxHashSet<String>,
    },
}

impl RetentionPolicy<'_> {
    fn removes(&self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Rolling { keep_days, today } => {
                let Some(published) = entry.published() else {
                    return false;
                };
                today
                    .checked_sub_days(Days::new(u64::from(*keep_days)))
                    .is_some_and(|cutoff| published < cutoff)
            }
            Self::Window { range, fetched } => entry
                .published()
                .is_some_and(|date| range.contains(date) && !fetched.contains(entry.id())),
        }
    }
}

/// Remove entries selected by `policy`, returning how many were dropped.
///
/// Relative order of the survivors is unchanged.
pub fn clean_entries(entries: &mut Vec<CatalogEntry>, policy: &RetentionPolicy<'_>) -> usize {
    let before = entries.len();
    entries.retain(|e| !policy.removes(e));
    let removed = before - entries.len();
    if removed > 0 {
        log::debug!("retention removed {removed} of {before} entries");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use paperwatch_core::PaperRecord;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(id: &str, date: Option<&str>) -> CatalogEntry {
        let mut record = PaperRecord::new(id, "t");
        record.published = date.map(d);
        CatalogEntry::new(record, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn ids(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(CatalogEntry::id).collect()
    }

    #[test]
    fn rolling_drops_older_than_cutoff() {
        let mut entries = vec![
            entry("fresh", Some("2024-03-10")),
            entry("edge", Some("2024-03-01")),
            entry("stale", Some("2024-02-29")),
            entry("undated", None),
        ];
        let policy = RetentionPolicy::Rolling {
            keep_days: 10,
            today: d("2024-03-11"),
        };
        assert_eq!(clean_entries(&mut entries, &policy), 1);
        assert_eq!(ids(&entries), ["fresh", "edge", "undated"]);
    }

    #[test]
    fn window_drops_only_unfetched_inside_range() {
        let fetched: FxHashSet<String> = ["b".to_string()].into_iter().collect();
        let mut entries = vec![
            entry("a", Some("2023-03-10")),
            entry("b", Some("2023-03-12")),
            entry("c", Some("2023-02-01")),
            entry("d", None),
        ];
        let policy = RetentionPolicy::Window {
            range: DateRange::new(Some(d("2023-03-01")), Some(d("2023-03-31"))),
            fetched: &fetched,
        };
        assert_eq!(clean_entries(&mut entries, &policy), 1);
        assert_eq!(ids(&entries), ["b", "c", "d"]);
    }

    #[test]
    fn empty_fetch_clears_window() {
        let fetched = FxHashSet::default();
        let mut entries = vec![entry("a", Some("2023-03-10")), entry("b", Some("2023-03-20"))];
        let policy = RetentionPolicy::Window {
            range: DateRange::new(Some(d("2023-03-01")), Some(d("2023-03-31"))),
            fetched: &fetched,
        };
        assert_eq!(clean_entries(&mut entries, &policy), 2);
        assert!(entries.is_empty());
    }
}
