//! Merge freshly fetched records into a topic's existing entries

use chrono::{DateTime, Utc};
use paperwatch_core::{CatalogEntry, PaperRecord};
use rustc_hash::FxHashMap;

use crate::catalog::sort_entries;

/// Result of [`merge_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged entries in catalog order.
    pub entries: Vec<CatalogEntry>,
    pub added: usize,
    pub updated: usize,
}

/// Upsert `records` into `existing`.
///
/// New ids become entries with `first_seen = now`; known ids are refreshed
/// and bump `last_updated`. Nothing is ever removed here. `records` must
/// already be deduplicated.
pub fn merge_records(
    existing: Vec<CatalogEntry>,
    records: Vec<PaperRecord>,
    now: DateTime<Utc>,
) -> MergeOutcome {
    let mut entries = existing;
    let mut index: FxHashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id().to_string(), i))
        .collect();

    let mut added = 0;
    let mut updated = 0;
    for record in records {
        if let Some(&slot) = index.get(&record.id) {
            entries[slot].refresh(record, now);
            updated += 1;
        } else {
            index.insert(record.id.clone(), entries.len());
            entries.push(CatalogEntry::new(record, now));
            added += 1;
        }
    }

    sort_entries(&mut entries);
    MergeOutcome {
        entries,
        added,
        updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn t(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn rec(id: &str, title: &str, date: &str) -> PaperRecord {
        PaperRecord::new(id, title).with_published(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap())
    }

    #[test]
    fn adds_into_empty() {
        let out = merge_records(
            Vec::new(),
            vec![rec("a", "A", "2024-01-01"), rec("b", "B", "2024-02-01")],
            t(1),
        );
        assert_eq!((out.added, out.updated), (2, 0));
        assert_eq!(out.entries[0].id(), "b");
        assert!(out.entries.iter().all(|e| e.first_seen == t(1)));
    }

    #[test]
    fn updates_keep_first_seen() {
        let first = merge_records(Vec::new(), vec![rec("a", "old", "2024-01-01")], t(1));
        let second = merge_records(first.entries, vec![rec("a", "new", "2024-01-01")], t(5));
        assert_eq!((second.added, second.updated), (0, 1));
        let e = &second.entries[0];
        assert_eq!(e.record.title, "new");
        assert_eq!(e.first_seen, t(1));
        assert_eq!(e.last_updated, t(5));
    }

    #[test]
    fn never_removes() {
        let first = merge_records(
            Vec::new(),
            vec![rec("a", "A", "2024-01-01"), rec("b", "B", "2024-01-02")],
            t(1),
        );
        let second = merge_records(first.entries, vec![rec("c", "C", "2024-01-03")], t(2));
        assert_eq!(second.entries.len(), 3);
    }

    #[test]
    fn remerge_is_stable_apart_from_timestamps() {
        let records = vec![rec("a", "A", "2024-01-01"), rec("b", "B", "2024-01-02")];
        let first = merge_records(Vec::new(), records.clone(), t(1));
        let second = merge_records(first.entries.clone(), records, t(1));
        assert_eq!(first.entries, second.entries);
    }
}
