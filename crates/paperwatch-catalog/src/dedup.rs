//! Collapse records sharing an identity

use paperwatch_core::PaperRecord;
use rustc_hash::FxHashMap;

/// Whether `incoming` should replace `current` for the same id.
///
/// Later publication date wins (undated counts as oldest). At equal dates a
/// record with an abstract beats one without; otherwise the later record wins.
fn prefer_incoming(current: &PaperRecord, incoming: &PaperRecord) -> bool {
    match incoming.published.cmp(&current.published) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => incoming.has_abstract() || !current.has_abstract(),
    }
}

/// Reduce `records` to one record per id.
///
/// Output keeps the position of each id's first occurrence.
pub fn dedup_records(records: Vec<PaperRecord>) -> Vec<PaperRecord> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut out: Vec<PaperRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(&record.id) {
            Some(&slot) => {
                if prefer_incoming(&out[slot], &record) {
                    out[slot] = record;
                }
            }
            None => {
                index.insert(record.id.clone(), out.len());
                out.push(record);
            }
        }
    }
    out
}
