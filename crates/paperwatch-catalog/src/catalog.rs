//! In-memory catalog: topic name → ordered entries

use std::cmp::Ordering;
use std::collections::BTreeMap;

use paperwatch_core::CatalogEntry;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Persistent set of entries grouped by topic.
///
/// Entries inside a topic are kept in [`entry_order`]; ids are unique per
/// topic but the same paper may appear under several topics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    topics: BTreeMap<String, Vec<CatalogEntry>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of a topic, empty if the topic has never been processed.
    pub fn entries(&self, topic: &str) -> &[CatalogEntry] {
        self.topics.get(topic).map_or(&[], Vec::as_slice)
    }

    /// Remove and return a topic's entries for in-place processing.
    pub fn take_entries(&mut self, topic: &str) -> Vec<CatalogEntry> {
        self.topics.remove(topic).unwrap_or_default()
    }

    /// Replace a topic's entries, restoring catalog order.
    pub fn set_entries(&mut self, topic: &str, mut entries: Vec<CatalogEntry>) {
        sort_entries(&mut entries);
        self.topics.insert(topic.to_string(), entries);
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn topics(&self) -> impl Iterator<Item = (&str, &[CatalogEntry])> {
        self.topics.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn total_entries(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Drop topics not in `keep`. Returns `(name, entry_count)` per dropped topic.
    pub fn retain_topics<'a>(&mut self, keep: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
        let keep: FxHashSet<&str> = keep.into_iter().collect();
        let dropped: Vec<String> = self
            .topics
            .keys()
            .filter(|k| !keep.contains(k.as_str()))
            .cloned()
            .collect();
        dropped
            .into_iter()
            .filter_map(|name| {
                let n = self.topics.remove(&name)?.len();
                Some((name, n))
            })
            .collect()
    }

    /// List every violated invariant; empty when the catalog is consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (topic, entries) in &self.topics {
            let mut ids = FxHashSet::default();
            for entry in entries {
                if !ids.insert(entry.id()) {
                    problems.push(format!("topic '{topic}': duplicate id {}", entry.id()));
                }
                if entry.last_updated < entry.first_seen {
                    problems.push(format!(
                        "topic '{topic}': entry {} updated before first seen",
                        entry.id()
                    ));
                }
                if let Err(reason) = entry.record.validate() {
                    problems.push(format!("topic '{topic}': entry '{}' {reason}", entry.id()));
                }
            }
            if entries
                .windows(2)
                .any(|w| entry_order(&w[0], &w[1]) == Ordering::Greater)
            {
                problems.push(format!("topic '{topic}': entries out of order"));
            }
        }
        problems
    }
}

/// Catalog order: newest publication date first, undated entries last,
/// ties broken by id ascending.
pub fn entry_order(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    match (a.published(), b.published()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id().cmp(b.id()))
}

pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(entry_order);
}
