//! Keyword and date-window filtering of fetched records

use paperwatch_core::{DateRange, KeywordFilter, PaperRecord, Topic};

/// Topic predicate over fetched records.
///
/// A record passes when any filter matches its title or abstract and,
/// if a range is configured, its publication date lies in the range.
/// Undated records never pass a configured range.
#[derive(Debug, Clone)]
pub struct RecordFilter<'a> {
    filters: &'a [KeywordFilter],
    range: Option<DateRange>,
}

impl<'a> RecordFilter<'a> {
    pub fn new(filters: &'a [KeywordFilter], range: Option<DateRange>) -> Self {
        Self {
            filters,
            range: range.filter(|r| !r.is_unbounded()),
        }
    }

    pub fn for_topic(topic: &'a Topic) -> Self {
        Self::new(&topic.filters, topic.date_range)
    }

    pub fn accepts(&self, record: &PaperRecord) -> bool {
        self.in_range(record) && self.matches_keywords(record)
    }

    fn in_range(&self, record: &PaperRecord) -> bool {
        match (&self.range, record.published) {
            (None, _) => true,
            (Some(r), Some(date)) => r.contains(date),
            (Some(_), None) => false,
        }
    }

    fn matches_keywords(&self, record: &PaperRecord) -> bool {
        let abstract_text = record.abstract_text.as_deref().unwrap_or("");
        self.filters
            .iter()
            .any(|f| f.matches(&record.title) || f.matches(abstract_text))
    }

    /// Keep the accepted records, preserving order.
    pub fn apply(&self, records: Vec<PaperRecord>) -> Vec<PaperRecord> {
        records.into_iter().filter(|r| self.accepts(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn topic(range: Option<DateRange>) -> Topic {
        Topic {
            name: "agents".into(),
            filters: vec![KeywordFilter::substring("agent")],
            date_range: range,
        }
    }

    #[test]
    fn matches_title_or_abstract() {
        let t = topic(None);
        let f = RecordFilter::for_topic(&t);
        assert!(f.accepts(&PaperRecord::new("1", "Agent planning")));
        assert!(f.accepts(&PaperRecord::new("2", "Planning").with_abstract("an AGENT based view")));
        assert!(!f.accepts(&PaperRecord::new("3", "Vision transformers")));
    }

    #[test]
    fn date_window_is_inclusive() {
        let t = topic(Some(DateRange::new(Some(d("2023-03-01")), None)));
        let f = RecordFilter::for_topic(&t);
        let rec = |date| PaperRecord::new("1", "agent").with_published(d(date));
        assert!(f.accepts(&rec("2023-03-01")));
        assert!(f.accepts(&rec("2023-03-15")));
        assert!(!f.accepts(&rec("2023-02-28")));
    }

    #[test]
    fn undated_records_fail_configured_range() {
        let t = topic(Some(DateRange::new(Some(d("2023-03-01")), None)));
        assert!(!RecordFilter::for_topic(&t).accepts(&PaperRecord::new("1", "agent")));
        assert!(RecordFilter::for_topic(&topic(None)).accepts(&PaperRecord::new("1", "agent")));
    }

    #[test]
    fn apply_preserves_order() {
        let t = topic(None);
        let out = RecordFilter::for_topic(&t).apply(vec![
            PaperRecord::new("b", "agent b"),
            PaperRecord::new("x", "nothing"),
            PaperRecord::new("a", "agent a"),
        ]);
        let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }
}
