//! Queries against the real arXiv API. Run with `--ignored`.

use chrono::NaiveDate;
use paperwatch_arxiv::{ArxivConfig, ArxivSource};
use paperwatch_core::{DateRange, SearchQuery, SourceAdapter, field};

#[test]
#[ignore = "hits export.arxiv.org"]
fn fetches_a_small_window() {
    let source = ArxivSource::new(ArxivConfig {
        page_size: 5,
        ..ArxivConfig::default()
    });
    let range = DateRange::new(NaiveDate::from_ymd_opt(2024, 3, 1), NaiveDate::from_ymd_opt(2024, 3, 7));
    let query = SearchQuery {
        pattern: "agent".into(),
        date_range: Some(range),
        max_results: 8,
    };

    let records: Vec<_> = source
        .search(&query)
        .filter_map(Result::ok)
        .collect();
    assert!(!records.is_empty());
    assert!(records.len() <= 8);
    for r in &records {
        assert!(r.links.contains_key(field::LINK_ABS));
        assert!(r.published.is_some());
    }
}
