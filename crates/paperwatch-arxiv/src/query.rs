//! Translation of keyword queries into arXiv `search_query` syntax

use chrono::NaiveDate;
use paperwatch_core::{DateRange, SearchQuery};

/// Earliest submission date arXiv accepts in range queries.
const OPEN_START: &str = "19910101";
const OPEN_END: &str = "29991231";

fn day(date: Option<NaiveDate>, open: &str) -> String {
    date.map_or_else(|| open.to_string(), |d| d.format("%Y%m%d").to_string())
}

/// `all:term` for a single word, `all:"multi word"` otherwise.
fn term(pattern: &str) -> String {
    let cleaned: String = pattern.chars().filter(|&c| c != '"').collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    match words.as_slice() {
        [single] => format!("all:{single}"),
        many => format!("all:\"{}\"", many.join(" ")),
    }
}

fn date_clause(range: &DateRange) -> String {
    format!(
        "submittedDate:[{}0000 TO {}2359]",
        day(range.start, OPEN_START),
        day(range.end, OPEN_END)
    )
}

/// Build the `search_query` parameter for one keyword query.
pub fn search_query(query: &SearchQuery) -> String {
    let mut q = term(&query.pattern);
    if let Some(range) = query.date_range.filter(|r| !r.is_unbounded()) {
        q.push_str(" AND ");
        q.push_str(&date_clause(&range));
    }
    q
}

/// Full parameter list for one page of results, newest submissions first.
pub fn page_params(search: &str, start: usize, max_results: usize) -> Vec<(&'static str, String)> {
    vec![
        ("search_query", search.to_string()),
        ("start", start.to_string()),
        ("max_results", max_results.to_string()),
        ("sortBy", "submittedDate".to_string()),
        ("sortOrder", "descending".to_string()),
    ]
}
