//! arXiv API client implementing [`SourceAdapter`]
//!
//! Results are fetched lazily, one page per HTTP call, while the returned
//! stream is consumed. Consecutive calls are spaced by `request_delay_ms`.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use paperwatch_core::{
    PaperRecord, PipelineError, RecordStream, SearchQuery, SourceAdapter, SourceError, get_text,
    retry_with_backoff,
};

use crate::config::ArxivConfig;
use crate::parser::{FeedPage, parse_feed};
use crate::query::{page_params, search_query};

pub struct ArxivSource {
    config: ArxivConfig,
    last_request: Mutex<Option<Instant>>,
}

impl ArxivSource {
    pub fn new(config: ArxivConfig) -> Self {
        Self {
            config,
            last_request: Mutex::new(None),
        }
    }

    /// Sleep until the configured delay since the previous request has passed.
    fn wait_turn(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = *last {
            let wait = self.config.request_delay().saturating_sub(prev.elapsed());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }

    /// Fetch and parse one page, retrying transient failures.
    ///
    /// A page that comes back empty while the feed still reports results
    /// past `start` is treated as a transient failure.
    pub fn fetch_page(&self, search: &str, start: usize, count: usize) -> Result<FeedPage, SourceError> {
        let params = page_params(search, start, count);
        let label = format!("arxiv {search} [{start}..{}]", start + count);
        retry_with_backoff(&label, || {
            self.wait_turn();
            let body = get_text(&self.config.base_url, &params)?;
            check_page(parse_feed(&body)?, start)
        })
    }
}

impl SourceAdapter for ArxivSource {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn search<'a>(&'a self, query: &SearchQuery) -> RecordStream<'a> {
        let search = search_query(query);
        log::debug!("arxiv: search_query={search}");
        let fetch = move |start, count| self.fetch_page(&search, start, count);
        Box::new(Pages::new(
            query.to_string(),
            query.max_results,
            self.config.page_size,
            fetch,
        ))
    }
}

/// Reject an empty page the feed says should have had entries.
fn check_page(page: FeedPage, start: usize) -> Result<FeedPage, SourceError> {
    match page.total_results {
        Some(total) if page.entries.is_empty() && total > start => Err(SourceError::Http {
            status: None,
            message: format!("empty page at offset {start} of {total} results"),
        }),
        _ => Ok(page),
    }
}

/// Lazy paginated result stream for one query.
///
/// `fetch(start, count)` returns one page; the stream ends after
/// `max_results` records, at the feed's reported total, or after the
/// first failed page.
struct Pages<F> {
    label: String,
    max_results: usize,
    page_size: usize,
    fetch: F,
    next_start: usize,
    buffered: VecDeque<Result<PaperRecord, PipelineError>>,
    done: bool,
}

impl<F> Pages<F>
where
    F: FnMut(usize, usize) -> Result<FeedPage, SourceError>,
{
    fn new(label: String, max_results: usize, page_size: usize, fetch: F) -> Self {
        Self {
            label,
            max_results,
            page_size: page_size.max(1),
            fetch,
            next_start: 0,
            buffered: VecDeque::new(),
            done: false,
        }
    }

    fn load_next_page(&mut self) -> Result<(), SourceError> {
        let start = self.next_start;
        let count = self.page_size.min(self.max_results - start);
        let page = check_page((self.fetch)(start, count)?, start)?;

        let received = page.entries.len().min(count);
        self.next_start += received;
        let exhausted = page.total_results.is_some_and(|total| self.next_start >= total);
        if received == 0 || exhausted || self.next_start >= self.max_results {
            self.done = true;
        }
        self.buffered.extend(
            page.entries
                .into_iter()
                .take(count)
                .map(|entry| entry.into_record()),
        );
        Ok(())
    }
}

impl<F> Iterator for Pages<F>
where
    F: FnMut(usize, usize) -> Result<FeedPage, SourceError>,
{
    type Item = Result<PaperRecord, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(item);
            }
            if self.done || self.next_start >= self.max_results {
                return None;
            }
            if let Err(source) = self.load_next_page() {
                self.done = true;
                return Some(Err(PipelineError::SourceUnavailable {
                    query: std::mem::take(&mut self.label),
                    source,
                }));
            }
        }
    }
}
