//! Per-run driver: fetch → filter → dedup → merge → cleanup for every topic
//!
//! Topics are processed one after another. Each topic's new entry sequence
//! is computed completely before it replaces the old one in the catalog, so
//! a failing or interrupted topic never leaves partial state behind.

use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use paperwatch_core::{
    DateRange, PaperRecord, PipelineError, ProgressContext, SearchQuery, SourceAdapter, Topic,
    fmt_num, is_shutdown_requested,
};
use rustc_hash::FxHashSet;

use crate::catalog::Catalog;
use crate::dedup::dedup_records;
use crate::filter::RecordFilter;
use crate::merge::merge_records;
use crate::retention::{RetentionPolicy, clean_entries};
use crate::summary::{RunSummary, TopicOutcome, TopicReport, TopicStats};

/// Retention mode for one run. The two cleanup modes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    /// Merge only, never remove.
    Disabled,
    /// Drop entries published more than `keep_days` before `today`.
    Rolling { keep_days: u32, today: NaiveDate },
    /// Re-fetch an explicit window and replace what the catalog holds inside it.
    Window(DateRange),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Timestamp stamped on added and refreshed entries.
    pub run_time: DateTime<Utc>,
    /// Per-query cap passed to the source.
    pub max_results: usize,
    pub mode: CleanupMode,
    /// Drop catalog topics that are no longer configured.
    pub prune_removed_topics: bool,
}

/// Refresh `catalog` for every topic in `topics`.
///
/// Per-topic source failures are recorded in the summary and leave that
/// topic's entries untouched. A shutdown request stops the run between
/// topics; topics finished so far stay applied.
pub fn refresh_catalog(
    catalog: &mut Catalog,
    topics: &[Topic],
    source: &dyn SourceAdapter,
    options: &RunOptions,
    progress: &ProgressContext,
) -> RunSummary {
    let started = Instant::now();
    let mut summary = RunSummary::default();

    log::info!(
        "refreshing {} topics from {} ({})",
        topics.len(),
        source.name(),
        describe_mode(&options.mode)
    );

    for topic in topics {
        if is_shutdown_requested() {
            summary.topics.push(TopicReport {
                name: topic.name.clone(),
                outcome: TopicOutcome::NotStarted,
            });
            continue;
        }

        let outcome = process_topic(catalog, topic, source, options, progress);
        let report = TopicReport {
            name: topic.name.clone(),
            outcome,
        };
        if !progress.is_tty() || matches!(report.outcome, TopicOutcome::Skipped(_)) {
            report.log();
        }
        summary.topics.push(report);
    }

    if summary.interrupted() {
        log::warn!("shutdown requested, remaining topics were not started");
    }

    if options.prune_removed_topics {
        summary.removed_topics = catalog.retain_topics(topics.iter().map(|t| t.name.as_str()));
    }

    summary.elapsed = started.elapsed();
    summary
}

fn describe_mode(mode: &CleanupMode) -> String {
    match mode {
        CleanupMode::Disabled => "no retention".to_string(),
        CleanupMode::Rolling { keep_days, .. } => format!("keeping {keep_days} days"),
        CleanupMode::Window(range) => format!("refresh window {range}"),
    }
}

/// Range the topic is fetched and filtered with, `None` when the topic lies
/// entirely outside the refresh window.
fn effective_range(topic: &Topic, mode: &CleanupMode) -> Option<Option<DateRange>> {
    match (mode, topic.date_range) {
        (CleanupMode::Window(window), Some(range)) => range.intersect(window).map(Some),
        (CleanupMode::Window(window), None) => Some(Some(*window)),
        (_, range) => Some(range),
    }
}

fn process_topic(
    catalog: &mut Catalog,
    topic: &Topic,
    source: &dyn SourceAdapter,
    options: &RunOptions,
    progress: &ProgressContext,
) -> TopicOutcome {
    let Some(range) = effective_range(topic, &options.mode) else {
        log::debug!("{}: range does not overlap the refresh window", topic.name);
        return TopicOutcome::OutsideWindow;
    };

    let pb = progress.topic_line(&topic.name);
    let mut stats = TopicStats::default();

    let fetched = match fetch_topic(topic, range, source, options.max_results, &mut stats, &pb) {
        Ok(records) => records,
        Err(e) => {
            pb.finish_and_clear();
            return TopicOutcome::Skipped(e.to_string());
        }
    };

    pb.set_message("merging");
    let matched = RecordFilter::new(&topic.filters, range).apply(fetched);
    stats.matched = matched.len();
    let distinct = dedup_records(matched);
    stats.distinct = distinct.len();

    let fetched_ids: FxHashSet<String> = distinct.iter().map(|r| r.id.clone()).collect();

    let merged = merge_records(catalog.take_entries(&topic.name), distinct, options.run_time);
    stats.added = merged.added;
    stats.updated = merged.updated;
    let mut entries = merged.entries;

    let policy = match (&options.mode, range) {
        (CleanupMode::Disabled, _) => None,
        (CleanupMode::Rolling { keep_days, today }, _) => Some(RetentionPolicy::Rolling {
            keep_days: *keep_days,
            today: *today,
        }),
        (CleanupMode::Window(_), Some(range)) => Some(RetentionPolicy::Window {
            range,
            fetched: &fetched_ids,
        }),
        (CleanupMode::Window(_), None) => None,
    };
    if let Some(policy) = policy {
        stats.removed = clean_entries(&mut entries, &policy);
    }

    stats.total = entries.len();
    catalog.set_entries(&topic.name, entries);
    pb.finish_and_clear();
    TopicOutcome::Processed(stats)
}

/// Run one query per keyword filter and collect everything the source yields.
///
/// Malformed records are counted and skipped. Any other error aborts the
/// topic and discards what was collected.
fn fetch_topic(
    topic: &Topic,
    range: Option<DateRange>,
    source: &dyn SourceAdapter,
    max_results: usize,
    stats: &mut TopicStats,
    pb: &indicatif::ProgressBar,
) -> Result<Vec<PaperRecord>, PipelineError> {
    let mut records = Vec::new();
    for filter in &topic.filters {
        let query = SearchQuery {
            pattern: filter.pattern().to_string(),
            date_range: range,
            max_results,
        };
        pb.set_message(format!("{query}"));
        log::debug!("{}: querying {} for {query}", topic.name, source.name());

        for item in source.search(&query) {
            let item = item.and_then(|record| match record.validate() {
                Ok(()) => Ok(record),
                Err(reason) => Err(PipelineError::malformed(Some(&record.id), reason)),
            });
            match item {
                Ok(record) => {
                    records.push(record);
                    stats.fetched += 1;
                    if stats.fetched % 50 == 0 {
                        pb.set_message(format!("{query}: {} records", fmt_num(stats.fetched)));
                    }
                }
                Err(e @ PipelineError::RecordMalformed { .. }) => {
                    log::warn!("{}: dropping {e}", topic.name);
                    stats.malformed += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn topic(range: Option<DateRange>) -> Topic {
        Topic {
            name: "t".into(),
            filters: vec![paperwatch_core::KeywordFilter::substring("x")],
            date_range: range,
        }
    }

    #[test]
    fn effective_range_outside_window_mode_is_topic_range() {
        let r = DateRange::new(Some(d("2024-01-01")), None);
        assert_eq!(effective_range(&topic(Some(r)), &CleanupMode::Disabled), Some(Some(r)));
        assert_eq!(effective_range(&topic(None), &CleanupMode::Disabled), Some(None));
    }

    #[test]
    fn effective_range_intersects_window() {
        let window = DateRange::new(Some(d("2023-03-01")), Some(d("2023-03-31")));
        let mode = CleanupMode::Window(window);
        assert_eq!(effective_range(&topic(None), &mode), Some(Some(window)));

        let from_mid_march = DateRange::new(Some(d("2023-03-15")), None);
        assert_eq!(
            effective_range(&topic(Some(from_mid_march)), &mode),
            Some(Some(DateRange::new(Some(d("2023-03-15")), Some(d("2023-03-31")))))
        );

        let later = DateRange::new(Some(d("2024-01-01")), None);
        assert_eq!(effective_range(&topic(Some(later)), &mode), None);
    }
}
