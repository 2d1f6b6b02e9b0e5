//! `paperwatch run` - refresh every configured topic

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;

use paperwatch_arxiv::ArxivSource;
use paperwatch_catalog::{CatalogStore, CleanupMode, RunOptions, RunSummary, refresh_catalog};
use paperwatch_core::{DateRange, ProgressContext};

use super::Status;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Start of an explicit refresh window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// End of an explicit refresh window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Rolling retention in days (overrides [retention] keep_days; 0 disables)
    #[arg(long)]
    pub keep_days: Option<u32>,

    /// Fetch and report, but do not write the catalog or the Markdown file
    #[arg(long)]
    pub dry_run: bool,

    /// Skip writing the Markdown file
    #[arg(long)]
    pub no_render: bool,
}

/// An explicit window wins over rolling retention.
fn cleanup_mode(window: Option<DateRange>, keep_days: u32, today: NaiveDate) -> CleanupMode {
    match window {
        Some(range) => CleanupMode::Window(range),
        None if keep_days > 0 => CleanupMode::Rolling { keep_days, today },
        None => CleanupMode::Disabled,
    }
}

fn status_of(summary: &RunSummary) -> Status {
    if summary.interrupted() {
        Status::Interrupted
    } else if summary.skipped() > 0 {
        Status::Partial
    } else {
        Status::Success
    }
}

pub fn run(args: RunArgs, config: &Config, progress: &ProgressContext) -> Result<Status> {
    // Configuration problems abort before anything is fetched.
    let topics = config.topics()?;
    let window = config.refresh_window(args.from.as_deref(), args.to.as_deref())?;

    let now = Utc::now();
    let keep_days = args.keep_days.unwrap_or(config.retention.keep_days);
    let options = RunOptions {
        run_time: now,
        max_results: config.max_results,
        mode: cleanup_mode(window, keep_days, now.date_naive()),
        prune_removed_topics: config.prune_removed_topics,
    };

    let store = CatalogStore::new(&config.data_dir);
    let mut catalog = store.load()?;
    log::info!(
        "catalog: {} entries across {} topics in {}",
        catalog.total_entries(),
        catalog.topic_count(),
        store.base_dir().display()
    );

    let source = ArxivSource::new(config.arxiv.clone());
    let summary = refresh_catalog(&mut catalog, &topics, &source, &options, progress);

    if progress.is_tty() {
        eprintln!("\n{}", summary.format_table());
    } else {
        summary.log();
    }

    if args.dry_run {
        log::info!("dry run: catalog and Markdown left untouched");
        return Ok(status_of(&summary));
    }

    store.save(&catalog)?;

    if !args.no_render {
        super::render::write_documents(&catalog, &config.render)
            .context("failed to render catalog")?;
    }

    Ok(status_of(&summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperwatch_catalog::{TopicOutcome, TopicReport, TopicStats};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn window_takes_precedence() {
        let w = DateRange::new(Some(d("2023-03-01")), Some(d("2023-03-31")));
        assert_eq!(cleanup_mode(Some(w), 30, d("2024-01-01")), CleanupMode::Window(w));
    }

    #[test]
    fn rolling_only_with_positive_days() {
        assert_eq!(
            cleanup_mode(None, 7, d("2024-01-08")),
            CleanupMode::Rolling {
                keep_days: 7,
                today: d("2024-01-08")
            }
        );
        assert_eq!(cleanup_mode(None, 0, d("2024-01-08")), CleanupMode::Disabled);
    }

    fn report(name: &str, outcome: TopicOutcome) -> TopicReport {
        TopicReport {
            name: name.into(),
            outcome,
        }
    }

    #[test]
    fn exit_status() {
        let mut summary = RunSummary {
            topics: vec![report("a", TopicOutcome::Processed(TopicStats::default()))],
            ..Default::default()
        };
        assert_eq!(status_of(&summary), Status::Success);

        summary.topics.push(report("b", TopicOutcome::Skipped("down".into())));
        assert_eq!(status_of(&summary), Status::Partial);

        summary.topics.push(report("c", TopicOutcome::NotStarted));
        assert_eq!(status_of(&summary), Status::Interrupted);
    }
}
