//! Run statistics and end-of-run reporting.
//!
//! Hierarchy:
//! - Topic-level: `TopicStats` (counts for one processed topic)
//! - Run-level: `RunSummary` (one `TopicReport` per configured topic)

use std::time::Duration;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use paperwatch_core::fmt_num;

/// Counts collected while processing one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicStats {
    /// Records yielded by the source across all of the topic's queries
    pub fetched: usize,
    /// Records dropped because the source could not normalize them
    pub malformed: usize,
    /// Records passing the keyword and date filters
    pub matched: usize,
    /// Matched records left after deduplication
    pub distinct: usize,
    pub added: usize,
    pub updated: usize,
    /// Entries dropped by retention cleanup
    pub removed: usize,
    /// Entry count after the run
    pub total: usize,
}

impl TopicStats {
    fn accumulate(&mut self, other: &Self) {
        self.fetched += other.fetched;
        self.malformed += other.malformed;
        self.matched += other.matched;
        self.distinct += other.distinct;
        self.added += other.added;
        self.updated += other.updated;
        self.removed += other.removed;
        self.total += other.total;
    }
}

/// What happened to one topic during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOutcome {
    Processed(TopicStats),
    /// Source failed; the topic's previous entries were left as they were.
    Skipped(String),
    /// Topic range does not overlap the refresh window.
    OutsideWindow,
    /// Shutdown was requested before the topic started.
    NotStarted,
}

impl TopicOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Processed(_) => "ok",
            Self::Skipped(_) => "skipped",
            Self::OutsideWindow => "outside window",
            Self::NotStarted => "not started",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicReport {
    pub name: String,
    pub outcome: TopicOutcome,
}

impl TopicReport {
    pub fn stats(&self) -> Option<&TopicStats> {
        match &self.outcome {
            TopicOutcome::Processed(s) => Some(s),
            _ => None,
        }
    }

    /// Log topic completion (non-TTY mode only).
    pub fn log(&self) {
        match &self.outcome {
            TopicOutcome::Processed(s) => log::info!(
                "{}: fetched {} ({} malformed), matched {}, +{} ~{} -{} → {} entries",
                self.name,
                fmt_num(s.fetched),
                s.malformed,
                fmt_num(s.matched),
                s.added,
                s.updated,
                s.removed,
                fmt_num(s.total)
            ),
            TopicOutcome::Skipped(reason) => log::error!("{}: skipped: {reason}", self.name),
            other => log::info!("{}: {}", self.name, other.label()),
        }
    }
}

/// Summary of a whole refresh run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub topics: Vec<TopicReport>,
    /// Topics dropped from the catalog because they left the configuration,
    /// with their entry counts.
    pub removed_topics: Vec<(String, usize)>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.topics.iter().filter(|t| t.stats().is_some()).count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TopicOutcome::Skipped(_)))
    }

    /// Whether shutdown cut the run short.
    pub fn interrupted(&self) -> bool {
        self.count(|o| matches!(o, TopicOutcome::NotStarted)) > 0
    }

    fn count(&self, pred: impl Fn(&TopicOutcome) -> bool) -> usize {
        self.topics.iter().filter(|t| pred(&t.outcome)).count()
    }

    pub fn totals(&self) -> TopicStats {
        let mut totals = TopicStats::default();
        for s in self.topics.iter().filter_map(TopicReport::stats) {
            totals.accumulate(s);
        }
        totals
    }

    /// Format summary table as a string.
    pub fn format_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Topic")
                    .fg(Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Status").fg(Color::Cyan),
                Cell::new("Fetched").fg(Color::Cyan),
                Cell::new("Matched").fg(Color::Cyan),
                Cell::new("Added").fg(Color::Cyan),
                Cell::new("Updated").fg(Color::Cyan),
                Cell::new("Removed").fg(Color::Cyan),
                Cell::new("Total").fg(Color::Cyan),
            ]);

        for report in &self.topics {
            let status = match &report.outcome {
                TopicOutcome::Processed(_) => Cell::new("ok").fg(Color::Green),
                TopicOutcome::Skipped(_) => Cell::new("skipped").fg(Color::Red),
                other => Cell::new(other.label()).fg(Color::Yellow),
            };
            let mut row = vec![Cell::new(&report.name), status];
            match report.stats() {
                Some(s) => row.extend([
                    Cell::new(fmt_num(s.fetched)),
                    Cell::new(fmt_num(s.matched)),
                    Cell::new(fmt_num(s.added)),
                    Cell::new(fmt_num(s.updated)),
                    Cell::new(fmt_num(s.removed)),
                    Cell::new(fmt_num(s.total)),
                ]),
                None => row.extend((0..6).map(|_| Cell::new("-"))),
            }
            table.add_row(row);
        }

        let totals = self.totals();
        table.add_row(vec![
            Cell::new("Total").add_attribute(comfy_table::Attribute::Bold),
            Cell::new(format!("{}/{}", self.processed(), self.topics.len())),
            Cell::new(fmt_num(totals.fetched)),
            Cell::new(fmt_num(totals.matched)),
            Cell::new(fmt_num(totals.added)).fg(Color::Green),
            Cell::new(fmt_num(totals.updated)),
            Cell::new(fmt_num(totals.removed)),
            Cell::new(fmt_num(totals.total)),
        ]);

        let mut out = table.to_string();
        for (name, n) in &self.removed_topics {
            out.push_str(&format!("\nremoved topic '{name}' ({} entries)", fmt_num(*n)));
        }
        for report in &self.topics {
            if let TopicOutcome::Skipped(reason) = &report.outcome {
                out.push_str(&format!("\n{}: {reason}", report.name));
            }
        }
        out.push_str(&format!("\nElapsed: {:.1}s", self.elapsed.as_secs_f64()));
        out
    }

    /// Log the run totals (non-TTY mode; topic lines are logged as topics finish).
    pub fn log(&self) {
        for (name, n) in &self.removed_topics {
            log::info!("removed topic '{name}' ({} entries)", fmt_num(*n));
        }
        let totals = self.totals();
        log::info!(
            "run complete: {}/{} topics, +{} ~{} -{} [{:.1}s]",
            self.processed(),
            self.topics.len(),
            totals.added,
            totals.updated,
            totals.removed,
            self.elapsed.as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        RunSummary {
            topics: vec![
                TopicReport {
                    name: "agents".into(),
                    outcome: TopicOutcome::Processed(TopicStats {
                        fetched: 10,
                        matched: 6,
                        distinct: 5,
                        added: 3,
                        updated: 2,
                        total: 5,
                        ..Default::default()
                    }),
                },
                TopicReport {
                    name: "slam".into(),
                    outcome: TopicOutcome::Skipped("source unavailable".into()),
                },
                TopicReport {
                    name: "nerf".into(),
                    outcome: TopicOutcome::NotStarted,
                },
            ],
            removed_topics: vec![("old".into(), 4)],
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn counts() {
        let s = summary();
        assert_eq!(s.processed(), 1);
        assert_eq!(s.skipped(), 1);
        assert!(s.interrupted());
        assert_eq!(s.totals().added, 3);
    }

    #[test]
    fn table_mentions_every_topic() {
        let table = summary().format_table();
        for name in ["agents", "slam", "nerf", "removed topic 'old'", "source unavailable"] {
            assert!(table.contains(name), "missing {name}");
        }
    }

    #[test]
    fn empty_summary_is_not_interrupted() {
        assert!(!RunSummary::default().interrupted());
    }
}
