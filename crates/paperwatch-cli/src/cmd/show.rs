//! `paperwatch show` - inspect the stored catalog

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use paperwatch_catalog::{Catalog, CatalogStore};
use paperwatch_core::{CatalogEntry, fmt_num};

use super::Status;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Topic to list entries for (default: overview of all topics)
    pub topic: Option<String>,
}

pub fn run(args: ShowArgs, config: &Config) -> Result<Status> {
    let catalog = CatalogStore::new(&config.data_dir).load()?;

    if catalog.is_empty() {
        eprintln!("Catalog is empty.");
        return Ok(Status::Success);
    }

    match args.topic {
        Some(topic) => show_topic(&catalog, &topic)?,
        None => show_overview(&catalog),
    }
    Ok(Status::Success)
}

fn date_cell(date: Option<chrono::NaiveDate>) -> Cell {
    date.map_or_else(|| Cell::new("-").fg(Color::DarkGrey), Cell::new)
}

fn show_overview(catalog: &Catalog) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Topic").fg(Color::Cyan),
            Cell::new("Entries").fg(Color::Cyan),
            Cell::new("Newest").fg(Color::Cyan),
            Cell::new("Oldest").fg(Color::Cyan),
            Cell::new("Last update").fg(Color::Cyan),
        ]);

    for (name, entries) in catalog.topics() {
        // Entries are newest-first with undated ones at the end.
        let newest = entries.first().and_then(CatalogEntry::published);
        let oldest = entries.iter().rev().find_map(CatalogEntry::published);
        let last_update = entries.iter().map(|e| e.last_updated).max();
        table.add_row(vec![
            Cell::new(name),
            Cell::new(fmt_num(entries.len())),
            date_cell(newest),
            date_cell(oldest),
            Cell::new(last_update.map_or_else(
                || "-".to_string(),
                |t| t.format("%Y-%m-%d %H:%M").to_string(),
            )),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!(
        "{} entries across {} topics",
        fmt_num(catalog.total_entries()),
        catalog.topic_count()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn show_topic(catalog: &Catalog, topic: &str) -> Result<()> {
    if !catalog.contains_topic(topic) {
        let known: Vec<_> = catalog.topic_names().collect();
        bail!("unknown topic '{topic}' (known: {})", known.join(", "));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Published").fg(Color::Cyan),
            Cell::new("Id").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("First seen").fg(Color::Cyan),
            Cell::new("Updated").fg(Color::Cyan),
        ]);

    let entries = catalog.entries(topic);
    for entry in entries {
        table.add_row(vec![
            date_cell(entry.published()),
            Cell::new(entry.id()),
            Cell::new(truncate(&entry.record.title, 60)),
            Cell::new(entry.first_seen.format("%Y-%m-%d")),
            Cell::new(entry.last_updated.format("%Y-%m-%d")),
        ]);
    }

    eprintln!("\n{table}");
    eprintln!("{}: {} entries", topic, fmt_num(entries.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_long_titles() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
