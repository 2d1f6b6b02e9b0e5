//! `paperwatch verify` - integrity check of the stored catalog

use anyhow::Result;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use paperwatch_catalog::CatalogStore;
use paperwatch_core::fmt_num;

use super::Status;
use crate::config::Config;

pub fn run(config: &Config) -> Result<Status> {
    let store = CatalogStore::new(&config.data_dir);
    if !store.catalog_path().exists() {
        eprintln!("No catalog at {}.", store.catalog_path().display());
        return Ok(Status::Success);
    }
    let report = store.verify()?;

    let hash_cell = match report.hash_matches {
        Some(true) => Cell::new("OK").fg(Color::Green),
        Some(false) => Cell::new("MISMATCH").fg(Color::Red),
        None => Cell::new("no manifest").fg(Color::Yellow),
    };
    let invariants_cell = if report.problems.is_empty() {
        Cell::new("OK").fg(Color::Green)
    } else {
        Cell::new(format!("{} problems", report.problems.len())).fg(Color::Red)
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Check").fg(Color::Cyan),
            Cell::new("Result").fg(Color::Cyan),
        ]);
    table.add_row(vec![Cell::new("Topics"), Cell::new(report.topics)]);
    table.add_row(vec![Cell::new("Entries"), Cell::new(fmt_num(report.entries))]);
    table.add_row(vec![Cell::new("Content hash"), hash_cell]);
    table.add_row(vec![Cell::new("Invariants"), invariants_cell]);

    eprintln!("\n{table}");
    for problem in &report.problems {
        eprintln!("  {problem}");
    }

    if report.is_ok() {
        eprintln!("Catalog verified OK.");
        Ok(Status::Success)
    } else {
        eprintln!("Catalog has integrity issues!");
        Ok(Status::Partial)
    }
}
