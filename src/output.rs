//! Output formatting and persistence for dashboard views.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use tracing::{debug, info};

use crate::category::Category;
use crate::dashboard::{ActivityRow, DashboardView};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a view using Rust's debug pretty-print format.
pub fn print_pretty(view: &DashboardView) {
    debug!("{:#?}", view);
}

/// Logs a view as pretty-printed JSON.
pub fn print_json(view: &DashboardView) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

/// Logs the headline numbers of a view as structured fields.
pub fn log_summary(view: &DashboardView) {
    let most_common = view
        .most_common
        .map(|m| format!("{} ({})", m.category, m.count))
        .unwrap_or_default();

    info!(
        total_items = view.total_items,
        metal = count_of(view, Category::Metal),
        wet = count_of(view, Category::Wet),
        dry = count_of(view, Category::Dry),
        most_common = %most_common,
        page = view.current_page,
        total_pages = view.total_pages,
        last_updated = %view.last_updated,
        "Dashboard updated"
    );
}

fn count_of(view: &DashboardView, category: Category) -> usize {
    view.counts
        .iter()
        .find(|c| c.category == category)
        .map_or(0, |c| c.count)
}

/// Appends activity rows to a CSV file.
///
/// Creates the file with headers if it does not already exist. Nothing is
/// written, and no file is created, when `rows` is empty.
pub fn append_rows(path: &str, rows: &[ActivityRow]) -> Result<()> {
    if rows.is_empty() {
        debug!(path, "No rows to append");
        return Ok(());
    }

    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
