// File exports and console table previews.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Resolve an export path inside the output directory, creating it on demand.
pub fn export_path(out_dir: &str, file: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {out_dir}"))?;
    Ok(Path::new(out_dir).join(file))
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// CSV export for generic string rows (the detail table has no fixed schema).
pub fn write_csv_rows(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Print the first `max_rows` rows as a markdown table.
pub fn preview_table<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Preview for schemaless rows (header row + string cells).
pub fn preview_rows(headers: &[String], rows: &[Vec<String>], max_rows: usize) {
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows.iter().take(max_rows) {
        builder.push_record(row);
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
