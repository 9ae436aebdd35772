use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use super::model::Table;

/// Write the table as CSV with a header row.
pub fn write_csv<W: Write>(table: &Table, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;
    for row in 0..table.len() {
        let record: Vec<String> = table.columns().iter().map(|c| c.text(row)).collect();
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Write the table to `path`, creating parent directories.
pub fn save_csv(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, file)?;
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Save under `dir` as `{source}_{YYYY-mm-dd_HH-MM-SS}.csv` and return the path.
pub fn export_timestamped(table: &Table, dir: &Path, source: &str) -> Result<PathBuf> {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = dir.join(format!("{}_{stamp}.csv", sanitize(source)));
    save_csv(table, &path)?;
    Ok(path)
}

fn sanitize(source: &str) -> String {
    let cleaned: String = source
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "tabla".to_string()
    } else {
        cleaned
    }
}
