use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info};

use crate::analysis::{Operation, Report};
use crate::config::Config;
use crate::data::filter::{apply_filters, RangeFilter};
use crate::data::stats::{describe, ColumnSummary};
use crate::data::{loader, writer, Table};
use crate::display;

// ---------------------------------------------------------------------------
// Session state: load → apply → display
// ---------------------------------------------------------------------------

/// The working state of one analysis run, independent of rendering.
pub struct Session {
    config: Config,

    /// Loaded table (None until a file is loaded).
    table: Option<Table>,

    /// Label of the table's origin, used to name exports.
    source: Option<String>,

    /// Report of the most recent successful operation.
    last_report: Option<Report>,

    /// Status / error message of the most recent step.
    pub status_message: Option<String>,
}

/// Overview of the loaded table.
#[derive(Debug, Clone)]
pub struct Summary {
    pub source: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub head: Table,
    pub describe: Vec<ColumnSummary>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table: None,
            source: None,
            last_report: None,
            status_message: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn last_report(&self) -> Option<&Report> {
        self.last_report.as_ref()
    }

    /// Load a file. On failure the previous table stays in place.
    pub fn load(&mut self, path: &Path) -> Result<&Table> {
        match loader::load_file(path) {
            Ok(table) => {
                let source = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("tabla")
                    .to_string();
                self.set_table(table, source);
                self.table.as_ref().context("table just loaded")
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Ingest an in-memory table.
    pub fn set_table(&mut self, table: Table, source: impl Into<String>) {
        let source = source.into();
        self.status_message = Some(format!(
            "{}: {} rows, {} columns",
            source,
            table.len(),
            table.num_columns()
        ));
        self.table = Some(table);
        self.source = Some(source);
        self.last_report = None;
    }

    /// Run an operation. The table is only replaced when the operation
    /// succeeds as a whole.
    pub fn apply(&mut self, op: &Operation) -> Result<&Report> {
        let Some(current) = &self.table else {
            return Err(self.fail(anyhow::anyhow!("no data loaded")));
        };
        let mut working = current.clone();
        match op.run(&mut working, self.config.hubble_constant) {
            Ok(report) => {
                self.status_message = Some(report.title.clone());
                self.table = Some(working);
                Ok(&*self.last_report.insert(report))
            }
            Err(e) => Err(self.fail(anyhow::Error::new(e).context(format!("applying {}", op.name())))),
        }
    }

    /// Keep only rows passing `filters`; returns the remaining row count.
    pub fn filter(&mut self, filters: &[RangeFilter]) -> Result<usize> {
        let Some(current) = &self.table else {
            return Err(self.fail(anyhow::anyhow!("no data loaded")));
        };
        let total = current.len();
        match apply_filters(current, filters) {
            Ok(filtered) => {
                info!("Filter kept {} of {} rows", filtered.len(), total);
                let rows = filtered.len();
                self.table = Some(filtered);
                Ok(rows)
            }
            Err(e) => Err(self.fail(anyhow::Error::new(e).context("filtering rows"))),
        }
    }

    pub fn summary(&self) -> Option<Summary> {
        let table = self.table.as_ref()?;
        Some(Summary {
            source: self.source.clone().unwrap_or_default(),
            rows: table.len(),
            columns: table.column_names().iter().map(|s| s.to_string()).collect(),
            head: table.head(self.config.head_rows),
            describe: describe(table),
        })
    }

    /// Text block with source, columns, first rows and statistics.
    pub fn render_summary(&self) -> Result<String> {
        let summary = self.summary().context("no data loaded")?;
        let mut out = format!(
            "Source: {}\nRows: {}\nColumns ({}): {}\n\n",
            summary.source,
            summary.rows,
            summary.columns.len(),
            summary.columns.join(", ")
        );
        out.push_str(&display::render_table(&summary.head, self.config.head_rows)?);
        out.push_str("\n\n");
        out.push_str(&display::render_describe(&summary.describe)?);
        Ok(out)
    }

    /// Write the current table to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let table = self.table.as_ref().context("no data loaded")?;
        writer::save_csv(table, path)
    }

    /// Write the current table to the export directory with a timestamped name.
    pub fn export(&self) -> Result<PathBuf> {
        let table = self.table.as_ref().context("no data loaded")?;
        let source = self.source.as_deref().unwrap_or("tabla");
        writer::export_timestamped(table, &self.config.export_dir, source)
    }

    fn fail(&mut self, e: anyhow::Error) -> anyhow::Error {
        error!("{e:#}");
        self.status_message = Some(format!("{e:#}"));
        e
    }
}
