//! Row-wise application of the physics formulas over a [`Table`].
//!
//! Every applier validates its input columns, appends (or replaces) its
//! derived columns in place and returns a [`Report`]. A row whose inputs are
//! null, or which hits a formula's guarded edge case, gets a null cell and is
//! counted in [`Report::skipped`].

pub mod batch;
pub mod cosmology;
pub mod exoplanets;
pub mod orbital;

use std::fmt;

use log::{debug, info};
use thiserror::Error;

use crate::data::{CellValue, Column, Table, TableError};
use crate::physics::PhysicsError;

pub use batch::{analyze, apply_hubble, apply_hubble_distance, apply_redshift};
pub use cosmology::{apply_cosmology, apply_photometry, cartesian_coordinates};
pub use exoplanets::apply_exoplanets;
pub use orbital::{apply_orbital, simulate_first_row};

/// Default input column names of the galaxy sample.
pub mod columns {
    pub const GALAXY: &str = "galaxia";
    pub const VELOCITY: &str = "velocidad";
    pub const DISTANCE: &str = "distancia";
    pub const OBSERVED: &str = "longitud_obs";
    pub const EMITTED: &str = "longitud_emit";
    pub const Z: &str = "z";

    pub const H0_OUT: &str = "H0_calculado";
    pub const REDSHIFT_OUT: &str = "redshift_calculado";
    pub const DISTANCE_OUT: &str = "distancia_Mpc_calculada";
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("table has no rows")]
    EmptyTable,
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("column '{0}' is not numeric")]
    NonNumeric(String),
    #[error("none of the expected columns are present: {}", .0.join(", "))]
    NoApplicableColumns(Vec<String>),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// What an applier did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub title: String,
    pub lines: Vec<String>,
    /// Names of columns added or replaced.
    pub derived: Vec<String>,
    /// Rows that produced a null derived cell.
    pub skipped: usize,
}

impl Report {
    pub fn new(title: impl Into<String>) -> Self {
        Report {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: Report) {
        self.lines.push(format!("[{}]", other.title));
        self.lines.extend(other.lines);
        self.derived.extend(other.derived);
        self.skipped += other.skipped;
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        if !self.derived.is_empty() {
            writeln!(f, "  derived columns: {}", self.derived.join(", "))?;
        }
        if self.skipped > 0 {
            writeln!(f, "  rows skipped: {}", self.skipped)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Operation – one applier selected by name
// ---------------------------------------------------------------------------

/// An applier with its column arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Hubble { velocity: String, distance: String },
    Redshift { observed: String, emitted: String },
    HubbleDistance { redshift: String },
    Analyze,
    Cosmology,
    Orbital,
    Exoplanets,
    Photometry,
    Cartesian,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Hubble { .. } => "hubble",
            Operation::Redshift { .. } => "redshift",
            Operation::HubbleDistance { .. } => "distance",
            Operation::Analyze => "analyze",
            Operation::Cosmology => "cosmology",
            Operation::Orbital => "orbital",
            Operation::Exoplanets => "exoplanets",
            Operation::Photometry => "photometry",
            Operation::Cartesian => "cartesian",
        }
    }

    /// Run against `table` with Hubble constant `h0` (km/s/Mpc).
    pub fn run(&self, table: &mut Table, h0: f64) -> Result<Report> {
        let report = match self {
            Operation::Hubble { velocity, distance } => apply_hubble(table, velocity, distance)?,
            Operation::Redshift { observed, emitted } => apply_redshift(table, observed, emitted)?,
            Operation::HubbleDistance { redshift } => apply_hubble_distance(table, redshift, h0)?,
            Operation::Analyze => analyze(table, h0)?,
            Operation::Cosmology => apply_cosmology(table, h0)?,
            Operation::Orbital => apply_orbital(table)?,
            Operation::Exoplanets => apply_exoplanets(table)?,
            Operation::Photometry => apply_photometry(table)?,
            Operation::Cartesian => cartesian_coordinates(table, h0)?,
        };
        info!(
            "{}: derived [{}], {} rows skipped",
            report.title,
            report.derived.join(", "),
            report.skipped
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) fn ensure_rows(table: &Table) -> Result<()> {
    if table.is_empty() {
        Err(AnalysisError::EmptyTable)
    } else {
        Ok(())
    }
}

/// Numeric view of a named column, rejecting missing and non-numeric ones.
pub(crate) fn numeric(table: &Table, name: &str) -> Result<Vec<Option<f64>>> {
    let col = table
        .column(name)
        .ok_or_else(|| AnalysisError::MissingColumn(name.to_string()))?;
    if !col.is_numeric() {
        return Err(AnalysisError::NonNumeric(name.to_string()));
    }
    Ok(col.f64_values())
}

/// Numeric view of the first present column among `candidates`.
pub(crate) fn first_numeric(table: &Table, candidates: &[&str]) -> Result<Option<Vec<Option<f64>>>> {
    candidates
        .iter()
        .find(|name| table.has_column(name))
        .map(|name| numeric(table, name))
        .transpose()
}

/// Cells from fallible per-row results; failures become null and are counted.
pub(crate) fn collect_cells<I>(name: &str, results: I) -> (Vec<CellValue>, usize)
where
    I: IntoIterator<Item = Option<std::result::Result<f64, PhysicsError>>>,
{
    let mut skipped = 0;
    let cells = results
        .into_iter()
        .enumerate()
        .map(|(row, r)| match r {
            Some(Ok(v)) if v.is_finite() => CellValue::Float(v),
            Some(Err(e)) => {
                debug!("{name}: row {row} skipped: {e}");
                skipped += 1;
                CellValue::Null
            }
            _ => {
                skipped += 1;
                CellValue::Null
            }
        })
        .collect();
    (cells, skipped)
}

/// Insert a derived float column and record it in the report.
pub(crate) fn put(table: &mut Table, report: &mut Report, name: &str, cells: Vec<CellValue>) -> Result<()> {
    table.set_column(Column::derived(name, cells))?;
    report.derived.push(name.to_string());
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::data::{Column, Table};

    /// Build a table from `(name, cells)` pairs of CSV text.
    pub fn table(cols: &[(&str, &[&str])]) -> Table {
        Table::from_columns(
            cols.iter()
                .map(|(name, cells)| {
                    Column::from_text(*name, cells.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        )
        .unwrap()
    }

    pub fn floats(t: &Table, col: &str) -> Vec<Option<f64>> {
        t.column(col).unwrap().f64_values()
    }
}
