use super::{collect_cells, ensure_rows, numeric, put, AnalysisError, Report, Result};
use crate::data::stats::mean;
use crate::data::{CellValue, Table};
use crate::physics;
use crate::physics::kepler::{self, OrbitSimulation, OrbitalElements};

pub const PERIOD_YEARS: &str = "Periodo_Anios";
pub const MEAN_SPEED: &str = "Velocidad_Media_km_s";

/// Columns of a JPL Horizons elements table, in [`OrbitalElements`] order.
pub const ELEMENT_COLUMNS: [&str; 6] = ["a", "e", "incl", "Omega", "w", "M"];

/// Heliocentric period and mean speed from the semi-major axis `a` (AU)
/// of NEO tables. Exoplanet tables (`pl_orbper`) get a header-only report.
pub fn apply_orbital(table: &mut Table) -> Result<Report> {
    ensure_rows(table)?;
    if table.has_column("a") {
        let a = numeric(table, "a")?;
        let (period, skipped) = collect_cells(
            PERIOD_YEARS,
            a.iter().map(|a| a.map(physics::heliocentric_period_years)),
        );
        let (speed, _) = collect_cells(
            MEAN_SPEED,
            a.iter().map(|a| a.map(physics::heliocentric_speed_km_s)),
        );

        let mut report = Report::new("Orbital report (NEO)");
        put(table, &mut report, PERIOD_YEARS, period)?;
        put(table, &mut report, MEAN_SPEED, speed)?;
        report.skipped = skipped;
        if let Some(v) = table.column(MEAN_SPEED).and_then(mean) {
            report.line(format!("mean velocity: {v:.2} km/s"));
        }
        Ok(report)
    } else if table.has_column("pl_orbper") {
        let mut report = Report::new("Exoplanet orbits");
        report.line(format!("{} orbital periods available", table.len()));
        Ok(report)
    } else {
        Err(AnalysisError::NoApplicableColumns(vec![
            "a".into(),
            "pl_orbper".into(),
        ]))
    }
}

/// Read orbital elements from one row. `n` (deg/day) is optional.
pub fn elements_at(table: &Table, row: usize) -> Result<OrbitalElements> {
    let mut values = [0.0; 6];
    for (slot, name) in values.iter_mut().zip(ELEMENT_COLUMNS) {
        *slot = numeric(table, name)?
            .get(row)
            .copied()
            .flatten()
            .ok_or_else(|| AnalysisError::NonNumeric(name.to_string()))?;
    }
    let mean_motion = if table.has_column("n") {
        numeric(table, "n")?.get(row).copied().flatten()
    } else {
        None
    };
    let [a, e, incl, omega_node, arg_perihelion, mean_anomaly] = values;
    Ok(OrbitalElements {
        a,
        e,
        incl,
        omega_node,
        arg_perihelion,
        mean_anomaly,
        mean_motion,
    })
}

/// Simulate the object in the first row `days` into the future.
pub fn simulate_first_row(table: &Table, days: f64) -> Result<OrbitSimulation> {
    ensure_rows(table)?;
    let elements = elements_at(table, 0)?;
    let object = match table.cell(0, "targetname") {
        Some(CellValue::Null) | None => "Unknown object".to_string(),
        Some(name) => name.to_string(),
    };
    Ok(kepler::simulate(&elements, days, object)?)
}
