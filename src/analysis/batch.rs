use log::warn;

use super::columns::{
    DISTANCE, DISTANCE_OUT, EMITTED, H0_OUT, OBSERVED, REDSHIFT_OUT, VELOCITY, Z,
};
use super::{collect_cells, ensure_rows, numeric, put, AnalysisError, Report, Result};
use crate::data::stats::summarize;
use crate::data::Table;
use crate::physics;

fn zip_rows<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Vec<Option<physics::Result<f64>>>
where
    F: Fn(f64, f64) -> physics::Result<f64>,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)),
            _ => None,
        })
        .collect()
}

fn summary_line(table: &Table, column: &str, unit: &str) -> Option<String> {
    let s = summarize(table.column(column)?)?;
    let unit = if unit.is_empty() {
        String::new()
    } else {
        format!(" {unit}")
    };
    Some(format!(
        "{column}: mean {:.4}{unit}, std {:.4}, min {:.4}, max {:.4} (n={})",
        s.mean, s.std, s.min, s.max, s.count
    ))
}

fn warn_skipped(what: &str, skipped: usize) {
    if skipped > 0 {
        warn!("{what}: {skipped} rows had null or invalid inputs");
    }
}

/// `H0_calculado = velocity / distance` per row.
pub fn apply_hubble(table: &mut Table, velocity_col: &str, distance_col: &str) -> Result<Report> {
    ensure_rows(table)?;
    let v = numeric(table, velocity_col)?;
    let d = numeric(table, distance_col)?;

    let (cells, skipped) = collect_cells(H0_OUT, zip_rows(&v, &d, physics::hubble_constant));
    let mut report = Report::new("Hubble constant");
    put(table, &mut report, H0_OUT, cells)?;
    report.skipped = skipped;
    warn_skipped(H0_OUT, skipped);

    if let Some(line) = summary_line(table, H0_OUT, "km/s/Mpc") {
        report.line(line);
    }
    Ok(report)
}

/// `redshift_calculado = (observed - emitted) / emitted` per row.
pub fn apply_redshift(table: &mut Table, observed_col: &str, emitted_col: &str) -> Result<Report> {
    ensure_rows(table)?;
    let obs = numeric(table, observed_col)?;
    let emit = numeric(table, emitted_col)?;

    let (cells, skipped) = collect_cells(REDSHIFT_OUT, zip_rows(&obs, &emit, physics::redshift));
    let mut report = Report::new("Redshift");
    put(table, &mut report, REDSHIFT_OUT, cells)?;
    report.skipped = skipped;
    warn_skipped(REDSHIFT_OUT, skipped);

    if let Some(line) = summary_line(table, REDSHIFT_OUT, "") {
        report.line(line);
    }
    Ok(report)
}

/// `distancia_Mpc_calculada = c z / h0` per row.
pub fn apply_hubble_distance(table: &mut Table, redshift_col: &str, h0: f64) -> Result<Report> {
    ensure_rows(table)?;
    physics::hubble_distance_with(0.0, h0)?;
    let z = numeric(table, redshift_col)?;

    let rows = z
        .iter()
        .map(|z| z.map(|z| physics::hubble_distance_with(z, h0)));
    let (cells, skipped) = collect_cells(DISTANCE_OUT, rows);
    let mut report = Report::new("Hubble-law distance");
    put(table, &mut report, DISTANCE_OUT, cells)?;
    report.skipped = skipped;
    warn_skipped(DISTANCE_OUT, skipped);

    report.line(format!("H0 used: {h0} km/s/Mpc"));
    if let Some(line) = summary_line(table, DISTANCE_OUT, "Mpc") {
        report.line(line);
    }
    Ok(report)
}

/// Apply every calculation whose default input columns are present:
/// Hubble constant from `velocidad`/`distancia`, redshift from
/// `longitud_obs`/`longitud_emit`, and distance from `z` (or the redshift
/// just computed).
pub fn analyze(table: &mut Table, h0: f64) -> Result<Report> {
    ensure_rows(table)?;
    let mut report = Report::new("Table analysis");
    let mut applied = false;

    if table.has_column(VELOCITY) && table.has_column(DISTANCE) {
        report.merge(apply_hubble(table, VELOCITY, DISTANCE)?);
        applied = true;
    }
    if table.has_column(OBSERVED) && table.has_column(EMITTED) {
        report.merge(apply_redshift(table, OBSERVED, EMITTED)?);
        applied = true;
    }
    let redshift_col = [Z, REDSHIFT_OUT]
        .into_iter()
        .find(|c| table.has_column(c));
    if let Some(col) = redshift_col {
        report.merge(apply_hubble_distance(table, col, h0)?);
        applied = true;
    }

    if !applied {
        return Err(AnalysisError::NoApplicableColumns(
            [VELOCITY, DISTANCE, OBSERVED, EMITTED, Z]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_util::{floats, table};
    use crate::data::CellValue;
    use crate::physics::constants::{C_KM_S, H0};

    fn galaxies() -> Table {
        table(&[
            ("galaxia", &["A", "B", "C"]),
            ("velocidad", &["680", "750", "700"]),
            ("distancia", &["10", "11", "9.8"]),
            ("longitud_obs", &["656.3", "660.0", "658.1"]),
            ("longitud_emit", &["656.3", "652.0", "651.5"]),
        ])
    }

    #[test]
    fn hubble_per_row() {
        let mut t = galaxies();
        let r = apply_hubble(&mut t, "velocidad", "distancia").unwrap();
        assert_eq!(r.derived, vec![H0_OUT]);
        assert_eq!(
            floats(&t, H0_OUT),
            vec![Some(68.0), Some(750.0 / 11.0), Some(700.0 / 9.8)]
        );
    }

    #[test]
    fn zero_distance_row_is_null_not_fatal() {
        let mut t = table(&[("v", &["100", "200", ""]), ("d", &["2", "0", "4"])]);
        let r = apply_hubble(&mut t, "v", "d").unwrap();
        assert_eq!(r.skipped, 2);
        assert_eq!(t.cell(0, H0_OUT), Some(&CellValue::Float(50.0)));
        assert_eq!(t.cell(1, H0_OUT), Some(&CellValue::Null));
        assert_eq!(t.cell(2, H0_OUT), Some(&CellValue::Null));
    }

    #[test]
    fn redshift_per_row() {
        let mut t = galaxies();
        apply_redshift(&mut t, "longitud_obs", "longitud_emit").unwrap();
        let z = floats(&t, REDSHIFT_OUT);
        assert_eq!(z[0], Some(0.0));
        assert_eq!(z[1], Some((660.0 - 652.0) / 652.0));
    }

    #[test]
    fn distance_uses_given_h0() {
        let mut t = table(&[("z", &["0.05", "0.1"])]);
        apply_hubble_distance(&mut t, "z", H0).unwrap();
        assert_eq!(floats(&t, DISTANCE_OUT)[0], Some(C_KM_S * 0.05 / H0));
        assert!(apply_hubble_distance(&mut t, "z", 0.0).is_err());
    }

    #[test]
    fn rejects_missing_and_text_columns() {
        let mut t = galaxies();
        assert!(matches!(
            apply_hubble(&mut t, "velocidad", "nope"),
            Err(AnalysisError::MissingColumn(c)) if c == "nope"
        ));
        assert!(matches!(
            apply_hubble(&mut t, "galaxia", "distancia"),
            Err(AnalysisError::NonNumeric(c)) if c == "galaxia"
        ));
        assert!(!t.has_column(H0_OUT));
    }

    #[test]
    fn rejects_empty_table() {
        let mut t = table(&[("velocidad", &[]), ("distancia", &[])]);
        let err = apply_hubble(&mut t, "velocidad", "distancia").unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyTable));
        assert_eq!(err.to_string(), "table has no rows");
    }

    #[test]
    fn summary_lines_place_units() {
        let mut t = galaxies();
        let hubble = apply_hubble(&mut t, "velocidad", "distancia").unwrap();
        assert!(hubble.lines[0].contains(" km/s/Mpc, std "));
        let redshift = apply_redshift(&mut t, "longitud_obs", "longitud_emit").unwrap();
        assert!(redshift.lines[0].starts_with("redshift_calculado: mean "));
        assert!(!redshift.lines[0].contains(" ,"));
    }

    #[test]
    fn analyze_chains_redshift_into_distance() {
        let mut t = galaxies();
        let r = analyze(&mut t, H0).unwrap();
        assert_eq!(r.derived, vec![H0_OUT, REDSHIFT_OUT, DISTANCE_OUT]);
        let z = floats(&t, REDSHIFT_OUT)[1].unwrap();
        assert_eq!(floats(&t, DISTANCE_OUT)[1], Some(C_KM_S * z / H0));
    }

    #[test]
    fn analyze_prefers_z_column() {
        let mut t = table(&[("z", &["0.1"]), ("longitud_obs", &["700"]), ("longitud_emit", &["600"])]);
        analyze(&mut t, H0).unwrap();
        assert_eq!(floats(&t, DISTANCE_OUT)[0], Some(C_KM_S * 0.1 / H0));
    }

    #[test]
    fn analyze_without_known_columns_fails() {
        let mut t = table(&[("flux", &["1"])]);
        assert!(matches!(
            analyze(&mut t, H0),
            Err(AnalysisError::NoApplicableColumns(_))
        ));
    }

    #[test]
    fn rerun_replaces_column() {
        let mut t = galaxies();
        apply_hubble(&mut t, "velocidad", "distancia").unwrap();
        apply_hubble(&mut t, "velocidad", "distancia").unwrap();
        assert_eq!(t.num_columns(), 6);
    }
}
