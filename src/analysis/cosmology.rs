use super::{collect_cells, ensure_rows, first_numeric, numeric, put, AnalysisError, Report, Result};
use crate::data::stats::mean;
use crate::data::{CellValue, Table};
use crate::physics;

pub const RECESSION_VELOCITY: &str = "Velocidad_Recesion_km_s";
pub const HUBBLE_DISTANCE: &str = "Distancia_Hubble_Mpc";

pub const ESTIMATED_DISTANCE: &str = "distancia_estimada_Mpc";
pub const X_COORD: &str = "x_coord";
pub const Y_COORD: &str = "y_coord";
pub const Z_COORD: &str = "z_coord";

/// DESI flux band → magnitude column.
pub const BANDS: [(&str, &str); 4] = [
    ("flux_g", "mag_g"),
    ("flux_r", "mag_r"),
    ("flux_z", "mag_z"),
    ("flux_w1", "mag_w1"),
];

/// Colour index columns as `(name, bluer magnitude, redder magnitude)`.
pub const COLOURS: [(&str, &str, &str); 3] = [
    ("color_g_r", "mag_g", "mag_r"),
    ("color_r_z", "mag_r", "mag_z"),
    ("color_z_w1", "mag_z", "mag_w1"),
];

fn redshift_column(table: &Table) -> Result<Vec<Option<f64>>> {
    first_numeric(table, &["z", "Z"])?
        .ok_or_else(|| AnalysisError::NoApplicableColumns(vec!["z".into()]))
}

/// Recession velocity `c z` and Hubble distance `c z / h0` from a `z` column
/// (SDSS/DESI style tables).
pub fn apply_cosmology(table: &mut Table, h0: f64) -> Result<Report> {
    ensure_rows(table)?;
    physics::hubble_distance_with(0.0, h0)?;
    let z = redshift_column(table)?;

    let velocity = z.iter().map(|z| z.map(|z| Ok(physics::recession_velocity(z))));
    let (velocity, skipped) = collect_cells(RECESSION_VELOCITY, velocity);
    let distance = z.iter().map(|z| z.map(|z| physics::hubble_distance_with(z, h0)));
    let (distance, _) = collect_cells(HUBBLE_DISTANCE, distance);

    let mut report = Report::new("Cosmology report (SDSS/DESI)");
    put(table, &mut report, RECESSION_VELOCITY, velocity)?;
    put(table, &mut report, HUBBLE_DISTANCE, distance)?;
    report.skipped = skipped;

    let z_mean = z.iter().flatten().sum::<f64>() / z.iter().flatten().count().max(1) as f64;
    report.line(format!("mean z: {z_mean:.4}"));
    if let Some(d) = table.column(HUBBLE_DISTANCE).and_then(mean) {
        report.line(format!("mean distance: {d:.2} Mpc"));
    }
    Ok(report)
}

/// Hubble distance and 3D cartesian position from `ra`, `dec`, `z`
/// (or `RA`, `DEC`, `Z`), all angles in degrees.
pub fn cartesian_coordinates(table: &mut Table, h0: f64) -> Result<Report> {
    ensure_rows(table)?;
    physics::hubble_distance_with(0.0, h0)?;
    let (ra, dec, z) = if ["ra", "dec", "z"].iter().all(|c| table.has_column(c)) {
        (numeric(table, "ra")?, numeric(table, "dec")?, numeric(table, "z")?)
    } else if ["RA", "DEC", "Z"].iter().all(|c| table.has_column(c)) {
        (numeric(table, "RA")?, numeric(table, "DEC")?, numeric(table, "Z")?)
    } else {
        return Err(AnalysisError::NoApplicableColumns(vec![
            "ra".into(),
            "dec".into(),
            "z".into(),
        ]));
    };

    let mut dist = Vec::with_capacity(table.len());
    let mut axes: [Vec<CellValue>; 3] = Default::default();
    let mut skipped = 0;
    for row in 0..table.len() {
        let point = match (ra[row], dec[row], z[row]) {
            (Some(ra), Some(dec), Some(z)) => physics::hubble_distance_with(z, h0)
                .ok()
                .map(|d| (d, physics::cartesian(ra, dec, d))),
            _ => None,
        };
        match point {
            Some((d, xyz)) => {
                dist.push(CellValue::Float(d));
                for (axis, v) in axes.iter_mut().zip(xyz) {
                    axis.push(CellValue::Float(v));
                }
            }
            None => {
                skipped += 1;
                dist.push(CellValue::Null);
                for axis in axes.iter_mut() {
                    axis.push(CellValue::Null);
                }
            }
        }
    }

    let mut report = Report::new("Cartesian coordinates");
    put(table, &mut report, ESTIMATED_DISTANCE, dist)?;
    let [x, y, zc] = axes;
    put(table, &mut report, X_COORD, x)?;
    put(table, &mut report, Y_COORD, y)?;
    put(table, &mut report, Z_COORD, zc)?;
    report.skipped = skipped;
    report.line(format!("{} objects placed", table.len() - skipped));
    Ok(report)
}

/// AB magnitudes from DESI fluxes plus colour indices.
/// Non-positive fluxes give null magnitudes.
pub fn apply_photometry(table: &mut Table) -> Result<Report> {
    ensure_rows(table)?;
    let mut report = Report::new("DESI photometry");

    for (flux_col, mag_col) in BANDS {
        if !table.has_column(flux_col) {
            continue;
        }
        let flux = numeric(table, flux_col)?;
        let cells = flux
            .iter()
            .map(|f| CellValue::from_f64(f.and_then(physics::flux_to_magnitude)))
            .collect();
        put(table, &mut report, mag_col, cells)?;
    }
    if report.derived.is_empty() {
        return Err(AnalysisError::NoApplicableColumns(
            BANDS.iter().map(|(f, _)| f.to_string()).collect(),
        ));
    }

    for (colour, blue, red) in COLOURS {
        let (Some(b), Some(r)) = (table.column(blue), table.column(red)) else {
            continue;
        };
        let cells = b
            .f64_values()
            .into_iter()
            .zip(r.f64_values())
            .map(|(b, r)| CellValue::from_f64(b.zip(r).map(|(b, r)| b - r)))
            .collect();
        put(table, &mut report, colour, cells)?;
    }

    let with_colours = match (table.column("color_g_r"), table.column("color_r_z")) {
        (Some(gr), Some(rz)) => gr
            .values
            .iter()
            .zip(&rz.values)
            .filter(|(a, b)| !a.is_null() && !b.is_null())
            .count(),
        _ => 0,
    };
    report.line(format!("objects processed: {}", table.len()));
    report.line(format!("objects with g-r and r-z colours: {with_colours}"));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_util::{floats, table};
    use crate::physics::constants::{C_KM_S, H0};

    #[test]
    fn cosmology_from_z() {
        let mut t = table(&[("z", &["0.1", "", "0.2"])]);
        let r = apply_cosmology(&mut t, H0).unwrap();
        assert_eq!(r.skipped, 1);
        assert_eq!(floats(&t, RECESSION_VELOCITY)[0], Some(C_KM_S * 0.1));
        assert_eq!(floats(&t, HUBBLE_DISTANCE)[2], Some(C_KM_S * 0.2 / H0));
        assert_eq!(floats(&t, HUBBLE_DISTANCE)[1], None);
        assert!(r.lines[0].contains("0.1500"));
    }

    #[test]
    fn cosmology_accepts_upper_case_z() {
        let mut t = table(&[("Z", &["0.1"])]);
        assert!(apply_cosmology(&mut t, H0).is_ok());
        let mut t = table(&[("ra", &["1"])]);
        assert!(matches!(
            apply_cosmology(&mut t, H0),
            Err(AnalysisError::NoApplicableColumns(_))
        ));
    }

    #[test]
    fn cartesian_on_equator() {
        let mut t = table(&[("RA", &["90", "0"]), ("DEC", &["0", "x"]), ("Z", &["0.07", "0.1"])]);
        assert!(matches!(
            cartesian_coordinates(&mut t, H0),
            Err(AnalysisError::NonNumeric(_))
        ));

        let mut t = table(&[("ra", &["90", "0"]), ("dec", &["0", ""]), ("z", &["0.07", "0.1"])]);
        let r = cartesian_coordinates(&mut t, H0).unwrap();
        assert_eq!(r.skipped, 1);
        let d = C_KM_S * 0.07 / H0;
        let x = floats(&t, X_COORD)[0].unwrap();
        let y = floats(&t, Y_COORD)[0].unwrap();
        assert!(x.abs() < 1e-9);
        assert!((y - d).abs() < 1e-9);
        assert_eq!(floats(&t, Z_COORD)[1], None);
        assert!(t.has_column("ra"));
    }

    #[test]
    fn photometry_magnitudes_and_colours() {
        let mut t = table(&[
            ("flux_g", &["1", "-1"]),
            ("flux_r", &["10", "10"]),
            ("flux_z", &["100", "100"]),
        ]);
        let r = apply_photometry(&mut t).unwrap();
        assert_eq!(floats(&t, "mag_g"), vec![Some(22.5), None]);
        assert!((floats(&t, "color_g_r")[0].unwrap() - 2.5).abs() < 1e-12);
        assert_eq!(floats(&t, "color_g_r")[1], None);
        assert!(t.has_column("color_r_z"));
        assert!(!t.has_column("color_z_w1"));
        assert!(r.lines[1].ends_with(": 1"));
    }

    #[test]
    fn photometry_needs_a_flux_column() {
        let mut t = table(&[("z", &["0.1"])]);
        assert!(apply_photometry(&mut t).is_err());
    }
}
