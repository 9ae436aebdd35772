use std::fmt;

use super::{ensure_rows, numeric, put, Report, Result};
use crate::data::{CellValue, Table};
use crate::physics::{self, constants::SUN_TEFF_K};

pub const ESTIMATED_DISTANCE_AU: &str = "distancia_estimada_AU";
pub const PLANET_CLASS: &str = "Clase_Planeta";
pub const THERMAL_ZONE: &str = "Zona_Termica";

/// Size class from planet radius in Earth radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanetClass {
    Rocky,
    SuperEarth,
    MiniNeptune,
    GasGiant,
    BrownDwarf,
    Unknown,
}

impl PlanetClass {
    pub fn from_radius(earth_radii: Option<f64>) -> Self {
        match earth_radii {
            None => PlanetClass::Unknown,
            Some(r) if r < 1.25 => PlanetClass::Rocky,
            Some(r) if r < 2.0 => PlanetClass::SuperEarth,
            Some(r) if r < 6.0 => PlanetClass::MiniNeptune,
            Some(r) if r < 15.0 => PlanetClass::GasGiant,
            Some(_) => PlanetClass::BrownDwarf,
        }
    }
}

impl fmt::Display for PlanetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanetClass::Rocky => "Tipo Tierra (Rocoso)",
            PlanetClass::SuperEarth => "Super-Tierra",
            PlanetClass::MiniNeptune => "Mini-Neptuno",
            PlanetClass::GasGiant => "Gigante Gaseoso (Júpiter)",
            PlanetClass::BrownDwarf => "Enana Marrón / Otro",
            PlanetClass::Unknown => "Desconocido",
        })
    }
}

/// Position relative to the host star's habitable zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalZone {
    Hot,
    Habitable,
    Cold,
    Unknown,
}

impl ThermalZone {
    /// Habitable zone spans `[0.95, 1.4] × (T_eff / T_sun)²` AU.
    pub fn classify(distance_au: Option<f64>, star_teff_k: Option<f64>) -> Self {
        let (Some(d), Some(t)) = (distance_au, star_teff_k) else {
            return ThermalZone::Unknown;
        };
        let factor = (t / SUN_TEFF_K).powi(2);
        if d < 0.95 * factor {
            ThermalZone::Hot
        } else if d <= 1.4 * factor {
            ThermalZone::Habitable
        } else {
            ThermalZone::Cold
        }
    }
}

impl fmt::Display for ThermalZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ThermalZone::Hot => "Zona Caliente",
            ThermalZone::Habitable => "Zona Habitable (Ricitos de Oro)",
            ThermalZone::Cold => "Zona Fría",
            ThermalZone::Unknown => "Desconocido",
        })
    }
}

/// Estimated orbital distance, size class and thermal zone for NASA
/// Exoplanet Archive tables (`pl_orbsmax`, `pl_orbper`, `pl_rade`, `st_teff`).
pub fn apply_exoplanets(table: &mut Table) -> Result<Report> {
    ensure_rows(table)?;
    let mut report = Report::new("Exoplanet analysis");

    let distance: Vec<Option<f64>> = if table.has_column("pl_orbsmax") {
        numeric(table, "pl_orbsmax")?
    } else if table.has_column("pl_orbper") {
        numeric(table, "pl_orbper")?
            .into_iter()
            .map(|p| p.and_then(|p| physics::semi_major_axis_au_from_period(p).ok()))
            .collect()
    } else {
        vec![None; table.len()]
    };
    report.skipped = distance.iter().filter(|d| d.is_none()).count();
    put(
        table,
        &mut report,
        ESTIMATED_DISTANCE_AU,
        distance.iter().map(|d| CellValue::from_f64(*d)).collect(),
    )?;

    let mut rocky = 0;
    if table.has_column("pl_rade") {
        let classes: Vec<PlanetClass> = numeric(table, "pl_rade")?
            .into_iter()
            .map(PlanetClass::from_radius)
            .collect();
        rocky = classes.iter().filter(|c| **c == PlanetClass::Rocky).count();
        put(table, &mut report, PLANET_CLASS, labels(&classes))?;
    }

    let mut habitable = 0;
    if table.has_column("st_teff") {
        let zones: Vec<ThermalZone> = numeric(table, "st_teff")?
            .into_iter()
            .zip(&distance)
            .map(|(t, d)| ThermalZone::classify(*d, t))
            .collect();
        habitable = zones.iter().filter(|z| **z == ThermalZone::Habitable).count();
        put(table, &mut report, THERMAL_ZONE, labels(&zones))?;
    }

    report.line(format!("Earth-like planets detected: {rocky}"));
    report.line(format!("Habitable zone candidates: {habitable}"));
    Ok(report)
}

fn labels<T: fmt::Display>(items: &[T]) -> Vec<CellValue> {
    items
        .iter()
        .map(|i| CellValue::String(i.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_util::{floats, table};

    #[test]
    fn radius_boundaries() {
        assert_eq!(PlanetClass::from_radius(Some(1.0)), PlanetClass::Rocky);
        assert_eq!(PlanetClass::from_radius(Some(1.25)), PlanetClass::SuperEarth);
        assert_eq!(PlanetClass::from_radius(Some(5.9)), PlanetClass::MiniNeptune);
        assert_eq!(PlanetClass::from_radius(Some(11.2)), PlanetClass::GasGiant);
        assert_eq!(PlanetClass::from_radius(Some(20.0)), PlanetClass::BrownDwarf);
        assert_eq!(PlanetClass::from_radius(None), PlanetClass::Unknown);
    }

    #[test]
    fn sun_like_zones() {
        assert_eq!(ThermalZone::classify(Some(1.0), Some(SUN_TEFF_K)), ThermalZone::Habitable);
        assert_eq!(ThermalZone::classify(Some(0.39), Some(SUN_TEFF_K)), ThermalZone::Hot);
        assert_eq!(ThermalZone::classify(Some(5.2), Some(SUN_TEFF_K)), ThermalZone::Cold);
        assert_eq!(ThermalZone::classify(None, Some(SUN_TEFF_K)), ThermalZone::Unknown);
    }

    #[test]
    fn distance_from_period_when_axis_missing() {
        let mut t = table(&[
            ("pl_name", &["a", "b"]),
            ("pl_orbper", &["365.25", ""]),
            ("pl_rade", &["1.0", "11"]),
            ("st_teff", &["5778", "3000"]),
        ]);
        let r = apply_exoplanets(&mut t).unwrap();
        assert_eq!(floats(&t, ESTIMATED_DISTANCE_AU)[0], Some(1.0));
        assert_eq!(r.skipped, 1);
        assert_eq!(
            t.cell(0, PLANET_CLASS),
            Some(&CellValue::String("Tipo Tierra (Rocoso)".into()))
        );
        assert_eq!(
            t.cell(1, THERMAL_ZONE),
            Some(&CellValue::String("Desconocido".into()))
        );
        assert_eq!(r.lines[0], "Earth-like planets detected: 1");
        assert_eq!(r.lines[1], "Habitable zone candidates: 1");
    }

    #[test]
    fn semi_major_axis_column_wins() {
        let mut t = table(&[("pl_orbsmax", &["0.05"]), ("pl_orbper", &["3.5"])]);
        apply_exoplanets(&mut t).unwrap();
        assert_eq!(floats(&t, ESTIMATED_DISTANCE_AU), vec![Some(0.05)]);
        assert!(!t.has_column(PLANET_CLASS));
    }
}
