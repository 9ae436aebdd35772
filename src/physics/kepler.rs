//! Two-body propagation of heliocentric orbital elements.
//!
//! Angles are degrees at the API boundary and radians internally. Distances
//! are in AU, time in days.

use std::f64::consts::TAU;

use super::constants::GM_SUN_AU3_D2;
use super::{PhysicsError, Result};

/// Newton iterations when solving Kepler's equation.
pub const NEWTON_STEPS: usize = 10;

/// Points sampled along one revolution of the trajectory.
pub const TRAJECTORY_POINTS: usize = 100;

/// Classical orbital elements as published by JPL Horizons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis, AU.
    pub a: f64,
    /// Eccentricity.
    pub e: f64,
    /// Inclination, degrees.
    pub incl: f64,
    /// Longitude of the ascending node, degrees.
    pub omega_node: f64,
    /// Argument of perihelion, degrees.
    pub arg_perihelion: f64,
    /// Mean anomaly at epoch, degrees.
    pub mean_anomaly: f64,
    /// Mean motion, degrees/day. Derived from `a` when absent.
    pub mean_motion: Option<f64>,
}

impl OrbitalElements {
    pub fn validate(&self) -> Result<()> {
        if !(self.a.is_finite() && self.a > 0.0) {
            return Err(PhysicsError::NonPositive {
                quantity: "semi-major axis",
                value: self.a,
            });
        }
        if !(0.0..1.0).contains(&self.e) {
            return Err(PhysicsError::Eccentricity(self.e));
        }
        Ok(())
    }

    /// Mean motion in rad/day.
    pub fn mean_motion_rad(&self) -> f64 {
        match self.mean_motion {
            Some(n) => n.to_radians(),
            None => (GM_SUN_AU3_D2 / self.a.powi(3)).sqrt(),
        }
    }

    /// Perifocal (orbital plane) coordinates at eccentric anomaly `ecc_anomaly`.
    fn in_plane(&self, ecc_anomaly: f64) -> (f64, f64) {
        let x = self.a * (ecc_anomaly.cos() - self.e);
        let y = self.a * (1.0 - self.e * self.e).sqrt() * ecc_anomaly.sin();
        (x, y)
    }

    /// Rotate perifocal coordinates into the ecliptic frame.
    fn rotate(&self, x: f64, y: f64) -> [f64; 3] {
        let (so, co) = self.omega_node.to_radians().sin_cos();
        let (sw, cw) = self.arg_perihelion.to_radians().sin_cos();
        let (si, ci) = self.incl.to_radians().sin_cos();
        [
            x * (cw * co - sw * so * ci) - y * (sw * co + cw * so * ci),
            x * (cw * so + sw * co * ci) - y * (sw * so - cw * co * ci),
            x * (sw * si) + y * (cw * si),
        ]
    }

    /// Heliocentric ecliptic position at eccentric anomaly `ecc_anomaly`.
    pub fn position_at_eccentric_anomaly(&self, ecc_anomaly: f64) -> [f64; 3] {
        let (x, y) = self.in_plane(ecc_anomaly);
        self.rotate(x, y)
    }
}

/// Solve `E - e sin E = M` for `E` by Newton iteration starting at `E = M`.
pub fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc = mean_anomaly;
    for _ in 0..NEWTON_STEPS {
        ecc -= (ecc - e * ecc.sin() - mean_anomaly) / (1.0 - e * ecc.cos());
    }
    ecc
}

/// Full trajectory plus a predicted future position.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSimulation {
    pub object: String,
    pub days: f64,
    /// One revolution sampled uniformly in eccentric anomaly.
    pub trajectory: Vec<[f64; 3]>,
    /// Position `days` after epoch.
    pub future: [f64; 3],
}

/// Propagate `elements` forward by `days` and sample the whole orbit.
pub fn simulate(elements: &OrbitalElements, days: f64, object: impl Into<String>) -> Result<OrbitSimulation> {
    elements.validate()?;

    let step = TAU / (TRAJECTORY_POINTS - 1) as f64;
    let trajectory = (0..TRAJECTORY_POINTS)
        .map(|i| elements.position_at_eccentric_anomaly(i as f64 * step))
        .collect();

    let mean_future = elements.mean_anomaly.to_radians() + elements.mean_motion_rad() * days;
    let ecc_future = solve_kepler(mean_future, elements.e);

    Ok(OrbitSimulation {
        object: object.into(),
        days,
        trajectory,
        future: elements.position_at_eccentric_anomaly(ecc_future),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth_like() -> OrbitalElements {
        OrbitalElements {
            a: 1.0,
            e: 0.0167,
            incl: 0.0,
            omega_node: 0.0,
            arg_perihelion: 0.0,
            mean_anomaly: 0.0,
            mean_motion: None,
        }
    }

    #[test]
    fn kepler_residual_is_tiny() {
        for &e in &[0.0, 0.1, 0.5, 0.8] {
            for k in 0..12 {
                let m = k as f64 * 0.5;
                let ecc = solve_kepler(m, e);
                assert!((ecc - e * ecc.sin() - m).abs() < 1e-9, "e={e} M={m}");
            }
        }
    }

    #[test]
    fn circular_orbit_is_identity() {
        assert_eq!(solve_kepler(1.234, 0.0), 1.234);
    }

    #[test]
    fn derived_mean_motion_gives_one_year() {
        let n = earth_like().mean_motion_rad();
        assert!((TAU / n - 365.25).abs() < 0.1);
    }

    #[test]
    fn perihelion_at_epoch_without_rotation() {
        let sim = simulate(&earth_like(), 0.0, "Earth").unwrap();
        assert!((sim.future[0] - (1.0 - 0.0167)).abs() < 1e-12);
        assert!(sim.future[1].abs() < 1e-12);
        assert!(sim.future[2].abs() < 1e-12);
        assert_eq!(sim.trajectory.len(), TRAJECTORY_POINTS);
    }

    #[test]
    fn full_period_returns_to_start() {
        let el = earth_like();
        let period = TAU / el.mean_motion_rad();
        let sim = simulate(&el, period, "Earth").unwrap();
        assert!((sim.future[0] - (1.0 - 0.0167)).abs() < 1e-9);
    }

    #[test]
    fn inclination_lifts_out_of_plane() {
        let el = OrbitalElements {
            incl: 90.0,
            arg_perihelion: 90.0,
            ..earth_like()
        };
        let [_, _, z] = el.position_at_eccentric_anomaly(0.0);
        assert!((z - (1.0 - 0.0167)).abs() < 1e-12);
    }

    #[test]
    fn rejects_hyperbolic_elements() {
        let el = OrbitalElements { e: 1.2, ..earth_like() };
        assert_eq!(simulate(&el, 1.0, "x"), Err(PhysicsError::Eccentricity(1.2)));
    }
}
