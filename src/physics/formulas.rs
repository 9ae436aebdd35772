use std::f64::consts::TAU;

use super::constants::{
    AU_M, C_KM_S, EARTH_ORBITAL_SPEED_KM_S, G, H0, LY_PER_MPC, NANOMAGGIE_ZERO_POINT,
    SECONDS_PER_YEAR,
};
use super::{PhysicsError, Result};

fn finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PhysicsError::NotFinite { quantity, value })
    }
}

fn nonzero(quantity: &'static str, value: f64) -> Result<f64> {
    if finite(quantity, value)? == 0.0 {
        Err(PhysicsError::ZeroDenominator { quantity })
    } else {
        Ok(value)
    }
}

fn positive(quantity: &'static str, value: f64) -> Result<f64> {
    if finite(quantity, value)? > 0.0 {
        Ok(value)
    } else {
        Err(PhysicsError::NonPositive { quantity, value })
    }
}

// ---------------------------------------------------------------------------
// Cosmology
// ---------------------------------------------------------------------------

/// Hubble constant `H0 = v / d` in km/s/Mpc, from recession velocity (km/s)
/// and distance (Mpc).
pub fn hubble_constant(velocity_km_s: f64, distance_mpc: f64) -> Result<f64> {
    let v = finite("velocity", velocity_km_s)?;
    let d = nonzero("distance", distance_mpc)?;
    Ok(v / d)
}

/// Redshift `z = (λ_obs - λ_emit) / λ_emit`. Units cancel.
pub fn redshift(observed: f64, emitted: f64) -> Result<f64> {
    let obs = finite("observed wavelength", observed)?;
    let emit = nonzero("emitted wavelength", emitted)?;
    Ok((obs - emit) / emit)
}

/// Recession velocity `v = c z` in km/s (low-redshift approximation).
pub fn recession_velocity(z: f64) -> f64 {
    C_KM_S * z
}

/// Hubble-law distance `d = c z / H0` in Mpc with the reference `H0`.
pub fn hubble_distance(z: f64) -> f64 {
    recession_velocity(z) / H0
}

/// Hubble-law distance with a caller-supplied Hubble constant.
pub fn hubble_distance_with(z: f64, h0: f64) -> Result<f64> {
    let h0 = nonzero("Hubble constant", h0)?;
    Ok(recession_velocity(finite("redshift", z)?) / h0)
}

/// Megaparsecs to light years.
pub fn mpc_to_light_years(distance_mpc: f64) -> f64 {
    distance_mpc * LY_PER_MPC
}

/// AB magnitude of a nanomaggie flux, `22.5 - 2.5 log10(f)`.
/// Non-positive fluxes have no magnitude.
pub fn flux_to_magnitude(flux: f64) -> Option<f64> {
    (flux.is_finite() && flux > 0.0).then(|| NANOMAGGIE_ZERO_POINT - 2.5 * flux.log10())
}

/// Equatorial position to cartesian `[x, y, z]` in the units of `distance`.
pub fn cartesian(ra_deg: f64, dec_deg: f64, distance: f64) -> [f64; 3] {
    let ra = ra_deg.to_radians();
    let dec = dec_deg.to_radians();
    [
        distance * dec.cos() * ra.cos(),
        distance * dec.cos() * ra.sin(),
        distance * dec.sin(),
    ]
}

// ---------------------------------------------------------------------------
// Rotation and orbits
// ---------------------------------------------------------------------------

/// Angular velocity `ω = v / r` (rad per unit time of `v`).
pub fn angular_velocity(linear_velocity: f64, radius: f64) -> Result<f64> {
    let v = finite("linear velocity", linear_velocity)?;
    let r = nonzero("radius", radius)?;
    Ok(v / r)
}

/// Uniform circular motion derived from a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularMotion {
    /// rad/s
    pub angular_velocity: f64,
    /// units of `radius` per second
    pub linear_velocity: f64,
}

/// `ω = 2π / T` and `v = 2πr / T` for a period in seconds.
pub fn angular_velocity_from_period(period_s: f64, radius: f64) -> Result<CircularMotion> {
    let t = nonzero("period", period_s)?;
    let r = finite("radius", radius)?;
    Ok(CircularMotion {
        angular_velocity: TAU / t,
        linear_velocity: TAU * r / t,
    })
}

/// Circular orbital velocity `v = sqrt(G M / r)` in m/s, mass in kg, radius in m.
pub fn orbital_velocity(central_mass_kg: f64, radius_m: f64) -> Result<f64> {
    let r = positive("orbital radius", radius_m)?;
    let m = finite("central mass", central_mass_kg)?;
    if m < 0.0 {
        return Err(PhysicsError::NonPositive {
            quantity: "central mass",
            value: m,
        });
    }
    Ok((G * m / r).sqrt())
}

/// Circular orbital period `T = 2πr / v` in seconds.
pub fn orbital_period(radius_m: f64, velocity_m_s: f64) -> Result<f64> {
    let v = nonzero("orbital velocity", velocity_m_s)?;
    Ok(TAU * finite("orbital radius", radius_m)? / v)
}

/// Orbital parameters of a body around a central mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// m/s
    pub velocity: f64,
    /// s
    pub period: f64,
    pub period_years: f64,
    /// m
    pub perihelion: f64,
    /// m
    pub aphelion: f64,
}

/// Orbit with semi-major axis `a` (m) and eccentricity `e`, using the
/// circular velocity at `a` for period and speed.
pub fn orbit(central_mass_kg: f64, semi_major_axis_m: f64, eccentricity: f64) -> Result<Orbit> {
    let m = positive("central mass", central_mass_kg)?;
    let e = finite("eccentricity", eccentricity)?;
    if !(0.0..1.0).contains(&e) {
        return Err(PhysicsError::Eccentricity(e));
    }
    let velocity = orbital_velocity(m, semi_major_axis_m)?;
    let period = orbital_period(semi_major_axis_m, velocity)?;
    Ok(Orbit {
        velocity,
        period,
        period_years: period / SECONDS_PER_YEAR,
        perihelion: semi_major_axis_m * (1.0 - e),
        aphelion: semi_major_axis_m * (1.0 + e),
    })
}

/// Heliocentric period in years from Kepler's third law, `T = a^1.5` (a in AU).
pub fn heliocentric_period_years(semi_major_axis_au: f64) -> Result<f64> {
    Ok(positive("semi-major axis", semi_major_axis_au)?.powf(1.5))
}

/// Mean heliocentric orbital speed in km/s, `29.78 / sqrt(a)` (a in AU).
pub fn heliocentric_speed_km_s(semi_major_axis_au: f64) -> Result<f64> {
    Ok(EARTH_ORBITAL_SPEED_KM_S / positive("semi-major axis", semi_major_axis_au)?.sqrt())
}

/// Semi-major axis in AU of a solar-mass orbit from its period in days.
pub fn semi_major_axis_au_from_period(period_days: f64) -> Result<f64> {
    let years = positive("orbital period", period_days)? / super::constants::DAYS_PER_YEAR;
    Ok(years.powf(2.0 / 3.0))
}

/// Meters to astronomical units.
pub fn m_to_au(meters: f64) -> f64 {
    meters / AU_M
}
