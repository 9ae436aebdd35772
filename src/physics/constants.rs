/// Speed of light, km/s.
pub const C_KM_S: f64 = 299_792.458;

/// Reference Hubble constant, km/s/Mpc.
pub const H0: f64 = 70.0;

/// Gravitational constant, m³ kg⁻¹ s⁻².
pub const G: f64 = 6.674_30e-11;

/// Astronomical unit, m.
pub const AU_M: f64 = 1.496e11;

/// Solar mass, kg.
pub const SOLAR_MASS_KG: f64 = 1.989e30;

/// Earth's mean orbital speed, km/s. Scales `v ∝ a^-1/2` for heliocentric orbits.
pub const EARTH_ORBITAL_SPEED_KM_S: f64 = 29.78;

/// Gaussian gravitational parameter of the Sun, AU³/day².
pub const GM_SUN_AU3_D2: f64 = 0.000_295_912_208_285_591_1;

/// Solar effective temperature, K.
pub const SUN_TEFF_K: f64 = 5778.0;

/// Mean seconds in a Julian year.
pub const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

/// Days in a Julian year.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Light years in one megaparsec.
pub const LY_PER_MPC: f64 = 3.2616e6;

/// AB zero point of DESI nanomaggie fluxes.
pub const NANOMAGGIE_ZERO_POINT: f64 = 22.5;
