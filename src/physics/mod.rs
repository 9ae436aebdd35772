//! Closed-form astrophysical formulas.
//!
//! Every function here is pure: numbers in, numbers (or a
//! [`PhysicsError`]) out.

pub mod constants;
pub mod formulas;
pub mod kepler;

use thiserror::Error;

pub use formulas::*;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("{quantity} must not be zero")]
    ZeroDenominator { quantity: &'static str },
    #[error("{quantity} must be positive, got {value}")]
    NonPositive { quantity: &'static str, value: f64 },
    #[error("{quantity} must be finite, got {value}")]
    NotFinite { quantity: &'static str, value: f64 },
    #[error("eccentricity must be in [0, 1), got {0}")]
    Eccentricity(f64),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
