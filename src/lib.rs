//! Astronomy calculator and table analyzer.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`physics`] | Closed-form formulas (Hubble's law, redshift, orbits) and Kepler propagation |
//! | [`data`] | [`Table`](data::Table) model, CSV/DAT/JSON/Parquet loading, CSV output, describe |
//! | [`analysis`] | Row-wise appliers that add derived columns and return a [`Report`](analysis::Report) |
//! | [`session`] | Load → apply → display orchestration |
//! | [`display`] | Terminal rendering of tables and statistics |
//! | [`config`] | Runtime settings from an optional JSON file |
//!
//! ```
//! use astro_panda::physics;
//!
//! let h0 = physics::hubble_constant(1500.0, 22.0).unwrap();
//! assert!((h0 - 68.18).abs() < 0.01);
//! assert_eq!(physics::redshift(656.3, 656.3).unwrap(), 0.0);
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod display;
pub mod physics;
pub mod session;
