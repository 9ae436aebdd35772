use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::physics::constants::H0;

/// Runtime settings. Every field has a default, so a config file only needs
/// the keys it overrides:
///
/// ```json
/// { "hubble_constant": 67.4, "data_dir": "catalogs" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// km/s/Mpc, used by distance calculations over tables.
    pub hubble_constant: f64,
    /// Directory scanned for loadable data sets.
    pub data_dir: PathBuf,
    /// Directory for timestamped exports.
    pub export_dir: PathBuf,
    /// Rows shown when printing a table.
    pub head_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hubble_constant: H0,
            data_dir: PathBuf::from("data"),
            export_dir: PathBuf::from("data"),
            head_rows: 5,
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!("Loaded config from {}: {config:?}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Defaults, or the file's settings when a path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.hubble_constant.is_finite() && self.hubble_constant > 0.0,
            "hubble_constant must be a positive number, got {}",
            self.hubble_constant
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("astro.json");
        std::fs::write(&path, r#"{ "hubble_constant": 67.4 }"#).unwrap();
        let c = Config::from_file(&path).unwrap();
        assert_eq!(c.hubble_constant, 67.4);
        assert_eq!(c.head_rows, 5);
        assert_eq!(c.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_h0() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "hubble": 67.4 }"#).unwrap();
        assert!(Config::from_file(&path).is_err());
        std::fs::write(&path, r#"{ "hubble_constant": 0 }"#).unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
