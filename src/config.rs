use crate::error::InvalidJitter;
use crate::sites::SiteJitter;
use crate::types::CriteriaWeights;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ev_sites.json";

/// Run configuration.
///
/// Example JSON:
/// ```json
/// {
///   "census_path": "data/lahore_census_2023.csv",
///   "sites_path": "data/candidate_sites.csv",
///   "output_dir": "outputs",
///   "weights": { "population_density": 0.3, "growth_rate": 0.2 },
///   "jitter": 5.0,
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub census_path: PathBuf,
    pub sites_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Criterion key to weight; unknown keys are ignored. When absent the
    /// default weights apply.
    pub weights: Option<BTreeMap<String, f64>>,
    /// Site score jitter amplitude. Zero disables jitter.
    pub jitter: f64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            census_path: PathBuf::from("data/lahore_census_2023.csv"),
            sites_path: Some(PathBuf::from("data/candidate_sites.csv")),
            output_dir: PathBuf::from("outputs"),
            weights: None,
            jitter: 0.0,
            seed: None,
        }
    }
}

impl Config {
    pub fn criteria_weights(&self) -> CriteriaWeights {
        match &self.weights {
            Some(map) => CriteriaWeights::from_map(map.iter().map(|(k, v)| (k.as_str(), *v))),
            None => CriteriaWeights::default(),
        }
    }

    /// A zero amplitude disables jitter; anything else must be a finite,
    /// non-negative amplitude whether or not a seed is given.
    pub fn site_jitter(&self) -> Result<SiteJitter, InvalidJitter> {
        match self.seed {
            Some(seed) => SiteJitter::seeded(self.jitter, seed),
            None if self.jitter == 0.0 => Ok(SiteJitter::none()),
            None => SiteJitter::unseeded(self.jitter),
        }
    }
}

/// Load configuration from a JSON file.
///
/// An explicit `path` must exist. Without one, `ev_sites.json` in the working
/// directory is used when present and defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !p.exists() {
                log::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(Config::default());
            }
            p
        }
    };

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    parse_config(&content).with_context(|| {
        format!("Failed to parse config: invalid JSON in {}", config_path.display())
    })
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(r#"{ "output_dir": "out", "seed": 7 }"#).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.census_path, PathBuf::from("data/lahore_census_2023.csv"));
        assert_eq!(config.criteria_weights(), CriteriaWeights::default());
    }

    #[test]
    fn test_weights_map() {
        let json = r#"{ "weights": { "density": 0.5, "growth_rate": 0.5, "parking": 1.0 } }"#;
        let config = parse_config(json).unwrap();
        let w = config.criteria_weights();
        assert_eq!(w.population_density, 0.5);
        assert_eq!(w.growth_rate, 0.5);
        assert_eq!(w.infrastructure, 0.0);
    }

    #[test]
    fn test_site_jitter_rejects_negative_with_or_without_seed() {
        let unseeded = parse_config(r#"{ "jitter": -5.0 }"#).unwrap();
        assert_eq!(unseeded.site_jitter().err(), Some(InvalidJitter(-5.0)));
        let seeded = parse_config(r#"{ "jitter": -5.0, "seed": 1 }"#).unwrap();
        assert_eq!(seeded.site_jitter().err(), Some(InvalidJitter(-5.0)));
    }

    #[test]
    fn test_site_jitter_rejects_overflowing_amplitude() {
        let config = parse_config(r#"{ "jitter": 1e308, "seed": 1 }"#).unwrap();
        assert!(config.site_jitter().is_err());
    }

    #[test]
    fn test_site_jitter_defaults_to_none() {
        let jitter = Config::default().site_jitter().unwrap();
        assert_eq!(jitter.amplitude(), 0.0);
        let seeded = parse_config(r#"{ "jitter": 5.0, "seed": 3 }"#).unwrap();
        assert_eq!(seeded.site_jitter().unwrap().amplitude(), 5.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_config("{ not json").is_err());
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = load_config(Some(Path::new("/no/such/ev_sites.json"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ev_sites.json");
        fs::write(&path, r#"{ "jitter": 5.0 }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.jitter, 5.0);
    }
}
