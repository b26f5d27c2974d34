use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

/// Run configuration, read once at startup from a JSON file.
/// Fields absent from the file take defaults; a missing or malformed file is
/// a fatal startup error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Genomes per generation
    pub population_size: usize,
    /// Hard stop after this many generations
    pub generation_cap: u32,
    /// Score at which the run is considered solved
    pub score_target: u32,
    /// Hidden neurons in each controller network (3 inputs, 1 output)
    pub hidden_neurons: usize,
    /// Per-weight chance of perturbation during reproduction
    pub mutation_rate: f64,
    /// Magnitude of a weight perturbation
    pub mutation_strength: f32,
    /// Fixed RNG seed for reproducible runs; random when absent
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            population_size: 50,
            generation_cap: 50,
            score_target: 50,
            hidden_neurons: 4,
            mutation_rate: 0.25,
            mutation_strength: 0.5,
            seed: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_run_caps() {
        let cfg = Config::default();
        assert_eq!(cfg.generation_cap, 50);
        assert_eq!(cfg.score_target, 50);
        assert!(cfg.population_size > 0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"population_size": 12, "seed": 7}"#).unwrap();
        assert_eq!(cfg.population_size, 12);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.score_target, Config::default().score_target);
    }

    #[test]
    fn missing_file_is_a_fatal_startup_error() {
        // a mistyped path must abort, not silently train on defaults
        let err = Config::load(Path::new("/nonexistent/flappy.json")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
