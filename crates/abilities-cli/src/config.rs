//! Simulation configuration, loaded from YAML.

use std::path::Path;

use ai_abilities::ControllerConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Global seed fed to every tick context.
    pub seed: u64,

    /// Ticks to simulate when `--ticks` is not given.
    pub ticks: u64,

    pub dt_seconds: f32,

    /// Number of demo agents, ids 1..=agents.
    pub agents: u32,

    /// Decision cadence shared by every agent.
    pub controller: ControllerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            ticks: 60,
            dt_seconds: 1.0 / 30.0,
            agents: 2,
            controller: ControllerConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed: 42\ncontroller:\n  decision_period: 4").unwrap();

        let config = SimConfig::load(file.path()).unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.ticks, SimConfig::default().ticks);
        assert_eq!(config.agents, 2);
        assert_eq!(config.controller.decision_period, 4);
        assert!(config.controller.repeat_between_decisions);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.yaml");
        std::fs::write(&path, "ticks: [not, a, number]\n").unwrap();

        let err = SimConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("sim.yaml"));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(SimConfig::load_or_default(None).unwrap(), SimConfig::default());
    }
}
