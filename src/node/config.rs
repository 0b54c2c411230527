use crate::finality::types::{DEFAULT_GENESIS_ID, DEFAULT_QUORUM};
use crate::utils::errors::{Result, TrackerError};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Construction parameters for a FinalityTracker.
#[derive(Debug, Deserialize, Clone)]
pub struct TrackerConfig {
    /// identifier seeded at height 0
    #[serde(default = "default_genesis_id")]
    pub genesis_id: String,
    /// votes required to finalize a candidate
    #[serde(default = "default_quorum")]
    pub quorum: u32,
}

fn default_genesis_id() -> String {
    DEFAULT_GENESIS_ID.to_string()
}

fn default_quorum() -> u32 {
    DEFAULT_QUORUM
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            genesis_id: default_genesis_id(),
            quorum: default_quorum(),
        }
    }
}

impl TrackerConfig {
    /// Load tracker config from a TOML file. Absent keys fall back to
    /// defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: TrackerConfig = toml::from_str(&data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.quorum == 0 {
            return Err(TrackerError::ConfigError(
                "quorum must be at least 1".into(),
            ));
        }
        if self.genesis_id.is_empty() {
            return Err(TrackerError::ConfigError(
                "genesis_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}
