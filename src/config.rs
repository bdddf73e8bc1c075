use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::display::DEFAULT_DELIMITER;
use crate::error::ConfigError;
use crate::rebalance::{TierConfig, TierSpec};

/// Settings file, e.g.
///
/// ```toml
/// delimiter = ","
///
/// [[tiers]]
/// name = "default"
/// exact_names = ["CAMP0000", "FISH0000"]
///
/// [[tiers]]
/// name = "floor"
/// prefixes = [""]
/// split_by_primary = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierSpec>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// File the serialized moves are also written to
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_tiers() -> Vec<TierSpec> {
    TierConfig::default().tiers
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            delimiter: default_delimiter(),
            output: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| {
            warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: Some(path.to_path_buf()),
                source,
            }
        })?;
        config.validate()?;
        debug!(path = ?path, tiers = config.tiers.len(), "Loaded config");
        Ok(config)
    }

    /// Loads the file if it exists, otherwise the built-in tier table
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                warn!("Config {:?} not found, using built-in tiers", path);
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn tier_config(&self) -> TierConfig {
        TierConfig::new(self.tiers.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        let mut seen = HashSet::new();
        for (idx, tier) in self.tiers.iter().enumerate() {
            if tier.name.trim().is_empty() {
                return Err(ConfigError::UnnamedTier(idx));
            }
            if !seen.insert(tier.name.as_str()) {
                return Err(ConfigError::DuplicateTier(tier.name.clone()));
            }
        }
        Ok(())
    }
}
