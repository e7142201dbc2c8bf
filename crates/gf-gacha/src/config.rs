//! Gacha engine configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use gf_core::{GfError, GfResult};

use crate::ledger::DEFAULT_MAX_HISTORY;
use crate::rarity::RarityTable;

/// Where the session runs; selects the batch ceiling and the report label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Self-contained session on the player's machine
    #[default]
    Local,
    /// Session hosted by a service (larger batches for load testing)
    Server,
}

impl SessionMode {
    pub fn label(self) -> &'static str {
        match self {
            SessionMode::Local => "Local mode",
            SessionMode::Server => "Server mode",
        }
    }
}

/// Draw and history limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PullLimits {
    /// Largest batch in local mode
    pub max_batch_local: u32,
    /// Largest batch in server mode
    pub max_batch_server: u32,
    /// History cap; exceeding it keeps the newest half
    pub max_history: usize,
    /// Default number of records returned from a batch
    pub max_return_results: usize,
    /// Recent entries included in the exported report
    pub recent_history: usize,
}

impl Default for PullLimits {
    fn default() -> Self {
        Self {
            max_batch_local: 10_000,
            max_batch_server: 100_000,
            max_history: DEFAULT_MAX_HISTORY,
            max_return_results: 100,
            recent_history: 50,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GachaConfig {
    /// Tiers and pity parameters
    pub rarity: RarityTable,
    /// Chance that a top-tier draw is taken from the featured subset
    pub featured_rate: f64,
    /// Batch and history limits
    pub limits: PullLimits,
    /// Session mode
    pub mode: SessionMode,
}

impl Default for GachaConfig {
    fn default() -> Self {
        Self {
            rarity: RarityTable::default(),
            featured_rate: 0.5,
            limits: PullLimits::default(),
            mode: SessionMode::Local,
        }
    }
}

impl GachaConfig {
    /// Service-hosted preset
    pub fn server() -> Self {
        Self {
            mode: SessionMode::Server,
            ..Self::default()
        }
    }

    /// Batch ceiling for the configured mode
    pub fn max_batch(&self) -> u32 {
        match self.mode {
            SessionMode::Local => self.limits.max_batch_local,
            SessionMode::Server => self.limits.max_batch_server,
        }
    }

    pub fn validate(&self) -> GfResult<()> {
        self.rarity.validate()?;

        if !(0.0..=1.0).contains(&self.featured_rate) {
            return Err(GfError::InvalidConfig(format!(
                "Featured rate out of range: {}",
                self.featured_rate
            )));
        }
        if self.limits.max_history < 2 {
            return Err(GfError::InvalidConfig(
                "History cap must be at least 2".to_string(),
            ));
        }
        if self.max_batch() == 0 {
            return Err(GfError::InvalidConfig(
                "Batch ceiling must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> GfResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GfError::InvalidConfig(format!("Invalid JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> GfResult<Self> {
        let config: Self = serde_yml::from_str(yaml)
            .map_err(|e| GfError::InvalidConfig(format!("Invalid YAML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the format by extension (YAML for .yml/.yaml)
    pub fn load<P: AsRef<Path>>(path: P) -> GfResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yml") | Some("yaml") => Self::from_yaml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Export config as JSON
    pub fn to_json(&self) -> GfResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
