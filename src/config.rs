//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files. Strategy
//! parameters are kept as raw JSON and parsed by the selected strategy.

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::Symbol;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_strategy_name")]
    pub strategy_name: String,
    #[serde(default = "empty_object")]
    pub strategy: serde_json::Value,
    #[serde(default)]
    pub trading: TradingConfig,
}

fn default_strategy_name() -> String {
    "vwap_breakout".to_string()
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(contents).context("Failed to parse config JSON")?;
        Ok(config)
    }

    /// Parse the `strategy` section into a strategy's parameter type.
    /// Missing keys fall back to the parameter type's serde defaults.
    pub fn strategy_params<T: DeserializeOwned>(
        &self,
        strategy: &'static str,
    ) -> Result<T, ConfigError> {
        serde_json::from_value(self.strategy.clone()).map_err(|e| ConfigError::Parse {
            strategy,
            reason: e.to_string(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strategy_name: default_strategy_name(),
            strategy: empty_object(),
            trading: TradingConfig::default(),
        }
    }
}

/// Trading universe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Traded pairs, in decision order
    pub pairs: Vec<String>,
    /// Currency cash is held in
    pub reserve_asset: String,
    /// Lending reserve idle cash is supplied to
    #[serde(default)]
    pub lending_reserve: Option<String>,
    pub initial_cash: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        TradingConfig {
            pairs: vec!["WBTC-USDC".to_string()],
            reserve_asset: "USDC".to_string(),
            lending_reserve: Some("USDC.e".to_string()),
            initial_cash: 10_000.0,
        }
    }
}

impl TradingConfig {
    pub fn symbols(&self) -> Vec<Symbol> {
        self.pairs.iter().map(|s| Symbol::new(s.clone())).collect()
    }

    /// Every pair listed once; decision order is the listed order
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pair) = self.pairs.iter().duplicates().next() {
            return Err(ConfigError::InvalidParameter {
                name: "pairs",
                reason: format!("'{pair}' is listed more than once"),
            });
        }
        Ok(())
    }
}

/// Require `value` to lie in `(0, 1]`
pub(crate) fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be in (0, 1], got {value}"),
        })
    }
}

/// Require a non-zero indicator length
pub(crate) fn check_length(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: "must be at least 1".to_string(),
        })
    }
}
