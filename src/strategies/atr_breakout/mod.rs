//! ATR Breakout Strategy
//!
//! Hourly multi-pair breakout: price clears a lagged reference price by a
//! fraction of ATR while the pair's ADX regime is bull.

mod config;
mod strategy;

pub use config::AtrBreakoutConfig;
pub use strategy::AtrBreakoutStrategy;

use crate::error::ConfigError;
use crate::{Config, Strategy};

pub const STRATEGY_NAME: &str = "atr_breakout";

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>, ConfigError> {
    let strategy_config: AtrBreakoutConfig = config.strategy_params(STRATEGY_NAME)?;
    strategy_config.validate()?;
    Ok(Box::new(AtrBreakoutStrategy::new(strategy_config)))
}
