//! VWAP Breakout Strategy
//!
//! Daily breakout above VWAP, filtered by the ADX regime. Idle cash sits in
//! a lending reserve and is withdrawn when a long entry fires.

mod config;
mod strategy;

pub use config::VwapBreakoutConfig;
pub use strategy::VwapBreakoutStrategy;

use crate::error::ConfigError;
use crate::{Config, Strategy};

pub const STRATEGY_NAME: &str = "vwap_breakout";

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>, ConfigError> {
    // Idle cash is always swept into the lending reserve
    if config.trading.lending_reserve.is_none() {
        return Err(ConfigError::InvalidParameter {
            name: "lending_reserve",
            reason: format!("{STRATEGY_NAME} needs a lending reserve for idle cash"),
        });
    }

    let strategy_config: VwapBreakoutConfig = config.strategy_params(STRATEGY_NAME)?;
    strategy_config.validate()?;
    Ok(Box::new(VwapBreakoutStrategy::new(strategy_config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_from_default_config() {
        let strategy = create(&Config::default()).unwrap();
        assert_eq!(strategy.name(), STRATEGY_NAME);
    }

    #[test]
    fn test_create_requires_lending_reserve() {
        let config = Config::from_json(
            r#"{
                "strategy_name": "vwap_breakout",
                "trading": {
                    "pairs": ["WBTC-USDC"],
                    "reserve_asset": "USDC",
                    "lending_reserve": null,
                    "initial_cash": 10000.0
                }
            }"#,
        )
        .unwrap();

        assert!(matches!(
            create(&config).err(),
            Some(ConfigError::InvalidParameter {
                name: "lending_reserve",
                ..
            })
        ));
    }
}
