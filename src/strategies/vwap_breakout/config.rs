//! VWAP Breakout Configuration

use serde::{Deserialize, Serialize};

use crate::config::{check_fraction, check_length};
use crate::error::ConfigError;
use crate::indicator_set::VwapAnchor;
use crate::CycleDuration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapBreakoutConfig {
    /// Decision cycle (default: 1d)
    pub cycle_duration: CycleDuration,

    /// Candle bucket for indicators (default: 1d)
    pub candle_time_bucket: CycleDuration,

    /// Share of cash put into a new long (default: 0.98)
    pub allocation: f64,

    /// ADX / DMI length (default: 30)
    pub adx_length: usize,

    /// ADX level the trend must exceed to count as bull or bear (default: 0)
    pub adx_filter_threshold: f64,

    /// VWAP accumulation window (default: daily)
    pub vwap_anchor: VwapAnchor,

    /// Fixed stop loss as a fraction of the entry price (default: 0.98)
    pub stop_loss_pct: f64,

    /// Trailing stop distance once activated (default: 0.98)
    pub trailing_stop_loss_pct: f64,

    /// Multiple of the opening price that activates the trailing stop (default: 1.075)
    pub trailing_stop_loss_activation_level: f64,

    /// Share of idle cash supplied to the lending reserve (default: 0.9999)
    pub credit_supply_fraction: f64,
}

impl Default for VwapBreakoutConfig {
    fn default() -> Self {
        Self {
            cycle_duration: CycleDuration::D1,
            candle_time_bucket: CycleDuration::D1,
            allocation: 0.98,
            adx_length: 30,
            adx_filter_threshold: 0.0,
            vwap_anchor: VwapAnchor::Daily,
            stop_loss_pct: 0.98,
            trailing_stop_loss_pct: 0.98,
            trailing_stop_loss_activation_level: 1.075,
            credit_supply_fraction: 0.9999,
        }
    }
}

impl VwapBreakoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("allocation", self.allocation)?;
        check_length("adx_length", self.adx_length)?;
        check_fraction("stop_loss_pct", self.stop_loss_pct)?;
        check_fraction("trailing_stop_loss_pct", self.trailing_stop_loss_pct)?;
        check_fraction("credit_supply_fraction", self.credit_supply_fraction)?;

        if !self.adx_filter_threshold.is_finite() || self.adx_filter_threshold < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "adx_filter_threshold",
                reason: format!("must be a non-negative number, got {}", self.adx_filter_threshold),
            });
        }
        if self.trailing_stop_loss_activation_level.is_nan()
            || self.trailing_stop_loss_activation_level <= 1.0
        {
            return Err(ConfigError::InvalidParameter {
                name: "trailing_stop_loss_activation_level",
                reason: format!(
                    "must be above 1.0, got {}",
                    self.trailing_stop_loss_activation_level
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(VwapBreakoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: VwapBreakoutConfig =
            serde_json::from_value(serde_json::json!({ "adx_filter_threshold": 48.0 })).unwrap();
        assert_eq!(config.adx_filter_threshold, 48.0);
        assert_eq!(config.adx_length, 30);
        assert_eq!(config.cycle_duration, CycleDuration::D1);
    }

    #[test]
    fn test_activation_level_must_exceed_one() {
        let config = VwapBreakoutConfig {
            trailing_stop_loss_activation_level: 0.9,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter {
                name: "trailing_stop_loss_activation_level",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_adx_length_rejected() {
        let config = VwapBreakoutConfig {
            adx_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
