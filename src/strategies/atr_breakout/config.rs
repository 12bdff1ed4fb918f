//! ATR Breakout Configuration

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{check_fraction, check_length};
use crate::error::ConfigError;
use crate::CycleDuration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrBreakoutConfig {
    /// Decision cycle (default: 1h)
    pub cycle_duration: CycleDuration,

    /// Candle bucket for indicators (default: 1h)
    pub candle_time_bucket: CycleDuration,

    /// Share of cash put into a new long (default: 0.98)
    pub allocation: f64,

    /// ADX / DMI length (default: 14)
    pub adx_length: usize,

    /// ADX level the trend must exceed to count as bull or bear (default: 25)
    pub adx_filter_threshold: f64,

    /// Bars the regime column is delayed by (default: 1)
    pub regime_shift: usize,

    /// ATR period (default: 20)
    pub atr_length: usize,

    /// ATR multiple added to the reference price (default: 0.5)
    pub atr_breakout_fraction: f64,

    /// Boundary the decision timestamp is truncated to before the lookback
    /// is applied; `null` uses the timestamp as is (default: 4h)
    pub lag_alignment: Option<CycleDuration>,

    /// Hours between the aligned timestamp and the reference price (default: 4)
    pub lookback_hours: u32,

    /// Fixed stop loss as a fraction of the entry price (default: 0.97)
    pub stop_loss_pct: f64,

    /// Trailing stop distance once activated (default: 0.98)
    pub trailing_stop_loss_pct: f64,

    /// Multiple of the opening price that activates the trailing stop (default: 1.05)
    pub trailing_stop_loss_activation_level: f64,
}

impl Default for AtrBreakoutConfig {
    fn default() -> Self {
        Self {
            cycle_duration: CycleDuration::H1,
            candle_time_bucket: CycleDuration::H1,
            allocation: 0.98,
            adx_length: 14,
            adx_filter_threshold: 25.0,
            regime_shift: 1,
            atr_length: 20,
            atr_breakout_fraction: 0.5,
            lag_alignment: Some(CycleDuration::H4),
            lookback_hours: 4,
            stop_loss_pct: 0.97,
            trailing_stop_loss_pct: 0.98,
            trailing_stop_loss_activation_level: 1.05,
        }
    }
}

impl AtrBreakoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("allocation", self.allocation)?;
        check_length("adx_length", self.adx_length)?;
        check_length("atr_length", self.atr_length)?;
        check_fraction("stop_loss_pct", self.stop_loss_pct)?;
        check_fraction("trailing_stop_loss_pct", self.trailing_stop_loss_pct)?;

        if !self.adx_filter_threshold.is_finite() || self.adx_filter_threshold < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "adx_filter_threshold",
                reason: format!("must be a non-negative number, got {}", self.adx_filter_threshold),
            });
        }
        if !self.atr_breakout_fraction.is_finite() || self.atr_breakout_fraction < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "atr_breakout_fraction",
                reason: format!("must be a non-negative number, got {}", self.atr_breakout_fraction),
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

    /// Time of the reference price for a decision at `timestamp`:
    /// truncated to `lag_alignment`, then moved back `lookback_hours`.
    pub fn reference_time(&self, timestamp: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let aligned = match self.lag_alignment {
            Some(alignment) => timestamp.duration_trunc(alignment.to_timedelta()).ok()?,
            None => timestamp,
        };
        aligned.checked_sub_signed(TimeDelta::hours(i64::from(self.lookback_hours)))
    }
}
