//! ATR Breakout Strategy - per pair loop
//!
//! Breakout level: close at the reference time + ATR * atr_breakout_fraction
//! Entry: bull regime, close above the breakout level, no long open anywhere
//! Exit: fixed stop loss, later a trailing stop once the activation level is hit

use tracing::{debug, info, warn};

use crate::error::{IndicatorError, PositionError};
use crate::execution::TradeIntent;
use crate::indicator_set::{IndicatorKind, IndicatorSet, IndicatorSource, IndicatorSpec};
use crate::regime::Regime;
use crate::strategies::trailing_stop::TrailingStopRule;
use crate::strategies::{Strategy, StrategyInput};
use crate::visualisation::PlotKind;
use crate::CycleDuration;

use super::config::AtrBreakoutConfig;
use super::STRATEGY_NAME;

pub const ATR: &str = "atr";
pub const ADX: &str = "adx";
pub const REGIME: &str = "regime";

pub struct AtrBreakoutStrategy {
    config: AtrBreakoutConfig,
    trailing_stop: TrailingStopRule,
}

impl AtrBreakoutStrategy {
    pub fn new(config: AtrBreakoutConfig) -> Self {
        let trailing_stop = TrailingStopRule {
            activation_level: config.trailing_stop_loss_activation_level,
            trailing_stop_pct: config.trailing_stop_loss_pct,
        };
        Self {
            config,
            trailing_stop,
        }
    }

    pub fn config(&self) -> &AtrBreakoutConfig {
        &self.config
    }
}

impl Strategy for AtrBreakoutStrategy {
    fn name(&self) -> &'static str {
        STRATEGY_NAME
    }

    fn cycle_duration(&self) -> CycleDuration {
        self.config.cycle_duration
    }

    fn candle_time_bucket(&self) -> CycleDuration {
        self.config.candle_time_bucket
    }

    fn create_indicators(&self) -> Result<IndicatorSet, IndicatorError> {
        let mut indicators = IndicatorSet::new();

        indicators.add(IndicatorSpec::new(
            ATR,
            IndicatorKind::Atr {
                length: self.config.atr_length,
            },
            IndicatorSource::Ohlcv,
        ))?;

        indicators.add(
            IndicatorSpec::new(
                ADX,
                IndicatorKind::Adx {
                    length: self.config.adx_length,
                },
                IndicatorSource::Ohlcv,
            )
            .with_order(1),
        )?;

        // Shifted so the label used at a bar comes from completed bars only
        indicators.add(
            IndicatorSpec::new(
                REGIME,
                IndicatorKind::Regime {
                    length: self.config.adx_length,
                    threshold: self.config.adx_filter_threshold,
                    shift: self.config.regime_shift,
                },
                IndicatorSource::Ohlcv,
            )
            .with_order(2),
        )?;

        Ok(indicators)
    }

    fn decide_trades(
        &self,
        input: &mut StrategyInput<'_>,
    ) -> Result<Vec<TradeIntent>, PositionError> {
        let indicators = input.indicators;
        let timestamp = input.timestamp();

        let Some(reference_time) = self.config.reference_time(timestamp) else {
            warn!(%timestamp, "Reference time out of range, skipping cycle");
            return Ok(vec![]);
        };

        let mut trades = self.trailing_stop.apply_to_open_positions(input);
        let cash = input.position_manager.current_cash();

        for pair in indicators.pairs() {
            let close_price = indicators.price(Some(pair), None);
            let reference_price = indicators.price(Some(pair), Some(reference_time));
            let atr = indicators.indicator_value(ATR, Some(pair));

            let (Some(close_price), Some(reference_price), Some(atr)) =
                (close_price, reference_price, atr)
            else {
                debug!(
                    pair = %pair,
                    ?close_price,
                    ?reference_price,
                    ?atr,
                    "Not enough history, skipping pair"
                );
                continue;
            };

            let breakout_level = reference_price + atr * self.config.atr_breakout_fraction;
            let regime = Regime::from_indicator(indicators.indicator_value(REGIME, Some(pair)));

            debug!(
                pair = %pair,
                %regime,
                close_price,
                breakout_level,
                %reference_time,
                "Decision cycle"
            );

            if !input.position_manager.is_any_long_position_open()
                && regime == Regime::Bull
                && close_price > breakout_level
            {
                let value = cash * self.config.allocation;
                if value > 0.0 {
                    info!(pair = %pair, value, close_price, breakout_level, "ATR breakout entry");
                    trades.extend(input.position_manager.open_spot(
                        pair,
                        value,
                        self.config.stop_loss_pct,
                    ));
                }
            }

            input.plot_indicator(
                "Breakout level",
                PlotKind::TechnicalIndicatorOnPrice,
                breakout_level,
                Some(pair),
            );
        }

        Ok(trades)
    }
}
