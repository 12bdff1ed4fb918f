//! VWAP Breakout Strategy - single pair with lending reserve
//!
//! Entry: bull regime and close above VWAP, funded by withdrawing the
//! lending deposit first
//! Exit: fixed stop loss, later a trailing stop once the activation level is hit
//! Idle: all cash supplied to the lending reserve

use tracing::{debug, info, warn};

use crate::error::{IndicatorError, PositionError};
use crate::execution::TradeIntent;
use crate::indicator_set::{IndicatorKind, IndicatorSet, IndicatorSource, IndicatorSpec};
use crate::regime::Regime;
use crate::strategies::trailing_stop::TrailingStopRule;
use crate::strategies::{Strategy, StrategyInput};
use crate::visualisation::PlotKind;
use crate::CycleDuration;

use super::config::VwapBreakoutConfig;
use super::STRATEGY_NAME;

pub const VWAP: &str = "vwap";
pub const ADX: &str = "adx";
pub const REGIME: &str = "regime";

pub struct VwapBreakoutStrategy {
    config: VwapBreakoutConfig,
    trailing_stop: TrailingStopRule,
}

impl VwapBreakoutStrategy {
    pub fn new(config: VwapBreakoutConfig) -> Self {
        let trailing_stop = TrailingStopRule {
            activation_level: config.trailing_stop_loss_activation_level,
            trailing_stop_pct: config.trailing_stop_loss_pct,
        };
        Self {
            config,
            trailing_stop,
        }
    }

    pub fn config(&self) -> &VwapBreakoutConfig {
        &self.config
    }
}

impl Strategy for VwapBreakoutStrategy {
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
            VWAP,
            IndicatorKind::Vwap {
                anchor: self.config.vwap_anchor,
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

        // Reads the ADX table, so it has to run after it
        indicators.add(
            IndicatorSpec::new(
                REGIME,
                IndicatorKind::Regime {
                    length: self.config.adx_length,
                    threshold: self.config.adx_filter_threshold,
                    shift: 0,
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

        let Some(pair) = indicators.single_pair().cloned() else {
            warn!(
                pairs = indicators.pairs().len(),
                "vwap_breakout trades exactly one pair, skipping cycle"
            );
            return Ok(vec![]);
        };

        let close_price = indicators.price(Some(&pair), None);
        let vwap = indicators.indicator_value(VWAP, Some(&pair));

        let (Some(close_price), Some(vwap)) = (close_price, vwap) else {
            debug!(pair = %pair, ?close_price, ?vwap, "Not enough history, no decision");
            return Ok(vec![]);
        };

        let regime = Regime::from_indicator(indicators.indicator_value(REGIME, Some(&pair)));
        let mut cash = input.position_manager.current_cash();

        debug!(
            pair = %pair,
            %regime,
            close_price,
            vwap,
            cash,
            "Decision cycle"
        );

        let mut trades = Vec::new();

        if !input.position_manager.is_any_long_position_open() {
            if regime == Regime::Bull && close_price > vwap {
                // Withdraw the lending deposit to fund the entry
                let credit = input
                    .position_manager
                    .current_credit_supply_position()
                    .map(|p| (p.id, p.quantity));
                if let Some((position_id, quantity)) = credit {
                    trades.extend(
                        input
                            .position_manager
                            .close_credit_supply_position(position_id)?,
                    );
                    cash = quantity;
                }

                let value = cash * self.config.allocation;
                if value > 0.0 {
                    info!(pair = %pair, value, close_price, vwap, "VWAP breakout entry");
                    trades.extend(input.position_manager.open_spot(
                        &pair,
                        value,
                        self.config.stop_loss_pct,
                    ));
                }
            }
        } else {
            trades.extend(self.trailing_stop.apply_to_open_positions(input));
        }

        if !input.position_manager.is_any_credit_supply_position_open()
            && !input.position_manager.is_any_long_position_open()
        {
            let amount = cash * self.config.credit_supply_fraction;
            if amount > 0.0 {
                debug!(amount, "Supplying idle cash to lending reserve");
                trades.extend(
                    input
                        .position_manager
                        .open_credit_supply_position_for_reserves(amount),
                );
            }
        }

        input.plot_indicator("VWAP", PlotKind::TechnicalIndicatorOnPrice, vwap, Some(&pair));

        Ok(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{PositionId, PositionSnapshot, SnapshotPositionManager};
    use crate::universe::StaticIndicators;
    use crate::visualisation::RecordingVisualisation;
    use crate::Symbol;
    use approx::assert_relative_eq;
    use chrono::{DateTime, TimeZone, Utc};

    fn pair() -> Symbol {
        Symbol::new("WBTC-USDC")
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
    }

    fn strategy() -> VwapBreakoutStrategy {
        VwapBreakoutStrategy::new(VwapBreakoutConfig {
            adx_filter_threshold: 48.0,
            stop_loss_pct: 0.97,
            ..Default::default()
        })
    }

    fn indicators(close: f64, vwap: f64, regime: Regime) -> StaticIndicators {
        StaticIndicators::new(ts(), vec![pair()])
            .with_price(&pair(), close)
            .with_indicator(&pair(), VWAP, vwap)
            .with_indicator(&pair(), REGIME, regime.to_value())
    }

    fn decide(
        strategy: &VwapBreakoutStrategy,
        indicators: &StaticIndicators,
        pm: &mut SnapshotPositionManager,
    ) -> Vec<TradeIntent> {
        let mut input = StrategyInput::new(indicators, pm);
        strategy.decide_trades(&mut input).unwrap()
    }

    #[test]
    fn test_indicator_declaration_order() {
        let set = strategy().create_indicators().unwrap();
        let names: Vec<_> = set.resolution_order().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["vwap", "adx", "regime"]);
        assert_eq!(
            set.get(REGIME).unwrap().kind,
            IndicatorKind::Regime {
                length: 30,
                threshold: 48.0,
                shift: 0
            }
        );
    }

    #[test]
    fn test_bull_breakout_opens_spot() {
        let regime = crate::regime::classify(50.0, 30.0, 10.0, 48.0);
        assert_eq!(regime, Regime::Bull);

        let mut pm = SnapshotPositionManager::new(10_000.0, vec![]);
        let trades = decide(&strategy(), &indicators(105.0, 100.0, regime), &mut pm);

        assert_eq!(trades.len(), 1);
        match &trades[0] {
            TradeIntent::OpenSpot {
                pair: p,
                value,
                stop_loss_pct,
            } => {
                assert_eq!(p, &pair());
                assert_relative_eq!(*value, 9800.0, epsilon = 1e-9);
                assert_relative_eq!(*stop_loss_pct, 0.97);
            }
            other => panic!("unexpected intent {other:?}"),
        }
    }

    #[test]
    fn test_crab_sweeps_cash_to_credit() {
        let mut pm = SnapshotPositionManager::new(10_000.0, vec![]);
        let trades = decide(&strategy(), &indicators(105.0, 100.0, Regime::Crab), &mut pm);

        assert_eq!(trades.len(), 1);
        match trades[0] {
            TradeIntent::OpenCreditSupply { amount } => assert_relative_eq!(amount, 9999.0, epsilon = 1e-6),
            ref other => panic!("unexpected intent {other:?}"),
        }
    }

    #[test]
    fn test_weak_trend_is_crab_and_does_not_enter() {
        let regime = crate::regime::classify(40.0, 30.0, 10.0, 48.0);
        assert_eq!(regime, Regime::Crab);

        let mut pm = SnapshotPositionManager::new(10_000.0, vec![]);
        let trades = decide(&strategy(), &indicators(105.0, 100.0, regime), &mut pm);
        assert!(trades.iter().all(|t| !t.is_entry()));
    }

    #[test]
    fn test_close_below_vwap_does_not_enter() {
        let mut pm = SnapshotPositionManager::new(0.0, vec![PositionSnapshot::credit_supply(
            5,
            Symbol::new("USDC.e"),
            9999.0,
        )]);
        let trades = decide(&strategy(), &indicators(99.0, 100.0, Regime::Bull), &mut pm);
        assert!(trades.is_empty());
    }

    #[test]
    fn test_entry_unwinds_credit_first() {
        let mut pm = SnapshotPositionManager::new(1.0, vec![PositionSnapshot::credit_supply(
            5,
            Symbol::new("USDC.e"),
            9999.0,
        )]);
        let trades = decide(&strategy(), &indicators(105.0, 100.0, Regime::Bull), &mut pm);

        assert_eq!(trades.len(), 2);
        assert_eq!(
            trades[0],
            TradeIntent::CloseCreditSupply {
                position_id: PositionId(5),
                quantity: 9999.0,
            }
        );
        match &trades[1] {
            TradeIntent::OpenSpot { value, .. } => assert_relative_eq!(*value, 9999.0 * 0.98, epsilon = 1e-9),
            other => panic!("unexpected intent {other:?}"),
        }
    }

    #[test]
    fn test_missing_vwap_or_price_is_no_action() {
        let mut pm = SnapshotPositionManager::new(10_000.0, vec![]);
        let no_vwap = StaticIndicators::new(ts(), vec![pair()])
            .with_price(&pair(), 105.0)
            .with_indicator(&pair(), REGIME, 1.0);
        assert!(decide(&strategy(), &no_vwap, &mut pm).is_empty());

        let no_price = StaticIndicators::new(ts(), vec![pair()])
            .with_indicator(&pair(), VWAP, 100.0)
            .with_indicator(&pair(), REGIME, 1.0);
        assert!(decide(&strategy(), &no_price, &mut pm).is_empty());
    }

    #[test]
    fn test_missing_regime_defaults_to_crab() {
        let mut pm = SnapshotPositionManager::new(10_000.0, vec![]);
        let indicators = StaticIndicators::new(ts(), vec![pair()])
            .with_price(&pair(), 105.0)
            .with_indicator(&pair(), VWAP, 100.0);
        let trades = decide(&strategy(), &indicators, &mut pm);

        assert!(trades.iter().all(|t| !t.is_entry()));
        assert!(matches!(trades[0], TradeIntent::OpenCreditSupply { .. }));
    }

    #[test]
    fn test_open_long_gets_trailing_stop_once() {
        let position = PositionSnapshot::spot(1, pair(), 100.0, 98.0);
        let mut pm = SnapshotPositionManager::new(0.0, vec![position]);
        let strategy = strategy();

        let trades = decide(&strategy, &indicators(108.0, 100.0, Regime::Bull), &mut pm);
        assert_eq!(
            trades,
            vec![TradeIntent::SetTrailingStop {
                position_id: PositionId(1),
                pair: pair(),
                trailing_stop_pct: 0.98,
            }]
        );

        let trades = decide(&strategy, &indicators(120.0, 100.0, Regime::Bull), &mut pm);
        assert!(trades.is_empty());
        assert_eq!(pm.positions()[0].trailing_stop_loss_pct, Some(0.98));
    }

    #[test]
    fn test_open_long_blocks_sweep_and_entry() {
        let position = PositionSnapshot::spot(1, pair(), 100.0, 98.0);
        let mut pm = SnapshotPositionManager::new(200.0, vec![position]);
        let trades = decide(&strategy(), &indicators(101.0, 100.0, Regime::Bull), &mut pm);
        assert!(trades.is_empty());
    }

    #[test]
    fn test_multi_pair_universe_is_skipped() {
        let mut pm = SnapshotPositionManager::new(10_000.0, vec![]);
        let indicators = StaticIndicators::new(ts(), vec![pair(), Symbol::new("ETH-USDC")]);
        assert!(decide(&strategy(), &indicators, &mut pm).is_empty());
    }

    #[test]
    fn test_vwap_is_plotted() {
        let mut pm = SnapshotPositionManager::new(10_000.0, vec![]);
        let mut vis = RecordingVisualisation::new();
        let indicators = indicators(105.0, 100.0, Regime::Bear);

        let mut input = StrategyInput::new(&indicators, &mut pm).with_visualisation(&mut vis);
        strategy().decide_trades(&mut input).unwrap();

        let points: Vec<_> = vis.series("VWAP").collect();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 100.0);
        assert_eq!(points[0].timestamp, ts());
    }

    #[test]
    fn test_same_inputs_same_intents() {
        let strategy = strategy();
        let indicators = indicators(105.0, 100.0, Regime::Bull);
        let positions = vec![PositionSnapshot::credit_supply(5, Symbol::new("USDC.e"), 5000.0)];

        let mut first = SnapshotPositionManager::new(0.0, positions.clone());
        let mut second = SnapshotPositionManager::new(0.0, positions);
        assert_eq!(
            decide(&strategy, &indicators, &mut first),
            decide(&strategy, &indicators, &mut second)
        );
    }
}
