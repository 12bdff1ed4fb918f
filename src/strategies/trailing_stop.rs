//! Trailing stop activation shared by the breakout strategies
//!
//! A spot position starts with a fixed stop loss. Once price has run far
//! enough above the opening price the position gets a trailing stop, once.
//! An activated trailing stop is never changed or removed here.

use tracing::info;

use crate::execution::{PositionSnapshot, TradeIntent};
use crate::universe::IndicatorProvider;

use super::StrategyInput;

/// When and how tight the trailing stop is switched on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingStopRule {
    /// Multiple of the opening price that activates the trailing stop
    pub activation_level: f64,
    /// Trailing stop distance as a fraction of the running high
    pub trailing_stop_pct: f64,
}

impl TrailingStopRule {
    /// Switch on the trailing stop of `position` if `price` reached the
    /// activation level. Only untrailed spot positions qualify.
    pub fn apply(&self, position: &mut PositionSnapshot, price: f64) -> Option<TradeIntent> {
        if !position.is_spot() || position.trailing_stop_loss_pct.is_some() {
            return None;
        }
        if price < position.opening_price * self.activation_level {
            return None;
        }

        position.trailing_stop_loss_pct = Some(self.trailing_stop_pct);
        info!(
            position = %position.id,
            pair = %position.pair,
            price,
            opening_price = position.opening_price,
            trailing_stop_pct = self.trailing_stop_pct,
            "Trailing stop activated"
        );

        Some(TradeIntent::SetTrailingStop {
            position_id: position.id,
            pair: position.pair.clone(),
            trailing_stop_pct: self.trailing_stop_pct,
        })
    }

    /// Run [`apply`](Self::apply) over every open position, priced with the
    /// position's own pair. Positions without a current price are skipped.
    pub fn apply_to_open_positions(&self, input: &mut StrategyInput<'_>) -> Vec<TradeIntent> {
        let indicators: &dyn IndicatorProvider = input.indicators;

        input
            .position_manager
            .open_positions_mut()
            .iter_mut()
            .filter_map(|position| {
                let price = indicators.price(Some(&position.pair), None)?;
                self.apply(position, price)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{PositionId, SnapshotPositionManager};
    use crate::universe::StaticIndicators;
    use crate::Symbol;
    use chrono::Utc;
    use proptest::prelude::*;

    const RULE: TrailingStopRule = TrailingStopRule {
        activation_level: 1.075,
        trailing_stop_pct: 0.98,
    };

    fn spot(opening_price: f64) -> PositionSnapshot {
        PositionSnapshot::spot(1, Symbol::new("WBTC-USDC"), opening_price, 1.0)
    }

    #[test]
    fn test_activates_at_level() {
        let mut position = spot(100.0);
        let intent = RULE.apply(&mut position, 107.6);

        assert_eq!(position.trailing_stop_loss_pct, Some(0.98));
        assert_eq!(
            intent,
            Some(TradeIntent::SetTrailingStop {
                position_id: PositionId(1),
                pair: Symbol::new("WBTC-USDC"),
                trailing_stop_pct: 0.98,
            })
        );
    }

    #[test]
    fn test_below_level_does_nothing() {
        let mut position = spot(100.0);
        assert!(RULE.apply(&mut position, 107.0).is_none());
        assert!(position.trailing_stop_loss_pct.is_none());
    }

    #[test]
    fn test_activates_only_once() {
        let mut position = spot(100.0);
        assert!(RULE.apply(&mut position, 110.0).is_some());

        let tighter = TrailingStopRule {
            activation_level: 1.0,
            trailing_stop_pct: 0.5,
        };
        assert!(tighter.apply(&mut position, 200.0).is_none());
        assert_eq!(position.trailing_stop_loss_pct, Some(0.98));
    }

    #[test]
    fn test_credit_positions_are_ignored() {
        let mut credit = PositionSnapshot::credit_supply(2, Symbol::new("USDC.e"), 100.0);
        assert!(RULE.apply(&mut credit, 1_000.0).is_none());
    }

    #[test]
    fn test_apply_to_open_positions_uses_position_pair_price() {
        let eth = Symbol::new("ETH-USDC");
        let btc = Symbol::new("WBTC-USDC");
        let positions = vec![
            PositionSnapshot::spot(1, eth.clone(), 2000.0, 1.0),
            PositionSnapshot::spot(2, btc.clone(), 60000.0, 0.1),
        ];
        let indicators = StaticIndicators::new(Utc::now(), vec![eth.clone(), btc.clone()])
            .with_price(&eth, 2200.0)
            .with_price(&btc, 60500.0);
        let mut pm = SnapshotPositionManager::new(0.0, positions);

        let intents = {
            let mut input = StrategyInput::new(&indicators, &mut pm);
            RULE.apply_to_open_positions(&mut input)
        };

        assert_eq!(intents.len(), 1);
        assert_eq!(pm.positions()[0].trailing_stop_loss_pct, Some(0.98));
        assert!(pm.positions()[1].trailing_stop_loss_pct.is_none());
    }

    #[test]
    fn test_missing_price_skips_position() {
        let eth = Symbol::new("ETH-USDC");
        let indicators = StaticIndicators::new(Utc::now(), vec![eth.clone()]);
        let mut pm = SnapshotPositionManager::new(0.0, vec![PositionSnapshot::spot(1, eth, 1.0, 1.0)]);

        let mut input = StrategyInput::new(&indicators, &mut pm);
        assert!(RULE.apply_to_open_positions(&mut input).is_empty());
    }

    proptest! {
        #[test]
        fn prop_activation_matches_level(
            opening in 1.0f64..100_000.0,
            ratio in 0.5f64..2.0,
        ) {
            let mut position = spot(opening);
            let price = opening * ratio;
            let activated = RULE.apply(&mut position, price).is_some();
            prop_assert_eq!(activated, price >= opening * RULE.activation_level);
            prop_assert_eq!(position.trailing_stop_loss_pct.is_some(), activated);
        }
    }
}
