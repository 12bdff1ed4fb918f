//! Position manager contract and an in-memory snapshot implementation

use tracing::debug;

use crate::error::PositionError;
use crate::execution::types::{PositionId, PositionSnapshot, TradeIntent};
use crate::Symbol;

/// Access to the portfolio owned by the execution framework.
///
/// Queries reflect intents already issued during the current cycle: after
/// `open_spot` a long position counts as open, after closing the credit
/// position it no longer does.
pub trait PositionManager {
    /// Free cash in the reserve currency
    fn current_cash(&self) -> f64;

    fn is_any_long_position_open(&self) -> bool;

    fn is_any_credit_supply_position_open(&self) -> bool;

    fn current_credit_supply_position(&self) -> Option<&PositionSnapshot>;

    /// Open positions, writable so a strategy can switch on trailing stops
    fn open_positions_mut(&mut self) -> &mut [PositionSnapshot];

    fn open_spot(&mut self, pair: &Symbol, value: f64, stop_loss_pct: f64) -> Vec<TradeIntent>;

    fn close_credit_supply_position(
        &mut self,
        position_id: PositionId,
    ) -> Result<Vec<TradeIntent>, PositionError>;

    fn open_credit_supply_position_for_reserves(&mut self, amount: f64) -> Vec<TradeIntent>;
}

/// Position manager over a plain snapshot of cash and open positions.
///
/// Nothing is executed: every call only produces intents and remembers them
/// for the rest of the cycle.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPositionManager {
    cash: f64,
    positions: Vec<PositionSnapshot>,
    pending_spot: Vec<Symbol>,
    pending_credit_supply: bool,
    closed: Vec<PositionId>,
}

impl SnapshotPositionManager {
    pub fn new(cash: f64, positions: Vec<PositionSnapshot>) -> Self {
        Self {
            cash,
            positions,
            ..Default::default()
        }
    }

    pub fn positions(&self) -> &[PositionSnapshot] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<PositionSnapshot> {
        self.positions
    }

    fn is_closed(&self, position_id: PositionId) -> bool {
        self.closed.contains(&position_id)
    }
}

impl PositionManager for SnapshotPositionManager {
    fn current_cash(&self) -> f64 {
        self.cash
    }

    fn is_any_long_position_open(&self) -> bool {
        !self.pending_spot.is_empty() || self.positions.iter().any(|p| p.is_spot())
    }

    fn is_any_credit_supply_position_open(&self) -> bool {
        self.pending_credit_supply || self.current_credit_supply_position().is_some()
    }

    fn current_credit_supply_position(&self) -> Option<&PositionSnapshot> {
        self.positions
            .iter()
            .find(|p| p.is_credit_supply() && !self.is_closed(p.id))
    }

    fn open_positions_mut(&mut self) -> &mut [PositionSnapshot] {
        &mut self.positions
    }

    fn open_spot(&mut self, pair: &Symbol, value: f64, stop_loss_pct: f64) -> Vec<TradeIntent> {
        debug!(pair = %pair, value, stop_loss_pct, "Spot entry requested");
        self.pending_spot.push(pair.clone());
        vec![TradeIntent::OpenSpot {
            pair: pair.clone(),
            value,
            stop_loss_pct,
        }]
    }

    fn close_credit_supply_position(
        &mut self,
        position_id: PositionId,
    ) -> Result<Vec<TradeIntent>, PositionError> {
        let position = self
            .positions
            .iter()
            .find(|p| p.id == position_id)
            .ok_or(PositionError::CreditPositionNotOpen(position_id))?;

        if !position.is_credit_supply() {
            return Err(PositionError::NotCreditSupply(position_id));
        }
        if self.is_closed(position_id) {
            return Err(PositionError::CreditPositionNotOpen(position_id));
        }

        let quantity = position.quantity;
        self.closed.push(position_id);
        debug!(position = %position_id, quantity, "Credit supply withdrawal requested");

        Ok(vec![TradeIntent::CloseCreditSupply {
            position_id,
            quantity,
        }])
    }

    fn open_credit_supply_position_for_reserves(&mut self, amount: f64) -> Vec<TradeIntent> {
        debug!(amount, "Credit supply deposit requested");
        self.pending_credit_supply = true;
        vec![TradeIntent::OpenCreditSupply { amount }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit(id: u64, quantity: f64) -> PositionSnapshot {
        PositionSnapshot::credit_supply(id, Symbol::new("USDC.e"), quantity)
    }

    #[test]
    fn test_empty_portfolio() {
        let pm = SnapshotPositionManager::new(1000.0, vec![]);
        assert_eq!(pm.current_cash(), 1000.0);
        assert!(!pm.is_any_long_position_open());
        assert!(!pm.is_any_credit_supply_position_open());
        assert!(pm.current_credit_supply_position().is_none());
    }

    #[test]
    fn test_open_spot_counts_as_long() {
        let mut pm = SnapshotPositionManager::new(1000.0, vec![]);
        let intents = pm.open_spot(&Symbol::new("WBTC-USDC"), 980.0, 0.98);

        assert_eq!(intents.len(), 1);
        assert!(intents[0].is_entry());
        assert!(pm.is_any_long_position_open());
    }

    #[test]
    fn test_close_credit_supply() {
        let mut pm = SnapshotPositionManager::new(0.0, vec![credit(3, 999.9)]);
        assert!(pm.is_any_credit_supply_position_open());

        let intents = pm.close_credit_supply_position(PositionId(3)).unwrap();
        assert_eq!(
            intents,
            vec![TradeIntent::CloseCreditSupply {
                position_id: PositionId(3),
                quantity: 999.9,
            }]
        );
        assert!(!pm.is_any_credit_supply_position_open());
    }

    #[test]
    fn test_close_credit_twice_is_an_error() {
        let mut pm = SnapshotPositionManager::new(0.0, vec![credit(3, 10.0)]);
        pm.close_credit_supply_position(PositionId(3)).unwrap();
        assert_eq!(
            pm.close_credit_supply_position(PositionId(3)),
            Err(PositionError::CreditPositionNotOpen(PositionId(3)))
        );
    }

    #[test]
    fn test_close_unknown_or_spot_position_is_an_error() {
        let spot = PositionSnapshot::spot(1, Symbol::new("WBTC-USDC"), 100.0, 1.0);
        let mut pm = SnapshotPositionManager::new(0.0, vec![spot]);

        assert_eq!(
            pm.close_credit_supply_position(PositionId(9)),
            Err(PositionError::CreditPositionNotOpen(PositionId(9)))
        );
        assert_eq!(
            pm.close_credit_supply_position(PositionId(1)),
            Err(PositionError::NotCreditSupply(PositionId(1)))
        );
    }

    #[test]
    fn test_deposit_counts_as_credit_open() {
        let mut pm = SnapshotPositionManager::new(100.0, vec![]);
        pm.open_credit_supply_position_for_reserves(99.99);
        assert!(pm.is_any_credit_supply_position_open());
        assert!(!pm.is_any_long_position_open());
    }
}
