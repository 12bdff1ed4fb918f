//! Position snapshots and trade intents
//!
//! Positions are owned by the execution framework. Strategies read them and
//! answer with intents; the only field a strategy writes is the trailing stop.

use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Position ID assigned by the execution framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(pub u64);

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of exposure a position holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionKind {
    /// Directional spot long
    Spot,
    /// Reserve currency deposited into a lending pool
    CreditSupply,
}

/// Snapshot of one open position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub id: PositionId,
    pub kind: PositionKind,
    /// Traded pair, or the lending reserve for credit supply
    pub pair: Symbol,
    pub opening_price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub stop_loss_pct: Option<f64>,
    #[serde(default)]
    pub trailing_stop_loss_pct: Option<f64>,
}

impl PositionSnapshot {
    pub fn spot(id: u64, pair: Symbol, opening_price: f64, quantity: f64) -> Self {
        Self {
            id: PositionId(id),
            kind: PositionKind::Spot,
            pair,
            opening_price,
            quantity,
            stop_loss_pct: None,
            trailing_stop_loss_pct: None,
        }
    }

    pub fn credit_supply(id: u64, reserve: Symbol, quantity: f64) -> Self {
        Self {
            id: PositionId(id),
            kind: PositionKind::CreditSupply,
            pair: reserve,
            opening_price: 1.0,
            quantity,
            stop_loss_pct: None,
            trailing_stop_loss_pct: None,
        }
    }

    pub fn is_spot(&self) -> bool {
        self.kind == PositionKind::Spot
    }

    pub fn is_credit_supply(&self) -> bool {
        self.kind == PositionKind::CreditSupply
    }
}

/// Instruction for the execution layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TradeIntent {
    /// Buy `value` worth of the pair's base asset, protected by a stop loss
    /// at `stop_loss_pct` of the fill price
    OpenSpot {
        pair: Symbol,
        value: f64,
        stop_loss_pct: f64,
    },
    /// Withdraw a lending deposit back to cash
    CloseCreditSupply {
        position_id: PositionId,
        quantity: f64,
    },
    /// Deposit idle cash into the lending reserve
    OpenCreditSupply { amount: f64 },
    /// Trailing stop switched on for an open spot position
    SetTrailingStop {
        position_id: PositionId,
        pair: Symbol,
        trailing_stop_pct: f64,
    },
}

impl TradeIntent {
    pub fn is_entry(&self) -> bool {
        matches!(self, TradeIntent::OpenSpot { .. })
    }
}
