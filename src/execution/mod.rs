//! Execution layer contract
//!
//! The strategies never execute anything themselves. They read position
//! snapshots through [`PositionManager`] and answer with [`TradeIntent`]s
//! that the execution framework routes.

pub mod position_manager;
pub mod types;

pub use position_manager::{PositionManager, SnapshotPositionManager};
pub use types::{PositionId, PositionKind, PositionSnapshot, TradeIntent};
