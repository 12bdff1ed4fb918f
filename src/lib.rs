//! Breakout Strategies
//!
//! ADX regime filtered breakout strategies for an external backtesting and
//! live execution framework. The framework runs the cycle loop, owns the
//! portfolio and executes orders; this crate supplies:
//!
//! - **Indicator declarations** ([`IndicatorSet`]) with their dependency order
//! - **Regime classification** ([`regime`]) from ADX, +DI and -DI
//! - **Decision functions** ([`Strategy::decide_trades`]) turning indicator
//!   values and position snapshots into ordered [`TradeIntent`]s
//!
//! Two strategies are registered:
//! - `vwap_breakout`: daily close above VWAP in a bull regime, idle cash lent out
//! - `atr_breakout`: hourly multi-pair breakout over a lagged price plus ATR
//!
//! ## Example
//! ```no_run
//! use breakout_strategies::execution::SnapshotPositionManager;
//! use breakout_strategies::strategies::{create_strategy, StrategyInput};
//! use breakout_strategies::universe::StaticIndicators;
//! use breakout_strategies::{Config, Symbol};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_file("configs/wbtc_vwap_breakout_1d.json")?;
//!     let strategy = create_strategy(&config)?;
//!
//!     let pair = Symbol::new("WBTC-USDC");
//!     let indicators = StaticIndicators::new(chrono::Utc::now(), vec![pair.clone()])
//!         .with_price(&pair, 105.0)
//!         .with_indicator(&pair, "vwap", 100.0)
//!         .with_indicator(&pair, "regime", 1.0);
//!     let mut positions = SnapshotPositionManager::new(10_000.0, vec![]);
//!
//!     let mut input = StrategyInput::new(&indicators, &mut positions);
//!     let trades = strategy.decide_trades(&mut input)?;
//!     println!("{trades:?}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod indicator_set;
pub mod indicators;
pub mod regime;
pub mod strategies;
pub mod types;
pub mod universe;
pub mod visualisation;

pub use config::Config;
pub use error::{ConfigError, IndicatorError, PositionError};
pub use execution::{PositionManager, PositionSnapshot, TradeIntent};
pub use indicator_set::IndicatorSet;
pub use regime::Regime;
pub use strategies::Strategy;
pub use types::*;
