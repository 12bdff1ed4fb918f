//! Trading Strategies Module
//!
//! Strategy framework with:
//! - Trait interface every strategy implements
//! - Per-cycle input bundle handed over by the scheduler
//! - Dynamic strategy registry (no hardcoded names at call sites)

pub mod atr_breakout;
pub mod trailing_stop;
pub mod vwap_breakout;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::error::{ConfigError, IndicatorError, PositionError};
use crate::execution::{PositionManager, TradeIntent};
use crate::indicator_set::IndicatorSet;
use crate::universe::IndicatorProvider;
use crate::visualisation::{PlotKind, Visualisation};
use crate::{Config, CycleDuration, Symbol};

// =============================================================================
// Strategy Input - everything a decision cycle may read or touch
// =============================================================================

/// Inputs of one decision cycle
pub struct StrategyInput<'a> {
    pub indicators: &'a dyn IndicatorProvider,
    pub position_manager: &'a mut dyn PositionManager,
    pub visualisation: Option<&'a mut dyn Visualisation>,
}

impl<'a> StrategyInput<'a> {
    pub fn new(
        indicators: &'a dyn IndicatorProvider,
        position_manager: &'a mut dyn PositionManager,
    ) -> Self {
        Self {
            indicators,
            position_manager,
            visualisation: None,
        }
    }

    pub fn with_visualisation(mut self, visualisation: &'a mut dyn Visualisation) -> Self {
        self.visualisation = Some(visualisation);
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.indicators.timestamp()
    }

    /// Plot a value if a visualisation sink is attached
    pub fn plot_indicator(&mut self, label: &str, kind: PlotKind, value: f64, pair: Option<&Symbol>) {
        let timestamp = self.timestamp();
        if let Some(vis) = self.visualisation.as_deref_mut() {
            vis.plot_indicator(timestamp, label, kind, value, pair);
        }
    }
}

// =============================================================================
// Strategy Trait - The contract all strategies must implement
// =============================================================================

/// Trading strategy trait.
///
/// Strategies hold only their parameters; all state lives with the
/// collaborators in [`StrategyInput`].
pub trait Strategy: Send + Sync {
    /// Strategy identifier (must match config's strategy_name)
    fn name(&self) -> &'static str;

    /// How often the scheduler calls `decide_trades`
    fn cycle_duration(&self) -> CycleDuration;

    /// Candle bucket the indicators are computed on
    fn candle_time_bucket(&self) -> CycleDuration {
        self.cycle_duration()
    }

    /// Indicators the strategy reads, with their dependency order
    fn create_indicators(&self) -> Result<IndicatorSet, IndicatorError>;

    /// Decide the trades of one cycle. The returned list is ordered and is
    /// identical for identical inputs.
    fn decide_trades(
        &self,
        input: &mut StrategyInput<'_>,
    ) -> Result<Vec<TradeIntent>, PositionError>;
}

// =============================================================================
// Strategy Factory - Type alias for strategy constructor functions
// =============================================================================

/// Factory function type for creating strategies from config
pub type StrategyFactory = fn(&Config) -> Result<Box<dyn Strategy>, ConfigError>;

// =============================================================================
// Strategy Registry - Dynamic registration without hardcoding
// =============================================================================

/// Global strategy registry
static REGISTRY: OnceLock<RwLock<HashMap<&'static str, StrategyFactory>>> = OnceLock::new();

fn get_registry() -> &'static RwLock<HashMap<&'static str, StrategyFactory>> {
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert(
            vwap_breakout::STRATEGY_NAME,
            vwap_breakout::create as StrategyFactory,
        );
        map.insert(
            atr_breakout::STRATEGY_NAME,
            atr_breakout::create as StrategyFactory,
        );
        RwLock::new(map)
    })
}

/// Create a strategy from configuration
pub fn create_strategy(config: &Config) -> Result<Box<dyn Strategy>, ConfigError> {
    config.trading.validate()?;

    let factory = {
        let registry = get_registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match registry.get(config.strategy_name.as_str()) {
            Some(factory) => *factory,
            None => {
                let mut available: Vec<_> = registry.keys().copied().collect();
                available.sort_unstable();
                return Err(ConfigError::UnknownStrategy {
                    name: config.strategy_name.clone(),
                    available: available.join(", "),
                });
            }
        }
    };

    factory(config)
}

/// Get list of available strategy names, sorted
pub fn available_strategies() -> Vec<&'static str> {
    let mut names: Vec<_> = get_registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .copied()
        .collect();
    names.sort_unstable();
    names
}

/// Register a new strategy (for plugins or testing)
pub fn register_strategy(name: &'static str, factory: StrategyFactory) {
    get_registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name, factory);
}
