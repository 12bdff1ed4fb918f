//! Single decision cycle command
//!
//! Reads a cycle input file, computes the strategy's indicators over the
//! supplied candles and prints the resulting intents as JSON.

use anyhow::{Context, Result};
use breakout_strategies::execution::{PositionSnapshot, SnapshotPositionManager, TradeIntent};
use breakout_strategies::strategies::{self, StrategyInput};
use breakout_strategies::universe::CandleUniverse;
use breakout_strategies::visualisation::{PlotPoint, RecordingVisualisation};
use breakout_strategies::{Candle, Config, Symbol};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Cycle input file
#[derive(Debug, Deserialize)]
struct CycleFile {
    timestamp: DateTime<Utc>,
    /// Free cash; defaults to the configured initial cash
    #[serde(default)]
    cash: Option<f64>,
    #[serde(default)]
    positions: Vec<PositionSnapshot>,
    /// Candles per pair, stamped with their open time
    candles: HashMap<String, Vec<Candle>>,
    /// How old the latest closed candle may be, in minutes
    #[serde(default)]
    data_delay_tolerance_minutes: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CycleOutput {
    strategy: &'static str,
    timestamp: DateTime<Utc>,
    /// Free cash the cycle started with, in `reserve_asset`
    cash: f64,
    reserve_asset: String,
    trades: Vec<TradeIntent>,
    positions: Vec<PositionSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plots: Option<Vec<PlotPoint>>,
}

pub fn run(
    config_path: String,
    cycle_path: String,
    strategy_override: Option<String>,
    plot: bool,
) -> Result<()> {
    let mut config = Config::from_file(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    if let Some(strategy) = strategy_override {
        info!("Overriding strategy to: {}", strategy);
        config.strategy_name = strategy;
    }

    let contents = std::fs::read_to_string(&cycle_path)
        .with_context(|| format!("Failed to read cycle file {}", cycle_path))?;
    let cycle: CycleFile = serde_json::from_str(&contents).context("Failed to parse cycle JSON")?;

    let output = decide_cycle(&config, cycle, plot)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn decide_cycle(config: &Config, mut cycle: CycleFile, plot: bool) -> Result<CycleOutput> {
    let strategy = strategies::create_strategy(config)?;
    let indicator_set = strategy
        .create_indicators()
        .context("Invalid indicator declaration")?;

    // Pairs are evaluated in configured order
    let candles: Vec<(Symbol, Vec<Candle>)> = config
        .trading
        .pairs
        .iter()
        .map(|pair| {
            let pair_candles = cycle.candles.remove(pair).unwrap_or_else(|| {
                warn!(pair = %pair, "No candles supplied for configured pair");
                Vec::new()
            });
            (Symbol::new(pair.clone()), pair_candles)
        })
        .collect();
    for pair in cycle.candles.keys() {
        warn!(pair = %pair, "Ignoring candles for pair that is not configured");
    }

    let mut universe = CandleUniverse::new(&indicator_set, candles, strategy.candle_time_bucket())
        .context("Failed to compute indicators")?;
    if let Some(minutes) = cycle.data_delay_tolerance_minutes {
        let tolerance = TimeDelta::try_minutes(minutes).with_context(|| {
            format!("data_delay_tolerance_minutes out of range: {minutes}")
        })?;
        universe = universe.with_data_delay_tolerance(tolerance);
    }
    debug!(pairs = universe.pairs().len(), "Universe ready");

    let cash = cycle.cash.unwrap_or(config.trading.initial_cash);
    let view = universe.view_at(cycle.timestamp);
    let mut position_manager = SnapshotPositionManager::new(cash, cycle.positions);
    let mut visualisation = RecordingVisualisation::new();

    let trades = {
        let mut input = StrategyInput::new(&view, &mut position_manager);
        if plot {
            input = input.with_visualisation(&mut visualisation);
        }
        strategy.decide_trades(&mut input)?
    };

    info!(
        strategy = strategy.name(),
        timestamp = %cycle.timestamp,
        trades = trades.len(),
        "Decision cycle complete"
    );

    Ok(CycleOutput {
        strategy: strategy.name(),
        timestamp: cycle.timestamp,
        cash,
        reserve_asset: config.trading.reserve_asset.clone(),
        trades,
        positions: position_manager.into_positions(),
        plots: plot.then(|| visualisation.points().to_vec()),
    })
}
