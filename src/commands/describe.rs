//! Strategy and indicator listing commands

use anyhow::{Context, Result};
use breakout_strategies::strategies;
use breakout_strategies::Config;
use tracing::info;

pub fn list_strategies() -> Result<()> {
    println!("Available strategies:");
    for name in strategies::available_strategies() {
        println!("  - {}", name);
    }
    Ok(())
}

pub fn show_indicators(config_path: String, strategy_override: Option<String>) -> Result<()> {
    let mut config = Config::from_file(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    if let Some(strategy) = strategy_override {
        info!("Overriding strategy to: {}", strategy);
        config.strategy_name = strategy;
    }

    let strategy = strategies::create_strategy(&config)?;
    let indicators = strategy
        .create_indicators()
        .context("Invalid indicator declaration")?;

    println!("\n{}", "=".repeat(60));
    println!(
        "INDICATORS: {} (cycle {}, candles {})",
        strategy.name(),
        strategy.cycle_duration(),
        strategy.candle_time_bucket()
    );
    println!("{}", "=".repeat(60));
    for spec in indicators.resolution_order() {
        println!(
            "  [{}] {:<10} {}",
            spec.order,
            spec.name,
            serde_json::to_string(&spec.kind)?
        );
    }
    println!("{}", "=".repeat(60));

    Ok(())
}
