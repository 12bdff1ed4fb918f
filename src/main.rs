//! Breakout strategies - main entry point
//!
//! This binary provides three subcommands:
//! - strategies: List registered strategies
//! - indicators: Show the indicator declaration of a configured strategy
//! - decide: Run one decision cycle over a cycle input file

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "breakout-strategies")]
#[command(about = "ADX regime filtered breakout strategies", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available strategies
    Strategies,

    /// Print the indicators a strategy declares, in resolution order
    Indicators {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/wbtc_vwap_breakout_1d.json")]
        config: String,

        /// Strategy name (overrides config file)
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Run one decision cycle and print the trade intents as JSON
    Decide {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/wbtc_vwap_breakout_1d.json")]
        config: String,

        /// Cycle input file: timestamp, cash, open positions and candles per pair
        #[arg(long)]
        cycle: String,

        /// Strategy name (overrides config file)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Include plotted indicator values in the output
        #[arg(long)]
        plot: bool,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // Log file naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // Console goes to stderr so stdout stays machine readable
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Strategies => "strategies",
        Commands::Indicators { .. } => "indicators",
        Commands::Decide { .. } => "decide",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Strategies => commands::describe::list_strategies(),
        Commands::Indicators { config, strategy } => {
            commands::describe::show_indicators(config, strategy)
        }
        Commands::Decide {
            config,
            cycle,
            strategy,
            plot,
        } => commands::decide::run(config, cycle, strategy, plot),
    }
}
