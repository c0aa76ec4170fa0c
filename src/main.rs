//! Rust Trading Engine CLI
//!
//! Command-line interface for executing trades from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- trades.csv > portfolios.csv
//! cargo run -- --strategy sync trades.csv > portfolios.csv
//! cargo run -- --strategy async trades.csv > portfolios.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 trades.csv > portfolios.csv
//! ```
//!
//! The program reads trade commands from the input CSV file, executes them
//! through the trading engine using the selected processing strategy, and
//! outputs the final portfolio reports to stdout. Logs go to stderr and are
//! controlled with the `RUST_LOG` environment variable.
//!
//! # Processing Strategies
//!
//! - **sync**: Synchronous CSV parsing with single-threaded processing
//! - **async**: Asynchronous batch processing with multi-threaded parallelism (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use rust_trading_engine::cli;
use rust_trading_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays clean for CSV output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}
