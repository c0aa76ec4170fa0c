//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. It processes trades in batches using thread-based
//! parallelism with account-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (account partitioning + threading)
//!     └── AsyncTradingEngine (thread-safe execution)
//!         ├── AsyncAccountLedger (thread-safe balances)
//!         ├── AsyncHoldingsTracker (thread-safe positions)
//!         ├── AsyncInstrumentRegistry (thread-safe symbol resolution)
//!         └── AsyncTradeLog (thread-safe trade history)
//! ```
//!
//! # Thread-Based Parallelism
//!
//! This strategy uses true thread-based parallelism:
//! - Processes batches sequentially to maintain per-account ordering across the file
//! - Within each batch, partitions by account ID for parallel execution
//! - Spawns worker threads via tokio multi-threaded runtime
//! - Uses Arc + DashMap for thread-safe shared state
//!
//! Price updates carry no account and only affect final portfolio valuation,
//! so they are applied directly to the registry as each batch arrives.

use crate::core::r#async::{
    AsyncAccountLedger, AsyncHoldingsTracker, AsyncInstrumentRegistry, AsyncTradeLog,
    AsyncTradingEngine, BatchProcessor,
};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::{write_portfolio_csv, Command};
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
///
/// Controls how trades are batched and the number of worker threads
/// for parallel execution within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of trades per batch
    pub batch_size: usize,
    /// Maximum number of batches processing concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                "invalid batch_size ({}), using default ({})",
                batch_size,
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                "invalid max_concurrent_batches ({}), using default ({})",
                max_concurrent_batches,
                default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Implements the ProcessingStrategy trait using multi-threaded, asynchronous
/// batch processing. Commands are read in batches and processed sequentially
/// (batch-by-batch) to maintain ordering guarantees. Within each batch, trades
/// are partitioned by account ID and executed in parallel across threads.
///
/// # Thread Safety
///
/// AsyncProcessingStrategy is Send + Sync and uses thread-safe components
/// internally (Arc-wrapped AsyncTradingEngine with DashMap-based state).
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `batch_size`: Number of commands per batch (default: 1000)
/// - `max_concurrent_batches`: Number of worker threads (default: CPU cores)
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the specified configuration
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    ///
    /// # Returns
    ///
    /// A new `AsyncProcessingStrategy` configured for batch processing
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process trade commands from input file and write portfolios to output
    ///
    /// This method implements the complete asynchronous batch processing pipeline:
    /// 1. Creates thread-safe engine components (AsyncTradingEngine, etc.)
    /// 2. Creates a BatchProcessor for account-based partitioning
    /// 3. Creates a tokio multi-threaded runtime
    /// 4. Reads commands in batches from CSV using AsyncReader
    /// 5. Applies price updates directly, dispatches trades to the processor
    /// 6. Processes each batch sequentially (waits for completion before next batch)
    /// 7. Builds final portfolio reports per account
    /// 8. Writes the reports to output using csv_format module
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file
    /// * `output` - Mutable reference to a writer for outputting portfolios
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed successfully
    /// * `Err(String)` if a fatal error occurred
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are returned
    /// immediately. Individual trade errors are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let engine = Arc::new(AsyncTradingEngine::new(
                Arc::new(AsyncAccountLedger::new()),
                Arc::new(AsyncHoldingsTracker::new()),
                Arc::new(AsyncInstrumentRegistry::new()),
                Arc::new(AsyncTradeLog::new()),
            ));

            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);

            let mut reader = AsyncReader::new(compat_file);

            // Process batches sequentially to maintain per-account ordering across
            // the entire file. Each batch is still parallel across accounts.
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;

                if batch.is_empty() {
                    break;
                }

                let mut trades = Vec::with_capacity(batch.len());
                for command in batch {
                    match command {
                        Command::Trade(record) => trades.push(record),
                        Command::UpdatePrice { symbol, price } => {
                            engine.update_reference_price(&symbol, price);
                        }
                    }
                }

                // Wait for completion before reading the next batch so trades
                // spanning batch boundaries stay in order per account
                let results = processor.process_batch(trades).await;
                for processed in &results {
                    if let Err(e) = &processed.result {
                        tracing::warn!("trade execution error: {}", e);
                    }
                }
            }

            // Build a portfolio report per account, sorted by account ID
            let mut reports = Vec::new();
            for account in engine.ledger().get_all_accounts() {
                let report = engine
                    .portfolio(account.id)
                    .map_err(|e| format!("Failed to build portfolio for {}: {}", account.id, e))?;
                reports.push(report);
            }

            write_portfolio_csv(&reports, output)?;

            Ok(())
        })
    }
}
