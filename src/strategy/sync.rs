//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates trade processing by coordinating
//! between the SyncReader (for CSV input) and TradingEngine (for business logic).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Trade execution to `TradingEngine` (business logic)
//! - CSV output to `csv_format::write_portfolio_csv` (format handling)
//!
//! This separation of concerns makes the code more maintainable and testable.
//!
//! # Memory Efficiency
//!
//! This strategy maintains streaming input behavior:
//! - Processes CSV rows one at a time (streaming via iterator)
//! - Does not load entire file into memory
//! - Memory usage is O(accounts + holdings + trades), not O(file_size)
//!
//! # Thread Safety
//!
//! While this strategy is single-threaded, it implements Send + Sync to be
//! compatible with the ProcessingStrategy trait, allowing it to be used in
//! multi-threaded contexts if needed.

use crate::core::TradingEngine;
use crate::io::csv_format::{write_portfolio_csv, Command};
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use std::io::Write;
use std::path::Path;

/// Synchronous processing strategy
///
/// Implements the ProcessingStrategy trait using single-threaded, synchronous
/// processing. Orchestrates the flow between CSV reading, trade execution,
/// and portfolio output generation.
///
/// # Examples
///
/// ```no_run
/// use rust_trading_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("trades.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process trade commands from input file and write portfolios to output
    ///
    /// This method orchestrates the complete synchronous processing pipeline:
    /// 1. Creates a SyncReader to stream commands from the CSV file
    /// 2. Creates a TradingEngine to execute trades
    /// 3. Iterates through commands, executing each through the engine
    /// 4. Builds a portfolio report for every account the engine has seen
    /// 5. Writes the reports to output using csv_format::write_portfolio_csv
    ///
    /// Accounts are opened with the standard starting balance the first time
    /// an input row references them. Price rows update the instrument registry
    /// directly.
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
    /// Fatal errors (file not found, I/O errors) are returned immediately.
    /// Individual trade errors are logged and processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let mut engine = TradingEngine::new();

        let reader = SyncReader::new(input_path)?;

        for result in reader {
            match result {
                Ok(Command::Trade(record)) => {
                    // First reference opens the account with the starting balance
                    engine.ensure_account(record.account);
                    if let Err(e) = engine.execute(record) {
                        tracing::warn!("trade execution error: {}", e);
                    }
                }
                Ok(Command::UpdatePrice { symbol, price }) => {
                    engine.update_reference_price(&symbol, price);
                }
                Err(e) => {
                    tracing::warn!("CSV parsing error: {}", e);
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ALICE: &str = "5f0c1a9e-3c44-4b2f-9d61-8a7b1f2e4c3d";
    const BOB: &str = "9d2f4b6c-1e8a-4f3d-b5c7-2a9e8d1f6b4c";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_strategy_processes_valid_buy() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\nbuy,{},AAPL,Apple Inc.,10,150.00\n",
            ALICE
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("account,cash"));
        assert!(output_str.contains(ALICE));
        // 1,000,000.00 - 1,500.00 cash, holding valued at cost
        assert!(output_str.contains("998500.00"));
        assert!(output_str.contains("1000000.00"));
    }

    #[test]
    fn test_sync_strategy_profitable_round_trip() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,Apple Inc.,10,100.00\n\
             sell,{alice},AAPL,,10,150.00\n",
            alice = ALICE
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        // 500.00 profit banked, 5 acorns granted on top of the starting 5
        assert!(output_str.contains("1000500.00,10"));
    }

    #[test]
    fn test_sync_strategy_applies_price_updates() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,Apple Inc.,10,100.00\n\
             price,,AAPL,,,150.00\n",
            alice = ALICE
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        // Holding valued at the published price: 10 * 150.00
        assert!(output_str.contains("1500.00"));
        // Unrealized gain of 500.00 on a 1000.00 basis
        assert!(output_str.contains("500.00,50.00"));
    }

    #[test]
    fn test_sync_strategy_processes_multiple_accounts() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,Apple Inc.,10,150.00\n\
             buy,{bob},MSFT,Microsoft,5,200.00\n",
            alice = ALICE,
            bob = BOB
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains(ALICE));
        assert!(output_str.contains(BOB));
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_strategy_continues_on_rejected_trade() {
        // Second row oversells, but processing should continue
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,Apple Inc.,10,100.00\n\
             sell,{alice},AAPL,,50,100.00\n\
             sell,{alice},AAPL,,10,150.00\n",
            alice = ALICE
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        // Final sell still succeeded
        assert!(output_str.contains("1000500.00"));
    }

    #[test]
    fn test_sync_strategy_continues_on_malformed_record() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,Apple Inc.,10,150.00\n\
             buy,not-a-uuid,AAPL,,5,150.00\n\
             buy,{bob},MSFT,Microsoft,5,200.00\n",
            alice = ALICE,
            bob = BOB
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains(ALICE));
        assert!(output_str.contains(BOB));
        assert!(!output_str.contains("not-a-uuid"));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
