//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over trade commands from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize CSV records
//! sequentially, delegating parsing and conversion to the csv_format module.
//! It maintains streaming behavior by processing CSV records one at a time
//! without loading the entire file into memory.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding Result<Command, String>
//! for each CSV row. This allows for idiomatic Rust iteration patterns:
//!
//! ```no_run
//! use rust_trading_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("trades.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("Processing command: {:?}", command),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as Err variants in the iterator
//! - Line numbers are included in error messages for debugging
//!
//! # Memory Efficiency
//!
//! The reader maintains streaming behavior:
//! - Reads CSV records one at a time
//! - Does not load entire file into memory
//! - Memory usage is O(1) per record, not O(file_size)

use crate::io::csv_format::{convert_csv_record, Command, CsvRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over trade commands.
/// Maintains streaming behavior with constant memory usage.
///
/// # Examples
///
/// ```no_run
/// use rust_trading_engine::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("trades.csv")).unwrap();
/// let commands: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Successfully parsed {} commands", commands.len());
/// ```
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// Opens the CSV file and prepares it for streaming iteration.
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (price rows omit trailing fields)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if file opened successfully
    /// * `Err(String)` if file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Command, String>;

    /// Get the next command from the CSV file
    ///
    /// This method:
    /// 1. Reads the next CSV row and deserializes it to CsvRecord
    /// 2. Converts the CsvRecord to Command using csv_format::convert_csv_record
    /// 3. Includes line numbers in error messages for debugging
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Command))` - Successfully parsed command
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();

        match deserializer.next()? {
            Ok(csv_record) => {
                self.line_num += 1;
                // Add line number context to any conversion errors
                Some(
                    convert_csv_record(csv_record)
                        .map_err(|e| format!("Line {}: {}", self.line_num + 1, e)),
                )
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(format!(
                    "Line {}: CSV parse error: {}",
                    self.line_num + 1,
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;
    use rust_decimal_macros::dec;
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
    fn test_sync_reader_new_opens_file() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\nbuy,{},AAPL,Apple Inc.,10,150.00\n",
            ALICE
        );
        let file = create_temp_csv(&csv_content);

        let result = SyncReader::new(file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_sync_reader_new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_reader_iterates_valid_buy() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\nbuy,{},AAPL,Apple Inc.,10,150.25\n",
            ALICE
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.collect();

        assert_eq!(commands.len(), 1);
        match commands[0].as_ref().unwrap() {
            Command::Trade(trade) => {
                assert_eq!(trade.account.to_string(), ALICE);
                assert_eq!(trade.symbol, "AAPL");
                assert_eq!(trade.side, Side::Buy);
                assert_eq!(trade.quantity, 10);
                assert_eq!(trade.price, dec!(150.25));
            }
            other => panic!("expected trade command, got {:?}", other),
        }
    }

    #[test]
    fn test_sync_reader_iterates_all_command_types() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,Apple Inc.,10,150.00\n\
             sell,{alice},AAPL,,4,160.00\n\
             price,,AAPL,,,175.50\n",
            alice = ALICE
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(commands.len(), 3);
        assert!(matches!(&commands[0], Command::Trade(t) if t.side == Side::Buy));
        assert!(matches!(&commands[1], Command::Trade(t) if t.side == Side::Sell));
        assert_eq!(
            commands[2],
            Command::UpdatePrice {
                symbol: "AAPL".to_string(),
                price: dec!(175.50),
            }
        );
    }

    #[test]
    fn test_sync_reader_handles_malformed_record() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\nbuy,{},AAPL,,ten,150.00\n",
            ALICE
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.collect();

        assert_eq!(commands.len(), 1);
        let error = commands[0].as_ref().unwrap_err();
        assert!(error.contains("Line 2"));
        assert!(error.contains("Invalid quantity"));
    }

    #[test]
    fn test_sync_reader_includes_line_numbers_in_errors() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,,10,150.00\n\
             buy,not-a-uuid,AAPL,,5,150.00\n\
             buy,{bob},MSFT,,5,200.00\n",
            alice = ALICE,
            bob = BOB
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.collect();

        assert_eq!(commands.len(), 3);
        assert!(commands[0].is_ok());
        assert!(commands[1].is_err());
        assert!(commands[2].is_ok());

        let error = commands[1].as_ref().unwrap_err();
        assert!(error.contains("Line 3")); // Line 3 because of header
    }

    #[test]
    fn test_sync_reader_handles_whitespace() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n  buy  ,  {}  ,  AAPL  ,  Apple Inc.  ,  10  ,  150.00  \n",
            ALICE
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.collect();

        assert_eq!(commands.len(), 1);
        match commands[0].as_ref().unwrap() {
            Command::Trade(trade) => {
                assert_eq!(trade.symbol, "AAPL");
                assert_eq!(trade.name.as_deref(), Some("Apple Inc."));
                assert_eq!(trade.price, dec!(150.00));
            }
            other => panic!("expected trade command, got {:?}", other),
        }
    }

    #[test]
    fn test_sync_reader_handles_empty_file_after_header() {
        let csv_content = "type,account,symbol,name,quantity,price\n";
        let file = create_temp_csv(csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.collect();

        assert_eq!(commands.len(), 0);
    }

    #[test]
    fn test_sync_reader_continues_after_error() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,,10,150.00\n\
             transfer,{alice},AAPL,,5,150.00\n\
             sell,{alice},AAPL,,4,160.00\n",
            alice = ALICE
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.collect();

        assert_eq!(commands.len(), 3);
        assert!(commands[0].is_ok());
        assert!(commands[1].is_err());
        assert!(commands[2].is_ok());
    }

    #[test]
    fn test_sync_reader_filter_map_pattern() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             buy,{alice},AAPL,,10,150.00\n\
             buy,{alice},AAPL,,10,bad-price\n\
             buy,{bob},MSFT,,5,200.00\n",
            alice = ALICE,
            bob = BOB
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let valid: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(valid.len(), 2);
        assert!(matches!(&valid[0], Command::Trade(t) if t.symbol == "AAPL"));
        assert!(matches!(&valid[1], Command::Trade(t) if t.symbol == "MSFT"));
    }

    #[test]
    fn test_sync_reader_case_insensitive_commands() {
        let csv_content = format!(
            "type,account,symbol,name,quantity,price\n\
             BUY,{alice},AAPL,,10,150.00\n\
             Sell,{alice},AAPL,,4,160.00\n\
             PRICE,,AAPL,,,170.00\n",
            alice = ALICE
        );
        let file = create_temp_csv(&csv_content);

        let reader = SyncReader::new(file.path()).unwrap();
        let commands: Vec<_> = reader.filter_map(Result::ok).collect();

        assert_eq!(commands.len(), 3);
        assert!(matches!(&commands[0], Command::Trade(t) if t.side == Side::Buy));
        assert!(matches!(&commands[1], Command::Trade(t) if t.side == Side::Sell));
        assert!(matches!(&commands[2], Command::UpdatePrice { .. }));
    }
}
