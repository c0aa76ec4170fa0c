//! Error types for the Rust Trading Engine
//!
//! This module defines all error types that can occur during trade processing.
//! Errors are designed to be descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed CSV, invalid data types, etc.
//! - **Trade Errors**: Insufficient funds, missing holdings, invalid parameters, etc.
//! - **Arithmetic Errors**: Overflow in balance or cost-basis calculations

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::AccountId;

/// Main error type for the trading engine
///
/// This enum represents all possible errors that can occur during
/// trade processing. Each variant includes relevant context
/// to help diagnose and resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    ///
    /// This is typically a fatal error (file permissions, disk full, etc.).
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Trade request carried a non-positive quantity or price
    ///
    /// This is a recoverable error - the trade is rejected
    /// and the account state remains unchanged.
    #[error("Invalid trade parameters for account {account}: {reason}")]
    InvalidTradeParameters {
        /// Account that submitted the trade
        account: AccountId,
        /// Description of the rejected parameter
        reason: String,
    },

    /// Account does not exist
    ///
    /// This is a recoverable error - the operation is rejected.
    #[error("Account {account} not found")]
    AccountNotFound {
        /// Account ID that was not found
        account: AccountId,
    },

    /// Account already exists and cannot be opened again
    ///
    /// This is a recoverable error - the open request is rejected.
    #[error("Account {account} already exists")]
    AccountAlreadyExists {
        /// Account ID that already exists
        account: AccountId,
    },

    /// Instrument does not exist
    ///
    /// This is a recoverable error - the lookup is rejected.
    #[error("Instrument '{symbol}' not found")]
    InstrumentNotFound {
        /// Symbol that was not found
        symbol: String,
    },

    /// Insufficient cash balance for a buy
    ///
    /// This is a recoverable error - the buy is rejected
    /// and the account state remains unchanged.
    #[error(
        "Insufficient funds for account {account}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// Account ID
        account: AccountId,
        /// Available cash balance
        available: Decimal,
        /// Total cost of the rejected buy
        requested: Decimal,
    },

    /// Account holds no units of the instrument being sold
    ///
    /// This is a recoverable error - the sell is rejected.
    #[error("Account {account} holds no units of '{symbol}'")]
    NoHoldings {
        /// Account ID
        account: AccountId,
        /// Symbol of the instrument
        symbol: String,
    },

    /// Account holds fewer units than the sell requests
    ///
    /// This is a recoverable error - the sell is rejected
    /// and the holding remains unchanged.
    #[error("Insufficient holdings of '{symbol}' for account {account}: held {held}, requested {requested}")]
    InsufficientHoldings {
        /// Account ID
        account: AccountId,
        /// Symbol of the instrument
        symbol: String,
        /// Units currently held
        held: u64,
        /// Units requested to sell
        requested: u64,
    },

    /// Insufficient acorn balance for a debit
    ///
    /// This is a recoverable error - the debit is rejected.
    #[error("Insufficient acorns for account {account}: held {held}, requested {requested}")]
    InsufficientAcorns {
        /// Account ID
        account: AccountId,
        /// Acorns currently held
        held: u32,
        /// Acorns requested
        requested: u32,
    },

    /// Arithmetic overflow would occur
    ///
    /// This is a fatal error for the affected trade - it is rejected
    /// to maintain account integrity.
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account ID
        account: AccountId,
    },
}

// Conversion from io::Error to TradeError
impl From<std::io::Error> for TradeError {
    fn from(error: std::io::Error) -> Self {
        TradeError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to TradeError
impl From<csv::Error> for TradeError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        TradeError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl TradeError {
    /// Create an InvalidTradeParameters error
    pub fn invalid_trade_parameters(account: AccountId, reason: &str) -> Self {
        TradeError::InvalidTradeParameters {
            account,
            reason: reason.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountId) -> Self {
        TradeError::AccountNotFound { account }
    }

    /// Create an AccountAlreadyExists error
    pub fn account_already_exists(account: AccountId) -> Self {
        TradeError::AccountAlreadyExists { account }
    }

    /// Create an InstrumentNotFound error
    pub fn instrument_not_found(symbol: &str) -> Self {
        TradeError::InstrumentNotFound {
            symbol: symbol.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        TradeError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create a NoHoldings error
    pub fn no_holdings(account: AccountId, symbol: &str) -> Self {
        TradeError::NoHoldings {
            account,
            symbol: symbol.to_string(),
        }
    }

    /// Create an InsufficientHoldings error
    pub fn insufficient_holdings(
        account: AccountId,
        symbol: &str,
        held: u64,
        requested: u64,
    ) -> Self {
        TradeError::InsufficientHoldings {
            account,
            symbol: symbol.to_string(),
            held,
            requested,
        }
    }

    /// Create an InsufficientAcorns error
    pub fn insufficient_acorns(account: AccountId, held: u32, requested: u32) -> Self {
        TradeError::InsufficientAcorns {
            account,
            held,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        TradeError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }
}
