//! Rust Trading Engine Library
//! # Overview
//!
//! This library provides a streaming CSV-based trade processor implementing
//! both a sync and an async strategy. Accounts start with a fixed cash balance
//! and a small grant of acorns, a reward currency earned by selling holdings at
//! a profit.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Trade, Instrument, Holding, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Trade execution orchestration
//!   - [`core::ledger`] - Cash and acorn balance management
//!   - [`core::holdings`] - Position tracking with weighted-average cost basis
//!   - [`core::instruments`] - Symbol resolution and reference prices
//!   - [`core::trade_log`] - Trade history
//!   - [`core::portfolio`] - Portfolio valuation and P/L reporting
//! - [`io`] - I/O handling with pluggable processing strategies
//! - [`strategy`] - Sync and async processing pipelines
//!
//! # Commands
//!
//! The engine supports three input commands:
//!
//! - **Buy**: Purchase instrument units at a caller-supplied price
//! - **Sell**: Sell held units, realizing profit or loss against the average cost
//! - **Price**: Publish a reference price used for portfolio valuation
//!
//! # Acorns
//!
//! Selling at a profit grants one acorn per full 100.00 of realized profit.
//! Unprofitable sells never deduct acorns.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    AccountLedger, HoldingsTracker, InstrumentRegistry, PortfolioReport, PositionReport, TradeLog,
    TradingEngine,
};
pub use io::write_portfolio_csv;
pub use types::{
    Account, AccountId, Holding, Instrument, InstrumentId, Side, Trade, TradeError, TradeId,
    TradeRecord, TradeResult, TradeStatus,
};
