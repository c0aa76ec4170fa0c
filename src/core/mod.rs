//! Core business logic module
//!
//! This module contains the core trade processing components:
//! - `engine` - Trade execution orchestration
//! - `ledger` - Account state management and balance operations
//! - `instruments` - Instrument registry and reference prices
//! - `holdings` - Position tracking and cost-basis arithmetic
//! - `trade_log` - Append-only record of executed trades
//! - `portfolio` - Point-in-time portfolio valuation
//! - `async` - Asynchronous implementations for concurrent processing

pub mod r#async;
pub mod engine;
pub mod holdings;
pub mod instruments;
pub mod ledger;
pub mod portfolio;
pub mod trade_log;

pub use engine::TradingEngine;
pub use holdings::HoldingsTracker;
pub use instruments::InstrumentRegistry;
pub use ledger::AccountLedger;
pub use portfolio::{PortfolioReport, PositionReport};
pub use r#async::{
    AsyncAccountLedger, AsyncHoldingsTracker, AsyncInstrumentRegistry, AsyncTradeLog,
    AsyncTradingEngine,
};
pub use trade_log::{TradeLog, TradeOutcome};
