//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and identifiers
//! - `instrument`: Tradeable instruments and identifiers
//! - `holding`: Per-account positions and cost-basis arithmetic
//! - `trade`: Trade requests, executed trades, and rounding rules
//! - `error`: Error types for the trading engine

pub mod account;
pub mod error;
pub mod holding;
pub mod instrument;
pub mod trade;

pub use account::{Account, AccountId, STARTING_ACORNS, STARTING_BALANCE};
pub use error::TradeError;
pub use holding::Holding;
pub use instrument::{Instrument, InstrumentId};
pub use trade::{
    acorn_reward, round_cash, Side, Trade, TradeId, TradeRecord, TradeResult, TradeStatus,
};
