//! Asynchronous implementations of core components
//!
//! This module provides thread-safe, concurrent implementations of the core
//! trade execution components using DashMap for locking.
//!
//! # Architecture
//!
//! The async implementations mirror the synchronous versions but use
//! concurrent data structures:
//!
//! - **AsyncAccountLedger**: Thread-safe cash and acorn balances using DashMap
//! - **AsyncHoldingsTracker**: Thread-safe position tracking using DashMap
//! - **AsyncInstrumentRegistry**: Thread-safe symbol resolution using DashMap
//! - **AsyncTradeLog**: Thread-safe trade history using DashMap
//! - **AsyncTradingEngine**: Orchestrates async trade execution
//!
//! # Thread Safety
//!
//! All components are designed for safe concurrent access:
//! - Trades for different accounts proceed in parallel
//! - Trades for the same account are serialized by a per-account lock
//! - No global locks - fine-grained locking per entity

pub mod batch_processor;
pub mod engine;
pub mod holdings;
pub mod instruments;
pub mod ledger;
pub mod trade_log;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::AsyncTradingEngine;
pub use holdings::AsyncHoldingsTracker;
pub use instruments::AsyncInstrumentRegistry;
pub use ledger::AsyncAccountLedger;
pub use trade_log::AsyncTradeLog;
