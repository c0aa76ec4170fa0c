//! Trade log module
//!
//! This module provides the `TradeLog` struct which records every executed
//! trade. Profit and reward outcomes are captured at execution time, so
//! history queries never reconstruct them from positions that have since
//! changed.

use chrono::Utc;
use crate::types::{AccountId, InstrumentId, Side, Trade, TradeId, TradeStatus};
use rust_decimal::Decimal;

/// Append-only record of executed trades
///
/// Trade IDs are assigned sequentially starting at 1, so insertion
/// order and ID order agree. History queries return newest first.
pub struct TradeLog {
    /// Executed trades in insertion order
    trades: Vec<Trade>,

    /// Next trade ID to assign
    next_id: TradeId,
}

/// Fields of a trade the engine supplies at execution time
///
/// The log itself assigns the ID, the Completed status, and the
/// execution timestamp.
#[derive(Debug, Clone)]
pub struct TradeOutcome {
    /// Account that executed the trade
    pub account: AccountId,
    /// Instrument that was traded
    pub instrument: InstrumentId,
    /// Trade direction
    pub side: Side,
    /// Units traded
    pub quantity: u64,
    /// Price per unit at execution
    pub unit_price: Decimal,
    /// Total cash moved
    pub total_amount: Decimal,
    /// Profit realized against the average cost (zero for buys)
    pub realized_profit: Decimal,
    /// Acorns granted by this trade
    pub acorns_granted: u32,
}

impl TradeLog {
    /// Create a new empty trade log
    pub fn new() -> Self {
        TradeLog {
            trades: Vec::new(),
            next_id: 1,
        }
    }

    /// Record an executed trade
    ///
    /// Assigns the next sequential trade ID, stamps the execution time,
    /// and stores the trade with Completed status.
    ///
    /// # Returns
    ///
    /// A clone of the recorded trade, including its assigned ID.
    pub fn record(&mut self, outcome: TradeOutcome) -> Trade {
        let trade = Trade {
            id: self.next_id,
            account: outcome.account,
            instrument: outcome.instrument,
            side: outcome.side,
            quantity: outcome.quantity,
            unit_price: outcome.unit_price,
            total_amount: outcome.total_amount,
            realized_profit: outcome.realized_profit,
            acorns_granted: outcome.acorns_granted,
            status: TradeStatus::Completed,
            executed_at: Utc::now(),
        };
        self.next_id += 1;
        self.trades.push(trade.clone());
        trade
    }

    /// Look up a trade by ID
    pub fn get(&self, id: TradeId) -> Option<&Trade> {
        self.trades.iter().find(|trade| trade.id == id)
    }

    /// All trades for one account, newest first
    pub fn account_history(&self, account: AccountId) -> Vec<Trade> {
        self.trades
            .iter()
            .rev()
            .filter(|trade| trade.account == account)
            .cloned()
            .collect()
    }

    /// All trades in one instrument, newest first
    pub fn instrument_history(&self, instrument: InstrumentId) -> Vec<Trade> {
        self.trades
            .iter()
            .rev()
            .filter(|trade| trade.instrument == instrument)
            .cloned()
            .collect()
    }

    /// Total number of recorded trades
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// Whether any trades have been recorded
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

impl Default for TradeLog {
    fn default() -> Self {
        Self::new()
    }
}
