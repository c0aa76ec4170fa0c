//! Thread-safe trade log for async batch processing
//!
//! This module provides the `AsyncTradeLog` struct. Trade IDs come from
//! an atomic counter and trades are stored in a `DashMap`, so concurrent
//! recorders never contend on a single list. History queries sort by
//! trade ID, which preserves the per-account ordering the engine's
//! account locks guarantee.

use crate::core::trade_log::TradeOutcome;
use crate::types::{AccountId, InstrumentId, Trade, TradeId, TradeStatus};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe append-only record of executed trades
#[derive(Debug)]
pub struct AsyncTradeLog {
    /// Concurrent map of trade IDs to executed trades
    trades: DashMap<TradeId, Trade>,

    /// Next trade ID to assign
    next_id: AtomicU64,
}

impl AsyncTradeLog {
    /// Create a new empty trade log
    pub fn new() -> Self {
        Self {
            trades: DashMap::new(),
            next_id: AtomicU64::new(1),
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
    pub fn record(&self, outcome: TradeOutcome) -> Trade {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let trade = Trade {
            id,
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
        self.trades.insert(id, trade.clone());
        trade
    }

    /// Look up a trade by ID
    pub fn get(&self, id: TradeId) -> Option<Trade> {
        self.trades.get(&id).map(|entry| entry.value().clone())
    }

    /// All trades for one account, newest first
    pub fn account_history(&self, account: AccountId) -> Vec<Trade> {
        let mut trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|entry| entry.value().account == account)
            .map(|entry| entry.value().clone())
            .collect();
        trades.sort_by(|a, b| b.id.cmp(&a.id));
        trades
    }

    /// All trades in one instrument, newest first
    pub fn instrument_history(&self, instrument: InstrumentId) -> Vec<Trade> {
        let mut trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|entry| entry.value().instrument == instrument)
            .map(|entry| entry.value().clone())
            .collect();
        trades.sort_by(|a, b| b.id.cmp(&a.id));
        trades
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

impl Default for AsyncTradeLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn outcome(account: AccountId, instrument: InstrumentId) -> TradeOutcome {
        TradeOutcome {
            account,
            instrument,
            side: Side::Buy,
            quantity: 10,
            unit_price: dec!(100.00),
            total_amount: dec!(1000.00),
            realized_profit: Decimal::ZERO,
            acorns_granted: 0,
        }
    }

    #[test]
    fn test_record_assigns_sequential_ids() {
        let log = AsyncTradeLog::new();
        let account = Uuid::new_v4();

        let first = log.record(outcome(account, 1));
        let second = log.record(outcome(account, 1));

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_account_history_newest_first() {
        let log = AsyncTradeLog::new();
        let account = Uuid::new_v4();

        log.record(outcome(account, 1));
        log.record(outcome(account, 2));
        log.record(outcome(account, 1));

        let ids: Vec<TradeId> = log
            .account_history(account)
            .iter()
            .map(|trade| trade.id)
            .collect();

        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_instrument_history_filters() {
        let log = AsyncTradeLog::new();
        let account = Uuid::new_v4();

        log.record(outcome(account, 1));
        log.record(outcome(account, 2));

        assert_eq!(log.instrument_history(1).len(), 1);
        assert_eq!(log.instrument_history(2).len(), 1);
        assert!(log.instrument_history(3).is_empty());
    }

    #[test]
    fn test_concurrent_recording_keeps_unique_ids() {
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        let log = Arc::new(AsyncTradeLog::new());
        let mut handles = vec![];

        for _ in 0..50 {
            let log_clone = Arc::clone(&log);
            let handle = thread::spawn(move || log_clone.record(outcome(Uuid::new_v4(), 1)).id);
            handles.push(handle);
        }

        let ids: HashSet<TradeId> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(ids.len(), 50);
        assert_eq!(log.len(), 50);
    }
}
