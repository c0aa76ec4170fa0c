//! Thread-safe holdings tracking for async batch processing
//!
//! This module provides the `AsyncHoldingsTracker` struct, which maintains
//! positions using `DashMap` so that trades on different accounts can update
//! their positions concurrently. The trading engine additionally serializes
//! trades within one account, so the quantity transitions here never race.

use crate::types::{AccountId, Holding, InstrumentId, TradeError};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Thread-safe position tracker for async batch processing
///
/// Positions are keyed by (account, instrument). A position sold down
/// to zero units is removed from the map, so every stored holding has
/// a positive quantity.
#[derive(Debug)]
pub struct AsyncHoldingsTracker {
    /// Concurrent map of (account, instrument) pairs to positions
    holdings: DashMap<(AccountId, InstrumentId), Holding>,
}

impl AsyncHoldingsTracker {
    /// Create a new tracker with no positions
    pub fn new() -> Self {
        Self {
            holdings: DashMap::new(),
        }
    }

    /// Fold a buy into the account's position
    ///
    /// Creates the position on first purchase. The weighted-average
    /// cost arithmetic lives on `Holding::apply_buy`.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the cost-basis calculation would
    /// overflow. The position is unchanged on error.
    pub fn apply_buy(
        &self,
        account: AccountId,
        instrument: InstrumentId,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<(), TradeError> {
        let mut entry = self
            .holdings
            .entry((account, instrument))
            .or_insert_with(|| Holding::new(account, instrument));
        entry.value_mut().apply_buy(quantity, unit_price)
    }

    /// Apply a sell against the account's position
    ///
    /// Validates the position before mutating anything, decrements the
    /// quantity, and removes the position if it reaches zero.
    ///
    /// # Returns
    ///
    /// The average cost per unit at the moment of the sale.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account holds no position in the instrument (`NoHoldings`)
    /// - The position holds fewer units than requested (`InsufficientHoldings`)
    pub fn apply_sell(
        &self,
        account: AccountId,
        instrument: InstrumentId,
        symbol: &str,
        quantity: u64,
    ) -> Result<Decimal, TradeError> {
        let key = (account, instrument);

        let (average_cost, emptied) = {
            let mut entry = self
                .holdings
                .get_mut(&key)
                .ok_or_else(|| TradeError::no_holdings(account, symbol))?;

            let holding = entry.value_mut();
            if holding.quantity < quantity {
                return Err(TradeError::insufficient_holdings(
                    account,
                    symbol,
                    holding.quantity,
                    quantity,
                ));
            }

            let average_cost = holding.average_cost;
            holding.quantity -= quantity;
            (average_cost, holding.quantity == 0)
        };

        // The entry guard must be dropped before removing from the same shard
        if emptied {
            self.holdings.remove(&key);
        }

        Ok(average_cost)
    }

    /// Look up one position
    ///
    /// Returns a snapshot clone of the position at the time of the call.
    pub fn get(&self, account: AccountId, instrument: InstrumentId) -> Option<Holding> {
        self.holdings
            .get(&(account, instrument))
            .map(|entry| entry.value().clone())
    }

    /// All positions held by one account, sorted by instrument ID
    pub fn get_account_holdings(&self, account: AccountId) -> Vec<Holding> {
        let mut holdings: Vec<Holding> = self
            .holdings
            .iter()
            .filter(|entry| entry.value().account == account)
            .map(|entry| entry.value().clone())
            .collect();
        holdings.sort_by_key(|holding| holding.instrument);
        holdings
    }

    /// Total number of open positions across all accounts
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Whether any positions are open
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}

impl Default for AsyncHoldingsTracker {
    fn default() -> Self {
        Self::new()
    }
}
