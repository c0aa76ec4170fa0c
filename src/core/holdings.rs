//! Holdings tracking module
//!
//! This module provides the `HoldingsTracker` struct which maintains every
//! account's positions and applies the buy/sell quantity transitions.
//!
//! The HoldingsTracker is responsible for:
//! - Folding buys into the weighted-average cost basis
//! - Validating and applying sells
//! - Removing positions the moment they reach zero units

use crate::types::{AccountId, Holding, InstrumentId, TradeError};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Manages all positions across accounts
///
/// Positions are keyed by (account, instrument). A position sold down
/// to zero units is removed from the map, so every stored holding has
/// a positive quantity.
pub struct HoldingsTracker {
    /// Map of (account, instrument) pairs to positions
    holdings: HashMap<(AccountId, InstrumentId), Holding>,
}

impl HoldingsTracker {
    /// Create a new tracker with no positions
    pub fn new() -> Self {
        HoldingsTracker {
            holdings: HashMap::new(),
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
        &mut self,
        account: AccountId,
        instrument: InstrumentId,
        quantity: u64,
        unit_price: Decimal,
    ) -> Result<(), TradeError> {
        let holding = self
            .holdings
            .entry((account, instrument))
            .or_insert_with(|| Holding::new(account, instrument));
        holding.apply_buy(quantity, unit_price)
    }

    /// Apply a sell against the account's position
    ///
    /// Validates the position before mutating anything, decrements the
    /// quantity, and removes the position if it reaches zero. Sells never
    /// change the average cost of the units that remain.
    ///
    /// # Arguments
    ///
    /// * `account` - The selling account
    /// * `instrument` - The instrument being sold
    /// * `symbol` - Symbol used for error context
    /// * `quantity` - Units to sell
    ///
    /// # Returns
    ///
    /// The average cost per unit at the moment of the sale, which the
    /// engine needs for the profit calculation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account holds no position in the instrument (`NoHoldings`)
    /// - The position holds fewer units than requested (`InsufficientHoldings`)
    pub fn apply_sell(
        &mut self,
        account: AccountId,
        instrument: InstrumentId,
        symbol: &str,
        quantity: u64,
    ) -> Result<Decimal, TradeError> {
        let key = (account, instrument);

        let holding = self
            .holdings
            .get_mut(&key)
            .ok_or_else(|| TradeError::no_holdings(account, symbol))?;

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

        if holding.quantity == 0 {
            self.holdings.remove(&key);
        }

        Ok(average_cost)
    }

    /// Look up one position
    pub fn get(&self, account: AccountId, instrument: InstrumentId) -> Option<&Holding> {
        self.holdings.get(&(account, instrument))
    }

    /// All positions held by one account, sorted by instrument ID
    pub fn get_account_holdings(&self, account: AccountId) -> Vec<&Holding> {
        let mut holdings: Vec<&Holding> = self
            .holdings
            .values()
            .filter(|holding| holding.account == account)
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

impl Default for HoldingsTracker {
    fn default() -> Self {
        Self::new()
    }
}
