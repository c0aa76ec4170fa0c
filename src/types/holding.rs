//! Holding types for the Rust Trading Engine
//!
//! This module defines the per-account position in an instrument and
//! the weighted-average cost-basis arithmetic applied on every buy.

use rust_decimal::Decimal;

use super::account::AccountId;
use super::error::TradeError;
use super::instrument::InstrumentId;
use super::trade::round_cash;

/// A position one account holds in one instrument
///
/// The average cost is the weighted average of every buy still
/// reflected in the position. Sells reduce quantity without touching
/// the average; a position sold down to zero units is removed, so a
/// zero-quantity holding never persists.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    /// Owning account
    pub account: AccountId,

    /// Instrument held
    pub instrument: InstrumentId,

    /// Units held (never zero once stored)
    pub quantity: u64,

    /// Weighted-average cost per unit, rounded to cents
    pub average_cost: Decimal,
}

impl Holding {
    /// Create an empty position ready to receive its first buy
    pub fn new(account: AccountId, instrument: InstrumentId) -> Self {
        Holding {
            account,
            instrument,
            quantity: 0,
            average_cost: Decimal::ZERO,
        }
    }

    /// Fold a buy into the position
    ///
    /// The first buy sets the average cost to the purchase price.
    /// Later buys re-weight it:
    ///
    /// ```text
    /// new_avg = (old_avg * old_qty + price * qty) / (old_qty + qty)
    /// ```
    ///
    /// rounded to cents, half away from zero.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the quantity or cost
    /// calculation would overflow. The position is unchanged on error.
    pub fn apply_buy(&mut self, quantity: u64, unit_price: Decimal) -> Result<(), TradeError> {
        let new_quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| TradeError::arithmetic_overflow("buy quantity", self.account))?;

        let new_average = if self.quantity == 0 {
            unit_price
        } else {
            let existing_cost = self
                .average_cost
                .checked_mul(Decimal::from(self.quantity))
                .ok_or_else(|| TradeError::arithmetic_overflow("cost basis", self.account))?;
            let added_cost = unit_price
                .checked_mul(Decimal::from(quantity))
                .ok_or_else(|| TradeError::arithmetic_overflow("cost basis", self.account))?;
            let total_cost = existing_cost
                .checked_add(added_cost)
                .ok_or_else(|| TradeError::arithmetic_overflow("cost basis", self.account))?;

            // new_quantity > 0, so the division cannot fail
            round_cash(total_cost / Decimal::from(new_quantity))
        };

        self.quantity = new_quantity;
        self.average_cost = new_average;
        Ok(())
    }
}
