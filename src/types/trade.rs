//! Trade-related types for the Rust Trading Engine
//!
//! This module defines trade sides, requests, executed trade records,
//! and the rounding rules shared by every cash calculation.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::account::AccountId;
use super::instrument::InstrumentId;

/// Trade identifier
///
/// Assigned sequentially by the trade log, starting at 1.
pub type TradeId = u64;

/// Cash amounts divided per acorn granted (one acorn per 100 of profit)
pub const ACORN_PROFIT_UNIT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Direction of a trade
///
/// Every trade is either a buy or a sell. There is no hold or
/// cancel direction; a request that is neither buy nor sell is
/// rejected at the parsing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Exchange cash for units of an instrument
    ///
    /// Debits the total cost from the cash balance and folds the
    /// purchase into the holding's weighted-average cost.
    Buy,

    /// Exchange units of an instrument for cash
    ///
    /// Credits the proceeds to the cash balance and may grant acorns
    /// when the sell realizes a profit over the average cost.
    Sell,
}

/// Lifecycle status of an executed trade
///
/// The engine only records trades that executed, so every trade it
/// produces is Completed. Cancelled and Failed exist for callers
/// that persist trades through an external settlement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    /// Trade executed and balances were updated
    Completed,
    /// Trade was cancelled before execution
    Cancelled,
    /// Trade failed during settlement
    Failed,
}

/// Input trade request
///
/// Represents a single trade as submitted by a caller, before any
/// validation. The name field is optional because only the first
/// reference to a symbol needs one; later trades reuse the stored
/// instrument name.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    /// The account submitting the trade
    pub account: AccountId,

    /// Symbol of the instrument to trade
    pub symbol: String,

    /// Human-readable instrument name (used when the symbol is first seen)
    pub name: Option<String>,

    /// Trade direction
    pub side: Side,

    /// Number of units to trade (must be positive)
    pub quantity: u64,

    /// Caller-supplied price per unit (must be positive)
    pub price: Decimal,
}

/// Executed trade stored in the trade log
///
/// Profit and reward outcomes are captured at execution time so
/// that history queries never have to reconstruct them from
/// holdings that have since changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// Unique trade identifier
    pub id: TradeId,

    /// Account that executed the trade
    pub account: AccountId,

    /// Instrument that was traded
    pub instrument: InstrumentId,

    /// Trade direction
    pub side: Side,

    /// Number of units traded
    pub quantity: u64,

    /// Price per unit at execution
    pub unit_price: Decimal,

    /// Total cash moved: quantity x unit price, rounded to cents
    pub total_amount: Decimal,

    /// Profit realized against the average cost (zero for buys)
    pub realized_profit: Decimal,

    /// Acorns granted by this trade (zero for buys and losing sells)
    pub acorns_granted: u32,

    /// Lifecycle status
    pub status: TradeStatus,

    /// When the trade executed
    pub executed_at: DateTime<Utc>,
}

/// Outcome of a successful trade returned to the caller
///
/// Carries the instrument symbol and name alongside the executed
/// trade fields so callers don't need a second instrument lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeResult {
    /// Identifier of the recorded trade
    pub trade_id: TradeId,

    /// Symbol of the traded instrument
    pub symbol: String,

    /// Name of the traded instrument
    pub name: String,

    /// Trade direction
    pub side: Side,

    /// Number of units traded
    pub quantity: u64,

    /// Price per unit at execution
    pub unit_price: Decimal,

    /// Total cash moved
    pub total_amount: Decimal,

    /// Profit realized against the average cost (zero for buys)
    pub realized_profit: Decimal,

    /// Acorns granted by this trade
    pub acorns_granted: u32,

    /// When the trade executed
    pub executed_at: DateTime<Utc>,
}

/// Round a cash amount to cents, half away from zero
///
/// Every stored currency amount (totals, average costs, profits,
/// valuations) passes through this so that equal inputs always
/// produce bit-identical balances.
pub fn round_cash(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a realized profit into an acorn grant
///
/// One acorn per whole 100 of profit, truncated toward zero.
/// Profits at or below zero grant nothing; losses never debit acorns.
pub fn acorn_reward(profit: Decimal) -> u32 {
    if profit <= Decimal::ZERO {
        return 0;
    }
    // Saturates if the grant ever exceeds u32 range.
    (profit / ACORN_PROFIT_UNIT).floor().to_u32().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case::exact_cents(dec!(123.45), dec!(123.45))]
    #[case::half_up(dec!(100.665), dec!(100.67))]
    #[case::half_up_boundary(dec!(0.005), dec!(0.01))]
    #[case::truncating_extra_digits(dec!(33.333333), dec!(33.33))]
    #[case::negative_half_away(dec!(-0.005), dec!(-0.01))]
    #[case::zero(dec!(0), dec!(0.00))]
    fn test_round_cash(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_cash(input), expected);
    }

    #[rstest]
    #[case::exact_multiple(dec!(500.00), 5)]
    #[case::one_unit(dec!(100.00), 1)]
    #[case::below_one_unit(dec!(99.99), 0)]
    #[case::truncates_remainder(dec!(250.75), 2)]
    #[case::zero_profit(dec!(0.00), 0)]
    #[case::loss(dec!(-500.00), 0)]
    fn test_acorn_reward(#[case] profit: Decimal, #[case] expected: u32) {
        assert_eq!(acorn_reward(profit), expected);
    }
}
