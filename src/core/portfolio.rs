//! Portfolio valuation module
//!
//! This module builds point-in-time portfolio reports from an account's
//! balances and positions. Valuation uses the instrument reference price
//! when one has been published, and falls back to the position's average
//! cost otherwise, in which case the position shows zero unrealized
//! profit or loss.

use crate::types::{round_cash, Account, AccountId, Holding, Instrument, TradeError};
use rust_decimal::Decimal;

/// One hundred, for percentage rate calculations
const PERCENT: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Valuation of a single position
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    /// Symbol of the held instrument
    pub symbol: String,

    /// Name of the held instrument
    pub name: String,

    /// Units held
    pub quantity: u64,

    /// Weighted-average cost per unit
    pub average_cost: Decimal,

    /// Price per unit used for this valuation
    ///
    /// The instrument reference price when published, otherwise the
    /// average cost.
    pub current_price: Decimal,

    /// Market value: quantity x current price, rounded to cents
    pub value: Decimal,

    /// Cost basis: quantity x average cost, rounded to cents
    pub cost_basis: Decimal,

    /// Unrealized profit or loss: value - cost basis
    pub profit_loss: Decimal,

    /// Unrealized profit or loss as a percentage of cost basis
    pub profit_loss_rate: Decimal,
}

/// Point-in-time valuation of an entire account
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    /// Account being valued
    pub account: AccountId,

    /// Cash balance
    pub cash_balance: Decimal,

    /// Acorn balance
    pub acorns: u32,

    /// Valuation of every open position, sorted by symbol
    pub positions: Vec<PositionReport>,

    /// Sum of position values
    pub total_stock_value: Decimal,

    /// Sum of position cost bases
    pub total_cost_basis: Decimal,

    /// Cash balance plus total stock value
    pub total_value: Decimal,

    /// Total unrealized profit or loss across positions
    pub total_profit_loss: Decimal,

    /// Total unrealized profit or loss as a percentage of total cost basis
    pub total_profit_loss_rate: Decimal,
}

/// Value one position against its instrument
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a value calculation overflows.
fn value_position(
    holding: &Holding,
    instrument: &Instrument,
) -> Result<PositionReport, TradeError> {
    let current_price = if instrument.has_reference_price() {
        instrument.reference_price
    } else {
        holding.average_cost
    };

    let quantity = Decimal::from(holding.quantity);
    let value = current_price
        .checked_mul(quantity)
        .map(round_cash)
        .ok_or_else(|| TradeError::arithmetic_overflow("position value", holding.account))?;
    let cost_basis = holding
        .average_cost
        .checked_mul(quantity)
        .map(round_cash)
        .ok_or_else(|| TradeError::arithmetic_overflow("cost basis", holding.account))?;

    let profit_loss = value - cost_basis;
    let profit_loss_rate = if cost_basis > Decimal::ZERO {
        round_cash(profit_loss / cost_basis * PERCENT)
    } else {
        Decimal::ZERO
    };

    Ok(PositionReport {
        symbol: instrument.symbol.clone(),
        name: instrument.name.clone(),
        quantity: holding.quantity,
        average_cost: holding.average_cost,
        current_price,
        value,
        cost_basis,
        profit_loss,
        profit_loss_rate,
    })
}

/// Build a portfolio report for one account
///
/// Positions are valued individually and per-position results are
/// summed, so the totals always equal the sum of the listed positions.
/// An account with no positions reports its cash balance as the total
/// value.
///
/// # Arguments
///
/// * `account` - The account state to report on
/// * `positions` - Every open (holding, instrument) pair of the account
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a valuation sum overflows.
pub fn build_report(
    account: &Account,
    positions: &[(Holding, Instrument)],
) -> Result<PortfolioReport, TradeError> {
    let mut reports = Vec::with_capacity(positions.len());
    for (holding, instrument) in positions {
        reports.push(value_position(holding, instrument)?);
    }
    reports.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let mut total_stock_value = Decimal::ZERO;
    let mut total_cost_basis = Decimal::ZERO;
    for report in &reports {
        total_stock_value = total_stock_value
            .checked_add(report.value)
            .ok_or_else(|| TradeError::arithmetic_overflow("portfolio value", account.id))?;
        total_cost_basis = total_cost_basis
            .checked_add(report.cost_basis)
            .ok_or_else(|| TradeError::arithmetic_overflow("portfolio cost", account.id))?;
    }

    let total_value = account
        .balance
        .checked_add(total_stock_value)
        .ok_or_else(|| TradeError::arithmetic_overflow("portfolio total", account.id))?;
    let total_profit_loss = total_stock_value - total_cost_basis;
    let total_profit_loss_rate = if total_cost_basis > Decimal::ZERO {
        round_cash(total_profit_loss / total_cost_basis * PERCENT)
    } else {
        Decimal::ZERO
    };

    Ok(PortfolioReport {
        account: account.id,
        cash_balance: account.balance,
        acorns: account.acorns,
        positions: reports,
        total_stock_value,
        total_cost_basis,
        total_value,
        total_profit_loss,
        total_profit_loss_rate,
    })
}
