//! Trade execution engine
//!
//! This module provides the TradingEngine that orchestrates trade execution
//! by coordinating between the AccountLedger, HoldingsTracker,
//! InstrumentRegistry, and TradeLog components.
//!
//! The engine enforces business rules such as:
//! - Parameter validation (positive quantity and price) before any mutation
//! - Cash sufficiency for buys, holding sufficiency for sells
//! - Profit-triggered acorn grants on sells
//! - Validate-then-write ordering so a rejected trade never changes state

use crate::core::holdings::HoldingsTracker;
use crate::core::instruments::InstrumentRegistry;
use crate::core::ledger::AccountLedger;
use crate::core::portfolio::{build_report, PortfolioReport};
use crate::core::trade_log::{TradeLog, TradeOutcome};
use crate::types::{
    acorn_reward, round_cash, AccountId, InstrumentId, Side, Trade, TradeError, TradeRecord,
    TradeResult,
};
use rust_decimal::Decimal;

/// Trade execution engine
///
/// Orchestrates trade execution by coordinating between the ledger,
/// holdings tracker, instrument registry, and trade log. Enforces
/// business rules and maintains balance invariants.
pub struct TradingEngine {
    ledger: AccountLedger,
    holdings: HoldingsTracker,
    instruments: InstrumentRegistry,
    trade_log: TradeLog,
}

impl TradingEngine {
    /// Create a new TradingEngine
    ///
    /// Initializes an empty engine with no accounts, instruments,
    /// positions, or recorded trades.
    ///
    /// # Returns
    ///
    /// A new TradingEngine ready to execute trades
    pub fn new() -> Self {
        TradingEngine {
            ledger: AccountLedger::new(),
            holdings: HoldingsTracker::new(),
            instruments: InstrumentRegistry::new(),
            trade_log: TradeLog::new(),
        }
    }

    /// Access the account ledger
    pub fn ledger(&self) -> &AccountLedger {
        &self.ledger
    }

    /// Access the holdings tracker
    pub fn holdings(&self) -> &HoldingsTracker {
        &self.holdings
    }

    /// Access the instrument registry
    pub fn instruments(&self) -> &InstrumentRegistry {
        &self.instruments
    }

    /// Access the trade log
    pub fn trades(&self) -> &TradeLog {
        &self.trade_log
    }

    /// Open an account with an explicit starting balance
    ///
    /// # Errors
    ///
    /// Returns `AccountAlreadyExists` if the account is already open.
    pub fn open_account(
        &mut self,
        account: AccountId,
        initial_balance: Decimal,
    ) -> Result<(), TradeError> {
        self.ledger.open(account, initial_balance)?;
        Ok(())
    }

    /// Open an account with default balances if it does not exist
    ///
    /// Idempotent; an existing account is left untouched.
    pub fn ensure_account(&mut self, account: AccountId) {
        self.ledger.ensure(account);
    }

    /// Publish a reference price for a symbol
    ///
    /// Creates the instrument if the symbol is unknown. The price only
    /// affects portfolio valuation, never trade execution.
    pub fn update_reference_price(&mut self, symbol: &str, price: Decimal) {
        self.instruments.update_price(symbol, price);
    }

    /// Execute a single trade
    ///
    /// Validates the request, routes it by side, updates balances and
    /// positions, and records the executed trade. A rejected trade
    /// leaves every balance and position exactly as it was.
    ///
    /// # Arguments
    ///
    /// * `record` - The trade request to execute
    ///
    /// # Returns
    ///
    /// * `Ok(TradeResult)` describing the executed trade
    /// * `Err(TradeError)` if the trade was rejected
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The quantity or price is not positive
    /// - The account does not exist
    /// - A buy exceeds the cash balance
    /// - A sell exceeds the held quantity (or no position exists)
    /// - A balance or cost calculation would overflow
    pub fn execute(&mut self, record: TradeRecord) -> Result<TradeResult, TradeError> {
        if record.quantity == 0 {
            return Err(TradeError::invalid_trade_parameters(
                record.account,
                "quantity must be positive",
            ));
        }
        if record.price <= Decimal::ZERO {
            return Err(TradeError::invalid_trade_parameters(
                record.account,
                "unit price must be positive",
            ));
        }

        // The account must already exist; trades never create accounts
        self.ledger.get(record.account)?;

        let instrument = self
            .instruments
            .resolve(&record.symbol, record.name.as_deref());
        let instrument_id = instrument.id;
        let instrument_name = instrument.name.clone();

        let total_amount = record
            .price
            .checked_mul(Decimal::from(record.quantity))
            .map(round_cash)
            .ok_or_else(|| TradeError::arithmetic_overflow("trade total", record.account))?;

        match record.side {
            Side::Buy => self.execute_buy(record, instrument_id, instrument_name, total_amount),
            Side::Sell => self.execute_sell(record, instrument_id, instrument_name, total_amount),
        }
    }

    /// Execute a buy: debit cash, fold into the position, log the trade
    fn execute_buy(
        &mut self,
        record: TradeRecord,
        instrument_id: InstrumentId,
        instrument_name: String,
        total_amount: Decimal,
    ) -> Result<TradeResult, TradeError> {
        if !self
            .ledger
            .has_sufficient_balance(record.account, total_amount)?
        {
            let available = self.ledger.balance(record.account)?;
            return Err(TradeError::insufficient_funds(
                record.account,
                available,
                total_amount,
            ));
        }

        self.ledger.debit(record.account, total_amount)?;
        self.holdings.apply_buy(
            record.account,
            instrument_id,
            record.quantity,
            record.price,
        )?;

        let trade = self.trade_log.record(TradeOutcome {
            account: record.account,
            instrument: instrument_id,
            side: Side::Buy,
            quantity: record.quantity,
            unit_price: record.price,
            total_amount,
            realized_profit: Decimal::ZERO,
            acorns_granted: 0,
        });

        tracing::debug!(
            account = %record.account,
            symbol = %record.symbol,
            quantity = record.quantity,
            total = %total_amount,
            "buy executed"
        );

        Ok(Self::to_result(trade, record.symbol, instrument_name))
    }

    /// Execute a sell: credit cash, reduce the position, grant acorns on profit
    fn execute_sell(
        &mut self,
        record: TradeRecord,
        instrument_id: InstrumentId,
        instrument_name: String,
        total_amount: Decimal,
    ) -> Result<TradeResult, TradeError> {
        // Validate the position up front so a rejected sell mutates nothing
        let holding = self
            .holdings
            .get(record.account, instrument_id)
            .ok_or_else(|| TradeError::no_holdings(record.account, &record.symbol))?;

        if holding.quantity < record.quantity {
            return Err(TradeError::insufficient_holdings(
                record.account,
                &record.symbol,
                holding.quantity,
                record.quantity,
            ));
        }

        // Profit is realized against the average cost at the moment of sale
        let average_cost = holding.average_cost;
        let realized_profit = record
            .price
            .checked_sub(average_cost)
            .and_then(|margin| margin.checked_mul(Decimal::from(record.quantity)))
            .map(round_cash)
            .ok_or_else(|| TradeError::arithmetic_overflow("realized profit", record.account))?;
        let acorns_granted = acorn_reward(realized_profit);

        self.ledger.credit(record.account, total_amount)?;
        self.holdings.apply_sell(
            record.account,
            instrument_id,
            &record.symbol,
            record.quantity,
        )?;

        if acorns_granted > 0 {
            self.ledger.credit_acorns(record.account, acorns_granted)?;
            tracing::info!(
                account = %record.account,
                symbol = %record.symbol,
                profit = %realized_profit,
                acorns = acorns_granted,
                "acorns granted"
            );
        }

        let trade = self.trade_log.record(TradeOutcome {
            account: record.account,
            instrument: instrument_id,
            side: Side::Sell,
            quantity: record.quantity,
            unit_price: record.price,
            total_amount,
            realized_profit,
            acorns_granted,
        });

        tracing::debug!(
            account = %record.account,
            symbol = %record.symbol,
            quantity = record.quantity,
            total = %total_amount,
            "sell executed"
        );

        Ok(Self::to_result(trade, record.symbol, instrument_name))
    }

    fn to_result(trade: Trade, symbol: String, name: String) -> TradeResult {
        TradeResult {
            trade_id: trade.id,
            symbol,
            name,
            side: trade.side,
            quantity: trade.quantity,
            unit_price: trade.unit_price,
            total_amount: trade.total_amount,
            realized_profit: trade.realized_profit,
            acorns_granted: trade.acorns_granted,
            executed_at: trade.executed_at,
        }
    }

    /// All trades for one account, newest first
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub fn trade_history(&self, account: AccountId) -> Result<Vec<Trade>, TradeError> {
        self.ledger.get(account)?;
        Ok(self.trade_log.account_history(account))
    }

    /// All trades in one instrument, newest first
    ///
    /// # Errors
    ///
    /// Returns `InstrumentNotFound` if the symbol has never been seen.
    pub fn instrument_history(&self, symbol: &str) -> Result<Vec<Trade>, TradeError> {
        let instrument = self
            .instruments
            .get(symbol)
            .ok_or_else(|| TradeError::instrument_not_found(symbol))?;
        Ok(self.trade_log.instrument_history(instrument.id))
    }

    /// Build a point-in-time portfolio report for one account
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist, or
    /// `ArithmeticOverflow` if a valuation calculation overflows.
    pub fn portfolio(&self, account: AccountId) -> Result<PortfolioReport, TradeError> {
        let state = self.ledger.get(account)?;

        let mut positions = Vec::new();
        for holding in self.holdings.get_account_holdings(account) {
            if let Some(instrument) = self.instruments.get_by_id(holding.instrument) {
                positions.push((holding.clone(), instrument.clone()));
            }
        }

        build_report(state, &positions)
    }
}

impl Default for TradingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn buy(account: AccountId, symbol: &str, quantity: u64, price: Decimal) -> TradeRecord {
        TradeRecord {
            account,
            symbol: symbol.to_string(),
            name: None,
            side: Side::Buy,
            quantity,
            price,
        }
    }

    fn sell(account: AccountId, symbol: &str, quantity: u64, price: Decimal) -> TradeRecord {
        TradeRecord {
            account,
            symbol: symbol.to_string(),
            name: None,
            side: Side::Sell,
            quantity,
            price,
        }
    }

    fn engine_with_account() -> (TradingEngine, AccountId) {
        let mut engine = TradingEngine::new();
        let account = Uuid::new_v4();
        engine.ensure_account(account);
        (engine, account)
    }

    #[test]
    fn test_buy_debits_cash_and_creates_position() {
        let (mut engine, account) = engine_with_account();

        let result = engine.execute(buy(account, "AAPL", 10, dec!(150.00))).unwrap();

        assert_eq!(result.total_amount, dec!(1500.00));
        assert_eq!(result.realized_profit, dec!(0.00));
        assert_eq!(result.acorns_granted, 0);

        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(998500.00));
        let holding = engine.holdings().get(account, 1).unwrap();
        assert_eq!(holding.quantity, 10);
        assert_eq!(holding.average_cost, dec!(150.00));
    }

    #[test]
    fn test_buy_with_name_creates_named_instrument() {
        let (mut engine, account) = engine_with_account();

        let mut record = buy(account, "AAPL", 1, dec!(150.00));
        record.name = Some("Apple Inc.".to_string());
        let result = engine.execute(record).unwrap();

        assert_eq!(result.name, "Apple Inc.");
        assert_eq!(engine.instruments().get("AAPL").unwrap().name, "Apple Inc.");
    }

    #[test]
    fn test_repeat_buys_reweight_average_cost() {
        let (mut engine, account) = engine_with_account();

        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();
        engine.execute(buy(account, "AAPL", 10, dec!(200.00))).unwrap();

        let holding = engine.holdings().get(account, 1).unwrap();
        assert_eq!(holding.quantity, 20);
        assert_eq!(holding.average_cost, dec!(150.00));
        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(997000.00));
    }

    #[test]
    fn test_buy_rejected_when_insufficient_funds() {
        let mut engine = TradingEngine::new();
        let account = Uuid::new_v4();
        engine.open_account(account, dec!(100.00)).unwrap();

        let result = engine.execute(buy(account, "AAPL", 2, dec!(50.01)));

        assert!(matches!(result, Err(TradeError::InsufficientFunds { .. })));
        // Nothing changed
        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(100.00));
        assert!(engine.holdings().is_empty());
        assert!(engine.trades().is_empty());
    }

    #[test]
    fn test_buy_spending_entire_balance_succeeds() {
        let mut engine = TradingEngine::new();
        let account = Uuid::new_v4();
        engine.open_account(account, dec!(100.00)).unwrap();

        engine.execute(buy(account, "AAPL", 2, dec!(50.00))).unwrap();

        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(0.00));
    }

    #[test]
    fn test_sell_credits_cash_and_reduces_position() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();

        let result = engine.execute(sell(account, "AAPL", 4, dec!(100.00))).unwrap();

        assert_eq!(result.total_amount, dec!(400.00));
        assert_eq!(result.realized_profit, dec!(0.00));
        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(999400.00));
        assert_eq!(engine.holdings().get(account, 1).unwrap().quantity, 6);
    }

    #[test]
    fn test_profitable_sell_grants_acorns() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();

        let result = engine.execute(sell(account, "AAPL", 10, dec!(150.00))).unwrap();

        // profit = (150 - 100) * 10 = 500, reward = 5
        assert_eq!(result.realized_profit, dec!(500.00));
        assert_eq!(result.acorns_granted, 5);
        assert_eq!(engine.ledger().acorn_balance(account).unwrap(), 10);
    }

    #[test]
    fn test_sell_below_one_acorn_unit_grants_nothing() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 1, dec!(100.00))).unwrap();

        let result = engine.execute(sell(account, "AAPL", 1, dec!(199.99))).unwrap();

        assert_eq!(result.realized_profit, dec!(99.99));
        assert_eq!(result.acorns_granted, 0);
        assert_eq!(engine.ledger().acorn_balance(account).unwrap(), 5);
    }

    #[test]
    fn test_losing_sell_grants_no_acorns_and_debits_none() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();

        let result = engine.execute(sell(account, "AAPL", 10, dec!(80.00))).unwrap();

        assert_eq!(result.realized_profit, dec!(-200.00));
        assert_eq!(result.acorns_granted, 0);
        assert_eq!(engine.ledger().acorn_balance(account).unwrap(), 5);
        // Proceeds still credited
        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(999800.00));
    }

    #[test]
    fn test_sell_entire_position_removes_holding() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();

        engine.execute(sell(account, "AAPL", 10, dec!(100.00))).unwrap();

        assert!(engine.holdings().get(account, 1).is_none());
    }

    #[test]
    fn test_rebuy_after_full_sell_starts_fresh_basis() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();
        engine.execute(sell(account, "AAPL", 10, dec!(150.00))).unwrap();

        engine.execute(buy(account, "AAPL", 5, dec!(120.00))).unwrap();

        let holding = engine.holdings().get(account, 1).unwrap();
        assert_eq!(holding.average_cost, dec!(120.00));
    }

    #[test]
    fn test_sell_without_position_is_rejected() {
        let (mut engine, account) = engine_with_account();

        let result = engine.execute(sell(account, "AAPL", 1, dec!(100.00)));

        assert!(matches!(result, Err(TradeError::NoHoldings { .. })));
        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(1000000.00));
        assert!(engine.trades().is_empty());
    }

    #[test]
    fn test_oversell_is_rejected_without_mutation() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 5, dec!(100.00))).unwrap();
        let balance_before = engine.ledger().balance(account).unwrap();

        let result = engine.execute(sell(account, "AAPL", 6, dec!(100.00)));

        assert!(matches!(
            result,
            Err(TradeError::InsufficientHoldings { held: 5, requested: 6, .. })
        ));
        assert_eq!(engine.ledger().balance(account).unwrap(), balance_before);
        assert_eq!(engine.holdings().get(account, 1).unwrap().quantity, 5);
        assert_eq!(engine.trades().len(), 1);
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let (mut engine, account) = engine_with_account();

        let result = engine.execute(buy(account, "AAPL", 0, dec!(100.00)));

        assert!(matches!(
            result,
            Err(TradeError::InvalidTradeParameters { .. })
        ));
    }

    #[test]
    fn test_non_positive_price_is_rejected() {
        let (mut engine, account) = engine_with_account();

        let zero = engine.execute(buy(account, "AAPL", 1, dec!(0.00)));
        let negative = engine.execute(buy(account, "AAPL", 1, dec!(-5.00)));

        assert!(matches!(zero, Err(TradeError::InvalidTradeParameters { .. })));
        assert!(matches!(
            negative,
            Err(TradeError::InvalidTradeParameters { .. })
        ));
        // Rejected trades never register the symbol
        assert!(engine.instruments().is_empty());
    }

    #[test]
    fn test_trade_for_unknown_account_is_rejected() {
        let mut engine = TradingEngine::new();

        let result = engine.execute(buy(Uuid::new_v4(), "AAPL", 1, dec!(100.00)));

        assert!(matches!(result, Err(TradeError::AccountNotFound { .. })));
    }

    #[test]
    fn test_fractional_total_rounds_half_up() {
        let (mut engine, account) = engine_with_account();

        // 3 * 33.335 = 100.005 -> 100.01
        let result = engine.execute(buy(account, "AAPL", 3, dec!(33.335))).unwrap();

        assert_eq!(result.total_amount, dec!(100.01));
        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(999899.99));
    }

    #[test]
    fn test_trade_history_newest_first_with_outcomes() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();
        engine.execute(sell(account, "AAPL", 10, dec!(150.00))).unwrap();

        let history = engine.trade_history(account).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].side, Side::Sell);
        assert_eq!(history[0].realized_profit, dec!(500.00));
        assert_eq!(history[0].acorns_granted, 5);
        assert_eq!(history[1].side, Side::Buy);
        assert_eq!(history[1].realized_profit, dec!(0.00));
    }

    #[test]
    fn test_trade_history_for_unknown_account() {
        let engine = TradingEngine::new();
        let result = engine.trade_history(Uuid::new_v4());
        assert!(matches!(result, Err(TradeError::AccountNotFound { .. })));
    }

    #[test]
    fn test_instrument_history_for_unknown_symbol() {
        let engine = TradingEngine::new();
        let result = engine.instrument_history("AAPL");
        assert!(matches!(
            result,
            Err(TradeError::InstrumentNotFound { .. })
        ));
    }

    #[test]
    fn test_instrument_history_spans_accounts() {
        let mut engine = TradingEngine::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        engine.ensure_account(first);
        engine.ensure_account(second);

        engine.execute(buy(first, "AAPL", 1, dec!(100.00))).unwrap();
        engine.execute(buy(second, "AAPL", 2, dec!(101.00))).unwrap();

        let history = engine.instrument_history("AAPL").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].account, second);
    }

    #[test]
    fn test_portfolio_values_with_reference_price() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();
        engine.update_reference_price("AAPL", dec!(120.00));

        let report = engine.portfolio(account).unwrap();

        assert_eq!(report.cash_balance, dec!(999000.00));
        assert_eq!(report.total_stock_value, dec!(1200.00));
        assert_eq!(report.total_cost_basis, dec!(1000.00));
        assert_eq!(report.total_value, dec!(1000200.00));
        assert_eq!(report.total_profit_loss, dec!(200.00));
        assert_eq!(report.total_profit_loss_rate, dec!(20.00));
    }

    #[test]
    fn test_portfolio_without_reference_price_shows_no_movement() {
        let (mut engine, account) = engine_with_account();
        engine.execute(buy(account, "AAPL", 10, dec!(100.00))).unwrap();

        let report = engine.portfolio(account).unwrap();

        assert_eq!(report.total_stock_value, dec!(1000.00));
        assert_eq!(report.total_profit_loss, dec!(0.00));
    }

    #[test]
    fn test_portfolio_for_unknown_account() {
        let engine = TradingEngine::new();
        let result = engine.portfolio(Uuid::new_v4());
        assert!(matches!(result, Err(TradeError::AccountNotFound { .. })));
    }

    #[test]
    fn test_accounts_are_isolated() {
        let mut engine = TradingEngine::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        engine.ensure_account(first);
        engine.ensure_account(second);

        engine.execute(buy(first, "AAPL", 10, dec!(100.00))).unwrap();

        assert_eq!(engine.ledger().balance(first).unwrap(), dec!(999000.00));
        assert_eq!(engine.ledger().balance(second).unwrap(), dec!(1000000.00));
        assert!(engine.holdings().get(second, 1).is_none());
    }

    #[test]
    fn test_cash_conservation_across_round_trip() {
        let (mut engine, account) = engine_with_account();

        engine.execute(buy(account, "AAPL", 10, dec!(123.45))).unwrap();
        engine.execute(sell(account, "AAPL", 10, dec!(123.45))).unwrap();

        // Buying and selling at the same price restores the balance
        assert_eq!(engine.ledger().balance(account).unwrap(), dec!(1000000.00));
        assert!(engine.holdings().is_empty());
    }
}
