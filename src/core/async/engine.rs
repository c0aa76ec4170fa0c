//! Trade execution orchestration for async batch processing
//!
//! This module provides the `AsyncTradingEngine` struct, which orchestrates
//! trade execution using thread-safe ledger, holdings, instrument, and trade
//! log components.
//!
//! # Architecture
//!
//! ```text
//! AsyncTradingEngine
//!     ├── Arc<AsyncAccountLedger>       (thread-safe cash and acorn balances)
//!     ├── Arc<AsyncHoldingsTracker>     (thread-safe positions)
//!     ├── Arc<AsyncInstrumentRegistry>  (thread-safe instrument catalog)
//!     └── Arc<AsyncTradeLog>            (thread-safe executed trade record)
//! ```
//!
//! # Thread Safety
//!
//! The engine is cloneable and safe to share across async tasks. On top of
//! the per-component DashMap locking, the engine holds a per-account mutex
//! across each whole trade, so the multi-step cash/holding/acorn update of
//! one account is never interleaved with another trade on the same account.
//! Trades on different accounts run fully in parallel.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::core::portfolio::{build_report, PortfolioReport};
use crate::core::trade_log::TradeOutcome;
use crate::types::{
    acorn_reward, round_cash, AccountId, InstrumentId, Side, Trade, TradeError, TradeRecord,
    TradeResult,
};

use super::{AsyncAccountLedger, AsyncHoldingsTracker, AsyncInstrumentRegistry, AsyncTradeLog};

/// Trade execution orchestrator for async batch processing
///
/// `AsyncTradingEngine` coordinates trade execution across thread-safe
/// components. It can be cloned and shared across multiple async tasks
/// for concurrent processing; trades within one account are serialized
/// by a per-account lock.
#[derive(Debug, Clone)]
pub struct AsyncTradingEngine {
    /// Thread-safe cash and acorn balances
    ledger: Arc<AsyncAccountLedger>,

    /// Thread-safe position tracker
    holdings: Arc<AsyncHoldingsTracker>,

    /// Thread-safe instrument catalog
    instruments: Arc<AsyncInstrumentRegistry>,

    /// Thread-safe record of executed trades
    trade_log: Arc<AsyncTradeLog>,

    /// Per-account execution locks
    ///
    /// Held across a whole trade (and portfolio snapshot) so that the
    /// multi-step update of one account is atomic with respect to other
    /// trades on the same account.
    account_locks: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
}

impl AsyncTradingEngine {
    /// Create a new AsyncTradingEngine
    ///
    /// # Arguments
    ///
    /// * `ledger` - Arc-wrapped AsyncAccountLedger for balances
    /// * `holdings` - Arc-wrapped AsyncHoldingsTracker for positions
    /// * `instruments` - Arc-wrapped AsyncInstrumentRegistry for the catalog
    /// * `trade_log` - Arc-wrapped AsyncTradeLog for executed trades
    pub fn new(
        ledger: Arc<AsyncAccountLedger>,
        holdings: Arc<AsyncHoldingsTracker>,
        instruments: Arc<AsyncInstrumentRegistry>,
        trade_log: Arc<AsyncTradeLog>,
    ) -> Self {
        Self {
            ledger,
            holdings,
            instruments,
            trade_log,
            account_locks: Arc::new(DashMap::new()),
        }
    }

    /// Access the account ledger
    pub fn ledger(&self) -> &AsyncAccountLedger {
        &self.ledger
    }

    /// Access the holdings tracker
    pub fn holdings(&self) -> &AsyncHoldingsTracker {
        &self.holdings
    }

    /// Access the instrument registry
    pub fn instruments(&self) -> &AsyncInstrumentRegistry {
        &self.instruments
    }

    /// Access the trade log
    pub fn trades(&self) -> &AsyncTradeLog {
        &self.trade_log
    }

    /// Open an account with default balances if it does not exist
    pub fn ensure_account(&self, account: AccountId) {
        self.ledger.ensure(account);
    }

    /// Publish a reference price for a symbol
    pub fn update_reference_price(&self, symbol: &str, price: Decimal) {
        self.instruments.update_price(symbol, price);
    }

    /// Take the execution lock for one account
    fn account_lock(&self, account: AccountId) -> Arc<Mutex<()>> {
        self.account_locks
            .entry(account)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Execute a single trade
    ///
    /// Semantics match the synchronous `TradingEngine::execute`: validate
    /// everything first, then update balances and positions, then record
    /// the trade. The whole sequence runs under the account's execution
    /// lock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The quantity or price is not positive
    /// - The account does not exist
    /// - A buy exceeds the cash balance
    /// - A sell exceeds the held quantity (or no position exists)
    /// - A balance or cost calculation would overflow
    pub fn execute(&self, record: TradeRecord) -> Result<TradeResult, TradeError> {
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

        let lock = self.account_lock(record.account);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // The account must already exist; trades never create accounts
        self.ledger.get(record.account)?;

        let instrument = self
            .instruments
            .resolve(&record.symbol, record.name.as_deref());

        let total_amount = record
            .price
            .checked_mul(Decimal::from(record.quantity))
            .map(round_cash)
            .ok_or_else(|| TradeError::arithmetic_overflow("trade total", record.account))?;

        match record.side {
            Side::Buy => self.execute_buy(record, instrument.id, instrument.name, total_amount),
            Side::Sell => self.execute_sell(record, instrument.id, instrument.name, total_amount),
        }
    }

    /// Execute a buy under the caller-held account lock
    fn execute_buy(
        &self,
        record: TradeRecord,
        instrument_id: InstrumentId,
        instrument_name: String,
        total_amount: Decimal,
    ) -> Result<TradeResult, TradeError> {
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

    /// Execute a sell under the caller-held account lock
    fn execute_sell(
        &self,
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
    /// The account's execution lock is held while the cash balance and
    /// positions are read, so the report is a consistent snapshot even
    /// while other tasks trade on other accounts.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist, or
    /// `ArithmeticOverflow` if a valuation calculation overflows.
    pub fn portfolio(&self, account: AccountId) -> Result<PortfolioReport, TradeError> {
        let lock = self.account_lock(account);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let state = self.ledger.get(account)?;

        let mut positions = Vec::new();
        for holding in self.holdings.get_account_holdings(account) {
            if let Some(instrument) = self.instruments.get_by_id(holding.instrument) {
                positions.push((holding, instrument));
            }
        }

        build_report(&state, &positions)
    }
}
