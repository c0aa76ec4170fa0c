//! Account ledger module
//!
//! This module provides the `AccountLedger` struct which maintains the state
//! of all accounts and provides operations for managing cash and acorn balances.
//!
//! The AccountLedger is responsible for:
//! - Opening accounts explicitly or on first reference
//! - Tracking cash balances with checked arithmetic
//! - Tracking acorn reward balances
//! - Providing sorted account listings for output

use crate::types::{Account, AccountId, TradeError};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Manages all accounts and their balances
///
/// The AccountLedger maintains an in-memory map of account IDs to account
/// states. It provides methods for account creation, balance queries, and
/// the credit/debit operations the trading engine builds on.
pub struct AccountLedger {
    /// Map of account IDs to account states
    accounts: HashMap<AccountId, Account>,
}

impl AccountLedger {
    /// Create a new AccountLedger with no accounts
    ///
    /// # Returns
    ///
    /// A new AccountLedger with an empty account map
    pub fn new() -> Self {
        AccountLedger {
            accounts: HashMap::new(),
        }
    }

    /// Open a new account with an explicit starting cash balance
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID to open
    /// * `initial_balance` - The starting cash balance
    ///
    /// # Returns
    ///
    /// A reference to the newly opened account
    ///
    /// # Errors
    ///
    /// Returns `AccountAlreadyExists` if an account with this ID is
    /// already open. The existing account is unchanged.
    pub fn open(
        &mut self,
        id: AccountId,
        initial_balance: Decimal,
    ) -> Result<&Account, TradeError> {
        if self.accounts.contains_key(&id) {
            return Err(TradeError::account_already_exists(id));
        }
        Ok(self
            .accounts
            .entry(id)
            .or_insert_with(|| Account::with_balance(id, initial_balance)))
    }

    /// Get or create the account for the specified ID
    ///
    /// If no account exists, creates one with the default starting
    /// balances (1,000,000.00 cash and 5 acorns). Idempotent: calling
    /// twice with the same ID returns the same account.
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID to get or create
    ///
    /// # Returns
    ///
    /// A reference to the account for the specified ID
    pub fn ensure(&mut self, id: AccountId) -> &Account {
        self.accounts.entry(id).or_insert_with(|| Account::new(id))
    }

    /// Look up an account by ID
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account exists for the ID.
    pub fn get(&self, id: AccountId) -> Result<&Account, TradeError> {
        self.accounts
            .get(&id)
            .ok_or_else(|| TradeError::account_not_found(id))
    }

    /// Get the cash balance of an account
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account exists for the ID.
    pub fn balance(&self, id: AccountId) -> Result<Decimal, TradeError> {
        Ok(self.get(id)?.balance)
    }

    /// Get the acorn balance of an account
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account exists for the ID.
    pub fn acorn_balance(&self, id: AccountId) -> Result<u32, TradeError> {
        Ok(self.get(id)?.acorns)
    }

    /// Check whether an account can cover a cash amount
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account exists for the ID.
    pub fn has_sufficient_balance(
        &self,
        id: AccountId,
        amount: Decimal,
    ) -> Result<bool, TradeError> {
        Ok(self.get(id)?.balance >= amount)
    }

    /// Check whether an account can cover an acorn amount
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account exists for the ID.
    pub fn has_sufficient_acorns(&self, id: AccountId, units: u32) -> Result<bool, TradeError> {
        Ok(self.get(id)?.acorns >= units)
    }

    /// Get all accounts sorted by account ID
    ///
    /// Returns a vector of references to all accounts, sorted by account ID
    /// in ascending order. This provides deterministic output for CSV generation.
    ///
    /// # Returns
    ///
    /// A vector of references to all accounts, sorted by account ID
    pub fn get_all_accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Credit cash to an account
    ///
    /// Increases the cash balance by the specified amount. Uses checked
    /// arithmetic to prevent overflow and maintain account integrity.
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID to credit
    /// * `amount` - The amount to credit (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - The amount is not positive
    /// - Adding the amount to the balance would cause overflow
    pub fn credit(&mut self, id: AccountId, amount: Decimal) -> Result<(), TradeError> {
        if amount <= Decimal::ZERO {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "credit amount must be positive",
            ));
        }

        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| TradeError::account_not_found(id))?;

        let new_balance = account
            .balance
            .checked_add(amount)
            .ok_or_else(|| TradeError::arithmetic_overflow("credit", id))?;

        account.balance = new_balance;
        account.touch();

        Ok(())
    }

    /// Debit cash from an account
    ///
    /// Decreases the cash balance by the specified amount. Validates that
    /// sufficient cash exists before processing, so the balance can never
    /// go negative.
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID to debit
    /// * `amount` - The amount to debit (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - The amount is not positive
    /// - The amount exceeds the cash balance
    pub fn debit(&mut self, id: AccountId, amount: Decimal) -> Result<(), TradeError> {
        if amount <= Decimal::ZERO {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "debit amount must be positive",
            ));
        }

        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| TradeError::account_not_found(id))?;

        if account.balance < amount {
            return Err(TradeError::insufficient_funds(id, account.balance, amount));
        }

        // balance >= amount, so the subtraction cannot underflow
        account.balance -= amount;
        account.touch();

        Ok(())
    }

    /// Credit acorns to an account
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID to credit
    /// * `units` - The number of acorns to credit (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - `units` is zero
    /// - Adding the units would overflow the acorn balance
    pub fn credit_acorns(&mut self, id: AccountId, units: u32) -> Result<(), TradeError> {
        if units == 0 {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "acorn credit must be positive",
            ));
        }

        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| TradeError::account_not_found(id))?;

        let new_acorns = account
            .acorns
            .checked_add(units)
            .ok_or_else(|| TradeError::arithmetic_overflow("credit_acorns", id))?;

        account.acorns = new_acorns;
        account.touch();

        Ok(())
    }

    /// Debit acorns from an account
    ///
    /// Validates that sufficient acorns exist before processing, so the
    /// acorn balance can never go negative.
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID to debit
    /// * `units` - The number of acorns to debit (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The account does not exist
    /// - `units` is zero
    /// - `units` exceeds the acorn balance
    pub fn debit_acorns(&mut self, id: AccountId, units: u32) -> Result<(), TradeError> {
        if units == 0 {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "acorn debit must be positive",
            ));
        }

        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| TradeError::account_not_found(id))?;

        if account.acorns < units {
            return Err(TradeError::insufficient_acorns(id, account.acorns, units));
        }

        account.acorns -= units;
        account.touch();

        Ok(())
    }
}

impl Default for AccountLedger {
    fn default() -> Self {
        Self::new()
    }
}
