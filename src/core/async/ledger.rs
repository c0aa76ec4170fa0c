//! Thread-safe account ledger for async batch processing
//!
//! This module provides the `AsyncAccountLedger` struct, which manages account
//! states using concurrent data structures to enable safe multi-threaded access.
//!
//! # Design
//!
//! The `AsyncAccountLedger` uses `DashMap` (a concurrent HashMap) to provide
//! thread-safe account storage with fine-grained locking. This allows multiple
//! threads to safely access different accounts concurrently while maintaining
//! consistency for operations on the same account.

use crate::types::{Account, AccountId, TradeError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Thread-safe account ledger for async batch processing
///
/// `AsyncAccountLedger` provides concurrent access to account states using
/// `DashMap` for fine-grained locking. Multiple threads can safely access
/// different accounts simultaneously, while operations on the same account
/// are automatically serialized.
///
/// # Thread Safety
///
/// All methods are safe to call from multiple threads concurrently. The internal
/// `DashMap` ensures that:
/// - Concurrent reads to different accounts don't block each other
/// - Concurrent writes to different accounts don't block each other
/// - Operations on the same account are properly synchronized
#[derive(Debug)]
pub struct AsyncAccountLedger {
    /// Concurrent HashMap storing account states by account ID
    accounts: DashMap<AccountId, Account>,
}

impl AsyncAccountLedger {
    /// Create a new empty AsyncAccountLedger
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Get an existing account or create one with default balances
    ///
    /// If multiple threads attempt to create the same account
    /// simultaneously, only one will succeed in creating it, and all
    /// threads will receive the same account.
    ///
    /// # Returns
    ///
    /// A clone of the account. This is a snapshot at the time of the call;
    /// concurrent modifications by other threads won't be reflected in the
    /// returned value.
    pub fn ensure(&self, id: AccountId) -> Account {
        self.accounts
            .entry(id)
            .or_insert_with(|| Account::new(id))
            .clone()
    }

    /// Open a new account with an explicit starting cash balance
    ///
    /// # Errors
    ///
    /// Returns `AccountAlreadyExists` if an account with this ID is
    /// already open. The existing account is unchanged.
    pub fn open(&self, id: AccountId, initial_balance: Decimal) -> Result<Account, TradeError> {
        match self.accounts.entry(id) {
            Entry::Occupied(_) => Err(TradeError::account_already_exists(id)),
            Entry::Vacant(entry) => {
                let account = Account::with_balance(id, initial_balance);
                entry.insert(account.clone());
                Ok(account)
            }
        }
    }

    /// Look up an account by ID
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account exists for the ID.
    pub fn get(&self, id: AccountId) -> Result<Account, TradeError> {
        self.accounts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TradeError::account_not_found(id))
    }

    /// Update an account using a closure
    ///
    /// The closure receives a mutable reference to the account and can
    /// modify it. The account entry is locked during the closure
    /// execution, so no other thread can observe a partially-updated
    /// state. The account's modification time is stamped after the
    /// closure succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no account exists for the ID, or
    /// the error produced by the closure. The account is unchanged when
    /// the closure fails.
    pub fn update<F>(&self, id: AccountId, f: F) -> Result<(), TradeError>
    where
        F: FnOnce(&mut Account) -> Result<(), TradeError>,
    {
        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| TradeError::account_not_found(id))?;
        f(entry.value_mut())?;
        entry.value_mut().touch();
        Ok(())
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

    /// Credit cash to an account
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, the amount is not
    /// positive, or the addition would overflow.
    pub fn credit(&self, id: AccountId, amount: Decimal) -> Result<(), TradeError> {
        if amount <= Decimal::ZERO {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "credit amount must be positive",
            ));
        }
        self.update(id, |account| {
            account.balance = account
                .balance
                .checked_add(amount)
                .ok_or_else(|| TradeError::arithmetic_overflow("credit", id))?;
            Ok(())
        })
    }

    /// Debit cash from an account
    ///
    /// Validates that sufficient cash exists inside the entry lock, so
    /// the balance can never go negative even under concurrent debits.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, the amount is not
    /// positive, or the amount exceeds the cash balance.
    pub fn debit(&self, id: AccountId, amount: Decimal) -> Result<(), TradeError> {
        if amount <= Decimal::ZERO {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "debit amount must be positive",
            ));
        }
        self.update(id, |account| {
            if account.balance < amount {
                return Err(TradeError::insufficient_funds(id, account.balance, amount));
            }
            account.balance -= amount;
            Ok(())
        })
    }

    /// Credit acorns to an account
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, `units` is zero,
    /// or the addition would overflow.
    pub fn credit_acorns(&self, id: AccountId, units: u32) -> Result<(), TradeError> {
        if units == 0 {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "acorn credit must be positive",
            ));
        }
        self.update(id, |account| {
            account.acorns = account
                .acorns
                .checked_add(units)
                .ok_or_else(|| TradeError::arithmetic_overflow("credit_acorns", id))?;
            Ok(())
        })
    }

    /// Debit acorns from an account
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist, `units` is zero,
    /// or `units` exceeds the acorn balance.
    pub fn debit_acorns(&self, id: AccountId, units: u32) -> Result<(), TradeError> {
        if units == 0 {
            return Err(TradeError::invalid_trade_parameters(
                id,
                "acorn debit must be positive",
            ));
        }
        self.update(id, |account| {
            if account.acorns < units {
                return Err(TradeError::insufficient_acorns(id, account.acorns, units));
            }
            account.acorns -= units;
            Ok(())
        })
    }

    /// Get all accounts for final output
    ///
    /// Returns a snapshot of every account sorted by account ID, so the
    /// output order is deterministic regardless of the internal map's
    /// sharding.
    pub fn get_all_accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.id);
        accounts
    }

    /// Number of open accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether any accounts are open
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl Default for AsyncAccountLedger {
    fn default() -> Self {
        Self::new()
    }
}
