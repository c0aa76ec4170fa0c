//! Account-related types for the Rust Trading Engine
//!
//! This module defines the Account structure and related functionality
//! for managing cash and acorn balances.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Unique account identifier
pub type AccountId = Uuid;

/// Cash balance every account starts with (1,000,000.00)
pub const STARTING_BALANCE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

/// Acorn balance every account starts with
pub const STARTING_ACORNS: u32 = 5;

/// Account state
///
/// Represents the current state of an account, including the cash
/// balance used for trading and the acorn reward balance earned
/// from profitable sells.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The account ID (UUID)
    pub id: AccountId,

    /// Cash available for buys
    ///
    /// Never negative: debits are rejected rather than allowed to
    /// take the balance below zero.
    pub balance: Decimal,

    /// Acorn reward balance
    ///
    /// Acorns are an integral reward currency granted when a sell
    /// realizes a profit. They are never fractional.
    pub acorns: u32,

    /// When the account was opened
    pub created_at: DateTime<Utc>,

    /// When the account state last changed
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with the default starting balances
    ///
    /// # Arguments
    ///
    /// * `id` - The account ID
    ///
    /// # Returns
    ///
    /// A new Account with:
    /// - balance = 1,000,000.00
    /// - acorns = 5
    pub fn new(id: AccountId) -> Self {
        Account::with_balance(id, STARTING_BALANCE)
    }

    /// Create a new account with an explicit starting cash balance
    ///
    /// The acorn balance still starts at the default.
    pub fn with_balance(id: AccountId, balance: Decimal) -> Self {
        let now = Utc::now();
        Account {
            id,
            balance,
            acorns: STARTING_ACORNS,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record that the account state changed
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
