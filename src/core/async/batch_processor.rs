//! Batch processing with account-based partitioning for async trade execution
//!
//! This module provides the `BatchProcessor` struct, which manages concurrent batch
//! processing with account-based partitioning to enable parallel execution while
//! maintaining per-account trade ordering.
//!
//! # Design
//!
//! The `BatchProcessor` partitions batches by account ID, allowing trades for
//! different accounts to execute concurrently while maintaining sequential
//! ordering for each individual account's trades.
//!
//! # Thread Safety
//!
//! The processor is cloneable and can be safely shared across async tasks.
//! All internal state is protected by Arc, and the underlying engine uses
//! thread-safe components.

use std::collections::HashMap;
use std::sync::Arc;

use super::AsyncTradingEngine;
use crate::types::{AccountId, TradeError, TradeRecord, TradeResult};

/// Result of executing a single trade
///
/// Contains the original trade record and the outcome of executing it.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The trade record that was executed
    pub record: TradeRecord,

    /// The execution outcome (trade result or error)
    pub result: Result<TradeResult, TradeError>,
}

/// Batch processor with account-based partitioning
///
/// `BatchProcessor` manages concurrent batch processing by partitioning
/// trades by account ID. This enables parallel execution of trades for
/// different accounts while maintaining sequential ordering per account.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Thread-safe trade execution engine
    ///
    /// Wrapped in Arc to enable sharing across async tasks.
    engine: Arc<AsyncTradingEngine>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `engine` - Arc-wrapped AsyncTradingEngine for trade execution
    ///
    /// # Returns
    ///
    /// A new `BatchProcessor` that can be cloned and shared across async tasks.
    pub fn new(engine: Arc<AsyncTradingEngine>) -> Self {
        Self { engine }
    }

    /// Partition a batch of trades by account ID
    ///
    /// Each sub-batch contains only trades for a single account, in their
    /// original order. This enables parallel execution across accounts while
    /// keeping each account's trades sequential.
    ///
    /// # Arguments
    ///
    /// * `batch` - A vector of trade records to partition
    ///
    /// # Returns
    ///
    /// A HashMap where:
    /// - Keys are account IDs
    /// - Values are vectors of trades for that account (in original order)
    ///
    /// # Guarantees
    ///
    /// - Each trade appears in exactly one sub-batch
    /// - No trades are lost or duplicated
    /// - Trades for each account maintain their original order
    pub fn partition_by_account(
        &self,
        batch: Vec<TradeRecord>,
    ) -> HashMap<AccountId, Vec<TradeRecord>> {
        let mut account_batches: HashMap<AccountId, Vec<TradeRecord>> = HashMap::new();

        for record in batch {
            account_batches
                .entry(record.account)
                .or_default()
                .push(record);
        }

        account_batches
    }

    /// Execute all trades for a single account sequentially
    ///
    /// Trades are executed in the order they appear in the input vector, so
    /// per-account ordering holds even when multiple accounts are being
    /// processed concurrently. The account is opened with the standard
    /// starting balance on first reference.
    ///
    /// # Arguments
    ///
    /// * `trades` - A vector of trades for one account (in order)
    ///
    /// # Returns
    ///
    /// A vector of `ProcessingResult` containing the outcome of each trade,
    /// in the same order as the input.
    ///
    /// # Guarantees
    ///
    /// - Trades execute in input order
    /// - All trades are attempted, even if some fail
    /// - Errors are captured in the result and don't stop processing
    pub async fn process_account_trades(&self, trades: Vec<TradeRecord>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(trades.len());

        for record in trades {
            self.engine.ensure_account(record.account);
            let result = self.engine.execute(record.clone());
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Execute a batch of trades with account-based partitioning
    ///
    /// This method processes a batch by:
    /// 1. Partitioning the batch by account ID
    /// 2. Spawning a tokio task per account's trade list
    /// 3. Waiting for all tasks to complete
    /// 4. Collecting and returning all results
    ///
    /// # Arguments
    ///
    /// * `batch` - A vector of trade records to execute
    ///
    /// # Returns
    ///
    /// A vector of `ProcessingResult` containing the outcome of each trade.
    /// Results may be in a different order than the input due to concurrent
    /// processing.
    ///
    /// # Guarantees
    ///
    /// - Trades for different accounts execute concurrently
    /// - Trades for the same account execute sequentially in order
    /// - All trades are attempted, even if some fail
    pub async fn process_batch(&self, batch: Vec<TradeRecord>) -> Vec<ProcessingResult> {
        let account_batches = self.partition_by_account(batch);

        let mut tasks = Vec::new();
        for (_account_id, trades) in account_batches {
            let processor = self.clone();
            let task = tokio::spawn(async move { processor.process_account_trades(trades).await });
            tasks.push(task);
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(account_results) => results.extend(account_results),
                Err(e) => {
                    tracing::error!("batch task panicked: {:?}", e);
                }
            }
        }

        results
    }
}
