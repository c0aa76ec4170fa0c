//! Thread-safe instrument registry for async batch processing
//!
//! This module provides the `AsyncInstrumentRegistry` struct. Symbol
//! resolution goes through the `DashMap` entry API, so two threads
//! racing to create the same symbol still end up with exactly one
//! instrument and one ID.

use crate::types::{Instrument, InstrumentId, TradeError};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};

/// Thread-safe instrument registry
///
/// Instruments are stored by symbol, with a secondary ID-to-symbol
/// index for lookups by instrument ID. IDs are drawn from an atomic
/// counter, so they are unique but not necessarily dense when two
/// threads race on different symbols.
#[derive(Debug)]
pub struct AsyncInstrumentRegistry {
    /// Concurrent map of symbols to instruments
    by_symbol: DashMap<String, Instrument>,

    /// Concurrent map of instrument IDs back to symbols
    symbols_by_id: DashMap<InstrumentId, String>,

    /// Next instrument ID to assign
    next_id: AtomicU32,
}

impl AsyncInstrumentRegistry {
    /// Create a new registry with no instruments
    pub fn new() -> Self {
        Self {
            by_symbol: DashMap::new(),
            symbols_by_id: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Resolve a symbol to its instrument, creating it if unknown
    ///
    /// A newly created instrument has a zero reference price and takes
    /// its name from `fallback_name`, or from the symbol itself when no
    /// name is supplied. Concurrent resolves of the same symbol create
    /// exactly one instrument; all callers receive the same entry.
    ///
    /// # Returns
    ///
    /// A snapshot clone of the instrument for the symbol
    pub fn resolve(&self, symbol: &str, fallback_name: Option<&str>) -> Instrument {
        let instrument = self
            .by_symbol
            .entry(symbol.to_string())
            .or_insert_with(|| {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                Instrument::new(id, symbol, fallback_name.unwrap_or(symbol))
            })
            .clone();
        // Idempotent: re-inserting the same mapping is harmless
        self.symbols_by_id
            .insert(instrument.id, symbol.to_string());
        instrument
    }

    /// Look up an instrument by symbol without creating it
    pub fn get(&self, symbol: &str) -> Option<Instrument> {
        self.by_symbol.get(symbol).map(|entry| entry.value().clone())
    }

    /// Look up an instrument by ID
    pub fn get_by_id(&self, id: InstrumentId) -> Option<Instrument> {
        let symbol = self.symbols_by_id.get(&id)?.value().clone();
        self.get(&symbol)
    }

    /// Publish a new reference price for a symbol
    ///
    /// Creates the instrument if the symbol is unknown, then stores the
    /// price. Callers validate that the price is positive before
    /// publishing it.
    pub fn update_price(&self, symbol: &str, price: Decimal) {
        self.resolve(symbol, None);
        if let Some(mut entry) = self.by_symbol.get_mut(symbol) {
            entry.value_mut().reference_price = price;
        }
    }

    /// Publish valuation ratios for a symbol
    ///
    /// # Errors
    ///
    /// Returns `InstrumentNotFound` if the symbol is unknown.
    pub fn set_ratios(
        &self,
        symbol: &str,
        per: Option<Decimal>,
        pbr: Option<Decimal>,
    ) -> Result<(), TradeError> {
        let mut entry = self
            .by_symbol
            .get_mut(symbol)
            .ok_or_else(|| TradeError::instrument_not_found(symbol))?;
        let instrument = entry.value_mut();
        instrument.per = per;
        instrument.pbr = pbr;
        Ok(())
    }

    /// Number of registered instruments
    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

impl Default for AsyncInstrumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
