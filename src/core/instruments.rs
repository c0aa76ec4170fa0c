//! Instrument registry module
//!
//! This module provides the `InstrumentRegistry` struct which maintains all
//! known instruments. Instruments are created lazily the first time a symbol
//! is referenced, and carry an advisory reference price used only for
//! portfolio valuation.

use crate::types::{Instrument, InstrumentId, TradeError};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Manages all known instruments
///
/// The registry owns the symbol-to-instrument mapping and assigns
/// sequential instrument IDs. Resolving an unknown symbol creates it
/// with a zero reference price; resolving a known one returns the
/// existing entry, so every symbol maps to exactly one instrument.
pub struct InstrumentRegistry {
    /// Map of instrument IDs to instruments
    instruments: HashMap<InstrumentId, Instrument>,

    /// Map of symbols to instrument IDs
    symbols: HashMap<String, InstrumentId>,

    /// Next instrument ID to assign
    next_id: InstrumentId,
}

impl InstrumentRegistry {
    /// Create a new registry with no instruments
    pub fn new() -> Self {
        InstrumentRegistry {
            instruments: HashMap::new(),
            symbols: HashMap::new(),
            next_id: 1,
        }
    }

    /// Resolve a symbol to its instrument, creating it if unknown
    ///
    /// A newly created instrument has a zero reference price and takes
    /// its name from `fallback_name`, or from the symbol itself when no
    /// name is supplied. An existing instrument is returned unchanged;
    /// in particular, a later `fallback_name` never renames it.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The symbol to resolve
    /// * `fallback_name` - Name to use when the symbol is first seen
    ///
    /// # Returns
    ///
    /// A reference to the instrument for the symbol
    pub fn resolve(&mut self, symbol: &str, fallback_name: Option<&str>) -> &Instrument {
        let id = match self.symbols.get(symbol) {
            Some(id) => *id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                let name = fallback_name.unwrap_or(symbol);
                self.instruments
                    .insert(id, Instrument::new(id, symbol, name));
                self.symbols.insert(symbol.to_string(), id);
                id
            }
        };
        // The entry was just inserted or already present
        &self.instruments[&id]
    }

    /// Look up an instrument by symbol without creating it
    pub fn get(&self, symbol: &str) -> Option<&Instrument> {
        self.symbols
            .get(symbol)
            .and_then(|id| self.instruments.get(id))
    }

    /// Look up an instrument by ID
    pub fn get_by_id(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments.get(&id)
    }

    /// Publish a new reference price for a symbol
    ///
    /// Creates the instrument if the symbol is unknown, then stores the
    /// price. The price feeds portfolio valuation only; it never affects
    /// trade execution. Callers validate that the price is positive
    /// before publishing it.
    pub fn update_price(&mut self, symbol: &str, price: Decimal) {
        self.resolve(symbol, None);
        if let Some(id) = self.symbols.get(symbol) {
            if let Some(instrument) = self.instruments.get_mut(id) {
                instrument.reference_price = price;
            }
        }
    }

    /// Publish valuation ratios for a symbol
    ///
    /// # Errors
    ///
    /// Returns `InstrumentNotFound` if the symbol is unknown. Ratios
    /// are only meaningful for instruments that already trade.
    pub fn set_ratios(
        &mut self,
        symbol: &str,
        per: Option<Decimal>,
        pbr: Option<Decimal>,
    ) -> Result<(), TradeError> {
        let id = self
            .symbols
            .get(symbol)
            .copied()
            .ok_or_else(|| TradeError::instrument_not_found(symbol))?;
        if let Some(instrument) = self.instruments.get_mut(&id) {
            instrument.per = per;
            instrument.pbr = pbr;
        }
        Ok(())
    }

    /// Number of registered instruments
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

impl Default for InstrumentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolve_creates_unknown_symbol() {
        let mut registry = InstrumentRegistry::new();

        let instrument = registry.resolve("AAPL", Some("Apple Inc."));

        assert_eq!(instrument.id, 1);
        assert_eq!(instrument.symbol, "AAPL");
        assert_eq!(instrument.name, "Apple Inc.");
        assert_eq!(instrument.reference_price, Decimal::ZERO);
    }

    #[test]
    fn test_resolve_without_name_uses_symbol() {
        let mut registry = InstrumentRegistry::new();

        let instrument = registry.resolve("MSFT", None);

        assert_eq!(instrument.name, "MSFT");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut registry = InstrumentRegistry::new();

        let first_id = registry.resolve("AAPL", Some("Apple Inc.")).id;
        let second_id = registry.resolve("AAPL", Some("A Different Name")).id;

        assert_eq!(first_id, second_id);
        assert_eq!(registry.len(), 1);
        // First name wins
        assert_eq!(registry.get("AAPL").unwrap().name, "Apple Inc.");
    }

    #[test]
    fn test_resolve_assigns_sequential_ids() {
        let mut registry = InstrumentRegistry::new();

        assert_eq!(registry.resolve("AAPL", None).id, 1);
        assert_eq!(registry.resolve("MSFT", None).id, 2);
        assert_eq!(registry.resolve("GOOG", None).id, 3);
    }

    #[test]
    fn test_get_unknown_symbol() {
        let registry = InstrumentRegistry::new();
        assert!(registry.get("AAPL").is_none());
    }

    #[test]
    fn test_update_price_on_known_symbol() {
        let mut registry = InstrumentRegistry::new();
        registry.resolve("AAPL", Some("Apple Inc."));

        registry.update_price("AAPL", dec!(187.50));

        assert_eq!(registry.get("AAPL").unwrap().reference_price, dec!(187.50));
    }

    #[test]
    fn test_update_price_creates_unknown_symbol() {
        let mut registry = InstrumentRegistry::new();

        registry.update_price("TSLA", dec!(240.00));

        let instrument = registry.get("TSLA").unwrap();
        assert_eq!(instrument.reference_price, dec!(240.00));
        assert_eq!(instrument.name, "TSLA");
    }

    #[test]
    fn test_get_by_id() {
        let mut registry = InstrumentRegistry::new();
        let id = registry.resolve("AAPL", None).id;

        assert_eq!(registry.get_by_id(id).unwrap().symbol, "AAPL");
        assert!(registry.get_by_id(99).is_none());
    }

    #[test]
    fn test_set_ratios() {
        let mut registry = InstrumentRegistry::new();
        registry.resolve("AAPL", None);

        registry
            .set_ratios("AAPL", Some(dec!(28.5)), Some(dec!(47.1)))
            .unwrap();

        let instrument = registry.get("AAPL").unwrap();
        assert_eq!(instrument.per, Some(dec!(28.5)));
        assert_eq!(instrument.pbr, Some(dec!(47.1)));
    }

    #[test]
    fn test_set_ratios_on_unknown_symbol() {
        let mut registry = InstrumentRegistry::new();
        let result = registry.set_ratios("AAPL", Some(dec!(28.5)), None);
        assert!(matches!(
            result,
            Err(TradeError::InstrumentNotFound { .. })
        ));
    }
}
