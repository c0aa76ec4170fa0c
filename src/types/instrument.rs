//! Instrument types for the Rust Trading Engine
//!
//! This module defines the tradeable instrument structure. Instruments
//! are created lazily the first time a symbol is referenced and carry
//! an advisory reference price used only for portfolio valuation.

use rust_decimal::Decimal;

/// Instrument identifier
///
/// Assigned sequentially by the registry, starting at 1.
pub type InstrumentId = u32;

/// A tradeable instrument
///
/// The reference price is advisory: trades always execute at the
/// caller-supplied price, and the reference price only feeds
/// portfolio valuation. A zero reference price means no price has
/// been published yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    /// Unique instrument identifier
    pub id: InstrumentId,

    /// Symbol the instrument is traded under
    pub symbol: String,

    /// Human-readable name
    pub name: String,

    /// Last published reference price (zero until one is published)
    pub reference_price: Decimal,

    /// Price-to-earnings ratio, if published
    pub per: Option<Decimal>,

    /// Price-to-book ratio, if published
    pub pbr: Option<Decimal>,
}

impl Instrument {
    /// Create a new instrument with no published price or ratios
    pub fn new(id: InstrumentId, symbol: &str, name: &str) -> Self {
        Instrument {
            id,
            symbol: symbol.to_string(),
            name: name.to_string(),
            reference_price: Decimal::ZERO,
            per: None,
            pbr: None,
        }
    }

    /// Whether a reference price has been published for this instrument
    pub fn has_reference_price(&self) -> bool {
        self.reference_price > Decimal::ZERO
    }
}
