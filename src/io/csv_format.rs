//! CSV format handling for trade commands and portfolio output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain commands
//! - Portfolio report serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::PortfolioReport;
use crate::types::{Side, TradeRecord};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;
use uuid::Uuid;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns:
/// type, account, symbol, name, quantity, price
///
/// Most fields are optional strings because `price` rows carry no account or
/// quantity, and real-world feeds leave cells empty. Validation and parsing
/// happen in [`convert_csv_record`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub command: String,
    pub account: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
}

/// A parsed input command
///
/// Input rows either execute a trade or publish a reference price for an
/// instrument.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Execute a buy or sell trade
    Trade(TradeRecord),

    /// Publish a reference price for an instrument
    UpdatePrice { symbol: String, price: Decimal },
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Convert a CsvRecord to a Command
///
/// This function:
/// - Parses the command string into a trade side or price update
/// - Parses the account field into a UUID (trade rows only)
/// - Parses quantity as a positive integer (trade rows only)
/// - Parses price as a positive decimal (all rows)
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(Command) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Command, String> {
    let symbol = non_empty(csv_record.symbol)
        .ok_or_else(|| format!("'{}' row requires a symbol", csv_record.command))?;

    let price_str = non_empty(csv_record.price)
        .ok_or_else(|| format!("'{}' row for {} requires a price", csv_record.command, symbol))?;
    let price = Decimal::from_str(&price_str)
        .map_err(|_| format!("Invalid price '{}' for {}", price_str, symbol))?;
    if price <= Decimal::ZERO {
        return Err(format!("Price for {} must be positive, got {}", symbol, price));
    }

    let side = match csv_record.command.to_lowercase().as_str() {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        "price" => {
            return Ok(Command::UpdatePrice { symbol, price });
        }
        other => return Err(format!("Invalid command type: '{}'", other)),
    };

    let account_str = non_empty(csv_record.account)
        .ok_or_else(|| format!("'{}' row for {} requires an account", csv_record.command, symbol))?;
    let account = Uuid::from_str(&account_str)
        .map_err(|_| format!("Invalid account id '{}'", account_str))?;

    let quantity_str = non_empty(csv_record.quantity).ok_or_else(|| {
        format!("'{}' row for {} requires a quantity", csv_record.command, symbol)
    })?;
    let quantity = quantity_str
        .parse::<u64>()
        .map_err(|_| format!("Invalid quantity '{}' for {}", quantity_str, symbol))?;
    if quantity == 0 {
        return Err(format!("Quantity for {} must be positive", symbol));
    }

    Ok(Command::Trade(TradeRecord {
        account,
        symbol,
        name: non_empty(csv_record.name),
        side,
        quantity,
        price,
    }))
}

/// Write portfolio reports to CSV format
///
/// Writes reports in CSV format with columns:
/// account, cash, acorns, stock_value, cost_basis, total_value, profit_loss,
/// profit_loss_rate
///
/// Reports are sorted by account ID for deterministic output.
///
/// # Arguments
///
/// * `reports` - Slice of portfolio reports to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_portfolio_csv(
    reports: &[PortfolioReport],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record([
            "account",
            "cash",
            "acorns",
            "stock_value",
            "cost_basis",
            "total_value",
            "profit_loss",
            "profit_loss_rate",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    // Sort reports by account ID for deterministic output
    let mut sorted_reports = reports.to_vec();
    sorted_reports.sort_by_key(|report| report.account);

    for report in sorted_reports {
        writer
            .write_record(&[
                report.account.to_string(),
                format!("{:.2}", report.cash_balance),
                report.acorns.to_string(),
                format!("{:.2}", report.total_stock_value),
                format!("{:.2}", report.total_cost_basis),
                format!("{:.2}", report.total_value),
                format!("{:.2}", report.total_profit_loss),
                format!("{:.2}", report.total_profit_loss_rate),
            ])
            .map_err(|e| format!("Failed to write portfolio record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
