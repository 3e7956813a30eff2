//! Currency normalization against a static rate table.
//!
//! All stored and sampled prices are in the base unit of account (USD).
//! [`RateTable::normalize`] converts an amount into a display string for a
//! requested currency. Unknown codes degrade to base-unit display.

use std::collections::HashMap;

use serde::Serialize;

/// Symbol used for the base unit and for unknown currency codes.
pub const BASE_SYMBOL: &str = "$";

/// One row of the rate table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyRate {
    /// Multiplier relative to the base unit.
    pub rate: f64,
    pub symbol: String,
    /// Truncate to an integer instead of showing two decimals.
    pub integer_display: bool,
}

impl CurrencyRate {
    pub fn new(rate: f64, symbol: &str, integer_display: bool) -> Self {
        Self {
            rate,
            symbol: symbol.to_string(),
            integer_display,
        }
    }
}

/// Currency code → conversion and display rule.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<String, CurrencyRate>,
}

impl RateTable {
    /// An empty table: every code formats in the base unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of eight currencies.
    pub fn standard() -> Self {
        let mut table = Self::new();
        table.insert("USD", CurrencyRate::new(1.0, "$", false));
        table.insert("EUR", CurrencyRate::new(0.85, "€", false));
        table.insert("GBP", CurrencyRate::new(0.73, "£", false));
        table.insert("JPY", CurrencyRate::new(110.0, "¥", true));
        table.insert("CAD", CurrencyRate::new(1.25, "C$", false));
        table.insert("AUD", CurrencyRate::new(1.35, "A$", false));
        table.insert("INR", CurrencyRate::new(75.0, "₹", true));
        table.insert("CNY", CurrencyRate::new(6.5, "¥", false));
        table
    }

    /// Add or replace a row. Codes are stored uppercase.
    pub fn insert(&mut self, code: &str, rate: CurrencyRate) {
        self.rates.insert(canonical_code(code), rate);
    }

    pub fn get(&self, code: &str) -> Option<&CurrencyRate> {
        self.rates.get(&canonical_code(code))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Known currency codes, sorted.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Format `amount` (base unit) in `code`.
    ///
    /// Integer-display currencies are truncated toward zero, never rounded.
    pub fn normalize(&self, amount: f64, code: &str) -> String {
        match self.get(code) {
            Some(row) => {
                let converted = amount * row.rate;
                if row.integer_display {
                    format!("{}{}", row.symbol, converted.trunc() as i64)
                } else {
                    format!("{}{:.2}", row.symbol, converted)
                }
            }
            None => format!("{}{:.2}", BASE_SYMBOL, amount),
        }
    }
}

fn canonical_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
