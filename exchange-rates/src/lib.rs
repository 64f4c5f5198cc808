//! Exchange Rates Reference Library with Macro-Based Currency Generation
//!
//! This library holds the static reference data of the FX desk: the supported
//! currencies, the base rate for every ordered currency pair, and the display
//! formatting used wherever amounts and rates are shown. Currencies are defined
//! declaratively using a macro that generates the `CurrencyCode` enum and its
//! metadata lookups.
//!
//! # Adding a New Currency
//! Add a line to the `define_currencies!` invocation and the pairs it trades
//! in to `STANDARD_RATES`:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     CHF => ("CHF", "Swiss Franc", "CHF "),
//! }
//! ```
//!
//! # Example
//! ```
//! use exchange_rates::{CurrencyCode, RateTable, format_currency, format_rate};
//!
//! let rates = RateTable::standard();
//! let rate = rates.base_rate(CurrencyCode::USD, CurrencyCode::EUR).unwrap();
//! assert_eq!(format_rate(rate), "0.8500");
//! assert_eq!(format_currency(1000.0, CurrencyCode::USD), "$1,000.00");
//! ```

use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// Parse Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Returned when a currency code is not one of the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct ParseCurrencyError(pub String);

/// Display metadata for a supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Currency {
    pub code: CurrencyCode,
    pub name: &'static str,
    pub symbol: &'static str,
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the CurrencyCode enum and its metadata lookups
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define currencies with an auto-generated code enum and lookups.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     Variant => ("CODE", "Display name", "SYMBOL"),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $display:literal, $symbol:literal)
        ),* $(,)?
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $display),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            pub fn info(&self) -> Currency {
                Currency {
                    code: *self,
                    name: self.name(),
                    symbol: self.symbol(),
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = ParseCurrencyError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(ParseCurrencyError(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "US Dollar", "$"),
    EUR => ("EUR", "Euro", "€"),
    GBP => ("GBP", "British Pound", "£"),
    JPY => ("JPY", "Japanese Yen", "¥"),
    INR => ("INR", "Indian Rupee", "₹"),
}

/// Every supported currency except `selected`, in definition order.
pub fn available_currencies(selected: CurrencyCode) -> Vec<Currency> {
    CurrencyCode::all()
        .iter()
        .filter(|&&c| c != selected)
        .map(CurrencyCode::info)
        .collect()
}

/// A pair is quotable only between two different supported currencies.
pub fn is_valid_pair(source: CurrencyCode, destination: CurrencyCode) -> bool {
    source != destination
}

// ─────────────────────────────────────────────────────────────────────────────
// Base Rates
// ─────────────────────────────────────────────────────────────────────────────

use CurrencyCode::{EUR, GBP, INR, JPY, USD};

/// Units of the destination currency per unit of the source currency.
///
/// Rates are quoted per ordered pair and are not reciprocal of each other.
pub const STANDARD_RATES: &[(CurrencyCode, CurrencyCode, f64)] = &[
    (USD, EUR, 0.85),
    (USD, GBP, 0.75),
    (USD, JPY, 150.0),
    (USD, INR, 83.0),
    (EUR, USD, 1.18),
    (EUR, GBP, 0.88),
    (EUR, JPY, 176.0),
    (EUR, INR, 97.5),
    (GBP, USD, 1.33),
    (GBP, EUR, 1.14),
    (GBP, JPY, 200.0),
    (GBP, INR, 110.5),
    (JPY, USD, 0.0067),
    (JPY, EUR, 0.0057),
    (JPY, GBP, 0.0050),
    (JPY, INR, 0.55),
    (INR, USD, 0.012),
    (INR, EUR, 0.010),
    (INR, GBP, 0.009),
    (INR, JPY, 1.80),
];

/// Default width of the fluctuation band, as a fraction of the base rate (±1%).
pub const DEFAULT_FLUCTUATION_RANGE: f64 = 0.02;

/// Base rate lookup keyed by ordered currency pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<(CurrencyCode, CurrencyCode), f64>,
}

impl RateTable {
    /// The desk's standard table covering every ordered pair.
    pub fn standard() -> Self {
        STANDARD_RATES
            .iter()
            .fold(Self::default(), |table, &(from, to, rate)| {
                table.with_rate(from, to, rate)
            })
    }

    pub fn with_rate(mut self, from: CurrencyCode, to: CurrencyCode, rate: f64) -> Self {
        self.rates.insert((from, to), rate);
        self
    }

    pub fn without(mut self, from: CurrencyCode, to: CurrencyCode) -> Self {
        self.rates.remove(&(from, to));
        self
    }

    pub fn base_rate(&self, from: CurrencyCode, to: CurrencyCode) -> Option<f64> {
        self.rates.get(&(from, to)).copied()
    }

    /// All pairs, sorted by source then destination.
    pub fn pairs(&self) -> Vec<(CurrencyCode, CurrencyCode, f64)> {
        let mut pairs: Vec<_> = self
            .rates
            .iter()
            .map(|(&(from, to), &rate)| (from, to, rate))
            .collect();
        pairs.sort_by_key(|&(from, to, _)| (from, to));
        pairs
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Applies a symmetric fluctuation to `base_rate`.
///
/// `jitter` is a position in the band, clamped to `[-0.5, 0.5]`, so the result
/// never strays further than `range / 2` (relative) from the base rate.
pub fn fluctuate(base_rate: f64, range: f64, jitter: f64) -> f64 {
    base_rate * (1.0 + jitter.clamp(-0.5, 0.5) * range)
}

// ─────────────────────────────────────────────────────────────────────────────
// Display Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Formats an amount with the currency symbol, two decimals and thousands separators.
pub fn format_currency(amount: f64, currency: CurrencyCode) -> String {
    format!(
        "{}{}",
        currency.symbol(),
        group_thousands(&format!("{:.2}", amount))
    )
}

/// Formats an exchange rate with four decimals.
pub fn format_rate(rate: f64) -> String {
    group_thousands(&format!("{:.4}", rate))
}

fn group_thousands(fixed: &str) -> String {
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
