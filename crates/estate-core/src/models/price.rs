//! Price representation at rest.
//!
//! Prices are stored as SQLite REAL, and only prices that read back unchanged
//! are written. Rows written before the schema repair may still hold the price
//! as TEXT; those are parsed with invariant-culture rules.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rusqlite::types::ValueRef;
use std::str::FromStr;

/// Parse a legacy textual price.
///
/// Accepts surrounding whitespace, an optional leading `+`, `,` as thousands
/// separator in the integral part and `.` as decimal point. Negative values,
/// exponents and currency symbols are rejected.
///
/// ```
/// use estate_core::models::parse_legacy_price;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_legacy_price("250000.50"), Some(Decimal::new(25000050, 2)));
/// assert_eq!(parse_legacy_price(" 1,250,000 "), Some(Decimal::new(1250000, 0)));
/// assert_eq!(parse_legacy_price("n/a"), None);
/// ```
pub fn parse_legacy_price(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (integral, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    // Separators only between digits of the integral part.
    if integral.starts_with(',') || integral.ends_with(',') || integral.contains(",,") {
        return None;
    }
    let integral: String = integral.chars().filter(|c| *c != ',').collect();

    let digits_ok = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits_ok(&integral) || !fraction.map_or(true, digits_ok) {
        return None;
    }
    if integral.is_empty() && fraction.map_or(true, str::is_empty) {
        return None;
    }

    let normalized = match fraction {
        Some(f) if !f.is_empty() => format!("{}.{}", if integral.is_empty() { "0" } else { &integral }, f),
        _ => integral,
    };

    Decimal::from_str(&normalized).ok()
}

/// Convert a price to the numeric value persisted in the store.
///
/// Returns `None` when the REAL would not read back as the same decimal.
///
/// ```
/// use estate_core::models::price_to_sql;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(price_to_sql(Decimal::new(25000050, 2)), Some(250000.5));
/// assert_eq!(price_to_sql(Decimal::from_str("12345678901234567.89").unwrap()), None);
/// ```
pub fn price_to_sql(price: Decimal) -> Option<f64> {
    let value = price.to_f64()?;
    (Decimal::from_f64(value) == Some(price)).then_some(value)
}

/// A search bound translated into a comparison against stored REALs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBound {
    pub value: f64,
    pub inclusive: bool,
}

impl PriceBound {
    /// Bound for `price >= bound`.
    ///
    /// A bound with no exact REAL is moved to its nearest REAL; when that REAL
    /// reads back below the bound the comparison becomes strict.
    pub fn lower(bound: Decimal) -> Option<Self> {
        let (value, stored) = nearest_stored(bound)?;
        Some(PriceBound { value, inclusive: stored >= bound })
    }

    /// Bound for `price <= bound`.
    pub fn upper(bound: Decimal) -> Option<Self> {
        let (value, stored) = nearest_stored(bound)?;
        Some(PriceBound { value, inclusive: stored <= bound })
    }
}

fn nearest_stored(bound: Decimal) -> Option<(f64, Decimal)> {
    let value = bound.to_f64().filter(|v| v.is_finite())?;
    Some((value, Decimal::from_f64(value)?))
}

/// Why a stored price could not be read back as a decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceDecodeError {
    /// Legacy text that does not parse as a price.
    Unparsable(String),
    /// A non-finite REAL or a NULL/BLOB value.
    NotNumeric(&'static str),
}

impl std::fmt::Display for PriceDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceDecodeError::Unparsable(text) => write!(f, "unparsable price text {:?}", text),
            PriceDecodeError::NotNumeric(kind) => write!(f, "price stored as {}", kind),
        }
    }
}

/// Read a stored price, whatever its storage class.
pub fn price_from_sql(value: ValueRef<'_>) -> Result<Decimal, PriceDecodeError> {
    match value {
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => {
            Decimal::from_f64(f).ok_or(PriceDecodeError::NotNumeric("non-finite real"))
        }
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            parse_legacy_price(&text).ok_or_else(|| PriceDecodeError::Unparsable(text.into_owned()))
        }
        ValueRef::Null => Err(PriceDecodeError::NotNumeric("null")),
        ValueRef::Blob(_) => Err(PriceDecodeError::NotNumeric("blob")),
    }
}
