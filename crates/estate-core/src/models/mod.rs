//! Data models for the estate catalog.

mod price;
mod property;
mod responses;

pub use price::{parse_legacy_price, price_from_sql, price_to_sql, PriceBound, PriceDecodeError};
pub use property::{format_timestamp, now_truncated, parse_timestamp, Property, PropertyId};
pub use responses::{PageResult, PropertyDto};
