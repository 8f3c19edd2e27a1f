//! One-time repair of legacy rows whose `price` was stored as text.

mod normalizer;

pub use crate::models::parse_legacy_price;
pub use normalizer::{NormalizationReport, SchemaNormalizer};
