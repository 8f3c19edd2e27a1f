//! The `Property` listing entity.

use crate::error::{EstateError, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, totally ordered listing identifier.
///
/// Generated ids are UUIDv7 strings, so lexical order follows creation order.
/// Any string is accepted as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(String);

impl PropertyId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for PropertyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for PropertyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A real-estate listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub owner_id: String,
    pub name: String,
    pub address: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Create a listing stamped with the current time.
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        price: Decimal,
        image_url: impl Into<String>,
    ) -> Self {
        let now = now_truncated();
        Self {
            id: PropertyId::generate(),
            owner_id: owner_id.into(),
            name: name.into(),
            address: address.into(),
            price,
            image_url: image_url.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Override both timestamps, keeping them at store precision.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        let created_at = created_at.trunc_subsecs(6);
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    /// Check the entity invariants.
    pub fn validate(&self) -> Result<()> {
        if self.price < Decimal::ZERO {
            return Err(EstateError::Validation {
                field: "price".to_string(),
                message: format!("must be non-negative, got {}", self.price),
            });
        }
        if self.created_at > self.updated_at {
            return Err(EstateError::Validation {
                field: "createdAt".to_string(),
                message: "must not be after updatedAt".to_string(),
            });
        }
        Ok(())
    }
}

/// Current time at the microsecond precision the store keeps.
pub fn now_truncated() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 text; lexical order equals chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|ts| ts.with_timezone(&Utc))
}
