//! Wire shapes served to catalog clients.
//!
//! Field names match the web client's contract (`propertyId`, `idOwner`, ...).

use super::property::Property;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A listing as returned by the HTTP surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDto {
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "idOwner")]
    pub id_owner: String,
    pub name: String,
    #[serde(rename = "addressProperty")]
    pub address_property: String,
    #[serde(rename = "priceProperty", with = "rust_decimal::serde::float")]
    pub price_property: Decimal,
    pub image: String,
}

impl From<Property> for PropertyDto {
    fn from(property: Property) -> Self {
        Self {
            property_id: property.id.into_inner(),
            id_owner: property.owner_id,
            name: property.name,
            address_property: property.address,
            price_property: property.price,
            image: property.image_url,
        }
    }
}

/// One page of results plus the numbers a client needs to page further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: u64,
    pub total_pages: u64,
}
