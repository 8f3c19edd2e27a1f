//! Search inputs and their normalization.

use crate::config::{PaginationConfig, StoreConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sort key accepted by search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Price,
    Name,
    #[default]
    CreatedAt,
}

impl SortBy {
    /// Resolve a caller-supplied key; anything unrecognized sorts by creation time.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "price" => SortBy::Price,
            "name" => SortBy::Name,
            _ => SortBy::CreatedAt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Price => "price",
            SortBy::Name => "name",
            SortBy::CreatedAt => "createdAt",
        }
    }

    /// Physical sort expression.
    pub(crate) fn sort_key(&self) -> String {
        match self {
            SortBy::Price => "price".to_string(),
            SortBy::Name => format!("name COLLATE {}", StoreConfig::CASE_INSENSITIVE_COLLATION),
            SortBy::CreatedAt => "created_at".to_string(),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    /// Only `asc` (any case) sorts ascending.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortDir::Asc
        } else {
            SortDir::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }

    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Filter, sort and paging input for a search.
///
/// `page` and `page_size` are taken as given and clamped when the search runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub name: Option<String>,
    pub address: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: i64,
    pub page_size: i64,
    pub sort_by: SortBy,
    pub sort_dir: SortDir,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            name: None,
            address: None,
            min_price: None,
            max_price: None,
            page: PaginationConfig::DEFAULT_PAGE,
            page_size: PaginationConfig::DEFAULT_PAGE_SIZE,
            sort_by: SortBy::default(),
            sort_dir: SortDir::default(),
        }
    }
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn min_price(mut self, price: Decimal) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn max_price(mut self, price: Decimal) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn sort(mut self, sort_by: SortBy, sort_dir: SortDir) -> Self {
        self.sort_by = sort_by;
        self.sort_dir = sort_dir;
        self
    }

    pub fn paging(&self) -> Paging {
        Paging::normalize(self.page, self.page_size)
    }
}

/// Paging after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub page_size: i64,
}

impl Paging {
    /// Clamp raw paging input: `page < 1` becomes 1, a non-positive size
    /// becomes the default and an oversized one the maximum.
    pub fn normalize(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let page_size = if page_size <= 0 {
            PaginationConfig::DEFAULT_PAGE_SIZE
        } else {
            page_size.min(PaginationConfig::MAX_PAGE_SIZE)
        };
        Self { page, page_size }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size as u64)
    }
}
