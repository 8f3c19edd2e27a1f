//! Filtered, sorted, paginated reads over the properties table.

use super::params::{Paging, SearchParams};
use super::query::{self, Filter};
use crate::cancel::CancellationToken;
use crate::error::{EstateError, Result};
use crate::models::{parse_timestamp, price_from_sql, PageResult, Property, PropertyDto, PropertyId};
use crate::store::StoreContext;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension, Row};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<Property>,
    /// Rows matching the filter across all pages.
    pub total: u64,
    /// Page actually served, after clamping.
    pub page: i64,
    /// Page size actually used, after clamping.
    pub page_size: i64,
    pub query_time_ms: f64,
}

impl SearchPage {
    pub fn total_pages(&self) -> u64 {
        Paging {
            page: self.page,
            page_size: self.page_size,
        }
        .total_pages(self.total)
    }

    /// Convert into the wire shape.
    pub fn into_page_result(self) -> PageResult<PropertyDto> {
        let total_pages = self.total_pages();
        PageResult {
            items: self.items.into_iter().map(PropertyDto::from).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages,
        }
    }
}

/// Raw column values of one stored listing.
struct PropertyRow {
    id: String,
    owner_id: String,
    name: String,
    address: String,
    price: Value,
    image_url: String,
    created_at: String,
    updated_at: String,
}

impl PropertyRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            address: row.get(3)?,
            price: row.get(4)?,
            image_url: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<PropertyRow> for Property {
    type Error = EstateError;

    fn try_from(row: PropertyRow) -> Result<Self> {
        let corrupt = |message: String| EstateError::CorruptRecord {
            id: row.id.clone(),
            message,
        };

        let price = price_from_sql((&row.price).into()).map_err(|e| corrupt(e.to_string()))?;
        let created_at = parse_timestamp(&row.created_at)
            .map_err(|e| corrupt(format!("invalid createdAt {:?}: {}", row.created_at, e)))?;
        let updated_at = parse_timestamp(&row.updated_at)
            .map_err(|e| corrupt(format!("invalid updatedAt {:?}: {}", row.updated_at, e)))?;

        Ok(Property {
            id: PropertyId::from(row.id),
            owner_id: row.owner_id,
            name: row.name,
            address: row.address,
            price,
            image_url: row.image_url,
            created_at,
            updated_at,
        })
    }
}

/// Search and point lookup over the shared store.
///
/// Stateless; any number of searches may run concurrently.
#[derive(Clone)]
pub struct PropertySearch {
    ctx: Arc<StoreContext>,
}

impl PropertySearch {
    pub fn new(ctx: Arc<StoreContext>) -> Self {
        Self { ctx }
    }

    /// Run a search.
    ///
    /// Paging input is clamped rather than rejected. The count and the page
    /// are read in one transaction with the same filter.
    pub async fn search(
        &self,
        params: &SearchParams,
        cancel: &CancellationToken,
    ) -> Result<SearchPage> {
        let start = Instant::now();
        let paging = params.paging();
        let filter = Filter::from_params(params)?;

        let table = self.ctx.table();
        let count_sql = query::count_sql(table, &filter);
        let select_sql = query::select_sql(table, &filter, params);
        let count_params = filter.params.clone();
        let select_params = query::select_params(&filter, &paging);

        let (total, rows) = self
            .ctx
            .run(cancel, move |conn| {
                let tx = conn.transaction()?;
                let total: i64 = tx.query_row(
                    &count_sql,
                    params_from_iter(count_params.iter()),
                    |row| row.get(0),
                )?;
                let mut stmt = tx.prepare(&select_sql)?;
                let rows = stmt
                    .query_map(params_from_iter(select_params.iter()), PropertyRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                drop(stmt);
                tx.commit()?;
                Ok((total, rows))
            })
            .await?;

        let items = rows
            .into_iter()
            .map(Property::try_from)
            .collect::<Result<Vec<_>>>()?;

        let query_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "Search matched {} properties (page {}, size {}, {} filters) in {:.2}ms",
            total,
            paging.page,
            paging.page_size,
            filter.clauses.len(),
            query_time_ms
        );

        Ok(SearchPage {
            items,
            total: total.max(0) as u64,
            page: paging.page,
            page_size: paging.page_size,
            query_time_ms,
        })
    }

    /// Fetch one listing; `None` when no listing has this id.
    pub async fn get_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Property>> {
        let sql = query::get_by_id_sql(self.ctx.table());
        let key = id.to_string();
        let row = self
            .ctx
            .run(cancel, move |conn| {
                Ok(conn
                    .query_row(&sql, [&key], PropertyRow::from_row)
                    .optional()?)
            })
            .await?;

        match row {
            Some(row) => Property::try_from(row).map(Some),
            None => {
                debug!("Property not found: {}", id);
                Ok(None)
            }
        }
    }
}
