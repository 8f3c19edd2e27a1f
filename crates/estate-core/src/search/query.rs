//! SQL building for property searches.
//!
//! The count and data queries share one `WHERE` clause and parameter list, so
//! totals always agree with the rows that can be paged through.

use super::params::{Paging, SearchParams, SortBy, SortDir};
use crate::error::{EstateError, Result};
use crate::models::PriceBound;
use rust_decimal::Decimal;
use rusqlite::types::Value;

/// Column list read back into a `Property`.
pub(crate) const PROPERTY_COLUMNS: &str =
    "id, owner_id, name, address, price, image_url, created_at, updated_at";

/// Numeric bounds only apply to rows whose price is stored as a number.
const NUMERIC_PRICE: &str = "typeof(price) IN ('integer', 'real')";

/// A `WHERE` clause with its positional parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Filter {
    pub clauses: Vec<String>,
    pub params: Vec<Value>,
}

impl Filter {
    pub fn from_params(params: &SearchParams) -> Result<Self> {
        let mut filter = Filter::default();

        if let Some(term) = non_blank(params.name.as_deref()) {
            filter.push("name REGEXP ?", Value::Text(substring_pattern(term)));
        }
        if let Some(term) = non_blank(params.address.as_deref()) {
            filter.push("address REGEXP ?", Value::Text(substring_pattern(term)));
        }
        if let Some(min) = params.min_price {
            let bound = PriceBound::lower(min).ok_or_else(|| out_of_range("minPrice", min))?;
            let op = if bound.inclusive { ">=" } else { ">" };
            filter.push(
                &format!("({} AND price {} ?)", NUMERIC_PRICE, op),
                Value::Real(bound.value),
            );
        }
        if let Some(max) = params.max_price {
            let bound = PriceBound::upper(max).ok_or_else(|| out_of_range("maxPrice", max))?;
            let op = if bound.inclusive { "<=" } else { "<" };
            filter.push(
                &format!("({} AND price {} ?)", NUMERIC_PRICE, op),
                Value::Real(bound.value),
            );
        }

        Ok(filter)
    }

    fn push(&mut self, clause: &str, value: Value) {
        self.clauses.push(clause.to_string());
        self.params.push(value);
    }

    /// ` WHERE a AND b`, or nothing when there are no predicates.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn out_of_range(field: &str, bound: Decimal) -> EstateError {
    EstateError::Validation {
        field: field.to_string(),
        message: format!("{} is outside the comparable price range", bound),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Case-insensitive literal substring pattern for the `regexp` function.
pub(crate) fn substring_pattern(term: &str) -> String {
    format!("(?i){}", regex::escape(term))
}

/// `ORDER BY` with the id tie-breaker always last.
pub(crate) fn order_by_sql(sort_by: SortBy, sort_dir: SortDir) -> String {
    format!(
        " ORDER BY {} {}, id DESC",
        sort_by.sort_key(),
        sort_dir.as_sql()
    )
}

pub(crate) fn count_sql(table: &str, filter: &Filter) -> String {
    format!("SELECT COUNT(*) FROM {}{}", table, filter.where_sql())
}

/// Data query; `LIMIT ? OFFSET ?` are bound after the filter parameters.
pub(crate) fn select_sql(table: &str, filter: &Filter, params: &SearchParams) -> String {
    format!(
        "SELECT {} FROM {}{}{} LIMIT ? OFFSET ?",
        PROPERTY_COLUMNS,
        table,
        filter.where_sql(),
        order_by_sql(params.sort_by, params.sort_dir)
    )
}

/// Filter parameters followed by limit and offset.
pub(crate) fn select_params(filter: &Filter, paging: &Paging) -> Vec<Value> {
    let mut values = filter.params.clone();
    values.push(Value::Integer(paging.limit()));
    values.push(Value::Integer(paging.skip()));
    values
}

pub(crate) fn get_by_id_sql(table: &str) -> String {
    format!("SELECT {} FROM {} WHERE id = ?1", PROPERTY_COLUMNS, table)
}
