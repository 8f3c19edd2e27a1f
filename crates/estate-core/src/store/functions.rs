//! SQL functions and collations registered on every store connection.

use crate::config::StoreConfig;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::cmp::Ordering;
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Case-insensitive comparison used by the `estate_ci` collation.
///
/// Strings that differ only in case compare equal, so ordering ties fall
/// through to the next sort key.
pub(crate) fn compare_case_insensitive(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Register the collation and the `regexp` function used by `X REGEXP Y`.
pub(crate) fn register(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_collation(
        StoreConfig::CASE_INSENSITIVE_COLLATION,
        compare_case_insensitive,
    )?;

    // SQLite rewrites `X REGEXP Y` to `regexp(Y, X)`.
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let pattern: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let matched = match ctx.get_raw(1) {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .map(|text| pattern.is_match(text))
                    .unwrap_or(false),
                _ => false,
            };
            Ok(matched)
        },
    )?;

    Ok(())
}
