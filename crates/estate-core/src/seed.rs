//! Sample catalog and the insert primitive used to load it.

use crate::cancel::CancellationToken;
use crate::error::{EstateError, Result};
use crate::models::{format_timestamp, price_to_sql, Property};
use crate::store::StoreContext;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Transaction};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// (owner, name, address, price, image seed)
const SAMPLES: [(&str, &str, &str, i64, &str); 10] = [
    ("owner-001", "Park View Apartment", "123 Main St, Springfield", 250_000, "park"),
    ("owner-002", "Sunny Loft", "456 Elm St, Springfield", 320_000, "loft"),
    ("owner-003", "Cozy Cottage", "789 Oak Ave, Shelbyville", 180_000, "cottage"),
    ("owner-004", "Modern Villa", "12 Ocean Dr, Capital City", 980_000, "villa"),
    ("owner-005", "Downtown Studio", "75 Market St, Springfield", 140_000, "studio"),
    ("owner-006", "Riverside House", "41 River Rd, Ogdenville", 450_000, "river"),
    ("owner-007", "Penthouse Elite", "5 Skyline Blvd, North Haverbrook", 1_200_000, "penthouse"),
    ("owner-008", "Suburban Home", "9 Maple St, Springfield", 300_000, "suburban"),
    ("owner-009", "Country Farm", "Route 7, Ruralville", 520_000, "farm"),
    ("owner-010", "Lake Cabin", "2 Pine Rd, Lakeview", 210_000, "lake"),
];

/// The sample listings, created one second apart starting at `now`.
pub fn sample_properties(now: DateTime<Utc>) -> Vec<Property> {
    SAMPLES
        .iter()
        .enumerate()
        .map(|(i, (owner, name, address, price, image))| {
            Property::new(
                *owner,
                *name,
                *address,
                Decimal::from(*price),
                format!("https://picsum.photos/seed/{}/800/500", image),
            )
            .with_created_at(now + Duration::seconds(i as i64))
        })
        .collect()
}

/// Insert listings in one transaction.
///
/// Every listing is validated first; an invalid or duplicate listing fails
/// the whole call and nothing is written.
pub async fn insert_properties(
    ctx: &StoreContext,
    properties: &[Property],
    cancel: &CancellationToken,
) -> Result<usize> {
    for property in properties {
        property.validate()?;
    }
    let table = ctx.table().to_string();
    let properties = properties.to_vec();

    let inserted = ctx
        .run(cancel, move |conn| {
            let tx = conn.transaction()?;
            let inserted = insert_all(&tx, &table, &properties)?;
            tx.commit()?;
            Ok(inserted)
        })
        .await?;
    debug!("Inserted {} properties", inserted);
    Ok(inserted)
}

/// Insert the sample catalog if the table has no rows.
///
/// The emptiness check and the inserts share one transaction. Returns the
/// number of listings inserted (zero when the table already had data).
pub async fn seed_if_empty(ctx: &StoreContext, cancel: &CancellationToken) -> Result<usize> {
    let table = ctx.table().to_string();
    let samples = sample_properties(Utc::now());

    let inserted = ctx
        .run(cancel, move |conn| {
            let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
            let existing: i64 =
                tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            if existing > 0 {
                return Ok(0);
            }
            let inserted = insert_all(&tx, &table, &samples)?;
            tx.commit()?;
            Ok(inserted)
        })
        .await?;

    if inserted > 0 {
        info!("Seeded {} sample properties", inserted);
    } else {
        debug!("Store already has properties; skipping seed");
    }
    Ok(inserted)
}

/// Number of rows in the properties table.
pub async fn count_properties(ctx: &StoreContext, cancel: &CancellationToken) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", ctx.table());
    let count: i64 = ctx
        .run(cancel, move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
        .await?;
    Ok(count.max(0) as u64)
}

fn insert_all(tx: &Transaction<'_>, table: &str, properties: &[Property]) -> Result<usize> {
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {} (id, owner_id, name, address, price, image_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        table
    ))?;
    for property in properties {
        let price = price_to_sql(property.price).ok_or_else(|| EstateError::Validation {
            field: "price".to_string(),
            message: format!("{} cannot be stored without rounding", property.price),
        })?;
        stmt.execute(params![
            property.id.as_str(),
            property.owner_id,
            property.name,
            property.address,
            price,
            property.image_url,
            format_timestamp(&property.created_at),
            format_timestamp(&property.updated_at),
        ])?;
    }
    Ok(properties.len())
}
