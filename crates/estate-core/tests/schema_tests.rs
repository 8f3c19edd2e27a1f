//! Integration tests for legacy price repair on a file-backed store.

use estate_core::{
    CancellationToken, EstateApi, EstateError, PropertyId, SearchPage, SearchParams, StoreOptions,
};
use rust_decimal::Decimal;
use rusqlite::{params, Connection};
use std::str::FromStr;
use tempfile::TempDir;

const LEGACY_INSERT: &str = "INSERT INTO properties
    (id, owner_id, name, address, price, image_url, created_at, updated_at)
    VALUES (?1, 'owner-legacy', ?2, 'Old Town', ?3, '', ?4, ?4)";

/// Create the table through the API, then write rows the way an older writer
/// did: some prices as text.
async fn create_legacy_store(temp_dir: &TempDir) -> StoreOptions {
    let options = StoreOptions::at(temp_dir.path());
    let api = EstateApi::builder(options.clone())
        .with_indexes(false)
        .with_schema_repair(false)
        .build()
        .await
        .unwrap();
    api.close().await.unwrap();
    drop(api);

    let conn = Connection::open(options.database_path().unwrap()).unwrap();
    conn.execute(
        LEGACY_INSERT,
        params!["legacy-text", "Text Price", "250000.50", "2023-01-01T00:00:00.000000Z"],
    )
    .unwrap();
    conn.execute(
        LEGACY_INSERT,
        params!["legacy-bad", "Unknown Price", "n/a", "2023-01-02T00:00:00.000000Z"],
    )
    .unwrap();
    conn.execute(
        LEGACY_INSERT,
        params!["numeric", "Real Price", 150000.0, "2023-01-03T00:00:00.000000Z"],
    )
    .unwrap();
    options
}

fn ids(page: &SearchPage) -> Vec<&str> {
    page.items.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn test_normalizer_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let options = create_legacy_store(&temp_dir).await;
    let cancel = CancellationToken::new();

    let api = EstateApi::builder(options)
        .with_schema_repair(false)
        .build()
        .await
        .unwrap();
    let above = SearchParams::new().min_price(Decimal::from(200_000));

    // Textual prices are invisible to numeric filters until repaired.
    let before = api.search(&above, &cancel).await.unwrap();
    assert_eq!(before.total, 0);

    let report = api.ensure_schema(&cancel).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.converted, 1);
    assert_eq!(report.skipped, vec![PropertyId::from("legacy-bad")]);

    let after = api.search(&above, &cancel).await.unwrap();
    assert_eq!(ids(&after), vec!["legacy-text"]);
    assert_eq!(after.items[0].price, Decimal::from_str("250000.50").unwrap());

    let below = SearchParams::new().max_price(Decimal::from(1_000_000));
    let all_numeric = api.search(&below, &cancel).await.unwrap();
    assert_eq!(all_numeric.total, 2);
    assert!(!ids(&all_numeric).contains(&"legacy-bad"));

    assert!(api.ensure_schema(&cancel).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unparsable_row_is_left_as_is() {
    let temp_dir = TempDir::new().unwrap();
    let options = create_legacy_store(&temp_dir).await;
    let cancel = CancellationToken::new();

    let api = EstateApi::new(options.clone()).await.unwrap();
    api.close().await.unwrap();
    drop(api);

    // The provisioned file stays writable without the store's own functions.
    let conn = Connection::open(options.database_path().unwrap()).unwrap();
    conn.execute(
        LEGACY_INSERT,
        params!["legacy-late", "Late Import", "75,000", "2023-02-01T00:00:00.000000Z"],
    )
    .unwrap();
    let (kind, text): (String, String) = conn
        .query_row(
            "SELECT typeof(price), price FROM properties WHERE id = 'legacy-bad'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(kind, "text");
    assert_eq!(text, "n/a");
    drop(conn);

    // A restart repairs the late row and still reports the bad one.
    let api = EstateApi::builder(options)
        .with_schema_repair(false)
        .build()
        .await
        .unwrap();
    let report = api.ensure_schema(&cancel).await.unwrap();
    assert_eq!(report.converted, 1);
    assert_eq!(report.skipped, vec![PropertyId::from("legacy-bad")]);

    let late = api.get_by_id("legacy-late", &cancel).await.unwrap().unwrap();
    assert_eq!(late.price, Decimal::from(75_000));

    let result = api.get_by_id("legacy-bad", &cancel).await;
    assert!(matches!(result, Err(EstateError::CorruptRecord { .. })));
}

#[tokio::test]
async fn test_repaired_row_keeps_identity_and_fields() {
    let temp_dir = TempDir::new().unwrap();
    let options = create_legacy_store(&temp_dir).await;
    let cancel = CancellationToken::new();

    let api = EstateApi::new(options).await.unwrap();
    let repaired = api.get_by_id("legacy-text", &cancel).await.unwrap().unwrap();

    assert_eq!(repaired.name, "Text Price");
    assert_eq!(repaired.owner_id, "owner-legacy");
    assert_eq!(repaired.address, "Old Town");
    assert_eq!(repaired.created_at, repaired.updated_at);
    assert_eq!(repaired.price, Decimal::from_str("250000.5").unwrap());
}
