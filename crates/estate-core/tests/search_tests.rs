//! Integration tests for search and pagination through the EstateApi facade.

use chrono::{DateTime, Duration, TimeZone, Utc};
use estate_core::seed::insert_properties;
use estate_core::{
    CancellationToken, EstateApi, Property, PropertyId, SearchParams, SortBy, SortDir,
    StoreOptions,
};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tempfile::TempDir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
}

fn listing(name: &str, address: &str, price: i64, created_at: DateTime<Utc>) -> Property {
    Property::new("owner-1", name, address, Decimal::from(price), "").with_created_at(created_at)
}

async fn create_api(properties: &[Property]) -> EstateApi {
    let api = EstateApi::new(StoreOptions::in_memory()).await.unwrap();
    insert_properties(api.context(), properties, &CancellationToken::new())
        .await
        .unwrap();
    api
}

/// 240000 at t-2, 510000 at t-1, 780000 at t0.
async fn create_three_listings() -> EstateApi {
    create_api(&[
        listing("Garden Flat", "1 First St", 240_000, t0() - Duration::seconds(2)),
        listing("Harbor House", "2 Second St", 510_000, t0() - Duration::seconds(1)),
        listing("Hilltop Villa", "3 Third St", 780_000, t0()),
    ])
    .await
}

fn prices(items: &[Property]) -> Vec<Decimal> {
    items.iter().map(|p| p.price).collect()
}

#[tokio::test]
async fn test_price_range_sorted_ascending() {
    let api = create_three_listings().await;
    let params = SearchParams::new()
        .min_price(Decimal::from(250_000))
        .max_price(Decimal::from(800_000))
        .sort(SortBy::Price, SortDir::Asc)
        .page(1)
        .page_size(10);

    let page = api.search(&params, &CancellationToken::new()).await.unwrap();
    assert_eq!(prices(&page.items), vec![Decimal::from(510_000), Decimal::from(780_000)]);
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_newest_first_page() {
    let api = create_three_listings().await;
    let params = SearchParams::new()
        .sort(SortBy::CreatedAt, SortDir::Desc)
        .page(1)
        .page_size(2);

    let page = api.search(&params, &CancellationToken::new()).await.unwrap();
    let created: Vec<_> = page.items.iter().map(|p| p.created_at).collect();
    assert_eq!(created, vec![t0(), t0() - Duration::seconds(1)]);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages(), 2);
}

#[tokio::test]
async fn test_name_filter_is_case_insensitive() {
    let api = create_api(&[
        listing("Park View Apartment", "123 Main St", 250_000, t0()),
        listing("PARKSIDE Condo", "9 Elm St", 300_000, t0()),
        listing("Sunny Loft", "456 Elm St", 320_000, t0()),
    ])
    .await;
    let cancel = CancellationToken::new();

    let upper = api.search(&SearchParams::new().name("PARK"), &cancel).await.unwrap();
    let lower = api.search(&SearchParams::new().name("park"), &cancel).await.unwrap();

    assert_eq!(upper.total, 2);
    assert_eq!(upper.total, lower.total);
    assert_eq!(upper.items, lower.items);
}

#[tokio::test]
async fn test_address_filter_is_literal_substring() {
    let api = create_api(&[
        listing("A", "12 Ocean Dr.", 1, t0()),
        listing("B", "12 Ocean Dr", 2, t0()),
        listing("C", "Route 7", 3, t0()),
    ])
    .await;
    let cancel = CancellationToken::new();

    let page = api.search(&SearchParams::new().address("dr."), &cancel).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "A");

    let page = api.search(&SearchParams::new().address("OCEAN"), &cancel).await.unwrap();
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_filters_combine_conjunctively() {
    let api = create_api(&[
        listing("Park View", "Springfield", 250_000, t0()),
        listing("Park Lane", "Shelbyville", 260_000, t0()),
        listing("Park Row", "Springfield", 900_000, t0()),
    ])
    .await;
    let params = SearchParams::new()
        .name("park")
        .address("springfield")
        .max_price(Decimal::from(500_000));

    let page = api.search(&params, &CancellationToken::new()).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Park View");
}

#[tokio::test]
async fn test_equal_keys_break_ties_by_id_descending() {
    let same_time = t0();
    let properties: Vec<Property> = (0..6)
        .map(|i| listing(&format!("Twin {}", i), "Same St", 100_000, same_time))
        .collect();
    let api = create_api(&properties).await;
    let cancel = CancellationToken::new();

    let mut expected: Vec<PropertyId> = properties.iter().map(|p| p.id.clone()).collect();
    expected.sort();
    expected.reverse();

    for sort_by in [SortBy::CreatedAt, SortBy::Price] {
        for sort_dir in [SortDir::Asc, SortDir::Desc] {
            let params = SearchParams::new().sort(sort_by, sort_dir);
            let first = api.search(&params, &cancel).await.unwrap();
            let second = api.search(&params, &cancel).await.unwrap();

            let ids: Vec<_> = first.items.iter().map(|p| p.id.clone()).collect();
            assert_eq!(ids, expected);
            assert_eq!(first.items, second.items);
        }
    }
}

#[tokio::test]
async fn test_name_sort_ignores_case() {
    let api = create_api(&[
        listing("banana", "x", 1, t0()),
        listing("Apple", "x", 2, t0()),
        listing("cherry", "x", 3, t0()),
    ])
    .await;
    let params = SearchParams::new().sort(SortBy::Name, SortDir::Asc);

    let page = api.search(&params, &CancellationToken::new()).await.unwrap();
    let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Apple", "banana", "cherry"]);
}

#[tokio::test]
async fn test_pages_reconstruct_full_set() {
    let base = t0();
    let properties: Vec<Property> = (0..23)
        .map(|i| {
            // Pairs share a timestamp so the tie-breaker is exercised across page edges.
            listing(
                &format!("Home {}", i),
                "Main St",
                100_000 + i,
                base + Duration::seconds(i / 2),
            )
        })
        .collect();
    let api = create_api(&properties).await;
    let cancel = CancellationToken::new();

    let all = api
        .search(&SearchParams::new().page_size(100), &cancel)
        .await
        .unwrap();
    assert_eq!(all.total, 23);

    let mut collected = Vec::new();
    let first = api.search(&SearchParams::new().page_size(5), &cancel).await.unwrap();
    for page in 1..=first.total_pages() as i64 {
        let result = api
            .search(&SearchParams::new().page(page).page_size(5), &cancel)
            .await
            .unwrap();
        assert_eq!(result.total, 23);
        collected.extend(result.items);
    }

    assert_eq!(collected, all.items);
    let unique: HashSet<_> = collected.iter().map(|p| p.id.clone()).collect();
    assert_eq!(unique.len(), 23);
}

#[tokio::test]
async fn test_paging_is_clamped() {
    let properties: Vec<Property> = (0..120)
        .map(|i| listing(&format!("Unit {}", i), "Tower Rd", 1_000 + i, t0() + Duration::seconds(i)))
        .collect();
    let api = create_api(&properties).await;
    let cancel = CancellationToken::new();

    let page_zero = api.search(&SearchParams::new().page(0), &cancel).await.unwrap();
    let page_one = api.search(&SearchParams::new().page(1), &cancel).await.unwrap();
    assert_eq!(page_zero.page, 1);
    assert_eq!(page_zero.items, page_one.items);

    let negative = api.search(&SearchParams::new().page_size(-5), &cancel).await.unwrap();
    assert_eq!(negative.page_size, 20);
    assert_eq!(negative.items.len(), 20);

    let oversized = api.search(&SearchParams::new().page_size(500), &cancel).await.unwrap();
    assert_eq!(oversized.page_size, 100);
    assert_eq!(oversized.items.len(), 100);
    assert_eq!(oversized.total, 120);
}

#[tokio::test]
async fn test_total_independent_of_paging() {
    let properties: Vec<Property> = (0..15)
        .map(|i| listing(&format!("Lot {}", i), "Field Rd", i * 10_000, t0() + Duration::seconds(i)))
        .collect();
    let api = create_api(&properties).await;
    let cancel = CancellationToken::new();
    let filter = SearchParams::new().min_price(Decimal::from(50_000));

    let mut totals = HashSet::new();
    for (page, page_size) in [(1, 3), (2, 3), (4, 4), (9, 7), (1, 100)] {
        let result = api
            .search(&filter.clone().page(page).page_size(page_size), &cancel)
            .await
            .unwrap();
        totals.insert(result.total);
    }
    assert_eq!(totals, HashSet::from([10]));
}

#[tokio::test]
async fn test_get_by_id() {
    let api = create_three_listings().await;
    let cancel = CancellationToken::new();
    let page = api.search(&SearchParams::default(), &cancel).await.unwrap();
    let newest = &page.items[0];

    let found = api.get_by_id(newest.id.as_str(), &cancel).await.unwrap();
    assert_eq!(found.as_ref(), Some(newest));
    assert!(api.get_by_id("no-such-listing", &cancel).await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let options = StoreOptions::at(temp_dir.path()).with_database("catalog");
    let cancel = CancellationToken::new();

    let api = EstateApi::new(options.clone()).await.unwrap();
    insert_properties(api.context(), &[listing("Kept", "1 St", 5, t0())], &cancel)
        .await
        .unwrap();
    api.close().await.unwrap();
    drop(api);

    let reopened = EstateApi::new(options).await.unwrap();
    let page = reopened.search(&SearchParams::default(), &cancel).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "Kept");
}

#[tokio::test]
async fn test_concurrent_searches() {
    let api = std::sync::Arc::new(create_three_listings().await);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let api = std::sync::Arc::clone(&api);
        handles.push(tokio::spawn(async move {
            api.search(&SearchParams::default(), &CancellationToken::new())
                .await
                .map(|page| page.total)
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 3);
    }
}

#[tokio::test]
async fn test_names_equal_ignoring_case_tie_on_id() {
    let properties = [
        listing("Park", "x", 1, t0()),
        listing("PARK", "x", 2, t0()),
        listing("park", "x", 3, t0()),
    ];
    let api = create_api(&properties).await;

    let mut expected: Vec<PropertyId> = properties.iter().map(|p| p.id.clone()).collect();
    expected.sort();
    expected.reverse();

    for sort_dir in [SortDir::Asc, SortDir::Desc] {
        let params = SearchParams::new().sort(SortBy::Name, sort_dir);
        let page = api.search(&params, &CancellationToken::new()).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, expected);
    }
}
