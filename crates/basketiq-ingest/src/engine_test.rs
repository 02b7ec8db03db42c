use basketiq_core::{BaseUnit, Category, InMemoryStore, ProductFilter};
use chrono::{Duration, TimeZone};

use super::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 8, 0, 0).unwrap()
}

fn listing(price: f64) -> RawListing {
    RawListing {
        name: Some("Organic Bananas 5 Pack".to_string()),
        price: Some(price),
        url: Some("https://retailer.test/products/bananas".to_string()),
        external_id: Some("34566543".to_string()),
        size: Some("5 pack".to_string()),
        unit_price: Some("£0.30/each".to_string()),
        brand: Some("Farm Fresh".to_string()),
        rating: Some(4.5),
        ..RawListing::default()
    }
}

async fn history_len(store: &InMemoryStore, product_id: i64) -> usize {
    store
        .recent_price_history(product_id, usize::MAX)
        .await
        .unwrap()
        .len()
}

// -----------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn missing_or_blank_name_is_rejected() {
    let store = InMemoryStore::new();
    for name in [None, Some("  ".to_string())] {
        let raw = RawListing {
            name,
            ..listing(1.49)
        };
        let err = process_scraped_product(&store, &raw, "tesco", t0())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingField("name")));
    }
    assert!(store
        .list_products(&ProductFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn missing_url_and_price_are_rejected() {
    let store = InMemoryStore::new();

    let no_url = RawListing {
        url: None,
        ..listing(1.49)
    };
    let err = process_scraped_product(&store, &no_url, "tesco", t0())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::MissingField("url")));

    let no_price = RawListing {
        price: None,
        ..listing(1.49)
    };
    let err = process_scraped_product(&store, &no_price, "tesco", t0())
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::MissingField("price")));
}

#[tokio::test]
async fn negative_or_nan_price_is_rejected() {
    let store = InMemoryStore::new();
    for price in [-0.01, f64::NAN] {
        let err = process_scraped_product(&store, &listing(price), "tesco", t0())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidPrice(_)));
    }
}

// -----------------------------------------------------------------------
// History append rules
// -----------------------------------------------------------------------

#[tokio::test]
async fn identical_listing_twice_writes_one_history_row() {
    let store = InMemoryStore::new();

    let first = process_scraped_product(&store, &listing(1.49), "tesco", t0())
        .await
        .unwrap();
    let second = process_scraped_product(
        &store,
        &listing(1.49),
        "tesco",
        t0() + Duration::hours(1),
    )
    .await
    .unwrap();

    assert!(first.product_created);
    assert!(first.history_appended);
    assert!(!second.product_created);
    assert!(!second.history_appended);
    assert_eq!(first.product_id, second.product_id);
    assert_eq!(history_len(&store, first.product_id).await, 1);
}

#[tokio::test]
async fn changed_price_writes_second_history_row() {
    let store = InMemoryStore::new();

    let first = process_scraped_product(&store, &listing(1.49), "tesco", t0())
        .await
        .unwrap();
    let second = process_scraped_product(
        &store,
        &listing(1.29),
        "tesco",
        t0() + Duration::days(1),
    )
    .await
    .unwrap();

    assert!(second.history_appended);
    let history = store
        .recent_price_history(first.product_id, 30)
        .await
        .unwrap();
    let prices: Vec<f64> = history.iter().map(|h| h.price).collect();
    assert_eq!(prices, vec![1.49, 1.29]);
    assert_eq!(history[1].valid_from, t0() + Duration::days(1));

    let product = store
        .find_product(1, "https://retailer.test/products/bananas")
        .await
        .unwrap()
        .expect("product exists");
    assert!((product.current_price - 1.29).abs() < f64::EPSILON);
}

#[tokio::test]
async fn sub_penny_noise_is_not_a_price_change() {
    let store = InMemoryStore::new();
    let first = process_scraped_product(&store, &listing(1.99), "tesco", t0())
        .await
        .unwrap();
    let second = process_scraped_product(&store, &listing(1.990_000_1), "tesco", t0())
        .await
        .unwrap();

    assert!(!second.history_appended);
    assert_eq!(history_len(&store, first.product_id).await, 1);
}

// -----------------------------------------------------------------------
// Stored fields
// -----------------------------------------------------------------------

#[tokio::test]
async fn new_product_is_normalized_on_creation() {
    let store = InMemoryStore::new();
    let outcome = process_scraped_product(&store, &listing(1.49), "tesco", t0())
        .await
        .unwrap();

    let products = store.list_products(&ProductFilter::default()).await.unwrap();
    let product = &products[0];
    assert_eq!(product.id, outcome.product_id);
    assert_eq!(product.retailer_name, "tesco");
    assert_eq!(product.category, Category::Fruit);
    assert_eq!(product.currency, "GBP");
    assert_eq!(product.base_quantity, Some(5.0));
    assert_eq!(product.base_unit, Some(BaseUnit::Units));
    assert_eq!(product.external_id.as_deref(), Some("34566543"));

    let history = store
        .recent_price_history(outcome.product_id, 30)
        .await
        .unwrap();
    assert_eq!(history[0].unit_price, Some(0.30));
    assert_eq!(history[0].unit_price_unit.as_deref(), Some("each"));
    assert!(!history[0].is_offer);
}

#[tokio::test]
async fn offer_text_marks_history_row_as_offer() {
    let store = InMemoryStore::new();
    let raw = RawListing {
        discount_price: Some("£1.20 Clubcard Price".to_string()),
        ..listing(1.49)
    };
    let outcome = process_scraped_product(&store, &raw, "tesco", t0())
        .await
        .unwrap();

    let history = store
        .recent_price_history(outcome.product_id, 30)
        .await
        .unwrap();
    assert!(history[0].is_offer);
    assert_eq!(
        history[0].offer_description.as_deref(),
        Some("£1.20 Clubcard Price")
    );
}

#[tokio::test]
async fn repeat_observation_updates_price_and_size_only() {
    let store = InMemoryStore::new();
    process_scraped_product(&store, &listing(1.49), "tesco", t0())
        .await
        .unwrap();

    let changed = RawListing {
        name: Some("Renamed Bananas".to_string()),
        brand: Some("Other Brand".to_string()),
        size: Some("6 pack".to_string()),
        ..listing(1.59)
    };
    process_scraped_product(&store, &changed, "tesco", t0())
        .await
        .unwrap();

    let products = store.list_products(&ProductFilter::default()).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Organic Bananas 5 Pack");
    assert_eq!(products[0].brand.as_deref(), Some("Farm Fresh"));
    assert_eq!(products[0].base_quantity, Some(6.0));
    assert!((products[0].current_price - 1.59).abs() < f64::EPSILON);
}

#[tokio::test]
async fn retailer_names_are_case_sensitive() {
    let store = InMemoryStore::new();
    let a = process_scraped_product(&store, &listing(1.49), "tesco", t0())
        .await
        .unwrap();
    let b = process_scraped_product(&store, &listing(1.49), "Tesco", t0())
        .await
        .unwrap();

    assert_ne!(a.product_id, b.product_id);
    assert!(b.product_created);
}
