//! Integration tests for the catalog gateway and checkout flows,
//! driving a mock spreadsheet bridge.

use core::time::Duration;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fairpos::cache::{CatalogCache, Clock};
use fairpos::catalog::CatalogGateway;
use fairpos::client::SheetsClient;
use fairpos::fair_pos::FairPos;
use fairpos::models::{PaymentMethod, ProductId, VendorId};
use fairpos::retry::RetryPolicy;
use fairpos::session::Session;

/// Clock pinned to 2025-06-01 12:00:00 UTC.
#[derive(Debug)]
struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Builds a gateway against the mock server with a pinned clock and a
/// sleepless retry policy.
fn gateway(server: &MockServer) -> CatalogGateway {
    let client = SheetsClient::builder()
        .token("test-token")
        .base_url(server.uri())
        .build()
        .unwrap();
    let clock = FixedClock(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    CatalogGateway::new(
        client,
        CatalogCache::new(),
        Arc::new(clock),
        RetryPolicy::new(3, Duration::ZERO),
    )
}

/// Builds the high-level facade against the mock server.
fn pos(server: &MockServer) -> FairPos {
    FairPos::from_gateway(gateway(server))
}

/// Mounts a successful collection read.
async fn mount_records(server: &MockServer, collection: &str, records: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/collections/{collection}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": records })))
        .mount(server)
        .await;
}

/// A two-vendor catalog used by the checkout tests.
async fn mount_catalog(server: &MockServer) {
    mount_records(
        server,
        "Vendors",
        json!([
            {"VendorID": 1, "Name": "Анна", "QR_Code_URL": "https://pay.example/1.png"},
            {"VendorID": 2, "Name": "Борис", "Contact": "@boris"}
        ]),
    )
    .await;
    mount_records(
        server,
        "Products",
        json!([
            {"ProductID": 10, "Title": "Море", "Price": 300, "VendorID": 1, "Discount": 50, "ProductType": "Книги"},
            {"ProductID": 11, "Title": "Ветер", "Price": 500, "VendorID": 1, "ProductType": "Книги"},
            {"ProductID": 12, "Title": "Гора", "Price": 400, "VendorID": 1, "ProductType": "Книги"},
            {"ProductID": 20, "Title": "Лес", "Price": 200, "VendorID": 2, "Lottery": "TRUE", "ProductType": "Мерч"}
        ]),
    )
    .await;
}

#[tokio::test]
async fn vendors_are_fetched_once_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/Vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"VendorID": 1, "Name": "Анна"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let first = gateway.list_vendors().await;
    let second = gateway.list_vendors().await;
    assert_eq!(first.len(), 1);
    assert_eq!(second, first);
    assert_eq!(first.first().unwrap().id, VendorId::new(1));
}

#[tokio::test]
async fn rate_limited_read_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/Vendors"))
        .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/Vendors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"VendorID": 1, "Name": "Анна"}]
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let vendors = gateway(&server).list_vendors().await;
    assert_eq!(vendors.len(), 1);
}

#[tokio::test]
async fn permanent_failure_degrades_to_empty_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/Vendors"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let vendors = gateway(&server).list_vendors().await;
    assert!(vendors.is_empty());
}

#[tokio::test]
async fn unreachable_backend_degrades_to_empty() {
    let server = MockServer::start().await;
    let gateway = gateway(&server);
    drop(server);

    let vendors = gateway.list_vendors().await;
    assert!(vendors.is_empty());
    let transactions = gateway.list_transactions(None).await;
    assert!(transactions.is_empty());
}

#[tokio::test]
async fn products_by_vendor_filters_the_cached_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/Products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"ProductID": 10, "Title": "Море", "Price": 300, "VendorID": 1},
                {"ProductID": 20, "Title": "Лес", "Price": 200, "VendorID": 2, "Lottery": "TRUE"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let for_vendor = gateway.list_products_by_vendor(VendorId::new(1)).await;
    let lottery = gateway.list_lottery_products().await;
    assert_eq!(for_vendor.len(), 1);
    assert_eq!(for_vendor.first().unwrap().id, ProductId::new(10));
    assert_eq!(lottery.len(), 1);
    assert_eq!(lottery.first().unwrap().id, ProductId::new(20));
}

#[tokio::test]
async fn invalidated_cache_with_failing_backend_serves_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/Products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"ProductID": 10, "Title": "Море", "Price": 300, "VendorID": 1}]
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/collections/Products"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .with_priority(2)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    assert_eq!(gateway.list_products_by_vendor(VendorId::new(1)).await.len(), 1);
    gateway.invalidate_caches();
    assert!(gateway.list_products_by_vendor(VendorId::new(1)).await.is_empty());
}

#[tokio::test]
async fn append_assigns_ledger_id_and_timestamp() {
    let server = MockServer::start().await;
    mount_records(
        &server,
        "Transactions",
        json!([
            {"TransactionID": 1, "ProductID": 9, "VendorID": 1, "Payment_Method": "cash", "Amount": 100, "Timestamp": "2025-05-31 09:00:00"},
            {"TransactionID": 2, "ProductID": 9, "VendorID": 1, "Payment_Method": "cash", "Amount": 100, "Timestamp": "2025-05-31 09:05:00"}
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .and(body_partial_json(json!({
            "TransactionID": 3,
            "ProductID": 10,
            "VendorID": 1,
            "Payment_Method": "cashless",
            "Amount": 450.0,
            "Timestamp": "2025-06-01 12:00:00"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let recorded = gateway(&server)
        .append_transaction(
            ProductId::new(10),
            VendorId::new(1),
            PaymentMethod::Cashless,
            450.0,
        )
        .await;
    assert!(recorded);
}

#[tokio::test]
async fn append_failure_returns_false() {
    let server = MockServer::start().await;
    mount_records(&server, "Transactions", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let recorded = gateway(&server)
        .append_transaction(ProductId::new(10), VendorId::new(1), PaymentMethod::Cash, 100.0)
        .await;
    assert!(!recorded);
}

#[tokio::test]
async fn transactions_filter_on_the_date_portion() {
    let server = MockServer::start().await;
    mount_records(
        &server,
        "Transactions",
        json!([
            {"TransactionID": 1, "VendorID": 1, "Amount": 100, "Timestamp": "2025-05-30 23:59:59"},
            {"TransactionID": 2, "VendorID": 1, "Amount": 200, "Timestamp": "2025-05-31 00:00:00"},
            {"TransactionID": 3, "VendorID": 1, "Amount": 300, "Timestamp": "2025-06-01 08:00:00"},
            {"TransactionID": 4, "VendorID": 1, "Amount": 400, "Timestamp": "not a date"}
        ]),
    )
    .await;

    let gateway = gateway(&server);
    let since = NaiveDate::from_ymd_opt(2025, 5, 31);
    let filtered = gateway.list_transactions(since).await;
    let ids: Vec<i64> = filtered.iter().map(|tx| tx.id.into_inner()).collect();
    assert_eq!(ids, vec![2, 3]);

    // An unfiltered scan keeps the malformed row.
    let all = gateway.list_transactions(None).await;
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn products_by_type_filters_the_cached_catalog() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let pos = pos(&server);
    let books = pos.products_by_type("Книги").await;
    let merch = pos.products_by_type("Мерч").await;
    assert_eq!(books.len(), 3);
    assert_eq!(merch.len(), 1);
    assert!(pos.products_by_type("Открытки").await.is_empty());
}

#[tokio::test]
async fn add_to_cart_snapshots_with_discount() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let pos = pos(&server);
    let mut session = Session::new();
    let item = pos
        .add_to_cart(&mut session, ProductId::new(10), true)
        .await
        .unwrap();
    assert!((item.effective_price - 250.0).abs() < f64::EPSILON);
    assert!((item.discount_applied - 50.0).abs() < f64::EPSILON);
    let priced = pos.price(&session);
    assert!((priced.total - 250.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn add_to_cart_of_unknown_product_is_a_noop() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let pos = pos(&server);
    let mut session = Session::new();
    let result = pos.add_to_cart(&mut session, ProductId::new(99), false).await;
    assert!(result.is_err());
    assert!(session.is_empty());
}

#[tokio::test]
async fn cashless_checkout_surfaces_the_qr_code() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let pos = pos(&server);
    let mut session = Session::new();
    let _item = pos.add_to_cart(&mut session, ProductId::new(10), false).await.unwrap();

    let checkout = pos
        .start_vendor_checkout(&session, VendorId::new(1), PaymentMethod::Cashless)
        .await
        .unwrap();
    assert_eq!(checkout.instructions.image_url(), Some("https://pay.example/1.png"));
    assert!((checkout.subtotal - 300.0).abs() < f64::EPSILON);
    assert_eq!(checkout.item_count, 1);
}

#[tokio::test]
async fn checkout_for_vendor_without_items_is_rejected() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;

    let pos = pos(&server);
    let session = Session::new();
    let result = pos
        .start_vendor_checkout(&session, VendorId::new(1), PaymentMethod::Cash)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn partial_append_failure_still_marks_the_vendor_paid() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_records(&server, "Transactions", json!([])).await;
    // First two appends succeed, the third fails.
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .with_priority(2)
        .mount(&server)
        .await;

    let pos = pos(&server);
    let mut session = Session::new();
    for id in [10, 11, 12] {
        let _item = pos.add_to_cart(&mut session, ProductId::new(id), false).await.unwrap();
    }

    let outcome = pos
        .confirm_vendor_payment(&mut session, VendorId::new(1), PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.failure_count, 1);
    assert!(!outcome.all_recorded());
    // Only vendor 1 was in the cart, so the cycle completed and the
    // session reset despite the failure.
    assert!(outcome.cycle_complete);
    assert!(session.is_empty());
}

#[tokio::test]
async fn two_vendor_cycle_resets_only_when_both_are_paid() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_records(&server, "Transactions", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let pos = pos(&server);
    let mut session = Session::new();
    let _a = pos.add_to_cart(&mut session, ProductId::new(10), false).await.unwrap();
    let _b = pos.add_lottery_to_cart(&mut session, ProductId::new(20)).await.unwrap();

    let first = pos
        .confirm_vendor_payment(&mut session, VendorId::new(1), PaymentMethod::Cash)
        .await
        .unwrap();
    assert!(!first.cycle_complete);
    assert_eq!(session.cart().len(), 2);
    assert!(session.is_paid(VendorId::new(1)));
    assert!(!session.is_paid(VendorId::new(2)));

    let second = pos
        .confirm_vendor_payment(&mut session, VendorId::new(2), PaymentMethod::Cashless)
        .await
        .unwrap();
    // Lottery item charges the fixed 200 fee.
    assert!((second.total - 200.0).abs() < f64::EPSILON);
    assert!(second.cycle_complete);
    assert!(session.is_empty());
    assert!(session.payments().is_empty());
}

#[tokio::test]
async fn vendor_triple_rides_the_bundle_on_its_own_subtotal() {
    let server = MockServer::start().await;
    mount_records(
        &server,
        "Vendors",
        json!([{"VendorID": 1, "Name": "Анна"}]),
    )
    .await;
    mount_records(
        &server,
        "Products",
        json!([
            {"ProductID": 10, "Title": "А", "Price": 600, "VendorID": 1, "Promotion": "3for2"},
            {"ProductID": 11, "Title": "Б", "Price": 500, "VendorID": 1, "Promotion": "3for2"},
            {"ProductID": 12, "Title": "В", "Price": 400, "VendorID": 1, "Promotion": "3for2"}
        ]),
    )
    .await;
    mount_records(&server, "Transactions", json!([])).await;
    // The free member of the triple must be recorded with amount 0.
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .and(body_partial_json(json!({"ProductID": 12, "Amount": 0.0})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .with_priority(2)
        .mount(&server)
        .await;

    let pos = pos(&server);
    let mut session = Session::new();
    for id in [10, 11, 12] {
        let _item = pos.add_to_cart(&mut session, ProductId::new(id), false).await.unwrap();
    }

    let outcome = pos
        .confirm_vendor_payment(&mut session, VendorId::new(1), PaymentMethod::Cash)
        .await
        .unwrap();
    assert!((outcome.total - 1100.0).abs() < f64::EPSILON);
    assert_eq!(outcome.success_count, 3);
}

#[tokio::test]
async fn whole_cart_confirm_clears_even_on_failures() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_records(&server, "Transactions", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/collections/Transactions/records"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let pos = pos(&server);
    let mut session = Session::new();
    let _a = pos.add_to_cart(&mut session, ProductId::new(10), false).await.unwrap();
    let _b = pos.add_to_cart(&mut session, ProductId::new(11), false).await.unwrap();

    let outcome = pos
        .confirm_whole_cart_payment(&mut session, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(outcome.success_count, 0);
    assert_eq!(outcome.failure_count, 2);
    assert!(outcome.cycle_complete);
    assert!(session.is_empty());
}

#[tokio::test]
async fn sales_summary_folds_the_ledger() {
    let server = MockServer::start().await;
    mount_catalog(&server).await;
    mount_records(
        &server,
        "Transactions",
        json!([
            {"TransactionID": 1, "ProductID": 10, "VendorID": 1, "Payment_Method": "cash", "Amount": 300, "Timestamp": "2025-06-01 10:00:00"},
            {"TransactionID": 2, "ProductID": 11, "VendorID": 1, "Payment_Method": "cashless", "Amount": "500", "Timestamp": "2025-06-01 11:00:00"},
            {"TransactionID": 3, "ProductID": 20, "VendorID": 2, "Payment_Method": "cash", "Amount": 200, "Timestamp": "2025-06-01 12:00:00"}
        ]),
    )
    .await;

    let pos = pos(&server);
    let summary = pos.sales_summary(None).await;
    assert_eq!(summary.len(), 2);
    let top = summary.first().unwrap();
    assert_eq!(top.name, "Анна");
    assert!((top.total - 800.0).abs() < f64::EPSILON);

    let detail = pos.vendor_detail(VendorId::new(1), None).await;
    assert_eq!(detail.len(), 2);
    assert_eq!(detail.first().unwrap().product_title, "Ветер");
}
