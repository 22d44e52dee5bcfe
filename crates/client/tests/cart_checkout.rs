//! Integration tests for the persisted cart and checkout.
//!
//! Uses wiremock for the order service and tempfile for durable storage.
//! Tests cover hydration across restarts, checkout success and failure, and
//! the remembered phone number.

use std::sync::Arc;

use serde_json::json;
use shopfront_client::storage::keys;
use shopfront_client::{
    ApiClient, ApiConfig, CartState, Checkout, Contact, DurableStorage, FetchFailure, Fetched,
    FileStorage, Store, session,
};
use shopfront_core::{CurrencyCode, Customer, CustomerId, Pack, PackId, PackItem, Phone, Price, ProductId};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_checkout(mock_server: &MockServer, storage: Arc<dyn DurableStorage>) -> Checkout {
    let config = ApiConfig::new(&mock_server.uri(), "test-token").expect("valid config");
    let api = ApiClient::new(config).expect("failed to create client");
    Checkout::new(api, storage)
}

fn open_storage(dir: &tempfile::TempDir) -> Arc<dyn DurableStorage> {
    Arc::new(FileStorage::open(dir.path()).expect("open storage"))
}

fn starter_pack() -> Pack {
    Pack {
        id: PackId::new("k1"),
        name: "Starter".to_string(),
        price: Price::from_minor(4200, CurrencyCode::USD),
        description: None,
        image_url: None,
        items: vec![PackItem {
            product_id: ProductId::new("p1"),
            count: 2,
        }],
    }
}

#[test]
fn test_cart_survives_restart_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let cart = CartState::hydrate(Store::new(), open_storage(&dir));
        cart.add_to_cart(&ProductId::new("p1"), 2);
        cart.add_pack_to_cart(&starter_pack());
        cart.toggle_favorite(&ProductId::new("p3"));
    }

    let on_disk = std::fs::read_to_string(dir.path().join(keys::CART)).expect("cart file");
    let parsed: serde_json::Value = serde_json::from_str(&on_disk).expect("valid json");
    assert_eq!(parsed["products"]["p1"], json!({"count": 2}));
    assert_eq!(parsed["packs"]["k1"]["packData"]["name"], "Starter");

    let restored = CartState::hydrate(Store::new(), open_storage(&dir));
    assert_eq!(restored.total_count(), 3);
    assert!(restored.is_pack_fully_in_cart(&starter_pack()));
    assert!(restored.is_favorite(&ProductId::new("p3")));
}

#[test]
fn test_corrupt_file_starts_empty_then_recovers() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(keys::CART), "{\"products\":").expect("write");

    let cart = CartState::hydrate(Store::new(), open_storage(&dir));
    assert_eq!(cart.total_count(), 0);

    cart.add_to_cart(&ProductId::new("p1"), 1);
    let restored = CartState::hydrate(Store::new(), open_storage(&dir));
    assert_eq!(restored.product_count(&ProductId::new("p1")), Some(1));
}

#[tokio::test]
async fn test_checkout_success_clears_cart_and_remembers_phone() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = open_storage(&dir);

    Mock::given(method("POST"))
        .and(path("/orders/create"))
        .and(body_partial_json(json!({
            "customerId": "c-1",
            "phone": "+1 555 010 2030",
            "lines": [
                {"kind": "product", "id": "p1", "count": 2},
                {"kind": "pack", "id": "k1", "count": 1}
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "o-77", "status": "pending"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Store::new();
    session::set_customer(
        &store,
        Some(&Customer {
            id: CustomerId::new("c-1"),
            name: None,
            email: None,
            phone: None,
        }),
    );
    let cart = CartState::hydrate(store, Arc::clone(&storage));
    cart.add_to_cart(&ProductId::new("p1"), 2);
    cart.add_pack_to_cart(&starter_pack());

    let checkout = create_checkout(&mock_server, storage);
    assert_eq!(checkout.last_phone(), None);

    let phone = Phone::parse("+1 555 010 2030").expect("valid phone");
    let placed = checkout
        .submit_order(&cart, &Contact::new(phone.clone()).address("1 Main St"))
        .await
        .into_option()
        .expect("order placed");

    assert_eq!(placed.id.as_str(), "o-77");
    assert_eq!(cart.total_count(), 0);
    assert!(cart.line_items().is_empty());
    assert_eq!(checkout.last_phone(), Some(phone));
}

#[tokio::test]
async fn test_checkout_failure_keeps_cart() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let storage = open_storage(&dir);

    Mock::given(method("POST"))
        .and(path("/orders/create"))
        .respond_with(ResponseTemplate::new(422).set_body_string("out of stock"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cart = CartState::hydrate(Store::new(), Arc::clone(&storage));
    cart.add_to_cart(&ProductId::new("p1"), 1);

    let checkout = create_checkout(&mock_server, storage);
    let phone = Phone::parse("5550102030").expect("valid phone");
    let result = checkout.submit_order(&cart, &Contact::new(phone)).await;

    assert_eq!(result, Fetched::Failed(FetchFailure::Status(422)));
    assert_eq!(cart.product_count(&ProductId::new("p1")), Some(1));
    assert_eq!(checkout.last_phone(), None);
}

#[tokio::test]
async fn test_empty_cart_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let storage = open_storage(&dir);
    let cart = CartState::hydrate(Store::new(), Arc::clone(&storage));
    let checkout = create_checkout(&mock_server, storage);

    let phone = Phone::parse("5550102030").expect("valid phone");
    let result = checkout.submit_order(&cart, &Contact::new(phone)).await;
    assert_eq!(result, Fetched::Empty);
}
