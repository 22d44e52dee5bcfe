//! Integration tests for the catalog cache.
//!
//! Uses wiremock for HTTP mocking. Tests cover list fan-out, cache-forever
//! idempotence, failure caching for lists vs. entities, typed reads, and
//! answers that do not decode.

use serde_json::{Value, json};
use shopfront_client::{
    ApiClient, ApiConfig, CacheKey, Catalog, FetchFailure, Fetched, ListParams, Store,
};
use shopfront_core::{EntityKind, ProductId};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_catalog(mock_server: &MockServer) -> Catalog {
    let config = ApiConfig::new(&mock_server.uri(), "test-token").expect("valid config");
    let api = ApiClient::new(config).expect("failed to create client");
    Catalog::new(Store::new(), api)
}

fn product(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": {"amount": "12.50", "currencyCode": "USD"}
    })
}

#[tokio::test]
async fn test_list_fans_out_to_entity_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"limit": 2})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([product("p1", "Tea"), product("p2", "Mug")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Any detail request would be a cache miss
    Mock::given(method("POST"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    let list = catalog
        .get_collection(EntityKind::Product, &ListParams::all().limit(2))
        .await;
    assert_eq!(list.as_option().map(Vec::len), Some(2));

    let p2 = catalog.get_entity(EntityKind::Product, "p2").await;
    assert_eq!(p2, Fetched::Ok(product("p2", "Mug")));

    let typed = catalog.product(&ProductId::new("p1")).await.into_option();
    assert_eq!(typed.map(|p| p.name), Some("Tea".to_string()));
}

#[tokio::test]
async fn test_repeated_list_reads_hit_network_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/brands"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "b1", "name": "Acme"}])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    let first = catalog.get_collection(EntityKind::Brand, &ListParams::all()).await;
    let second = catalog.get_collection(EntityKind::Brand, &ListParams::all()).await;

    assert_eq!(first, second);
    assert!(catalog.is_cached(&CacheKey::Collection {
        kind: EntityKind::Brand,
        params: ListParams::all(),
    }));
}

#[tokio::test]
async fn test_different_params_are_different_keys() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/packs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    let all = catalog.get_collection(EntityKind::Pack, &ListParams::all()).await;
    let page = catalog
        .get_collection(EntityKind::Pack, &ListParams::all().limit(5).start_at("k3"))
        .await;

    assert_eq!(all, Fetched::Empty);
    assert_eq!(page, Fetched::Empty);
}

#[tokio::test]
async fn test_failed_list_is_cached_as_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collections"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    let first = catalog
        .get_collection(EntityKind::Collection, &ListParams::all())
        .await;
    assert_eq!(first, Fetched::Failed(FetchFailure::Status(503)));

    let second = catalog
        .get_collection(EntityKind::Collection, &ListParams::all())
        .await;
    assert_eq!(second, Fetched::Empty);
    assert!(second.into_list().is_empty());
}

#[tokio::test]
async fn test_failed_entity_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/product"))
        .and(body_json(json!({"id": "p7"})))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/product"))
        .and(body_json(json!({"id": "p7"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(product("p7", "Kettle")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);

    let first = catalog.get_entity(EntityKind::Product, "p7").await;
    assert!(first.is_failed());

    let second = catalog.get_entity(EntityKind::Product, "p7").await;
    assert_eq!(second, Fetched::Ok(product("p7", "Kettle")));

    // Now cached: no third request
    let third = catalog.get_entity(EntityKind::Product, "p7").await;
    assert!(third.is_ok());
}

#[tokio::test]
async fn test_empty_entity_body_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/brand"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    assert_eq!(catalog.get_entity(EntityKind::Brand, "b0").await, Fetched::Empty);
    assert_eq!(catalog.get_entity(EntityKind::Brand, "b0").await, Fetched::Empty);
}

#[tokio::test]
async fn test_store_profile_is_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Corner Shop",
            "currencyCode": "EUR"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    let profile = catalog.get_store_profile().await.into_option().expect("profile");
    assert_eq!(profile.name, "Corner Shop");

    assert!(catalog.get_store_profile().await.is_ok());
    assert!(catalog.is_cached(&CacheKey::StoreProfile));
}

#[tokio::test]
async fn test_malformed_store_profile_is_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nope": 1})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/store"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Corner Shop",
            "currencyCode": "EUR"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);

    let first = catalog.get_store_profile().await;
    assert!(matches!(first.failure(), Some(FetchFailure::Malformed(_))));
    assert!(!catalog.is_cached(&CacheKey::StoreProfile));

    let profile = catalog.get_store_profile().await.into_option().expect("profile");
    assert_eq!(profile.name, "Corner Shop");
    assert!(catalog.is_cached(&CacheKey::StoreProfile));
}

#[tokio::test]
async fn test_typed_read_refetches_wrong_shape_entry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "p2", "name": "No price"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/product"))
        .and(body_json(json!({"id": "p2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(product("p2", "Mug")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    assert!(catalog.products(&ListParams::all()).await.into_list().is_empty());

    // The fanned-out entry lacks a price, so the typed read goes to the network
    let mug = catalog
        .product(&ProductId::new("p2"))
        .await
        .into_option()
        .expect("product");
    assert_eq!(mug.name, "Mug");

    // The decoded answer replaced the entry: no further request
    assert!(catalog.product(&ProductId::new("p2")).await.is_ok());
}

#[tokio::test]
async fn test_typed_list_skips_malformed_elements() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product("p1", "Tea"),
            {"id": "p2", "name": "No price"},
            {"name": "No id", "price": {"amount": "1.00"}}
        ])))
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    let products = catalog.products(&ListParams::all()).await.into_list();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, ProductId::new("p1"));

    // Fan-out still happened for the element with an id
    assert!(catalog.is_cached(&CacheKey::Entity {
        kind: EntityKind::Product,
        id: "p2".to_string(),
    }));
}

#[tokio::test]
async fn test_non_list_answer_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&mock_server)
        .await;

    let catalog = create_catalog(&mock_server);
    let result = catalog.get_collection(EntityKind::Product, &ListParams::all()).await;

    assert!(matches!(result.failure(), Some(FetchFailure::Malformed(_))));
}
