//! Read-through catalog cache.
//!
//! Serves store profile, collection, product, brand and pack reads from the
//! [`Store`], falling back to the service on a miss.
//!
//! # Policy
//!
//! - Cache-forever: no TTL and no invalidation. A value cached for a key is
//!   never refreshed during the store's lifetime.
//! - List reads fan out: every element with a non-empty `id` is also cached
//!   under its entity key, so a later single-entity read is served locally.
//! - A list read that fails (or returns nothing) caches `[]`, so the same key
//!   is not re-requested. Single-entity and store-profile reads cache nothing
//!   on failure and will hit the service again next time.
//! - Single-entity and store-profile answers are cached only once they decode
//!   as the requested type. A cached value of the wrong shape counts as a miss.
//! - No in-flight de-duplication: two concurrent misses on one key both hit
//!   the service and both write the (same) answer.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shopfront_core::{
    Brand, BrandId, CatalogEntity, Collection, CollectionId, EntityKind, Pack, PackId, Product,
    ProductId, StoreProfile,
};
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, Endpoint};
use crate::error::{FetchFailure, Fetched};
use crate::store::{Store, StorePath};

// =============================================================================
// Cache keys
// =============================================================================

/// Sentinel segment for "no limit".
const ALL: &str = "all";
/// Sentinel segment for "from the beginning".
const START: &str = "start";
/// Marks an explicit start cursor so it can never collide with [`START`].
const FROM_PREFIX: &str = "from:";

/// Parameters of a list read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListParams {
    pub limit: Option<u32>,
    pub start_at: Option<String>,
}

impl ListParams {
    /// Everything, from the beginning.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            limit: None,
            start_at: None,
        }
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn start_at(mut self, id: impl Into<String>) -> Self {
        self.start_at = Some(id.into());
        self
    }

    /// Request body: `{limit?, startAt?}`.
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = serde_json::Map::new();
        if let Some(limit) = self.limit {
            body.insert("limit".to_string(), json!(limit));
        }
        if let Some(start_at) = &self.start_at {
            body.insert("startAt".to_string(), json!(start_at));
        }
        Value::Object(body)
    }
}

/// Typed cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The store profile singleton.
    StoreProfile,
    /// A list read with its parameters.
    Collection { kind: EntityKind, params: ListParams },
    /// One entity.
    Entity { kind: EntityKind, id: String },
}

impl CacheKey {
    /// Where the entry lives in the store.
    ///
    /// - `cache.store`
    /// - `cache.<list name>.<limit|all>.<from:id|start>`
    /// - `cache.<entity name>.<id>`
    #[must_use]
    pub fn path(&self) -> StorePath {
        let root = StorePath::cache();
        match self {
            Self::StoreProfile => root.child(Endpoint::StoreProfile.path()),
            Self::Collection { kind, params } => root
                .child(kind.list_name())
                .child(params.limit.map_or_else(|| ALL.to_string(), |l| l.to_string()))
                .child(
                    params
                        .start_at
                        .as_ref()
                        .map_or_else(|| START.to_string(), |s| format!("{FROM_PREFIX}{s}")),
                ),
            Self::Entity { kind, id } => root.child(kind.entity_name()).child(id.as_str()),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Identifier of a list element, if it has a usable one.
fn entity_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Read-through cache over the catalog endpoints.
#[derive(Debug, Clone)]
pub struct Catalog {
    store: Store,
    api: ApiClient,
}

impl Catalog {
    #[must_use]
    pub const fn new(store: Store, api: ApiClient) -> Self {
        Self { store, api }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Whether `key` is already cached.
    #[must_use]
    pub fn is_cached(&self, key: &CacheKey) -> bool {
        self.store.contains(&key.path())
    }

    /// Read a list of `kind`, raw JSON elements.
    #[instrument(skip(self), fields(kind = %kind))]
    pub async fn get_collection(&self, kind: EntityKind, params: &ListParams) -> Fetched<Vec<Value>> {
        let key = CacheKey::Collection {
            kind,
            params: params.clone(),
        };
        let path = key.path();

        if let Some(cached) = self.store.get(&path) {
            debug!(key = %key, "Cache hit for collection");
            return list_outcome(cached);
        }

        match self.api.post(Endpoint::List(kind), &params.body()).await {
            Ok(Some(Value::Array(items))) => {
                for item in &items {
                    if let Some(id) = entity_id(item) {
                        self.store
                            .set(&CacheKey::Entity { kind, id }.path(), item.clone());
                    }
                }
                self.store.set(&path, Value::Array(items.clone()));
                if items.is_empty() {
                    Fetched::Empty
                } else {
                    Fetched::Ok(items)
                }
            }
            Ok(Some(other)) => {
                warn!(key = %key, kind_of = %json_kind(&other), "Expected a list, caching empty");
                self.store.set(&path, Value::Array(Vec::new()));
                Fetched::Failed(FetchFailure::Malformed(format!(
                    "expected a list, got {}",
                    json_kind(&other)
                )))
            }
            Ok(None) => {
                self.store.set(&path, Value::Array(Vec::new()));
                Fetched::Empty
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Collection fetch failed, caching empty");
                self.store.set(&path, Value::Array(Vec::new()));
                Fetched::Failed(FetchFailure::from(&e))
            }
        }
    }

    /// Read one entity of `kind`, raw JSON.
    #[instrument(skip(self), fields(kind = %kind, id = %id))]
    pub async fn get_entity(&self, kind: EntityKind, id: &str) -> Fetched<Value> {
        let key = CacheKey::Entity {
            kind,
            id: id.to_string(),
        };
        self.read_through(&key, Endpoint::Detail(kind), &json!({ "id": id }))
            .await
    }

    /// Read the store profile.
    #[instrument(skip(self))]
    pub async fn get_store_profile(&self) -> Fetched<StoreProfile> {
        self.read_through(&CacheKey::StoreProfile, Endpoint::StoreProfile, &json!({}))
            .await
    }

    /// Typed list read. Elements that do not match `T` are skipped.
    pub async fn list<T: CatalogEntity>(&self, params: &ListParams) -> Fetched<Vec<T>> {
        let kind = T::KIND;
        self.get_collection(kind, params).await.map(|items| {
            items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<T>(item) {
                    Ok(entity) => Some(entity),
                    Err(e) => {
                        warn!(kind = %kind, error = %e, "Skipping malformed list element");
                        None
                    }
                })
                .collect()
        })
    }

    /// Typed single-entity read.
    #[instrument(skip(self), fields(kind = %T::KIND, id = %id))]
    pub async fn entity<T: CatalogEntity>(&self, id: &str) -> Fetched<T> {
        let key = CacheKey::Entity {
            kind: T::KIND,
            id: id.to_string(),
        };
        self.read_through(&key, Endpoint::Detail(T::KIND), &json!({ "id": id }))
            .await
    }

    /// Typed read of an already-cached entity, without touching the network.
    #[must_use]
    pub fn cached<T: CatalogEntity>(&self, id: &str) -> Option<T> {
        self.store.get_as(
            &CacheKey::Entity {
                kind: T::KIND,
                id: id.to_string(),
            }
            .path(),
        )
    }

    // -------------------------------------------------------------------------
    // Convenience accessors
    // -------------------------------------------------------------------------

    pub async fn products(&self, params: &ListParams) -> Fetched<Vec<Product>> {
        self.list(params).await
    }

    pub async fn product(&self, id: &ProductId) -> Fetched<Product> {
        self.entity(id.as_str()).await
    }

    pub async fn collections(&self, params: &ListParams) -> Fetched<Vec<Collection>> {
        self.list(params).await
    }

    pub async fn collection(&self, id: &CollectionId) -> Fetched<Collection> {
        self.entity(id.as_str()).await
    }

    pub async fn brands(&self, params: &ListParams) -> Fetched<Vec<Brand>> {
        self.list(params).await
    }

    pub async fn brand(&self, id: &BrandId) -> Fetched<Brand> {
        self.entity(id.as_str()).await
    }

    pub async fn packs(&self, params: &ListParams) -> Fetched<Vec<Pack>> {
        self.list(params).await
    }

    pub async fn pack(&self, id: &PackId) -> Fetched<Pack> {
        self.entity(id.as_str()).await
    }

    /// Cache-then-network read that caches only successes.
    ///
    /// An answer is a success only if it decodes as `T`; anything else is
    /// left out of the cache so the next call asks again. A cached value
    /// that does not decode as `T` is treated as a miss.
    async fn read_through<T: DeserializeOwned>(
        &self,
        key: &CacheKey,
        endpoint: Endpoint,
        body: &Value,
    ) -> Fetched<T> {
        let path = key.path();

        if let Some(cached) = self.store.get(&path) {
            match serde_json::from_value(cached) {
                Ok(typed) => {
                    debug!(key = %key, "Cache hit");
                    return Fetched::Ok(typed);
                }
                Err(e) => {
                    debug!(key = %key, error = %e, "Cached value has wrong shape, refetching");
                }
            }
        }

        match self.api.post(endpoint, body).await {
            Ok(Some(value)) => match serde_json::from_value::<T>(value.clone()) {
                Ok(typed) => {
                    self.store.set(&path, value);
                    Fetched::Ok(typed)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Malformed answer, not caching");
                    Fetched::Failed(FetchFailure::Malformed(e.to_string()))
                }
            },
            Ok(None) => {
                debug!(key = %key, "Service returned no data");
                Fetched::Empty
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Fetch failed, not caching");
                Fetched::Failed(FetchFailure::from(&e))
            }
        }
    }
}

fn list_outcome(cached: Value) -> Fetched<Vec<Value>> {
    match cached {
        Value::Array(items) if !items.is_empty() => Fetched::Ok(items),
        _ => Fetched::Empty,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
