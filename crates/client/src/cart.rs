//! Cart and favorites state.
//!
//! Both live as sub-trees of the [`Store`] (`cart` and `favorites`) and are
//! mirrored to durable storage. The only way to obtain a [`CartState`] is
//! [`CartState::hydrate`], so no mutation can run before the persisted state
//! has been restored.
//!
//! Mutations are total: they never fail and never validate their input.
//! Quantities are absolute, not deltas; a caller wanting to drop an item
//! calls the matching `remove_*` method instead of passing zero.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shopfront_core::{LineKind, NewOrderLine, Pack, PackId, ProductId};
use tracing::debug;

use crate::persistence::{self, Persisted, SyncHandle};
use crate::storage::{DurableStorage, keys};
use crate::store::{Change, Store, StorePath, Subscription};

/// Quantity used when a pack is added without an explicit count.
pub const DEFAULT_PACK_COUNT: u32 = 1;

// =============================================================================
// Persisted shapes
// =============================================================================

/// Cart entry for a single product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub count: u32,
}

/// Cart entry for a pack, with a snapshot of the pack taken when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackEntry {
    pub count: u32,
    pub pack_data: Pack,
}

/// The whole cart, as stored and persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub products: BTreeMap<ProductId, ProductEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub packs: BTreeMap<PackId, PackEntry>,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.packs.is_empty()
    }
}

impl Persisted for Cart {
    const KEY: &'static str = keys::CART;

    fn path() -> StorePath {
        StorePath::cart()
    }
}

/// Favorited product ids. Only `true` values are ever kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(BTreeMap<ProductId, bool>);

impl Favorites {
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ProductId> {
        self.0.iter().filter(|(_, v)| **v).map(|(k, _)| k)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Persisted for Favorites {
    const KEY: &'static str = keys::FAVORITES;

    fn path() -> StorePath {
        StorePath::favorites()
    }

    fn sanitize(mut self) -> Self {
        self.0.retain(|_, favorited| *favorited);
        self
    }
}

// =============================================================================
// Derived views
// =============================================================================

/// One line of the cart, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartLine {
    Product { id: ProductId, count: u32 },
    Pack { id: PackId, count: u32, pack: Pack },
}

impl CartLine {
    #[must_use]
    pub const fn kind(&self) -> LineKind {
        match self {
            Self::Product { .. } => LineKind::Product,
            Self::Pack { .. } => LineKind::Pack,
        }
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        match self {
            Self::Product { count, .. } | Self::Pack { count, .. } => *count,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Product { id, .. } => id.as_str(),
            Self::Pack { id, .. } => id.as_str(),
        }
    }
}

impl From<&CartLine> for NewOrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            kind: line.kind(),
            id: line.id().to_string(),
            count: line.count(),
        }
    }
}

// =============================================================================
// CartState
// =============================================================================

/// Cart and favorites, hydrated from durable storage and kept in sync with it.
#[derive(Debug)]
pub struct CartState {
    store: Store,
    cart_sync: SyncHandle,
    favorites_sync: SyncHandle,
}

impl CartState {
    /// Restore cart and favorites from `storage`, then start mirroring every
    /// change back to it.
    #[must_use]
    pub fn hydrate(store: Store, storage: Arc<dyn DurableStorage>) -> Self {
        let cart_sync = persistence::hydrate::<Cart>(&store, &storage);
        let favorites_sync = persistence::hydrate::<Favorites>(&store, &storage);
        Self {
            store,
            cart_sync,
            favorites_sync,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Whether both sub-trees finished hydrating.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cart_sync.is_loaded() && self.favorites_sync.is_loaded()
    }

    // -------------------------------------------------------------------------
    // Cart mutations
    // -------------------------------------------------------------------------

    /// Set the quantity of a product (absolute, not a delta).
    pub fn add_to_cart(&self, id: &ProductId, count: u32) {
        debug!(product_id = %id, count, "Set cart product count");
        self.store
            .set(&StorePath::cart_product(id).child("count"), json!(count));
    }

    /// Remove a product line entirely.
    pub fn remove_cart(&self, id: &ProductId) {
        self.store.remove(&StorePath::cart_product(id));
    }

    /// Add a pack with [`DEFAULT_PACK_COUNT`].
    pub fn add_pack_to_cart(&self, pack: &Pack) {
        self.set_pack_count(pack, DEFAULT_PACK_COUNT);
    }

    /// Set the quantity of a pack, refreshing its snapshot.
    pub fn set_pack_count(&self, pack: &Pack, count: u32) {
        debug!(pack_id = %pack.id, count, "Set cart pack count");
        self.store.set_serialized(
            &StorePath::cart_pack(&pack.id),
            &PackEntry {
                count,
                pack_data: pack.clone(),
            },
        );
    }

    /// Remove a pack line entirely.
    pub fn remove_pack_from_cart(&self, id: &PackId) {
        self.store.remove(&StorePath::cart_pack(id));
    }

    /// Drop the whole cart.
    pub fn clear_cart(&self) {
        self.store.set(&StorePath::cart(), Value::Null);
    }

    // -------------------------------------------------------------------------
    // Favorites mutations
    // -------------------------------------------------------------------------

    /// Flip membership of `id` and return whether it is now a favorite.
    ///
    /// The read and the write happen under one store lock.
    pub fn toggle_favorite(&self, id: &ProductId) -> bool {
        self.store
            .update(&StorePath::favorite(id), |current| {
                if current == Some(&Value::Bool(true)) {
                    None
                } else {
                    Some(Value::Bool(true))
                }
            })
            .is_some()
    }

    pub fn clear_all_favorites(&self) {
        self.store.set(&StorePath::favorites(), json!({}));
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Snapshot of the cart. A cleared cart reads as empty.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.store
            .get_as::<Option<Cart>>(&StorePath::cart())
            .flatten()
            .unwrap_or_default()
    }

    /// Snapshot of the favorites.
    #[must_use]
    pub fn favorites(&self) -> Favorites {
        self.store
            .get_as::<Favorites>(&StorePath::favorites())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_favorite(&self, id: &ProductId) -> bool {
        self.store.get(&StorePath::favorite(id)) == Some(Value::Bool(true))
    }

    /// Sum of all product and pack quantities.
    #[must_use]
    pub fn total_count(&self) -> u32 {
        let cart = self.cart();
        cart.products
            .values()
            .map(|e| e.count)
            .chain(cart.packs.values().map(|e| e.count))
            .fold(0, u32::saturating_add)
    }

    /// Quantity of `id` in the cart, if present.
    #[must_use]
    pub fn product_count(&self, id: &ProductId) -> Option<u32> {
        self.store
            .get_as::<ProductEntry>(&StorePath::cart_product(id))
            .map(|e| e.count)
    }

    /// Whether this exact pack (same id, same contents) is in the cart.
    #[must_use]
    pub fn is_pack_fully_in_cart(&self, pack: &Pack) -> bool {
        self.store
            .get_as::<PackEntry>(&StorePath::cart_pack(&pack.id))
            .is_some_and(|entry| entry.count >= 1 && entry.pack_data.same_items(pack))
    }

    /// Every cart line: products first, then packs.
    #[must_use]
    pub fn line_items(&self) -> Vec<CartLine> {
        let cart = self.cart();
        let products = cart
            .products
            .into_iter()
            .map(|(id, entry)| CartLine::Product {
                id,
                count: entry.count,
            });
        let packs = cart.packs.into_iter().map(|(id, entry)| CartLine::Pack {
            id,
            count: entry.count,
            pack: entry.pack_data,
        });
        products.chain(packs).collect()
    }

    // -------------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------------

    /// Be told about any change to the cart.
    pub fn subscribe_cart<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.store.subscribe(StorePath::cart(), callback)
    }

    /// Be told about any change to the favorites.
    pub fn subscribe_favorites<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.store.subscribe(StorePath::favorites(), callback)
    }
}
