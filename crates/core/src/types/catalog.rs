//! Catalog records served by the store backend.
//!
//! These mirror the JSON documents returned by the catalog endpoints
//! (camelCase field names). Optional presentation fields default when the
//! backend omits them.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::id::{BrandId, CollectionId, PackId, ProductId};
use super::price::{CurrencyCode, Price};

// =============================================================================
// Entity kinds
// =============================================================================

/// The remote collections the client reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Collection,
    Product,
    Brand,
    Pack,
}

impl EntityKind {
    /// Endpoint (and cache namespace) for list reads, e.g. `products`.
    #[must_use]
    pub const fn list_name(&self) -> &'static str {
        match self {
            Self::Collection => "collections",
            Self::Product => "products",
            Self::Brand => "brands",
            Self::Pack => "packs",
        }
    }

    /// Endpoint (and cache namespace) for single-entity reads, e.g. `product`.
    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Product => "product",
            Self::Brand => "brand",
            Self::Pack => "pack",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.entity_name())
    }
}

/// A record that lives in one of the remote catalog collections.
pub trait CatalogEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Which remote collection this record belongs to.
    const KIND: EntityKind;
}

// =============================================================================
// Store profile
// =============================================================================

/// Public profile of the store (name, branding, contact details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub currency_code: CurrencyCode,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

// =============================================================================
// Collections, brands, products
// =============================================================================

/// A curated group of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

impl CatalogEntity for Collection {
    const KIND: EntityKind = EntityKind::Collection;
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl CatalogEntity for Brand {
    const KIND: EntityKind = EntityKind::Brand;
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub collection_ids: Vec<CollectionId>,
    #[serde(default = "default_available")]
    pub available: bool,
}

const fn default_available() -> bool {
    true
}

impl CatalogEntity for Product {
    const KIND: EntityKind = EntityKind::Product;
}

// =============================================================================
// Packs
// =============================================================================

/// One product (and quantity) inside a pack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackItem {
    pub product_id: ProductId,
    #[serde(default = "default_item_count")]
    pub count: u32,
}

const fn default_item_count() -> u32 {
    1
}

/// A bundle of products sold together at a single price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pack {
    pub id: PackId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub items: Vec<PackItem>,
}

impl Pack {
    /// Whether two packs contain the same products in the same quantities,
    /// regardless of item order.
    #[must_use]
    pub fn same_items(&self, other: &Self) -> bool {
        let mut mine = self.items.clone();
        let mut theirs = other.items.clone();
        mine.sort();
        theirs.sort();
        mine == theirs
    }
}

impl CatalogEntity for Pack {
    const KIND: EntityKind = EntityKind::Pack;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(EntityKind::Product.list_name(), "products");
        assert_eq!(EntityKind::Product.entity_name(), "product");
        assert_eq!(EntityKind::Collection.list_name(), "collections");
        assert_eq!(EntityKind::Pack.to_string(), "pack");
    }

    #[test]
    fn test_product_defaults() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Oolong",
            "price": {"amount": "9.50"}
        }))
        .unwrap();

        assert!(product.available);
        assert!(product.image_urls.is_empty());
        assert_eq!(product.id.as_str(), "p1");
    }

    #[test]
    fn test_pack_same_items_ignores_order() {
        let pack: Pack = serde_json::from_value(json!({
            "id": "k1",
            "name": "Starter",
            "price": {"amount": "20"},
            "items": [{"productId": "a", "count": 2}, {"productId": "b"}]
        }))
        .unwrap();

        let mut reordered = pack.clone();
        reordered.items.reverse();
        assert!(pack.same_items(&reordered));

        let mut changed = pack.clone();
        changed.items[0].count = 3;
        assert!(!pack.same_items(&changed));
    }
}
