//! Status enums for orders.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the order service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    /// Any status this client version does not know about.
    #[serde(other)]
    Unknown,
}

/// Kind of a cart line: a single product or a product pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Product,
    Pack,
}
