//! Order records: what the order service returns, and what checkout submits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::{CustomerId, OrderId};
use super::phone::Phone;
use super::price::Price;
use super::status::{LineKind, OrderStatus};

/// A placed order, as listed in the customer's order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total: Option<Price>,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub kind: LineKind,
    pub id: String,
    pub count: u32,
    #[serde(default)]
    pub name: Option<String>,
}

/// One line of an order about to be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub kind: LineKind,
    pub id: String,
    pub count: u32,
}

/// Body of the create-order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Client-generated reference so the service can spot resubmissions.
    pub reference: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub phone: Phone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub lines: Vec<NewOrderLine>,
}

impl NewOrder {
    /// Start a new order with a fresh reference.
    #[must_use]
    pub fn new(phone: Phone, lines: Vec<NewOrderLine>) -> Self {
        Self {
            reference: Uuid::new_v4(),
            customer_id: None,
            phone,
            address: None,
            note: None,
            lines,
        }
    }
}
