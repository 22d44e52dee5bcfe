//! Signed-in customer record.

use serde::{Deserialize, Serialize};

use super::id::CustomerId;

/// The customer behind the current session.
///
/// Pushed into the client by whatever performs authentication; the data
/// layer only keeps the most recent value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}
