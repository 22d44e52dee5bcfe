//! Customer session slot.
//!
//! Authentication happens elsewhere; whatever performs it pushes the signed-in
//! customer here (or `None` on sign-out). The slot is a plain store value at
//! `customer`, so UI code can subscribe to it like any other path.

use serde_json::Value;
use shopfront_core::Customer;
use tracing::info;

use crate::store::{Change, Store, StorePath, Subscription};

/// Record the current customer. `None` marks the session as signed out.
pub fn set_customer(store: &Store, customer: Option<&Customer>) {
    match customer {
        Some(customer) => {
            info!(customer_id = %customer.id, "Customer signed in");
            store.set_serialized(&StorePath::customer(), customer);
        }
        None => {
            info!("Customer signed out");
            store.set(&StorePath::customer(), Value::Null);
        }
    }
}

/// The current customer, if signed in.
#[must_use]
pub fn customer(store: &Store) -> Option<Customer> {
    store.get_as::<Option<Customer>>(&StorePath::customer()).flatten()
}

/// Be told whenever the session changes.
pub fn subscribe_customer<F>(store: &Store, callback: F) -> Subscription
where
    F: Fn(Option<Customer>) + Send + Sync + 'static,
{
    store.subscribe(StorePath::customer(), move |change: &Change| {
        let customer = change
            .value
            .clone()
            .and_then(|v| serde_json::from_value::<Option<Customer>>(v).ok())
            .flatten();
        callback(customer);
    })
}
