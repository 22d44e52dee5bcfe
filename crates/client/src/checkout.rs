//! Order submission from the cart.
//!
//! Submitting is online-only and never cached. On success the contact phone
//! is remembered in durable storage (to prefill the next checkout) and the
//! cart is cleared. On failure the cart is left exactly as it was.

use std::sync::Arc;

use shopfront_core::{NewOrder, NewOrderLine, Order, Phone};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, Endpoint};
use crate::cart::CartState;
use crate::error::{FetchFailure, Fetched};
use crate::session;
use crate::storage::{DurableStorage, keys};

/// Contact details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub phone: Phone,
    pub address: Option<String>,
    pub note: Option<String>,
}

impl Contact {
    #[must_use]
    pub const fn new(phone: Phone) -> Self {
        Self {
            phone,
            address: None,
            note: None,
        }
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Submits the cart as an order.
#[derive(Clone)]
pub struct Checkout {
    api: ApiClient,
    storage: Arc<dyn DurableStorage>,
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}

impl Checkout {
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn DurableStorage>) -> Self {
        Self { api, storage }
    }

    /// Phone number used at the last successful checkout.
    #[must_use]
    pub fn last_phone(&self) -> Option<Phone> {
        match self.storage.read(keys::PHONE) {
            Ok(raw) => raw.and_then(|raw| Phone::parse(&raw).ok()),
            Err(e) => {
                debug!(error = %e, "Could not read last phone");
                None
            }
        }
    }

    /// Build the order the cart would currently produce.
    #[must_use]
    pub fn build_order(cart: &CartState, contact: &Contact) -> NewOrder {
        let lines = cart
            .line_items()
            .iter()
            .map(NewOrderLine::from)
            .collect();
        let mut order = NewOrder::new(contact.phone.clone(), lines);
        order.customer_id = session::customer(cart.store()).map(|c| c.id);
        order.address.clone_from(&contact.address);
        order.note.clone_from(&contact.note);
        order
    }

    /// Submit the cart.
    ///
    /// An empty cart yields [`Fetched::Empty`] without contacting the
    /// service. A success answer without a body also yields
    /// [`Fetched::Empty`], but still counts as a placed order.
    #[instrument(skip(self, cart, contact), fields(lines = tracing::field::Empty))]
    pub async fn submit_order(&self, cart: &CartState, contact: &Contact) -> Fetched<Order> {
        let order = Self::build_order(cart, contact);
        tracing::Span::current().record("lines", order.lines.len());
        if order.lines.is_empty() {
            debug!("Cart is empty, nothing to submit");
            return Fetched::Empty;
        }

        let placed = match self
            .api
            .post_as::<_, Order>(Endpoint::CreateOrder, &order)
            .await
        {
            Ok(placed) => placed,
            Err(e) => {
                warn!(error = %e, reference = %order.reference, "Order submission failed");
                return Fetched::Failed(FetchFailure::from(&e));
            }
        };

        info!(
            reference = %order.reference,
            order_id = placed.as_ref().map(|o| o.id.as_str()),
            "Order placed"
        );
        self.remember_phone(&contact.phone);
        cart.clear_cart();

        placed.map_or(Fetched::Empty, Fetched::Ok)
    }

    fn remember_phone(&self, phone: &Phone) {
        if let Err(e) = self.storage.write(keys::PHONE, phone.as_str()) {
            warn!(error = %e, "Could not remember checkout phone");
        }
    }
}
