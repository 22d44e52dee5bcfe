//! Client state shared across the UI.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::CartState;
use crate::catalog::Catalog;
use crate::checkout::Checkout;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::orders::OrderLoader;
use crate::session;
use crate::storage::{DurableStorage, FileStorage};
use crate::store::Store;

/// Every part of the data layer, wired to one store.
///
/// This struct is cheaply cloneable via `Arc`. The cart is hydrated from
/// durable storage during construction.
#[derive(Clone)]
pub struct ClientState {
    inner: Arc<ClientStateInner>,
}

struct ClientStateInner {
    config: ClientConfig,
    store: Store,
    catalog: Catalog,
    cart: CartState,
    checkout: Checkout,
    api: ApiClient,
}

impl ClientState {
    /// Create a new client state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the storage
    /// directory cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api = ApiClient::new(config.api.clone())?;
        let storage: Arc<dyn DurableStorage> = Arc::new(FileStorage::open(&config.storage_dir)?);
        let store = Store::new();

        let catalog = Catalog::new(store.clone(), api.clone());
        let cart = CartState::hydrate(store.clone(), Arc::clone(&storage));
        let checkout = Checkout::new(api.clone(), storage);

        Ok(Self {
            inner: Arc::new(ClientStateInner {
                config,
                store,
                catalog,
                cart,
                checkout,
                api,
            }),
        })
    }

    /// Load configuration from the environment and create the state.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing or invalid, or for the
    /// reasons listed on [`ClientState::new`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartState {
        &self.inner.cart
    }

    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }

    /// Order history loader for the signed-in customer, if any.
    #[must_use]
    pub fn order_loader(&self) -> Option<OrderLoader> {
        let customer = session::customer(&self.inner.store)?;
        Some(OrderLoader::new(
            self.inner.api.clone(),
            customer.id,
            self.inner.config.orders_page_size,
        ))
    }
}

impl std::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
