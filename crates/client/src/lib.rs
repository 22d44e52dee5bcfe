//! Shopfront Client - client-side data layer for a storefront.
//!
//! Four cooperating parts, all sharing one [`Store`]:
//!
//! - [`store`] - reactive path→JSON store with subscriptions
//! - [`catalog`] - read-through, cache-forever cache of catalog entities
//! - [`cart`] - cart and favorites, persisted through [`persistence`]
//! - [`orders`] - cursor-paginated loader for the customer's order history
//!
//! [`state`] wires them together from a [`ClientConfig`]. Around them sit
//! [`checkout`] (order submission), [`session`] (the pushed customer record),
//! the HTTP helper in [`api`], durable blob storage in [`storage`], plus
//! [`config`], [`error`] and [`telemetry`].
//!
//! # Example
//!
//! ```no_run
//! use shopfront_client::{ClientState, ListParams};
//!
//! # async fn run() -> shopfront_client::Result<()> {
//! let state = ClientState::from_env()?;
//!
//! let products = state.catalog().products(&ListParams::all()).await.into_list();
//! if let Some(first) = products.first() {
//!     state.cart().add_to_cart(&first.id, 1);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod persistence;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use api::{ApiClient, ApiError, Endpoint};
pub use cart::{Cart, CartLine, CartState, Favorites, PackEntry, ProductEntry};
pub use catalog::{CacheKey, Catalog, ListParams};
pub use checkout::{Checkout, Contact};
pub use config::{ApiConfig, ClientConfig, ConfigError};
pub use error::{ClientError, FetchFailure, Fetched, Result};
pub use orders::{LoaderState, OrderLoader};
pub use state::ClientState;
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{Change, Store, StorePath, Subscription};
