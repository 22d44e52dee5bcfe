//! Cursor-paginated loader for the signed-in customer's order history.
//!
//! Independent of the catalog cache: pages are held in the loader, not in
//! the store. The cursor is the id of the last order seen and only moves
//! forward. There is no server-provided "more" flag, so a page shorter than
//! the requested size is taken to mean the history is exhausted.

use serde::Serialize;
use shopfront_core::{CustomerId, Order, OrderId};
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, Endpoint};
use crate::error::FetchFailure;

/// Where the loader is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last page was full; more may follow.
    Ready,
    /// The last page was short; nothing more to load.
    Exhausted,
    /// The last request failed. Previously loaded orders are kept.
    Failed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageRequest<'a> {
    customer_id: &'a CustomerId,
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_after: Option<&'a OrderId>,
}

/// Incremental fetcher for one customer's orders.
///
/// Both loading methods take `&mut self`, so a second request cannot start
/// while one is in flight.
#[derive(Debug)]
pub struct OrderLoader {
    api: ApiClient,
    customer_id: CustomerId,
    page_size: u32,
    orders: Vec<Order>,
    has_more: bool,
    state: LoaderState,
    error: Option<String>,
}

impl OrderLoader {
    /// A loader for `customer_id`. A `page_size` of zero is raised to one.
    #[must_use]
    pub fn new(api: ApiClient, customer_id: CustomerId, page_size: u32) -> Self {
        Self {
            api,
            customer_id,
            page_size: page_size.max(1),
            orders: Vec::new(),
            has_more: false,
            state: LoaderState::Idle,
            error: None,
        }
    }

    /// Orders loaded so far, oldest page first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Whether the last page was full.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn state(&self) -> LoaderState {
        self.state
    }

    /// Message from the last failed request, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Fetch the first page and replace the loaded list with it.
    #[instrument(skip(self), fields(customer_id = %self.customer_id))]
    pub async fn refresh(&mut self) {
        if let Some(page) = self.fetch_page(None).await {
            self.orders = page;
        }
    }

    /// Fetch the page after the last loaded order and append it.
    ///
    /// With nothing loaded yet this fetches the first page.
    #[instrument(skip(self), fields(customer_id = %self.customer_id, loaded = self.orders.len()))]
    pub async fn load_more(&mut self) {
        let cursor = self.orders.last().map(|o| o.id.clone());
        if let Some(page) = self.fetch_page(cursor.as_ref()).await {
            self.orders.extend(page);
        }
    }

    async fn fetch_page(&mut self, cursor: Option<&OrderId>) -> Option<Vec<Order>> {
        let previous = self.state;
        self.state = LoaderState::Loading;

        let request = PageRequest {
            customer_id: &self.customer_id,
            page_size: self.page_size,
            start_after: cursor,
        };

        match self
            .api
            .post_as::<_, Vec<Order>>(Endpoint::MyOrders, &request)
            .await
        {
            Ok(page) => {
                let page = page.unwrap_or_default();
                self.has_more = page.len() == self.page_size as usize;
                self.state = if self.has_more {
                    LoaderState::Ready
                } else {
                    LoaderState::Exhausted
                };
                self.error = None;
                debug!(count = page.len(), has_more = self.has_more, "Loaded order page");
                Some(page)
            }
            Err(e) => {
                let failure = FetchFailure::from(&e);
                warn!(error = %failure, ?previous, "Failed to load order page");
                self.error = Some(failure.to_string());
                self.state = LoaderState::Failed;
                None
            }
        }
    }
}
