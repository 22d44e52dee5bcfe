//! Thin HTTP helper for the order/catalog service.
//!
//! Every logical read is one `POST {base_url}/{endpoint}` with a bearer token
//! and a JSON body. An empty body (or a literal `null`) means "no data".
//! Callers above this layer decide how failures degrade; this module only
//! reports them.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shopfront_core::EntityKind;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ApiConfig;

/// Errors that can occur when talking to the order/catalog service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The endpoint could not be resolved beneath the base URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Named endpoints of the remote contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Store profile singleton.
    StoreProfile,
    /// List reads: `collections`, `products`, `brands`, `packs`.
    List(EntityKind),
    /// Single-entity reads: `collection`, `product`, `brand`, `pack`.
    Detail(EntityKind),
    CreateOrder,
    MyOrders,
}

impl Endpoint {
    /// Path of the endpoint relative to the base URL.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::StoreProfile => "store",
            Self::List(kind) => kind.list_name(),
            Self::Detail(kind) => kind.entity_name(),
            Self::CreateOrder => "orders/create",
            Self::MyOrders => "orders/mine",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Client for the order/catalog service.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            inner: Arc::new(ApiClientInner { client, config }),
        })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Post `body` to `endpoint` and return the raw JSON answer.
    ///
    /// Returns `Ok(None)` when the service answers 2xx with an empty body or
    /// a JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or a body that
    /// is not JSON.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post<B>(&self, endpoint: Endpoint, body: &B) -> Result<Option<Value>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.inner.config.endpoint_url(endpoint.path())?;

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.config.bearer())
            .json(body)
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Service returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(200).collect(),
            });
        }

        if response_text.trim().is_empty() {
            debug!("Empty response body");
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&response_text) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse service response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Like [`ApiClient::post`], deserializing the answer into `T`.
    ///
    /// # Errors
    ///
    /// As for [`ApiClient::post`], plus a parse error if the JSON does not
    /// match `T`.
    pub async fn post_as<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<Option<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(endpoint, body)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(ApiError::from)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
