//! Unified error handling.
//!
//! Read paths of the data layer never return errors: they degrade to
//! [`Fetched::Empty`] or [`Fetched::Failed`]. The error types here surface
//! only from constructors (configuration, HTTP client, durable storage).

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Remote service operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Why a read produced no data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Transport-level failure (connection refused, TLS, ...).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned status {0}")]
    Status(u16),

    /// The answer was not the expected JSON document.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<&ApiError> for FetchFailure {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::Transport(e.to_string()),
            ApiError::Status { status, .. } => Self::Status(*status),
            ApiError::Parse(e) => Self::Malformed(e.to_string()),
            ApiError::Url(e) => Self::Transport(e.to_string()),
        }
    }
}

/// Outcome of a read through the data layer.
///
/// Lets callers tell "genuinely empty" apart from "failed to load".
/// [`Fetched::into_option`] collapses both to `None` for callers that only
/// care about data.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Fetched<T> {
    Ok(T),
    Empty,
    Failed(FetchFailure),
}

impl<T> Fetched<T> {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Data if present; `Empty` and `Failed` both become `None`.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    /// Borrowing variant of [`Fetched::into_option`].
    #[must_use]
    pub const fn as_option(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    /// The failure reason, if the read failed.
    #[must_use]
    pub const fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Failed(reason) => Some(reason),
            Self::Ok(_) | Self::Empty => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Ok(value) => Fetched::Ok(f(value)),
            Self::Empty => Fetched::Empty,
            Self::Failed(reason) => Fetched::Failed(reason),
        }
    }
}

impl<T> Fetched<Vec<T>> {
    /// The list, with `Empty` and `Failed` collapsed to an empty list.
    #[must_use]
    pub fn into_list(self) -> Vec<T> {
        self.into_option().unwrap_or_default()
    }
}
