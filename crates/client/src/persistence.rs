//! Hydrate-then-sync mirroring of store sub-trees to durable storage.
//!
//! For each persisted sub-tree:
//!
//! 1. Read the blob. If it parses, write it into the store; otherwise keep
//!    the empty default and carry on silently.
//! 2. Only then subscribe and flag the slot as loaded, so every later change
//!    is written back. A stored `null` (a cleared slot) loads as the default.
//!
//! Writing back before step 1 completes would overwrite the stored data with
//! the empty initial state, so the subscription is never created earlier.
//! Write-backs are fire-and-forget: failures are logged, never surfaced.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::storage::DurableStorage;
use crate::store::{Change, Store, StorePath, Subscription};

/// A store sub-tree that is mirrored to durable storage.
pub trait Persisted: Serialize + DeserializeOwned + Default + 'static {
    /// Durable storage key.
    const KEY: &'static str;

    /// Location in the store.
    fn path() -> StorePath;

    /// Normalize a freshly-loaded value before it enters the store.
    #[must_use]
    fn sanitize(self) -> Self {
        self
    }
}

/// Keeps one persisted sub-tree in sync. Dropping it stops the mirroring.
#[derive(Debug)]
pub struct SyncHandle {
    key: &'static str,
    loaded: Arc<AtomicBool>,
    _subscription: Subscription,
}

impl SyncHandle {
    /// Whether hydration finished and write-back is active.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }
}

/// Hydrate `T` from `storage` into `store`, then start mirroring changes.
pub fn hydrate<T: Persisted>(store: &Store, storage: &Arc<dyn DurableStorage>) -> SyncHandle {
    let path = T::path();

    match load::<T>(storage.as_ref()) {
        Some(value) => {
            debug!(key = T::KEY, "Hydrated from durable storage");
            store.set_serialized(&path, &value.sanitize());
        }
        None if !store.contains(&path) => store.set_serialized(&path, &T::default()),
        None => {}
    }

    let loaded = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&loaded);
    let sink = Arc::clone(storage);
    let subscription = store.subscribe(path, move |change| {
        if flag.load(Ordering::Acquire) {
            write_back(sink.as_ref(), T::KEY, change);
        }
    });
    loaded.store(true, Ordering::Release);

    SyncHandle {
        key: T::KEY,
        loaded,
        _subscription: subscription,
    }
}

fn load<T: Persisted>(storage: &dyn DurableStorage) -> Option<T> {
    let raw = match storage.read(T::KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            debug!(key = T::KEY, error = %e, "Durable storage unreadable, starting empty");
            return None;
        }
    };

    // A cleared slot is persisted as `null`
    match serde_json::from_str::<Option<T>>(&raw) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!(key = T::KEY, "Durable state was cleared, starting empty");
            None
        }
        Err(e) => {
            debug!(key = T::KEY, error = %e, "Discarding corrupt durable state");
            None
        }
    }
}

fn write_back(storage: &dyn DurableStorage, key: &str, change: &Change) {
    let result = match &change.value {
        Some(value) => match serde_json::to_string(value) {
            Ok(text) => storage.write(key, &text),
            Err(e) => {
                warn!(key, error = %e, "Could not serialize state for durable storage");
                return;
            }
        },
        None => storage.remove(key),
    };

    if let Err(e) = result {
        warn!(key, error = %e, "Durable storage write failed");
    }
}
