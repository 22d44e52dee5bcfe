//! Reactive path-addressed store.
//!
//! A [`Store`] holds a single JSON tree. Values are addressed by a
//! [`StorePath`] (a list of segments, displayed dotted, e.g.
//! `cart.products.p1.count`). Writing a path replaces the value there and
//! everything below it; reading a missing path yields `None`.
//!
//! Subscribers register on a path and are notified synchronously whenever a
//! write touches an overlapping path: an ancestor, the path itself, or a
//! descendant. Callbacks run after all store locks are released, so they may
//! freely read from or write to the store.
//!
//! The store is an explicit handle (cheap to clone, shared via `Arc`) that is
//! passed to the catalog cache and the cart state, never a global.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shopfront_core::{PackId, ProductId};
use tracing::debug;

// =============================================================================
// StorePath
// =============================================================================

/// Location of a value inside the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the tree.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Build a path from a dotted string. Empty segments are dropped.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Build a path from already-split segments.
    ///
    /// Segments may contain `.`; they are never re-split.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Append one segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `self` equals `other` or is one of its ancestors.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// Whether a write at one path can change the value seen at the other.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    // -------------------------------------------------------------------------
    // Well-known locations
    // -------------------------------------------------------------------------

    /// `cart`
    #[must_use]
    pub fn cart() -> Self {
        Self::from_segments(["cart"])
    }

    /// `cart.products`
    #[must_use]
    pub fn cart_products() -> Self {
        Self::from_segments(["cart", "products"])
    }

    /// `cart.products.<id>`
    #[must_use]
    pub fn cart_product(id: &ProductId) -> Self {
        Self::cart_products().child(id.as_str())
    }

    /// `cart.packs`
    #[must_use]
    pub fn cart_packs() -> Self {
        Self::from_segments(["cart", "packs"])
    }

    /// `cart.packs.<id>`
    #[must_use]
    pub fn cart_pack(id: &PackId) -> Self {
        Self::cart_packs().child(id.as_str())
    }

    /// `favorites`
    #[must_use]
    pub fn favorites() -> Self {
        Self::from_segments(["favorites"])
    }

    /// `favorites.<id>`
    #[must_use]
    pub fn favorite(id: &ProductId) -> Self {
        Self::favorites().child(id.as_str())
    }

    /// `customer`
    #[must_use]
    pub fn customer() -> Self {
        Self::from_segments(["customer"])
    }

    /// `cache`
    #[must_use]
    pub fn cache() -> Self {
        Self::from_segments(["cache"])
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

/// What a subscriber is told about a write.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// The path that was written or removed.
    pub written: StorePath,
    /// The value now stored at the *subscribed* path, if any.
    pub value: Option<Value>,
}

type Callback = Arc<dyn Fn(&Change) + Send + Sync>;

struct Subscriber {
    id: u64,
    path: StorePath,
    callback: Callback,
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping the handle unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    /// Stop receiving notifications.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.subscribers.lock().retain(|s| s.id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// =============================================================================
// Store
// =============================================================================

/// Shared reactive JSON store.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    root: RwLock<Value>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the value at `path`.
    #[must_use]
    pub fn get(&self, path: &StorePath) -> Option<Value> {
        lookup(&self.inner.root.read(), path).cloned()
    }

    /// Read and deserialize the value at `path`.
    ///
    /// A value of the wrong shape reads as `None`.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, path: &StorePath) -> Option<T> {
        let value = self.get(path)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                debug!(path = %path, error = %e, "Store value has unexpected shape");
                None
            }
        }
    }

    /// Whether anything is stored at `path`.
    #[must_use]
    pub fn contains(&self, path: &StorePath) -> bool {
        lookup(&self.inner.root.read(), path).is_some()
    }

    /// Write `value` at `path`, replacing whatever was there.
    pub fn set(&self, path: &StorePath, value: Value) {
        {
            let mut root = self.inner.root.write();
            write_at(&mut root, path, value);
        }
        self.notify(path);
    }

    /// Serialize and write `value` at `path`.
    ///
    /// Values that cannot be represented as JSON are not written.
    pub fn set_serialized<T: Serialize>(&self, path: &StorePath, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.set(path, json),
            Err(e) => debug!(path = %path, error = %e, "Value is not representable as JSON"),
        }
    }

    /// Delete the value at `path`. Returns whether something was removed.
    pub fn remove(&self, path: &StorePath) -> bool {
        let removed = {
            let mut root = self.inner.root.write();
            remove_at(&mut root, path)
        };
        if removed {
            self.notify(path);
        }
        removed
    }

    /// Atomically read and replace the value at `path`.
    ///
    /// `f` receives the current value and returns the new one; returning
    /// `None` removes the entry. The read and the write happen under one lock,
    /// so concurrent updates of the same path never interleave.
    pub fn update<F>(&self, path: &StorePath, f: F) -> Option<Value>
    where
        F: FnOnce(Option<&Value>) -> Option<Value>,
    {
        let (next, changed) = {
            let mut root = self.inner.root.write();
            let current = lookup(&root, path);
            let had_value = current.is_some();
            match f(current) {
                Some(value) => {
                    write_at(&mut root, path, value.clone());
                    (Some(value), true)
                }
                None => (None, had_value && remove_at(&mut root, path)),
            }
        };
        if changed {
            self.notify(path);
        }
        next
    }

    /// Register `callback` for writes overlapping `path`.
    pub fn subscribe<F>(&self, path: StorePath, callback: F) -> Subscription
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push(Subscriber {
            id,
            path,
            callback: Arc::new(callback),
        });
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    fn notify(&self, written: &StorePath) {
        let targets: Vec<(StorePath, Callback)> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .filter(|s| s.path.overlaps(written))
            .map(|s| (s.path.clone(), Arc::clone(&s.callback)))
            .collect();

        for (path, callback) in targets {
            let change = Change {
                written: written.clone(),
                value: self.get(&path),
            };
            callback(&change);
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tree helpers
// =============================================================================

fn lookup<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    if path.is_root() && root.is_null() {
        return None;
    }
    Some(current)
}

fn write_at(root: &mut Value, path: &StorePath, value: Value) {
    let Some((last, parents)) = path.segments().split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(last.clone(), value);
}

fn remove_at(root: &mut Value, path: &StorePath) -> bool {
    let Some((last, parents)) = path.segments().split_last() else {
        let existed = !root.is_null();
        *root = Value::Null;
        return existed;
    };

    let mut current = root;
    for segment in parents {
        match current.as_object_mut().and_then(|m| m.get_mut(segment)) {
            Some(next) => current = next,
            None => return false,
        }
    }
    current
        .as_object_mut()
        .is_some_and(|m| m.remove(last).is_some())
}

/// Coerce `value` into an object, discarding a non-object value in the way.
fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;

    use super::*;

    fn counter(store: &Store, path: &str) -> (Arc<AtomicUsize>, Subscription) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let sub = store.subscribe(StorePath::parse(path), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (hits, sub)
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = Store::new();
        assert_eq!(store.get(&StorePath::parse("a.b.c")), None);
        assert_eq!(store.get(&StorePath::root()), None);
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let store = Store::new();
        store.set(&StorePath::parse("cart.products.p1.count"), json!(2));

        assert_eq!(
            store.get(&StorePath::cart()),
            Some(json!({"products": {"p1": {"count": 2}}}))
        );
    }

    #[test]
    fn test_set_replaces_descendants() {
        let store = Store::new();
        store.set(&StorePath::parse("a.b"), json!({"c": 1, "d": 2}));
        store.set(&StorePath::parse("a.b"), json!({"e": 3}));

        assert_eq!(store.get(&StorePath::parse("a.b.c")), None);
        assert_eq!(store.get(&StorePath::parse("a.b.e")), Some(json!(3)));
    }

    #[test]
    fn test_set_through_scalar_replaces_it() {
        let store = Store::new();
        store.set(&StorePath::cart(), Value::Null);
        store.set(&StorePath::parse("cart.products.p1.count"), json!(1));

        assert_eq!(
            store.get(&StorePath::parse("cart.products.p1.count")),
            Some(json!(1))
        );
    }

    #[test]
    fn test_segments_with_dots_are_not_split() {
        let store = Store::new();
        let path = StorePath::cache().child("product").child("a.b");
        store.set(&path, json!(true));

        assert_eq!(store.get(&path), Some(json!(true)));
        assert_eq!(store.get(&StorePath::parse("cache.product.a.b")), None);
    }

    #[test]
    fn test_remove_deletes_key() {
        let store = Store::new();
        store.set(&StorePath::parse("f.x"), json!(true));

        assert!(store.remove(&StorePath::parse("f.x")));
        assert_eq!(store.get(&StorePath::parse("f")), Some(json!({})));
        assert!(!store.remove(&StorePath::parse("f.x")));
        assert!(!store.remove(&StorePath::parse("nope.deeper")));
    }

    #[test]
    fn test_notifies_ancestor_equal_and_descendant() {
        let store = Store::new();
        let (ancestor, _a) = counter(&store, "cart");
        let (equal, _b) = counter(&store, "cart.products");
        let (descendant, _c) = counter(&store, "cart.products.p1");
        let (unrelated, _d) = counter(&store, "favorites");

        store.set(&StorePath::cart_products(), json!({}));

        assert_eq!(ancestor.load(Ordering::SeqCst), 1);
        assert_eq!(equal.load(Ordering::SeqCst), 1);
        assert_eq!(descendant.load(Ordering::SeqCst), 1);
        assert_eq!(unrelated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_change_carries_value_at_subscribed_path() {
        let store = Store::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(StorePath::cart(), move |change| {
            sink.lock().push(change.clone());
        });

        store.set(&StorePath::parse("cart.products.p1.count"), json!(3));

        let changes = seen.lock();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].written.to_string(), "cart.products.p1.count");
        assert_eq!(
            changes[0].value,
            Some(json!({"products": {"p1": {"count": 3}}}))
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = Store::new();
        let (hits, sub) = counter(&store, "a");
        store.set(&StorePath::parse("a"), json!(1));
        drop(sub);
        store.set(&StorePath::parse("a"), json!(2));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_callback_may_write_to_store() {
        let store = Store::new();
        let mirror = store.clone();
        let _sub = store.subscribe(StorePath::parse("src"), move |change| {
            if let Some(value) = &change.value {
                mirror.set(&StorePath::parse("dst"), value.clone());
            }
        });

        store.set(&StorePath::parse("src"), json!("hello"));
        assert_eq!(store.get(&StorePath::parse("dst")), Some(json!("hello")));
    }

    #[test]
    fn test_update_is_read_modify_write() {
        let store = Store::new();
        let path = StorePath::parse("n");
        for _ in 0..3 {
            store.update(&path, |v| {
                Some(json!(v.and_then(Value::as_u64).unwrap_or(0) + 1))
            });
        }
        assert_eq!(store.get(&path), Some(json!(3)));

        assert_eq!(store.update(&path, |_| None), None);
        assert_eq!(store.get(&path), None);
    }

    #[test]
    fn test_update_to_none_on_missing_does_not_notify() {
        let store = Store::new();
        let (hits, _sub) = counter(&store, "x");
        store.update(&StorePath::parse("x"), |_| None);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_get_as_wrong_shape_is_none() {
        let store = Store::new();
        store.set(&StorePath::parse("n"), json!("not a number"));
        assert_eq!(store.get_as::<u32>(&StorePath::parse("n")), None);
    }

    #[test]
    fn test_path_relations() {
        let cart = StorePath::cart();
        let line = StorePath::cart_product(&ProductId::new("p1"));

        assert!(cart.is_prefix_of(&line));
        assert!(!line.is_prefix_of(&cart));
        assert!(line.overlaps(&cart));
        assert!(!StorePath::favorites().overlaps(&cart));
        assert_eq!(line.to_string(), "cart.products.p1");
        assert_eq!(StorePath::parse("..a..b."), StorePath::from_segments(["a", "b"]));
    }
}
