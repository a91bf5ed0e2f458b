//! Keyed storage for per-field UI state.
//!
//! A [`CacheStore`] maps [`FieldIdentity`] keys to lazily created values.
//! Stores are owned by whoever constructs them (usually a drawer) and are
//! registered with a [`StoreRegistry`] so that host events can clear them
//! in bulk:
//!
//! - `reload` clears every registered store.
//! - `selection_changed` clears only stores keyed by volatile identities.
//!
//! Each removed entry's disposal callback runs exactly once. A store that is
//! borrowed when an event arrives is cleared later, by
//! [`StoreRegistry::flush_deferred`] or the next event.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::model::{FieldIdentity, KeyKind};

/// Creates a value for a key on first access.
pub type Factory<T, A> = Box<dyn Fn(&FieldIdentity, &A) -> T>;

/// Runs when an entry is removed.
pub type Disposer<T> = Box<dyn FnMut(&FieldIdentity, T)>;

/// A store shared between its owning drawer and the registry.
pub type SharedStore<T, A = ()> = Rc<RefCell<CacheStore<T, A>>>;

/// Keyed storage with a factory and optional disposal callback.
pub struct CacheStore<T, A = ()> {
    name: String,
    key_kind: KeyKind,
    entries: FxHashMap<FieldIdentity, T>,
    factory: Factory<T, A>,
    dispose: Option<Disposer<T>>,
    created: usize,
    disposed: usize,
}

impl<T, A> CacheStore<T, A> {
    /// Creates a store whose keys have the given kind.
    pub fn new<F>(name: impl Into<String>, key_kind: KeyKind, factory: F) -> Self
    where
        F: Fn(&FieldIdentity, &A) -> T + 'static,
    {
        Self {
            name: name.into(),
            key_kind,
            entries: FxHashMap::default(),
            factory: Box::new(factory),
            dispose: None,
            created: 0,
            disposed: 0,
        }
    }

    /// Sets the callback run for each removed entry.
    pub fn with_dispose<D>(mut self, dispose: D) -> Self
    where
        D: FnMut(&FieldIdentity, T) + 'static,
    {
        self.dispose = Some(Box::new(dispose));
        self
    }

    /// Wraps the store for sharing with a [`StoreRegistry`].
    pub fn shared(self) -> SharedStore<T, A> {
        Rc::new(RefCell::new(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    /// Returns the entry for `identity`, creating it with the factory on a miss.
    pub fn return_item(&mut self, identity: &FieldIdentity, args: &A) -> &mut T {
        debug_assert_eq!(
            identity.kind(),
            self.key_kind,
            "store `{}` keyed by the wrong identity kind",
            self.name
        );
        let factory = &self.factory;
        let created = &mut self.created;
        let name = &self.name;
        self.entries.entry(*identity).or_insert_with(|| {
            *created += 1;
            tracing::debug!(store = %name, key = %identity, "cache entry created");
            factory(identity, args)
        })
    }

    /// Returns the entry for `identity` without creating it.
    pub fn get(&self, identity: &FieldIdentity) -> Option<&T> {
        self.entries.get(identity)
    }

    pub fn get_mut(&mut self, identity: &FieldIdentity) -> Option<&mut T> {
        self.entries.get_mut(identity)
    }

    pub fn contains(&self, identity: &FieldIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Stores `value`, disposing any previous entry for the key.
    pub fn append_item(&mut self, identity: FieldIdentity, value: T) {
        if let Some(old) = self.entries.insert(identity, value) {
            self.run_dispose(&identity, old);
        }
    }

    /// Removes and disposes one entry. Returns true if it existed.
    pub fn clear_item(&mut self, identity: &FieldIdentity) -> bool {
        match self.entries.remove(identity) {
            Some(old) => {
                self.run_dispose(identity, old);
                true
            }
            None => false,
        }
    }

    /// Removes and disposes every entry. Returns the number removed.
    pub fn clear_all(&mut self) -> usize {
        let drained: Vec<_> = self.entries.drain().collect();
        let count = drained.len();
        for (identity, value) in drained {
            self.run_dispose(&identity, value);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries the factory has created over the store's lifetime.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Number of entries disposed over the store's lifetime.
    pub fn disposed(&self) -> usize {
        self.disposed
    }

    fn run_dispose(&mut self, identity: &FieldIdentity, value: T) {
        self.disposed += 1;
        if let Some(dispose) = self.dispose.as_mut() {
            dispose(identity, value);
        }
    }
}

impl<T, A> fmt::Debug for CacheStore<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("name", &self.name)
            .field("key_kind", &self.key_kind)
            .field("len", &self.entries.len())
            .field("created", &self.created)
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Type-erased view of a store, as seen by the registry.
pub trait ManagedStore {
    fn name(&self) -> &str;

    fn key_kind(&self) -> KeyKind;

    fn len(&self) -> usize;

    fn created(&self) -> usize;

    fn disposed(&self) -> usize;

    /// Removes and disposes every entry.
    fn clear_all(&mut self) -> usize;
}

impl<T, A> ManagedStore for CacheStore<T, A> {
    fn name(&self) -> &str {
        CacheStore::name(self)
    }

    fn key_kind(&self) -> KeyKind {
        CacheStore::key_kind(self)
    }

    fn len(&self) -> usize {
        CacheStore::len(self)
    }

    fn created(&self) -> usize {
        CacheStore::created(self)
    }

    fn disposed(&self) -> usize {
        CacheStore::disposed(self)
    }

    fn clear_all(&mut self) -> usize {
        CacheStore::clear_all(self)
    }
}

/// Handle returned by [`StoreRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreHandle(u32);

/// Snapshot of one store's counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub name: String,
    pub key_kind: KeyKind,
    pub len: usize,
    pub created: usize,
    pub disposed: usize,
}

/// Which stores a clear applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClearScope {
    All,
    Volatile,
}

impl ClearScope {
    fn applies_to(self, kind: KeyKind) -> bool {
        match self {
            ClearScope::All => true,
            ClearScope::Volatile => kind == KeyKind::Volatile,
        }
    }
}

/// The set of stores cleared by host events.
#[derive(Default)]
pub struct StoreRegistry {
    stores: Vec<(StoreHandle, Rc<RefCell<dyn ManagedStore>>)>,
    /// Clears that found their store borrowed.
    deferred: RefCell<Vec<(StoreHandle, ClearScope)>>,
    next_handle: u32,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a store. The registry keeps a shared reference to it.
    pub fn register<S: ManagedStore + 'static>(&mut self, store: Rc<RefCell<S>>) -> StoreHandle {
        let handle = StoreHandle(self.next_handle);
        self.next_handle += 1;
        self.stores.push((handle, store));
        handle
    }

    /// Removes a store. It is not cleared. Returns true if it was registered.
    pub fn unregister(&mut self, handle: StoreHandle) -> bool {
        let before = self.stores.len();
        self.stores.retain(|(h, _)| *h != handle);
        self.deferred.borrow_mut().retain(|(h, _)| *h != handle);
        self.stores.len() != before
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Clears every store. Returns the number of entries removed.
    pub fn reload(&self) -> usize {
        let removed = self.clear_where(ClearScope::All);
        tracing::debug!(stores = self.stores.len(), removed, "reload cleared stores");
        removed
    }

    /// Clears volatile-keyed stores. Returns the number of entries removed.
    pub fn selection_changed(&self) -> usize {
        let removed = self.clear_where(ClearScope::Volatile);
        tracing::debug!(removed, "selection change cleared volatile stores");
        removed
    }

    /// Returns counters for every registered store, in registration order.
    pub fn stats(&self) -> Vec<StoreStats> {
        self.stores
            .iter()
            .filter_map(|(_, store)| {
                let store = store.try_borrow().ok()?;
                Some(StoreStats {
                    name: store.name().to_string(),
                    key_kind: store.key_kind(),
                    len: store.len(),
                    created: store.created(),
                    disposed: store.disposed(),
                })
            })
            .collect()
    }

    /// Total number of live entries across all stores.
    pub fn total_entries(&self) -> usize {
        self.stats().iter().map(|s| s.len).sum()
    }

    /// Runs clears that were deferred because their store was borrowed.
    ///
    /// Stores that are still borrowed stay deferred. Returns the number of
    /// entries removed.
    pub fn flush_deferred(&self) -> usize {
        let pending = std::mem::take(&mut *self.deferred.borrow_mut());
        let mut removed = 0;
        for (handle, scope) in pending {
            let Some((_, store)) = self.stores.iter().find(|(h, _)| *h == handle) else {
                continue;
            };
            match store.try_borrow_mut() {
                Ok(mut store) if scope.applies_to(store.key_kind()) => {
                    removed += store.clear_all();
                }
                Ok(_) => {}
                Err(_) => self.defer(handle, scope),
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "deferred clears flushed");
        }
        removed
    }

    /// Number of stores waiting on a deferred clear.
    pub fn deferred_len(&self) -> usize {
        self.deferred.borrow().len()
    }

    fn clear_where(&self, scope: ClearScope) -> usize {
        let mut removed = self.flush_deferred();
        for (handle, store) in &self.stores {
            let Ok(mut store) = store.try_borrow_mut() else {
                tracing::warn!(?scope, "store busy; clear deferred");
                self.defer(*handle, scope);
                continue;
            };
            if scope.applies_to(store.key_kind()) {
                removed += store.clear_all();
            }
        }
        removed
    }

    fn defer(&self, handle: StoreHandle, scope: ClearScope) {
        let mut deferred = self.deferred.borrow_mut();
        match deferred.iter_mut().find(|(h, _)| *h == handle) {
            Some((_, pending)) => {
                if scope == ClearScope::All {
                    *pending = ClearScope::All;
                }
            }
            None => deferred.push((handle, scope)),
        }
    }
}

impl fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("stores", &self.stats())
            .field("deferred", &self.deferred_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::model::SessionId;

    fn counting_store(kind: KeyKind, disposed: Rc<Cell<usize>>) -> SharedStore<u32> {
        CacheStore::new("counter", kind, |_, _| 7)
            .with_dispose(move |_, _| disposed.set(disposed.get() + 1))
            .shared()
    }

    #[test]
    fn test_lazy_creation() {
        let mut store: CacheStore<Vec<u8>> =
            CacheStore::new("lists", KeyKind::Persistent, |_, _| Vec::new());
        let key = FieldIdentity::persistent("Enemy", "waypoints");

        store.return_item(&key, &()).push(1);
        store.return_item(&key, &()).push(2);
        assert_eq!(store.get(&key), Some(&vec![1, 2]));
        assert_eq!(store.created(), 1);
    }

    #[test]
    fn test_factory_args() {
        let mut store: CacheStore<String, String> =
            CacheStore::new("labels", KeyKind::Persistent, |_, prefix: &String| {
                format!("{prefix}!")
            });
        let key = FieldIdentity::persistent("Enemy", "name");
        assert_eq!(store.return_item(&key, &"hi".to_string()), "hi!");
        // Args are ignored on a hit.
        assert_eq!(store.return_item(&key, &"other".to_string()), "hi!");
    }

    #[test]
    fn test_append_disposes_previous() {
        let disposed = Rc::new(Cell::new(0));
        let store = counting_store(KeyKind::Persistent, disposed.clone());
        let key = FieldIdentity::persistent("Enemy", "health");

        store.borrow_mut().append_item(key, 1);
        assert_eq!(disposed.get(), 0);
        store.borrow_mut().append_item(key, 2);
        assert_eq!(disposed.get(), 1);
        assert_eq!(store.borrow().get(&key), Some(&2));

        assert!(store.borrow_mut().clear_item(&key));
        assert!(!store.borrow_mut().clear_item(&key));
        assert_eq!(disposed.get(), 2);
    }

    #[test]
    fn test_reload_disposes_each_entry_once() {
        let disposed = Rc::new(Cell::new(0));
        let persistent = counting_store(KeyKind::Persistent, disposed.clone());
        let volatile = counting_store(KeyKind::Volatile, disposed.clone());

        let mut registry = StoreRegistry::new();
        registry.register(persistent.clone());
        registry.register(volatile.clone());

        let session = SessionId::new();
        for path in ["a", "b", "c"] {
            persistent
                .borrow_mut()
                .return_item(&FieldIdentity::persistent("Enemy", path), &());
            volatile
                .borrow_mut()
                .return_item(&FieldIdentity::volatile(session, path), &());
        }
        assert_eq!(registry.total_entries(), 6);

        assert_eq!(registry.reload(), 6);
        assert_eq!(disposed.get(), 6);
        assert_eq!(registry.total_entries(), 0);

        assert_eq!(registry.reload(), 0);
        assert_eq!(disposed.get(), 6);
    }

    #[test]
    fn test_selection_change_spares_persistent() {
        let disposed = Rc::new(Cell::new(0));
        let persistent = counting_store(KeyKind::Persistent, disposed.clone());
        let volatile = counting_store(KeyKind::Volatile, disposed.clone());

        let mut registry = StoreRegistry::new();
        registry.register(persistent.clone());
        registry.register(volatile.clone());

        persistent
            .borrow_mut()
            .return_item(&FieldIdentity::persistent("Enemy", "a"), &());
        volatile
            .borrow_mut()
            .return_item(&FieldIdentity::volatile(SessionId::new(), "a"), &());

        assert_eq!(registry.selection_changed(), 1);
        assert_eq!(persistent.borrow().len(), 1);
        assert_eq!(volatile.borrow().len(), 0);
        assert_eq!(disposed.get(), 1);
    }

    #[test]
    fn test_busy_store_cleared_later() {
        let disposed = Rc::new(Cell::new(0));
        let persistent = counting_store(KeyKind::Persistent, disposed.clone());
        let volatile = counting_store(KeyKind::Volatile, disposed.clone());

        let mut registry = StoreRegistry::new();
        registry.register(persistent.clone());
        registry.register(volatile.clone());
        persistent
            .borrow_mut()
            .return_item(&FieldIdentity::persistent("Enemy", "a"), &());
        volatile
            .borrow_mut()
            .return_item(&FieldIdentity::volatile(SessionId::new(), "a"), &());

        // A selection change while the persistent store is borrowed is
        // deferred, but never widens to persistent entries.
        {
            let _guard = persistent.borrow_mut();
            assert_eq!(registry.selection_changed(), 1);
        }
        assert_eq!(registry.deferred_len(), 1);
        assert_eq!(registry.flush_deferred(), 0);
        assert_eq!(persistent.borrow().len(), 1);
        assert_eq!(registry.deferred_len(), 0);

        let guard = persistent.borrow_mut();
        assert_eq!(registry.reload(), 0);
        assert_eq!(registry.reload(), 0);
        assert_eq!(registry.deferred_len(), 1);
        drop(guard);

        assert_eq!(registry.flush_deferred(), 1);
        assert_eq!(persistent.borrow().len(), 0);
        assert_eq!(disposed.get(), 2);
        assert_eq!(registry.deferred_len(), 0);
        assert_eq!(registry.flush_deferred(), 0);
    }

    #[test]
    fn test_unregister() {
        let store = counting_store(KeyKind::Persistent, Rc::new(Cell::new(0)));
        let mut registry = StoreRegistry::new();
        let handle = registry.register(store.clone());
        store
            .borrow_mut()
            .return_item(&FieldIdentity::persistent("Enemy", "a"), &());

        assert!(registry.unregister(handle));
        assert!(!registry.unregister(handle));
        assert_eq!(registry.reload(), 0);
        assert_eq!(store.borrow().len(), 1);
    }

    #[test]
    fn test_stats() {
        let store = counting_store(KeyKind::Volatile, Rc::new(Cell::new(0)));
        let mut registry = StoreRegistry::new();
        registry.register(store.clone());
        store
            .borrow_mut()
            .return_item(&FieldIdentity::volatile(SessionId::new(), "a"), &());

        let stats = registry.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "counter");
        assert_eq!(stats[0].key_kind, KeyKind::Volatile);
        assert_eq!(stats[0].len, 1);
        assert_eq!(stats[0].created, 1);
    }
}
