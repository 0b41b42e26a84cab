use std::{
    borrow::Borrow,
    collections::{HashMap, hash_map},
    fmt::{self, Debug},
    hash::{BuildHasher, Hash, RandomState},
};

use serde::{Serialize, Serializer};
use tracing::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    loader::Loader,
};

/// A map whose entries are fetched on demand by a [`Loader`].
///
/// Keyed reads ([`LazyMap::get`], [`LazyMap::attribute_get`]) load a single
/// entry the first time it is requested. Exhaustive reads ([`LazyMap::len`],
/// [`LazyMap::keys`], [`LazyMap::iter`]) load everything once, after which the
/// map is considered complete and the loader is no longer consulted until
/// [`LazyMap::clear`] is called.
///
/// Entries are never invalidated by the map itself. Writes through
/// [`LazyMap::insert`] and [`LazyMap::remove`] only touch the cached entries.
///
/// The map holds no locks. Every operation that can load takes `&mut self`,
/// so there is a single writer at any time. Sharing a map between threads
/// requires external synchronization, e.g. a `parking_lot::Mutex`.
pub struct LazyMap<K, V, L, S = RandomState> {
    /// Everything currently known, either loaded or written directly.
    entries: HashMap<K, V, S>,

    /// Set once [`Loader::load_all`] has succeeded.
    loaded_all: bool,

    loader: L,
}

impl<K, V, L> LazyMap<K, V, L, RandomState> {
    /// Creates an empty, unloaded map backed by `loader`.
    #[inline]
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self::with_hasher(loader, RandomState::new())
    }

    /// Creates an empty, unloaded map with at least the specified capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(loader: L, capacity: usize) -> Self {
        Self::with_capacity_and_hasher(loader, capacity, RandomState::new())
    }
}

impl<K, V, L, S> LazyMap<K, V, L, S> {
    /// Creates an empty, unloaded map which will use the given hash builder to
    /// hash keys.
    #[inline]
    #[must_use]
    pub fn with_hasher(loader: L, hasher: S) -> Self {
        Self {
            entries: HashMap::with_hasher(hasher),
            loaded_all: false,
            loader,
        }
    }

    /// Creates an empty, unloaded map with at least the specified capacity,
    /// using `hasher` to hash the keys.
    #[inline]
    #[must_use]
    pub fn with_capacity_and_hasher(loader: L, capacity: usize, hasher: S) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, hasher),
            loaded_all: false,
            loader,
        }
    }

    /// Returns `true` once every entry has been loaded.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded_all
    }

    /// Returns `false` only if the map is fully loaded and holds no entries.
    ///
    /// A map that has not been fully loaded counts as non-empty, even without
    /// cached entries, because loading may still produce some. This never
    /// triggers a load.
    #[inline]
    #[must_use]
    pub fn is_non_empty(&self) -> bool {
        !self.entries.is_empty() || !self.loaded_all
    }

    /// The negation of [`LazyMap::is_non_empty`].
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.is_non_empty()
    }

    /// Number of entries currently cached, without loading anything.
    #[inline]
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates the entries currently cached, without loading anything.
    #[must_use]
    pub fn cached_iter(&self) -> hash_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    #[inline]
    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    #[inline]
    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    #[inline]
    #[must_use]
    pub fn hasher(&self) -> &S {
        self.entries.hasher()
    }

    /// Drops all entries and marks the map as unloaded.
    ///
    /// The loader is kept, so the next read loads again.
    pub fn clear(&mut self) {
        trace!(entries = self.entries.len(), "Clearing lazy map.");

        self.entries.clear();
        self.loaded_all = false;
    }
}

impl<K, V, L, S> LazyMap<K, V, L, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts a key-value pair without consulting the loader.
    ///
    /// Returns the previous value, if any.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.entries.insert(key, value)
    }

    /// Removes a cached entry, returning its value.
    ///
    /// Never loads and never changes whether the map counts as fully loaded.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.entries
            .remove(key)
            .ok_or_else(|| Error::key_not_found(key))
    }

    /// Returns the cached value for `key`, without loading anything.
    #[inline]
    #[must_use]
    pub fn cached<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    fn needs_load<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        !self.loaded_all && !self.entries.contains_key(key)
    }
}

impl<K, V, L, S> LazyMap<K, V, L, S>
where
    K: Eq + Hash,
    L: Loader<K, V>,
    S: BuildHasher,
{
    /// Returns the value for `key`, loading it first if it is not cached.
    ///
    /// # Errors
    ///
    /// - [`Error::KeyNotFound`] if the loader reports `key` as missing, or the
    ///   key could not be loaded, or the map is fully loaded and has no such
    ///   key.
    /// - [`Error::Load`] if the loader failed unexpectedly.
    pub fn get<Q>(&mut self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + Debug + ?Sized,
    {
        if self.loader.is_missing(key) {
            trace!(?key, "Key is known to be missing.");
            return Err(Error::key_not_found(key));
        }

        if self.needs_load(key) && !self.try_load_one(key)? {
            return Err(Error::key_not_found(key));
        }

        self.entries
            .get(key)
            .ok_or_else(|| Error::key_not_found(key))
    }

    /// Similar to [`Self::get`], but returns a mutable reference.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + Debug + ?Sized,
    {
        self.get(key)?;
        self.entries
            .get_mut(key)
            .ok_or_else(|| Error::key_not_found(key))
    }

    /// Member-style access to the value named `name`.
    ///
    /// Differs from [`Self::get`] in its failures: a name that the loader
    /// could not produce is a [`Error::KeyNotFound`], while a name that is
    /// not a valid key without loading is an [`Error::AttributeNotFound`].
    /// Loading is attempted without consulting [`Loader::is_missing`].
    pub fn attribute_get<Q>(&mut self, name: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + Debug + ?Sized,
    {
        if self.needs_load(name) {
            if !self.try_load_one(name)? {
                return Err(Error::key_not_found(name));
            }
        } else if self.loader.is_missing(name) {
            return Err(Error::attribute_not_found(name));
        }

        self.entries
            .get(name)
            .ok_or_else(|| Error::attribute_not_found(name))
    }

    /// Returns `true` if [`Self::get`] would find `key`.
    ///
    /// Like `get`, this may load the entry.
    pub fn contains_key<Q>(&mut self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + Debug + ?Sized,
    {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(Error::KeyNotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Returns the value for `key`, or `default` if the key does not exist.
    pub fn get_or<'a, Q>(&'a mut self, key: &Q, default: &'a V) -> Result<&'a V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + Debug + ?Sized,
    {
        match self.get(key) {
            Err(Error::KeyNotFound(_)) => Ok(default),
            result => result,
        }
    }

    /// Loads every entry, unless that already happened.
    ///
    /// If the loader fails, the map stays unloaded. Entries the loader wrote
    /// before failing are kept.
    pub fn load_all(&mut self) -> Result<()> {
        if self.loaded_all {
            return Ok(());
        }

        trace!(cached = self.entries.len(), "Loading all entries.");
        self.loader
            .load_all(&mut self.entries)
            .map_err(|error| Error::load(None::<&str>, error))?;

        self.loaded_all = true;
        debug!(entries = self.entries.len(), "Loaded all entries.");

        Ok(())
    }

    /// Returns the number of entries, loading all of them first.
    pub fn len(&mut self) -> Result<usize> {
        self.load_all()?;
        Ok(self.entries.len())
    }

    /// Iterates all keys, loading all entries first.
    pub fn keys(&mut self) -> Result<hash_map::Keys<'_, K, V>> {
        self.load_all()?;
        Ok(self.entries.keys())
    }

    /// Iterates all values, loading all entries first.
    pub fn values(&mut self) -> Result<hash_map::Values<'_, K, V>> {
        self.load_all()?;
        Ok(self.entries.values())
    }

    /// Iterates all key-value pairs, loading all entries first.
    #[expect(clippy::iter_not_returning_iterator)]
    pub fn iter(&mut self) -> Result<hash_map::Iter<'_, K, V>> {
        self.load_all()?;
        Ok(self.entries.iter())
    }

    /// Runs the single-key loader and reports whether `key` is now cached.
    fn try_load_one<Q>(&mut self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + Debug + ?Sized,
    {
        trace!(?key, "Lazy loading entry.");

        let owned = key.to_owned();
        let loaded = self
            .loader
            .load_one(&owned, &mut self.entries)
            .map_err(|error| Error::load(Some(key), error))?;

        if !loaded {
            debug!(?key, "Could not lazy load entry.");
            return Ok(false);
        }

        if !self.entries.contains_key(key) {
            warn!(?key, "Loader reported success without inserting entry.");
            return Ok(false);
        }

        debug!(?key, "Lazy loaded entry.");
        Ok(true)
    }
}

impl<K, V, L, S> Default for LazyMap<K, V, L, S>
where
    L: Default,
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(L::default(), S::default())
    }
}

impl<K, V, L, S> Extend<(K, V)> for LazyMap<K, V, L, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl<K, V, L, S> Debug for LazyMap<K, V, L, S>
where
    K: Debug,
    V: Debug,
    L: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyMap")
            .field("entries", &self.entries)
            .field("loaded_all", &self.loaded_all)
            .field("loader", &self.loader)
            .finish()
    }
}

/// Serializes the cached entries only, it never loads.
impl<K, V, L, S> Serialize for LazyMap<K, V, L, S>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<Ser>(&self, ser: Ser) -> std::result::Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        ser.collect_map(&self.entries)
    }
}
