//! The contract a backing source implements to populate a [`LazyMap`].
//!
//! [`LazyMap`]: crate::LazyMap

use std::{
    borrow::Borrow,
    collections::HashMap,
    hash::{BuildHasher, Hash},
};

/// An unexpected failure reported by a [`Loader`].
///
/// "Not found" is never an error, loaders report it by returning `Ok(false)`
/// from [`Loader::load_one`].
pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Populates the entries of a [`LazyMap`] on demand.
///
/// Both [`Loader::load_one`] and [`Loader::load_all`] are required, a loader
/// that does not supply them does not compile.
///
/// [`LazyMap`]: crate::LazyMap
pub trait Loader<K, V> {
    /// Fetch the value for `key` and write it into `entries`.
    ///
    /// Returns `Ok(true)` if `entries` now holds `key`, and `Ok(false)` if the
    /// key is genuinely unavailable.
    fn load_one<S>(
        &mut self,
        key: &K,
        entries: &mut HashMap<K, V, S>,
    ) -> Result<bool, LoadError>
    where
        S: BuildHasher;

    /// Write every currently discoverable entry into `entries`.
    ///
    /// Must be idempotent, although the map stops calling it once it has
    /// succeeded.
    fn load_all<S>(&mut self, entries: &mut HashMap<K, V, S>) -> Result<(), LoadError>
    where
        S: BuildHasher;

    /// Whether `key` is known to be absent.
    ///
    /// A key reported missing never triggers [`Loader::load_one`] from a
    /// keyed lookup.
    fn is_missing<Q>(&self, _key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        false
    }

    /// Diagnostic used when a requested name is not available.
    fn missing_message(&self, name: &str) -> String {
        format!("'{name}' is not available.")
    }
}
