//! Lazily populated maps.
//!
//! A [`LazyMap`] behaves like an ordinary map to its caller, but its entries
//! come from a [`Loader`] supplied by the embedding application: a plugin
//! directory, a remote catalog, a generated registry. Single entries are loaded
//! the first time they are requested, and the whole source is loaded once when
//! an exhaustive view (length, iteration) is needed.
//!
//! ```ignore
//! let mut functions = LazyMap::new(PluginLoader::new(dir));
//!
//! verify_available(&mut functions, "test.ping")?;
//! let ping = functions.get("test.ping")?;
//! ```

mod error;
mod loader;
mod map;
#[cfg(test)]
mod testing;
mod verify;

pub use error::{Error, Result};
pub use loader::{LoadError, Loader};
pub use map::LazyMap;
pub use verify::verify_available;
