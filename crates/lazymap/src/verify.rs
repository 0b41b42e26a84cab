use std::hash::BuildHasher;

use tracing::debug;

use crate::{
    error::{Error, Result},
    loader::Loader,
    map::LazyMap,
};

const MISSING_NAME: &str = "Must specify a function to run!\nex: test.ping";

/// Check that `name` is non-empty and resolves to an entry of `map`.
///
/// This may load `name` through the map's loader. When the name cannot be
/// found, the returned [`Error::Execution`] carries the loader's
/// [`Loader::missing_message`].
pub fn verify_available<V, L, S>(map: &mut LazyMap<String, V, L, S>, name: &str) -> Result<()>
where
    L: Loader<String, V>,
    S: BuildHasher,
{
    if name.is_empty() {
        return Err(Error::Invocation(MISSING_NAME.to_owned()));
    }

    if !map.contains_key(name)? {
        debug!(name, "Requested name is not available.");
        return Err(Error::Execution(map.loader().missing_message(name)));
    }

    Ok(())
}
