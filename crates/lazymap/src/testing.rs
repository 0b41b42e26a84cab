//! A recording [`Loader`] backed by an in-memory source.

use std::{
    borrow::Borrow,
    collections::{HashMap, HashSet},
    hash::{BuildHasher, Hash},
};

use crate::loader::{LoadError, Loader};

#[derive(Debug, Default)]
pub(crate) struct Recorder {
    /// What the backing source can produce.
    pub source: HashMap<String, i32>,

    /// Keys reported by [`Loader::is_missing`].
    pub missing: HashSet<String>,

    /// Fail every load with an error.
    pub fail: bool,

    /// Report success from `load_one` without inserting anything.
    pub lie: bool,

    pub load_one_calls: Vec<String>,
    pub load_all_calls: usize,
}

impl Recorder {
    pub fn with_source(source: impl IntoIterator<Item = (&'static str, i32)>) -> Self {
        Self {
            source: source.into_iter().map(|(k, v)| (k.to_owned(), v)).collect(),
            ..Default::default()
        }
    }

    pub fn with_missing(mut self, keys: impl IntoIterator<Item = &'static str>) -> Self {
        self.missing.extend(keys.into_iter().map(str::to_owned));
        self
    }
}

impl Loader<String, i32> for Recorder {
    fn load_one<S>(
        &mut self,
        key: &String,
        entries: &mut HashMap<String, i32, S>,
    ) -> Result<bool, LoadError>
    where
        S: BuildHasher,
    {
        self.load_one_calls.push(key.clone());

        if self.fail {
            return Err("backend unavailable".into());
        }

        if self.lie {
            return Ok(true);
        }

        let Some(value) = self.source.get(key) else {
            return Ok(false);
        };

        entries.insert(key.clone(), *value);
        Ok(true)
    }

    fn load_all<S>(&mut self, entries: &mut HashMap<String, i32, S>) -> Result<(), LoadError>
    where
        S: BuildHasher,
    {
        self.load_all_calls += 1;

        if self.fail {
            return Err("backend unavailable".into());
        }

        entries.extend(self.source.iter().map(|(k, v)| (k.clone(), *v)));
        Ok(())
    }

    fn is_missing<Q>(&self, key: &Q) -> bool
    where
        String: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.missing.contains(key)
    }

    fn missing_message(&self, name: &str) -> String {
        let mut known: Vec<_> = self.source.keys().filter(|k| k.starts_with(name)).collect();
        known.sort_unstable();

        match known.first() {
            Some(suggestion) => format!("'{name}' is not available. Did you mean '{suggestion}'?"),
            None => format!("'{name}' is not available."),
        }
    }
}
