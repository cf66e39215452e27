use std::collections::HashMap;
use std::sync::Mutex;

use super::StringTable;
use crate::error::{Error, Result};

/// Fixed id-to-string mapping
#[derive(Debug, Clone, Default)]
pub struct MapStringTable {
    entries: HashMap<u32, String>,
}

impl MapStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u32, value: impl Into<String>) {
        self.entries.insert(id, value.into());
    }
}

impl FromIterator<(u32, String)> for MapStringTable {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl StringTable for MapStringTable {
    fn resolve(&self, id: u32) -> Result<String> {
        self.entries
            .get(&id)
            .cloned()
            .ok_or(Error::StringNotFound(id))
    }
}

/// Memoizes successful lookups of an inner table.
///
/// Bone and notetrack names repeat across most animations in a pool.
pub struct CachedStringTable<S: StringTable> {
    inner: S,
    cache: Mutex<HashMap<u32, String>>,
}

impl<S: StringTable> CachedStringTable<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drop everything cached, e.g. after the game reloads its assets
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl<S: StringTable> StringTable for CachedStringTable<S> {
    fn resolve(&self, id: u32) -> Result<String> {
        if let Some(hit) = self.cache.lock().ok().and_then(|c| c.get(&id).cloned()) {
            return Ok(hit);
        }

        let value = self.inner.resolve(id)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(id, value.clone());
        }
        Ok(value)
    }
}
