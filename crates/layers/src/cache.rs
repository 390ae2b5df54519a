use std::collections::BTreeMap;

use tracing::debug;

use crate::key::LayerKey;
use crate::layer::{LayerHandle, LayerId, TileLayer};
use crate::source::TileSource;

/// Memoizing store of tile layers, one per logical key.
///
/// The factory passed to [`LayerCache::get_or_create`] runs at most once per
/// key for the life of the cache. Entries are never evicted; the key space is
/// the fixed provider set plus whatever custom URLs the host sends.
#[derive(Debug, Default)]
pub struct LayerCache {
    entries: BTreeMap<LayerKey, LayerHandle>,
    next_id: u64,
}

impl LayerCache {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &LayerKey) -> Option<&LayerHandle> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &LayerKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Return the cached handle for `key`, building it with `factory` on a miss.
    ///
    /// A factory error leaves the cache untouched, so the next request for the
    /// same key tries again.
    pub fn get_or_create<F, E>(&mut self, key: LayerKey, factory: F) -> Result<LayerHandle, E>
    where
        F: FnOnce(&LayerKey) -> Result<TileSource, E>,
    {
        if let Some(handle) = self.entries.get(&key) {
            return Ok(handle.clone());
        }

        let source = factory(&key)?;
        let id = LayerId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        debug!(%key, %id, "constructed tile layer");
        let handle = LayerHandle::new(TileLayer::new(id, key.clone(), source));
        self.entries.insert(key, handle.clone());
        Ok(handle)
    }
}
