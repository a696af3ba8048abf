use parking_lot::RwLock;
use protocol::CityId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::engine::ShortestPaths;

/// Per-source memo of completed shortest-path runs.
///
/// An entry exists only for a source whose run finished without finding a
/// negative cycle; presence is the validity flag. Entries are inserted whole,
/// so readers never see a half-written vector.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<CityId, Arc<ShortestPaths>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: CityId) -> Option<Arc<ShortestPaths>> {
        self.entries.read().get(&source).cloned()
    }

    /// Stores `paths` under `source`, replacing any earlier entry.
    pub fn put(&self, source: CityId, paths: Arc<ShortestPaths>) {
        debug!("Caching shortest paths for city #{}", source);
        self.entries.write().insert(source, paths);
    }

    pub fn contains(&self, source: CityId) -> bool {
        self.entries.read().contains_key(&source)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
