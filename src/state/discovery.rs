use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Per-direction map from a discovered title to the parent that first revealed it
///
/// Cloning a `DiscoveryCache` yields another handle to the same map, so every
/// crawler of one direction shares a single cache. The check-then-insert in
/// [`DiscoveryCache::insert_if_absent`] happens under one lock, which keeps the
/// first discoverer as the only writer for a title.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryCache {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl DiscoveryCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records `title` as discovered through `parent` unless it is already known
    ///
    /// # Returns
    ///
    /// * `true` - This call inserted the title
    /// * `false` - The title was already present; the cache is unchanged
    pub fn insert_if_absent(&self, title: &str, parent: &str) -> bool {
        let mut map = self.lock();
        if map.contains_key(title) {
            return false;
        }
        map.insert(title.to_string(), parent.to_string());
        true
    }

    /// Returns true if the title has been discovered
    pub fn contains(&self, title: &str) -> bool {
        self.lock().contains_key(title)
    }

    /// Returns the parent recorded for a title
    pub fn parent_of(&self, title: &str) -> Option<String> {
        self.lock().get(title).cloned()
    }

    /// Folds a normalised title into the cache
    ///
    /// The canonical title `to` is recorded with the requested title `from` as
    /// its parent, so walking parents from anything discovered through the
    /// canonical page still ends at the title as it was requested.
    pub fn alias(&self, from: &str, to: &str) -> bool {
        let mut map = self.lock();
        if map.contains_key(to) || !map.contains_key(from) {
            return false;
        }
        map.insert(to.to_string(), from.to_string());
        true
    }

    /// Number of discovered titles
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been discovered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies the current contents for read-only use during path reconstruction
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.lock().clone()
    }
}
