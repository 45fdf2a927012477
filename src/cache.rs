//! Remote directory cache
//!
//! Client-held copy of the server's people and metadata identifier lists.
//! Each pool starts [`PoolState::Unloaded`], is replaced wholesale by a
//! successful load and only ever grows afterwards through
//! [`Directory::record_created`].

use async_trait::async_trait;
use genweb_types::{Identifier, Pool};

use crate::api::{ApiResult, GenwebApi};

/// Load state of one identifier pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PoolState {
    /// No successful load yet; distinct from an empty pool
    #[default]
    Unloaded,
    Loaded(Vec<Identifier>),
}

impl PoolState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, PoolState::Loaded(_))
    }

    pub fn identifiers(&self) -> Option<&[Identifier]> {
        match self {
            PoolState::Loaded(ids) => Some(ids),
            PoolState::Unloaded => None,
        }
    }
}

/// What the editor components need from the identifier cache
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Directory: Send {
    /// Fetch the full list for `pool` and replace the cached one.
    /// On failure the previous state is kept.
    async fn load(&mut self, api: &dyn GenwebApi, pool: Pool) -> ApiResult<usize>;

    /// Identifiers of a loaded pool, in server order
    fn candidates(&self, pool: Pool) -> Option<&[Identifier]>;

    fn is_loaded(&self, pool: Pool) -> bool {
        self.candidates(pool).is_some()
    }

    /// Exact membership. An unloaded pool contains nothing; callers are
    /// expected to check [`Directory::is_loaded`] first.
    fn contains(&self, pool: Pool, id: &str) -> bool {
        self.candidates(pool)
            .is_some_and(|ids| ids.iter().any(|known| known == id))
    }

    /// Append a freshly saved metadata identifier if absent.
    /// Returns true when the pool changed.
    fn record_created(&mut self, id: &Identifier) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryCache {
    people: PoolState,
    metadata: PoolState,
}

impl DirectoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, pool: Pool) -> &PoolState {
        match pool {
            Pool::People => &self.people,
            Pool::Metadata => &self.metadata,
        }
    }

    /// Replace a pool wholesale
    pub fn replace(&mut self, pool: Pool, ids: Vec<Identifier>) {
        *self.state_mut(pool) = PoolState::Loaded(ids);
    }

    /// Load every pool; one failing pool does not stop the others
    pub async fn load_all(&mut self, api: &dyn GenwebApi) -> Vec<(Pool, ApiResult<usize>)> {
        let mut results = Vec::with_capacity(Pool::ALL.len());
        for pool in Pool::ALL {
            let result = self.load(api, pool).await;
            results.push((pool, result));
        }
        results
    }

    fn state_mut(&mut self, pool: Pool) -> &mut PoolState {
        match pool {
            Pool::People => &mut self.people,
            Pool::Metadata => &mut self.metadata,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Directory for DirectoryCache {
    async fn load(&mut self, api: &dyn GenwebApi, pool: Pool) -> ApiResult<usize> {
        match api.list_identifiers(pool).await {
            Ok(ids) => {
                let count = ids.len();
                tracing::debug!(%pool, count, "directory pool loaded");
                self.replace(pool, ids);
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(%pool, error = %err, "directory pool load failed");
                Err(err)
            }
        }
    }

    fn candidates(&self, pool: Pool) -> Option<&[Identifier]> {
        self.state(pool).identifiers()
    }

    fn record_created(&mut self, id: &Identifier) -> bool {
        match &mut self.metadata {
            PoolState::Loaded(ids) if !ids.contains(id) => {
                ids.push(id.clone());
                true
            }
            PoolState::Loaded(_) => false,
            PoolState::Unloaded => {
                tracing::debug!(%id, "metadata pool not loaded; created id not cached");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryApi;
    use genweb_types::MetadataRecord;

    fn ids(values: &[&str]) -> Vec<Identifier> {
        values.iter().map(|v| Identifier::from(*v)).collect()
    }

    fn metadata(id: &str) -> MetadataRecord {
        [("id", id)].into_iter().collect()
    }

    #[test]
    fn unloaded_is_not_empty() {
        let mut cache = DirectoryCache::new();
        assert!(!cache.is_loaded(Pool::Metadata));
        assert!(!cache.contains(Pool::Metadata, "m1"));

        cache.replace(Pool::Metadata, Vec::new());
        assert!(cache.is_loaded(Pool::Metadata));
        assert_eq!(cache.candidates(Pool::Metadata), Some(&[][..]));
    }

    #[test]
    fn record_created_is_idempotent() {
        let mut cache = DirectoryCache::new();
        cache.replace(Pool::Metadata, ids(&["m1", "m2"]));

        assert!(cache.record_created(&"m3".into()));
        assert!(!cache.record_created(&"m3".into()));

        assert_eq!(cache.candidates(Pool::Metadata).unwrap(), &ids(&["m1", "m2", "m3"])[..]);
    }

    #[test]
    fn record_created_only_touches_metadata() {
        let mut cache = DirectoryCache::new();
        cache.replace(Pool::People, ids(&["p1"]));
        cache.replace(Pool::Metadata, ids(&[]));

        cache.record_created(&"p2".into());
        assert_eq!(cache.candidates(Pool::People).unwrap(), &ids(&["p1"])[..]);
    }

    #[tokio::test]
    async fn load_replaces_and_failure_keeps_previous_state() {
        let api = InMemoryApi::new()
            .with_metadata(metadata("m1"))
            .with_metadata(metadata("m2"));
        let mut cache = DirectoryCache::new();

        api.fail_next(500, "down");
        assert!(cache.load(&api, Pool::Metadata).await.is_err());
        assert_eq!(cache.state(Pool::Metadata), &PoolState::Unloaded);

        assert_eq!(cache.load(&api, Pool::Metadata).await.unwrap(), 2);
        assert!(cache.contains(Pool::Metadata, "m2"));

        api.fail_next(503, "busy");
        assert!(cache.load(&api, Pool::Metadata).await.is_err());
        assert_eq!(cache.candidates(Pool::Metadata).unwrap(), &ids(&["m1", "m2"])[..]);
    }

    #[tokio::test]
    async fn load_all_reports_each_pool() {
        let api = InMemoryApi::new();
        api.fail_next(500, "people down");
        let mut cache = DirectoryCache::new();

        let results = cache.load_all(&api).await;
        assert!(results[0].1.is_err());
        assert_eq!(results[1].1, Ok(0));
        assert!(!cache.is_loaded(Pool::People));
        assert!(cache.is_loaded(Pool::Metadata));
    }
}
