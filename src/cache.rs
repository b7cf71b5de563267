use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::Id;

const CACHE_TTL_SECS: i64 = 3600; // 1 hour

/// One cached view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Projects,
    Technologies,
    Categories,
    Screenshots,
    Project(Id),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Projects => f.write_str("projects"),
            CacheKey::Technologies => f.write_str("technologies"),
            CacheKey::Categories => f.write_str("categories"),
            CacheKey::Screenshots => f.write_str("screenshots"),
            // Integer and string ids may print alike.
            CacheKey::Project(Id::Int(id)) => write!(f, "project:i:{id}"),
            CacheKey::Project(Id::Str(id)) => write!(f, "project:s:{id}"),
        }
    }
}

/// A successful write against the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateProject,
    UpdateProject(Id),
    DeleteProject(Id),
    CreateTechnology,
    CreateScreenshot,
    DeleteScreenshot,
}

impl Mutation {
    /// Views whose contents the mutation can change.
    pub fn affected_keys(&self) -> Vec<CacheKey> {
        match self {
            Mutation::CreateProject => vec![CacheKey::Projects],
            Mutation::UpdateProject(id) => vec![CacheKey::Project(id.clone())],
            Mutation::DeleteProject(id) => {
                vec![CacheKey::Projects, CacheKey::Project(id.clone())]
            }
            Mutation::CreateTechnology => vec![CacheKey::Technologies],
            Mutation::CreateScreenshot | Mutation::DeleteScreenshot => {
                vec![CacheKey::Screenshots]
            }
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
struct CachedView {
    data: serde_json::Value,
    fetched_at: DateTime<Utc>,
    #[serde(default)]
    stale: bool,
}

/// Fetched views, persisted between runs. Invalidated entries are kept
/// but marked stale, so the next read goes back to the API.
#[derive(Serialize, Deserialize, Default)]
pub struct ViewCache {
    views: HashMap<String, CachedView>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl ViewCache {
    /// Load the cache file. Any problem reading it just yields an empty
    /// cache.
    pub fn load(path: PathBuf) -> Self {
        let cache = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str::<Self>(&contents).ok())
            .unwrap_or_default();

        Self {
            path: Some(path),
            ..cache
        }
    }

    pub fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };

        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let contents = match serde_json::to_string_pretty(self) {
            Ok(c) => c,
            Err(_) => return,
        };

        if let Err(err) = std::fs::write(path, contents) {
            debug!(error = %err, "could not write view cache");
        }
    }

    /// Cached value for `key` if it is fresh and still decodes as `T`.
    pub fn fresh<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let view = self.views.get(&key.to_string())?;

        if view.stale || Utc::now() - view.fetched_at > Duration::seconds(CACHE_TTL_SECS) {
            return None;
        }

        serde_json::from_value(view.data.clone()).ok()
    }

    pub fn store<T: Serialize>(&mut self, key: &CacheKey, value: &T) {
        let Ok(data) = serde_json::to_value(value) else {
            return;
        };

        self.views.insert(
            key.to_string(),
            CachedView {
                data,
                fetched_at: Utc::now(),
                stale: false,
            },
        );
    }

    pub fn invalidate(&mut self, key: &CacheKey) {
        if let Some(view) = self.views.get_mut(&key.to_string()) {
            debug!(%key, "view marked stale");
            view.stale = true;
        }
    }

    pub fn invalidate_after(&mut self, mutation: &Mutation) {
        for key in mutation.affected_keys() {
            self.invalidate(&key);
        }
    }

    /// Drop every view, e.g. when the session ends.
    pub fn clear(&mut self) {
        self.views.clear();
    }

    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.views
            .get(&key.to_string())
            .map_or(true, |view| view.stale)
    }

    /// Return the cached view, or run `fetch` and remember its result.
    pub async fn read_through<T, F, Fut>(&mut self, key: CacheKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh(&key) {
            debug!(%key, "view cache hit");
            return Ok(value);
        }

        debug!(%key, stale = self.is_stale(&key), "view cache miss");
        let value = fetch().await?;
        self.store(&key, &value);

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::CatalogError;

    fn project_list(ids: &[i64]) -> Vec<serde_json::Value> {
        ids.iter()
            .map(|id| serde_json::json!({ "id": id, "title": format!("P{id}") }))
            .collect()
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let mut cache = ViewCache::default();
        let fetches = Cell::new(0);
        let counter = &fetches;

        for _ in 0..2 {
            let list: Vec<serde_json::Value> = cache
                .read_through(CacheKey::Projects, || async move {
                    counter.set(counter.get() + 1);
                    Ok(project_list(&[4, 5]))
                })
                .await
                .unwrap();
            assert_eq!(list.len(), 2);
        }

        assert_eq!(fetches.get(), 1);
    }

    #[tokio::test]
    async fn deleting_a_project_forces_a_refetch() {
        let mut cache = ViewCache::default();
        cache.store(&CacheKey::Projects, &project_list(&[4, 5]));

        cache.invalidate_after(&Mutation::DeleteProject(Id::Int(5)));

        let fetches = Cell::new(0);
        let counter = &fetches;
        let list: Vec<serde_json::Value> = cache
            .read_through(CacheKey::Projects, || async move {
                counter.set(counter.get() + 1);
                Ok(project_list(&[4]))
            })
            .await
            .unwrap();

        assert_eq!(fetches.get(), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], 4);
        assert!(!cache.is_stale(&CacheKey::Projects));
    }

    #[test]
    fn updating_a_project_only_touches_its_detail() {
        let mut cache = ViewCache::default();
        cache.store(&CacheKey::Projects, &project_list(&[1, 2]));
        cache.store(&CacheKey::Project(Id::Int(1)), &project_list(&[1])[0]);
        cache.store(&CacheKey::Project(Id::Int(2)), &project_list(&[2])[0]);

        cache.invalidate_after(&Mutation::UpdateProject(Id::Int(1)));

        assert!(cache.is_stale(&CacheKey::Project(Id::Int(1))));
        assert!(!cache.is_stale(&CacheKey::Project(Id::Int(2))));
        assert!(!cache.is_stale(&CacheKey::Projects));
    }

    #[test]
    fn integer_and_string_project_ids_are_cached_apart() {
        let mut cache = ViewCache::default();
        cache.store(&CacheKey::Project(Id::Int(5)), &project_list(&[5])[0]);

        assert!(cache
            .fresh::<serde_json::Value>(&CacheKey::Project(Id::Str("5".to_string())))
            .is_none());
        assert!(cache
            .fresh::<serde_json::Value>(&CacheKey::Project(Id::Int(5)))
            .is_some());
        assert_ne!(
            CacheKey::Project(Id::Int(5)).to_string(),
            CacheKey::Project(Id::Str("5".to_string())).to_string()
        );
    }

    #[test]
    fn creating_a_technology_invalidates_the_technology_list() {
        let mut cache = ViewCache::default();
        cache.store(&CacheKey::Technologies, &vec!["Go"]);
        cache.store(&CacheKey::Categories, &vec!["Web"]);

        cache.invalidate_after(&Mutation::CreateTechnology);

        assert!(cache.is_stale(&CacheKey::Technologies));
        assert!(!cache.is_stale(&CacheKey::Categories));
    }

    #[tokio::test]
    async fn failed_fetch_leaves_view_stale() {
        let mut cache = ViewCache::default();
        cache.store(&CacheKey::Screenshots, &vec![1, 2]);
        cache.invalidate(&CacheKey::Screenshots);

        let result: Result<Vec<i64>> = cache
            .read_through(CacheKey::Screenshots, || async {
                Err(CatalogError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            })
            .await;

        assert!(result.is_err());
        assert!(cache.is_stale(&CacheKey::Screenshots));
    }

    #[test]
    fn persists_staleness_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = ViewCache::load(path.clone());
        cache.store(&CacheKey::Projects, &project_list(&[1]));
        cache.store(&CacheKey::Technologies, &vec!["Rust"]);
        cache.invalidate(&CacheKey::Projects);
        cache.save();

        let reloaded = ViewCache::load(path);
        assert!(reloaded.fresh::<Vec<serde_json::Value>>(&CacheKey::Projects).is_none());
        assert_eq!(
            reloaded.fresh::<Vec<String>>(&CacheKey::Technologies),
            Some(vec!["Rust".to_string()])
        );
    }

    #[test]
    fn expired_entries_are_not_fresh() {
        let mut cache = ViewCache::default();
        cache.store(&CacheKey::Categories, &vec![1]);
        cache
            .views
            .get_mut("categories")
            .unwrap()
            .fetched_at = Utc::now() - Duration::seconds(CACHE_TTL_SECS + 1);

        assert!(cache.fresh::<Vec<i64>>(&CacheKey::Categories).is_none());
    }

    #[test]
    fn clear_drops_every_view() {
        let mut cache = ViewCache::default();
        cache.store(&CacheKey::Categories, &vec![1, 2]);
        cache.store(&CacheKey::Project(Id::Int(4)), &serde_json::json!({ "id": 4 }));

        cache.clear();

        assert_eq!(cache.fresh::<Vec<i64>>(&CacheKey::Categories), None);
        assert!(cache.is_stale(&CacheKey::Project(Id::Int(4))));
    }

    #[test]
    fn corrupt_cache_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let cache = ViewCache::load(path);
        assert!(cache.is_stale(&CacheKey::Projects));
    }
}
