//! Explicit query cache.
//!
//! Query results are stored per key together with their status and the
//! time they were fetched. Reads within `stale_time` are served from the
//! cache; mutations mark the affected keys stale so the next read refetches.
//!
//! Keys are `/`-separated paths, so invalidating `ubicacionesTecnicas`
//! also invalidates `ubicacionesTecnicas/ramas/4`.

use std::any::Any;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::ApiError;

/// Logical identifier of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Locations,
    LocationBranches { id: i64, level: Option<u8> },
    LocationParents { id: i64 },
    WorkGroups,
    Technicians,
    GroupMembers,
}

impl QueryKey {
    pub const LOCATIONS: &'static str = "ubicacionesTecnicas";
    pub const WORK_GROUPS: &'static str = "gruposDeTrabajo";
    pub const TECHNICIANS: &'static str = "tecnicos";
    pub const GROUP_MEMBERS: &'static str = "trabajadoresPorGrupo";

    pub fn path(&self) -> String {
        match self {
            QueryKey::Locations => Self::LOCATIONS.to_string(),
            QueryKey::LocationBranches { id, level: None } => {
                format!("{}/ramas/{id}", Self::LOCATIONS)
            }
            QueryKey::LocationBranches { id, level: Some(level) } => {
                format!("{}/ramas/{id}/{level}", Self::LOCATIONS)
            }
            QueryKey::LocationParents { id } => format!("{}/padres/{id}", Self::LOCATIONS),
            QueryKey::WorkGroups => Self::WORK_GROUPS.to_string(),
            QueryKey::Technicians => Self::TECHNICIANS.to_string(),
            QueryKey::GroupMembers => Self::GROUP_MEMBERS.to_string(),
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Fresh,
    Stale,
}

#[derive(Clone)]
struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    invalidated: bool,
    fetched_at: DateTime<Utc>,
}

/// Query results keyed by [`QueryKey`] path. Cheap to share behind `Arc`.
pub struct QueryCache {
    entries: RwLock<BTreeMap<String, CacheEntry>>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            stale_time,
        }
    }

    fn status_of(&self, entry: &CacheEntry, now: DateTime<Utc>) -> QueryStatus {
        if entry.invalidated || now - entry.fetched_at > self.stale_time {
            QueryStatus::Stale
        } else {
            QueryStatus::Fresh
        }
    }

    /// Status of a key, or `None` if it was never fetched.
    pub fn status(&self, key: &QueryKey) -> Option<QueryStatus> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&key.path())
            .map(|entry| self.status_of(entry, Utc::now()))
    }

    /// When a key was last fetched.
    pub fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&key.path()).map(|entry| entry.fetched_at)
    }

    /// Cached value regardless of staleness.
    pub fn get<T: Any + Clone + Send + Sync>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&key.path())
            .and_then(|entry| entry.value.downcast_ref::<T>())
            .cloned()
    }

    /// Store a fresh value for `key`.
    pub fn set<T: Any + Send + Sync>(&self, key: &QueryKey, value: T) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.path(),
            CacheEntry {
                value: Arc::new(value),
                invalidated: false,
                fetched_at: Utc::now(),
            },
        );
    }

    /// Return the cached value if fresh, otherwise run `fetch` and store
    /// its result. A failed fetch leaves the previous entry untouched.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<T, ApiError>
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let path = key.path();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(&path) {
                if self.status_of(entry, Utc::now()) == QueryStatus::Fresh {
                    if let Some(value) = entry.value.downcast_ref::<T>() {
                        debug!(key = %path, "cache hit");
                        return Ok(value.clone());
                    }
                }
            }
        }

        debug!(key = %path, "cache miss, fetching");
        let value = fetch().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Mark `prefix` and every key below it stale. Returns how many
    /// entries were affected.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let child_prefix = format!("{prefix}/");
        let mut count = 0;
        for (path, entry) in entries.iter_mut() {
            if path == prefix || path.starts_with(&child_prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(prefix, count, "invalidated queries");
        count
    }

    /// Drop every entry (used on logout).
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QueryCache {
    /// Five minutes, the stale time the location views use.
    fn default() -> Self {
        Self::new(Duration::minutes(5))
    }
}
