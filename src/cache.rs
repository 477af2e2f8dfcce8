//! Query cache for patient reads.
//!
//! A small async cache in the style of a Redis client:
//! - DashMap storage shared between clones
//! - optional TTL per entry with background cleanup
//! - prefix invalidation so a mutation can drop every list page at once
//!
//! [`PatientCache`] layers the key scheme for list pages and single records on top.

use crate::models::{PaginatedPatients, Patient};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// A cache entry with optional expiration time.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// None means no expiration
    expires_at: Option<DateTime<Utc>>,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl_seconds.map(|ttl| Utc::now() + Duration::seconds(ttl as i64)),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| exp < Utc::now())
            .unwrap_or(false)
    }
}

/// Cache configuration options.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Background cleanup interval in seconds (default: 60)
    pub cleanup_interval_seconds: u64,
    /// TTL in seconds for entries (None means entries live until invalidated)
    pub default_ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: 60,
            default_ttl_seconds: None,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            default_ttl_seconds: settings.ttl_seconds,
            ..Self::default()
        }
    }
}

/// Generic keyed cache.
///
/// Clones share storage; only the instance built by `new_local` owns the cleanup task.
#[derive(Debug)]
pub struct Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    storage: Arc<DashMap<String, CacheEntry<V>>>,
    cleanup_task: Option<JoinHandle<()>>,
    config: CacheConfig,
}

impl<V> Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    /// Create a new local cache. Must be called inside a tokio runtime.
    pub fn new_local(config: CacheConfig) -> Self {
        let storage = Arc::new(DashMap::new());
        let cleanup_task = Some(Self::spawn_cleanup_task(
            Arc::clone(&storage),
            config.cleanup_interval_seconds,
        ));

        Self {
            storage,
            cleanup_task,
            config,
        }
    }

    fn spawn_cleanup_task(
        storage: Arc<DashMap<String, CacheEntry<V>>>,
        interval_seconds: u64,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds.max(1)));
            loop {
                interval.tick().await;
                storage.retain(|_, entry| !entry.is_expired());
            }
        })
    }

    /// Get a value by key (None if missing or expired).
    pub async fn get(&self, key: &str) -> Option<V> {
        self.storage.get(key).and_then(|entry| {
            if entry.is_expired() {
                None
            } else {
                Some(entry.value.clone())
            }
        })
    }

    /// Set a value with the configured default TTL.
    pub async fn set(&self, key: &str, value: V) {
        let entry = CacheEntry::new(value, self.config.default_ttl_seconds);
        self.storage.insert(key.to_string(), entry);
    }

    /// Delete a key (true if it existed).
    pub async fn delete(&self, key: &str) -> bool {
        self.storage.remove(key).is_some()
    }

    /// Delete every key starting with `prefix`; returns how many were removed.
    pub async fn delete_prefix(&self, prefix: &str) -> usize {
        let before = self.storage.len();
        self.storage.retain(|key, _| !key.starts_with(prefix));
        before - self.storage.len()
    }
}

impl<V> Drop for Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(task) = self.cleanup_task.take() {
            task.abort();
        }
    }
}

impl<V> Clone for Cache<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        // Shared storage, no second cleanup task
        Self {
            storage: Arc::clone(&self.storage),
            cleanup_task: None,
            config: self.config.clone(),
        }
    }
}

const LIST_PREFIX: &str = "patients:";
const RECORD_PREFIX: &str = "patient:";

/// Cache of list pages (by search, page and page size) and single-record reads.
#[derive(Debug, Clone)]
pub struct PatientCache {
    lists: Cache<PaginatedPatients>,
    records: Cache<Patient>,
}

impl PatientCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            lists: Cache::new_local(config.clone()),
            records: Cache::new_local(config),
        }
    }

    pub fn list_key(search: &str, page: u32, page_size: u32) -> String {
        format!("{}{}:{}:{}", LIST_PREFIX, page, page_size, search)
    }

    pub fn record_key(id: &str) -> String {
        format!("{}{}", RECORD_PREFIX, id)
    }

    pub async fn get_list(&self, search: &str, page: u32, page_size: u32) -> Option<PaginatedPatients> {
        self.lists.get(&Self::list_key(search, page, page_size)).await
    }

    pub async fn put_list(&self, search: &str, page: u32, page_size: u32, value: PaginatedPatients) {
        self.lists.set(&Self::list_key(search, page, page_size), value).await
    }

    pub async fn get_record(&self, id: &str) -> Option<Patient> {
        self.records.get(&Self::record_key(id)).await
    }

    pub async fn put_record(&self, patient: Patient) {
        self.records.set(&Self::record_key(&patient.id), patient).await
    }

    /// Drops every cached list page so the next list read refetches.
    pub async fn invalidate_lists(&self) -> usize {
        let removed = self.lists.delete_prefix(LIST_PREFIX).await;
        info!(removed, "invalidated patient list cache");
        removed
    }

    /// Drops the cached single-record read for `id`.
    pub async fn invalidate_record(&self, id: &str) -> bool {
        let removed = self.records.delete(&Self::record_key(id)).await;
        info!(patient_id = %id, removed, "invalidated patient record cache");
        removed
    }
}
