/*!
 * Cache Adapter
 * Dual-mode TTL cache over a shared concurrent map
 *
 * Lookups never block, so both dispatch paths are native: the async
 * implementations resolve immediately without touching the worker pool.
 * Expiry is lazy on read; long-lived owners can sweep with
 * [`Cache::purge_expired`].
 */

use crate::core::errors::{CallerError, Result};
use crate::dispatch::{unified_operation, Dispatched, Dispatcher, DualModeOperation};
use ahash::RandomState;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

type Entries<V> = Arc<DashMap<String, CacheEntry<V>, RandomState>>;

/// Dual-mode in-memory cache
pub struct Cache<V> {
    entries: Entries<V>,
    get_op: DualModeOperation<String, Option<V>>,
    set_op: DualModeOperation<(String, V, Option<Duration>), ()>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            get_op: self.get_op.clone(),
            set_op: self.set_op.clone(),
        }
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(dispatcher: &Dispatcher) -> Self {
        let entries: Entries<V> = Arc::new(DashMap::with_hasher(RandomState::new()));

        let get_op = {
            let entries = Arc::clone(&entries);
            let async_entries = Arc::clone(&entries);
            unified_operation(move |key: String| lookup(&entries, &key))
                .named("cache.get")
                .with_async(move |key: String| -> BoxFuture<'static, Result<Option<V>>> {
                    let entries = Arc::clone(&async_entries);
                    Box::pin(async move { lookup(&entries, &key) })
                })
                .bind(dispatcher)
        };

        let set_op = {
            let entries = Arc::clone(&entries);
            let async_entries = Arc::clone(&entries);
            unified_operation(
                move |(key, value, ttl): (String, V, Option<Duration>)| {
                    store(&entries, key, value, ttl)
                },
            )
            .named("cache.set")
            .with_async(
                move |(key, value, ttl): (String, V, Option<Duration>)| -> BoxFuture<'static, Result<()>> {
                    let entries = Arc::clone(&async_entries);
                    Box::pin(async move { store(&entries, key, value, ttl) })
                },
            )
            .bind(dispatcher)
        };

        Self {
            entries,
            get_op,
            set_op,
        }
    }

    /// Fetch a value if present and not expired; context-detected
    pub fn get(&self, key: impl Into<String>) -> Dispatched<Option<V>> {
        self.get_op.call(key.into())
    }

    /// Store a value, optionally expiring after `ttl`; context-detected
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Dispatched<()> {
        self.set_op.call((key.into(), value, ttl))
    }

    /// Count of stored entries, expired ones included until swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before - self.entries.len()
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn get_operation(&self) -> &DualModeOperation<String, Option<V>> {
        &self.get_op
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn set_operation(&self) -> &DualModeOperation<(String, V, Option<Duration>), ()> {
        &self.set_op
    }
}

fn lookup<V: Clone>(entries: &DashMap<String, CacheEntry<V>, RandomState>, key: &str) -> Result<Option<V>> {
    if key.is_empty() {
        return Err(CallerError::InvalidArgument("cache key must not be empty".into()).into());
    }
    if let Some(entry) = entries.get(key) {
        if !entry.is_expired() {
            return Ok(Some(entry.value.clone()));
        }
    }
    // Reap lazily; re-check under the removal lock.
    entries.remove_if(key, |_, entry| entry.is_expired());
    Ok(None)
}

fn store<V>(
    entries: &DashMap<String, CacheEntry<V>, RandomState>,
    key: String,
    value: V,
    ttl: Option<Duration>,
) -> Result<()> {
    if key.is_empty() {
        return Err(CallerError::InvalidArgument("cache key must not be empty".into()).into());
    }
    entries.insert(
        key,
        CacheEntry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        },
    );
    Ok(())
}
