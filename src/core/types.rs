/*!
 * Shared Configuration Types
 */

use serde::{Deserialize, Serialize};

/// Worker pool sizing and queueing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PoolConfig {
    /// Number of OS threads; concurrency never exceeds this
    pub workers: usize,

    /// Cap on queued submissions; `None` queues without bound
    pub queue_capacity: Option<usize>,

    /// Name prefix for worker threads, visible in debuggers and logs
    pub name: String,
}

impl PoolConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .clamp(2, 8);
        Self {
            workers,
            queue_capacity: None,
            name: "bridge".into(),
        }
    }
}

/// Fallback policy when an operation has no native async implementation
/// and is invoked from async context
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BridgePolicy {
    /// Run the blocking implementation on the worker pool (default)
    #[default]
    Bridge,

    /// Fail with `BridgeError::NativeRequired` instead of consuming a
    /// worker thread
    RequireNative,
}

/// Thread-safety contract for a database handle shared across bridged calls
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionGuard {
    /// Serialize all calls through a mutex; safe for single-connection
    /// drivers that are not thread-safe (default)
    #[default]
    Serialized,

    /// Pass calls through concurrently; the driver must be internally
    /// thread-safe or pooled
    Concurrent,
}
