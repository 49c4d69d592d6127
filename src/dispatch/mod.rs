/*!
 * Execution Dispatch
 * Routes one logical operation to the sync, bridged, or native async path
 * based on the caller's runtime context
 */

pub mod builder;
pub mod context;
pub mod operation;

pub use builder::{unified_operation, OperationBuilder};
pub use context::{ExecutionContext, RuntimeProbe, StaticProbe};
pub use operation::{AsyncImpl, Dispatched, DualModeOperation, SyncImpl};

use crate::core::errors::Result;
use crate::core::types::{BridgePolicy, PoolConfig};
use crate::pool::WorkerPool;
use std::sync::Arc;
use tracing::info;

/// Owns the worker pool, context probe, and fallback policy that dispatched
/// operations share
///
/// Pool lifetime has one explicit owner: either this dispatcher
/// ([`Dispatcher::new`]) or whoever injected it ([`Dispatcher::with_pool`]).
/// Cloning shares the same pool and probe.
#[derive(Clone)]
pub struct Dispatcher {
    pool: Arc<WorkerPool>,
    probe: Arc<dyn ExecutionContext>,
    policy: BridgePolicy,
}

impl Dispatcher {
    /// Build a dispatcher owning a fresh pool
    pub fn new(config: PoolConfig) -> Self {
        Self::with_pool(Arc::new(WorkerPool::new(config)))
    }

    /// Build a dispatcher over an injected, possibly shared pool
    pub fn with_pool(pool: Arc<WorkerPool>) -> Self {
        info!(workers = pool.worker_count(), "dispatcher ready");
        Self {
            pool,
            probe: Arc::new(RuntimeProbe),
            policy: BridgePolicy::Bridge,
        }
    }

    /// Replace the context probe (deterministic tests, context-aware hosts)
    pub fn with_probe(mut self, probe: Arc<dyn ExecutionContext>) -> Self {
        self.probe = probe;
        self
    }

    /// Set the fallback policy for operations without a native async
    /// implementation
    pub fn with_policy(mut self, policy: BridgePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pair a blocking implementation with an optional native async one
    ///
    /// The returned operation probes the execution context on every call
    /// and routes to the correct path; `call_sync`/`call_async` bypass
    /// detection. For the declarative form see [`unified_operation`].
    pub fn dispatch<A, T, F>(
        &self,
        sync_fn: F,
        async_fn: Option<AsyncImpl<A, T>>,
    ) -> DualModeOperation<A, T>
    where
        A: Send + 'static,
        T: Send + 'static,
        F: Fn(A) -> Result<T> + Send + Sync + 'static,
    {
        DualModeOperation::new(
            "operation",
            Arc::new(sync_fn),
            async_fn,
            Arc::clone(&self.pool),
            Arc::clone(&self.probe),
            self.policy,
            None,
        )
    }

    /// Drain or abandon the owned pool; idempotent
    pub fn shutdown(&self, wait: bool) {
        self.pool.shutdown(wait);
    }

    pub(crate) fn pool(&self) -> Arc<WorkerPool> {
        Arc::clone(&self.pool)
    }

    pub(crate) fn context_probe(&self) -> Arc<dyn ExecutionContext> {
        Arc::clone(&self.probe)
    }

    pub(crate) fn bridge_policy(&self) -> BridgePolicy {
        self.policy
    }

    /// Stats snapshot of the underlying pool
    pub fn pool_stats(&self) -> crate::pool::PoolStats {
        self.pool.stats()
    }
}
