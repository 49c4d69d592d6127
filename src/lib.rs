/*!
 * unibridge
 * Unified sync/async execution dispatch: one business-logic implementation,
 * callable from plain synchronous code or from inside a tokio runtime,
 * with bounded worker-thread bridging and dual-mode resource adapters
 */

pub mod adapters;
pub mod core;
pub mod dispatch;
pub mod pool;

// Re-exports
pub use adapters::{
    ApiClient, AsyncSqlDriver, Cache, Database, FileOps, HttpResponse, RequestOptions, Row,
    SqlDriver, SqlValue,
};
pub use crate::core::errors::{
    BridgeError, CallerError, ContextError, DispatchError, ResourceError, Result,
};
pub use crate::core::types::{BridgePolicy, ConnectionGuard, PoolConfig};
pub use dispatch::{
    unified_operation, Dispatched, Dispatcher, DualModeOperation, ExecutionContext,
    OperationBuilder, RuntimeProbe, StaticProbe,
};
pub use pool::{JobHandle, PoolStats, WorkerPool};
