/*!
 * Error Types
 * Layered error taxonomy with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors caused by the caller handing an operation bad input
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum CallerError {
    #[error("invalid argument: {0}")]
    #[diagnostic(
        code(caller::invalid_argument),
        help("Check the arguments passed to the operation. They were rejected before reaching the resource.")
    )]
    InvalidArgument(String),

    #[error("operation was dispatched to the async path and must be awaited")]
    #[diagnostic(
        code(caller::deferred_result),
        help("The call ran inside an async runtime. Await the dispatched value instead of unwrapping it synchronously.")
    )]
    DeferredResult,
}

/// Errors raised by the wrapped driver or client
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ResourceError {
    #[error("database driver error: {0}")]
    #[diagnostic(
        code(resource::database),
        help("The database driver rejected the call. Inspect the driver message for the root cause.")
    )]
    Database(String),

    #[error("http request failed: {0}")]
    #[diagnostic(
        code(resource::http),
        help("The HTTP session reported a failure. Check connectivity and the remote endpoint.")
    )]
    Http(String),

    #[error("i/o error: {0}")]
    #[diagnostic(
        code(resource::io),
        help("Filesystem operation failed. Check the path, permissions, and disk state.")
    )]
    Io(String),
}

/// Errors in the bridging machinery itself, distinct from anything the
/// wrapped resource could raise so callers can decide retry vs. fail
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum BridgeError {
    #[error("worker pool is shut down")]
    #[diagnostic(
        code(bridge::pool_closed),
        help("The owning adapter was torn down. No further submissions are accepted.")
    )]
    PoolClosed,

    #[error("worker pool queue is full (capacity {capacity})")]
    #[diagnostic(
        code(bridge::queue_full),
        help("Too many bridged calls are queued. Retry later or raise the queue capacity.")
    )]
    QueueFull { capacity: usize },

    #[error("bridged result was lost before delivery")]
    #[diagnostic(
        code(bridge::result_lost),
        help("The worker exited without reporting a result. This indicates a torn-down pool mid-flight.")
    )]
    ResultLost,

    #[error("operation has no native async implementation and bridging is disabled")]
    #[diagnostic(
        code(bridge::native_required),
        help("The dispatcher runs with BridgePolicy::RequireNative. Supply a native async implementation or relax the policy.")
    )]
    NativeRequired,
}

/// Context probing failed; dispatch must not silently guess a path
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ContextError {
    #[error("execution context probe failed: {0}")]
    #[diagnostic(
        code(context::probe_failed),
        help("The injected ExecutionContext could not determine the calling context.")
    )]
    ProbeFailed(String),
}

/// Unified dispatch-layer error type
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum DispatchError {
    #[error("caller error: {0}")]
    #[diagnostic(transparent)]
    Caller(#[from] CallerError),

    #[error("resource error: {0}")]
    #[diagnostic(transparent)]
    Resource(#[from] ResourceError),

    #[error("bridge error: {0}")]
    #[diagnostic(transparent)]
    Bridge(#[from] BridgeError),

    #[error("context error: {0}")]
    #[diagnostic(transparent)]
    Context(#[from] ContextError),
}

impl DispatchError {
    /// Whether the failure came from the bridging machinery rather than
    /// the resource, making a retry plausible
    pub fn is_bridge(&self) -> bool {
        matches!(self, DispatchError::Bridge(_))
    }
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        ResourceError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ResourceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ResourceError::Http(format!("{} ({})", err, status)),
            None => ResourceError::Http(err.to_string()),
        }
    }
}

/// Result type for dispatch-layer operations
pub type Result<T> = std::result::Result<T, DispatchError>;
