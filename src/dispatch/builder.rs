/*!
 * Unified Operation Builder
 * Declarative facade for defining dual-mode operations
 */

use crate::core::errors::Result;
use crate::dispatch::operation::{AsyncImpl, BridgeNotice, DualModeOperation, SyncImpl};
use crate::dispatch::Dispatcher;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Declare a dual-mode operation from its blocking implementation
///
/// A sync-only declaration is always correct but only "fake async": called
/// from a runtime it still consumes a worker thread. Supplying a native
/// implementation with [`OperationBuilder::with_async`] makes the async
/// path genuinely non-blocking. Neither form changes the call signature or
/// result shape observed by the caller.
///
/// ```ignore
/// let op = unified_operation(|n: u32| Ok(n + 1))
///     .named("counter.bump")
///     .bind(&dispatcher);
/// ```
pub fn unified_operation<A, T, F>(sync_fn: F) -> OperationBuilder<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
    F: Fn(A) -> Result<T> + Send + Sync + 'static,
{
    OperationBuilder {
        name: "operation",
        sync_impl: Arc::new(sync_fn),
        async_impl: None,
        bridge_notice: None,
    }
}

/// Accumulates the parts of a [`DualModeOperation`] before binding it to a
/// dispatcher
pub struct OperationBuilder<A, T> {
    name: &'static str,
    sync_impl: SyncImpl<A, T>,
    async_impl: Option<AsyncImpl<A, T>>,
    bridge_notice: Option<String>,
}

impl<A, T> OperationBuilder<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    /// Name used in dispatch logs
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Attach a native async implementation
    pub fn with_async<G>(mut self, async_fn: G) -> Self
    where
        G: Fn(A) -> BoxFuture<'static, Result<T>> + Send + Sync + 'static,
    {
        self.async_impl = Some(Arc::new(async_fn));
        self
    }

    /// Warn once when a bridge substitutes for a missing native
    /// implementation
    pub fn bridge_notice(mut self, message: impl Into<String>) -> Self {
        self.bridge_notice = Some(message.into());
        self
    }

    /// Bind to a dispatcher's pool, probe, and policy
    pub fn bind(self, dispatcher: &Dispatcher) -> DualModeOperation<A, T> {
        DualModeOperation::new(
            self.name,
            self.sync_impl,
            self.async_impl,
            dispatcher.pool(),
            dispatcher.context_probe(),
            dispatcher.bridge_policy(),
            self.bridge_notice
                .map(|message| Arc::new(BridgeNotice::new(message))),
        )
    }
}
