/*!
 * Dual-Mode Operations
 *
 * One logical operation, two implementations: a blocking one that runs on
 * the calling thread, and an optional native async one. At call time the
 * operation probes the execution context and routes accordingly:
 *
 * ```text
 * ┌──────────────┐
 * │    call()    │
 * └──────┬───────┘
 *        │
 *        ├── probe: no runtime ──► sync impl, calling thread ──► Ready
 *        │
 *        └── probe: runtime ──┬── native async impl ──► Deferred
 *                             │
 *                             └── sync impl on worker pool ──► Deferred
 * ```
 *
 * The observable result is identical on every path. Callers that already
 * know their context can bypass detection with `call_sync`/`call_async`.
 */

use crate::core::errors::{BridgeError, CallerError, DispatchError, Result};
use crate::core::types::BridgePolicy;
use crate::dispatch::context::ExecutionContext;
use crate::pool::WorkerPool;
use futures::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Once};
use std::task::{Context, Poll};
use tracing::{debug, warn};

/// Type-erased blocking implementation
pub type SyncImpl<A, T> = Arc<dyn Fn(A) -> Result<T> + Send + Sync>;

/// Type-erased native async implementation
pub type AsyncImpl<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Emitted once per operation the first time a bridge substitutes for a
/// missing native implementation
pub(crate) struct BridgeNotice {
    message: String,
    once: Once,
}

impl BridgeNotice {
    pub(crate) fn new(message: String) -> Self {
        Self {
            message,
            once: Once::new(),
        }
    }
}

/// Immutable pairing of a blocking implementation and an optional native
/// async implementation, dispatched by caller context
///
/// Created once by [`crate::dispatch::Dispatcher::dispatch`] or the
/// [`crate::dispatch::unified_operation`] builder; never mutated afterward.
pub struct DualModeOperation<A, T> {
    name: &'static str,
    sync_impl: SyncImpl<A, T>,
    async_impl: Option<AsyncImpl<A, T>>,
    pool: Arc<WorkerPool>,
    probe: Arc<dyn ExecutionContext>,
    policy: BridgePolicy,
    bridge_notice: Option<Arc<BridgeNotice>>,
}

impl<A, T> Clone for DualModeOperation<A, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sync_impl: Arc::clone(&self.sync_impl),
            async_impl: self.async_impl.as_ref().map(Arc::clone),
            pool: Arc::clone(&self.pool),
            probe: Arc::clone(&self.probe),
            policy: self.policy,
            bridge_notice: self.bridge_notice.as_ref().map(Arc::clone),
        }
    }
}

impl<A, T> DualModeOperation<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: &'static str,
        sync_impl: SyncImpl<A, T>,
        async_impl: Option<AsyncImpl<A, T>>,
        pool: Arc<WorkerPool>,
        probe: Arc<dyn ExecutionContext>,
        policy: BridgePolicy,
        bridge_notice: Option<Arc<BridgeNotice>>,
    ) -> Self {
        Self {
            name,
            sync_impl,
            async_impl,
            pool,
            probe,
            policy,
            bridge_notice,
        }
    }

    /// Context-detected entry point
    ///
    /// Outside a runtime the blocking implementation runs immediately on
    /// the calling thread and the returned value is ready; unwrap it with
    /// [`Dispatched::into_sync`]. Inside a runtime nothing runs until the
    /// returned value is awaited.
    pub fn call(&self, args: A) -> Dispatched<T> {
        match self.probe.is_async() {
            Err(err) => Dispatched::ready(Err(err.into())),
            Ok(false) => {
                debug!(op = self.name, path = "sync", "dispatching on calling thread");
                Dispatched::ready((self.sync_impl)(args))
            }
            Ok(true) => Dispatched::deferred(self.async_future(args)),
        }
    }

    /// Run the blocking implementation directly, bypassing detection
    pub fn call_sync(&self, args: A) -> Result<T> {
        (self.sync_impl)(args)
    }

    /// Take the async path explicitly, bypassing detection
    ///
    /// Uses the native implementation when present, otherwise bridges the
    /// blocking implementation through the worker pool.
    pub fn call_async(&self, args: A) -> BoxFuture<'static, Result<T>> {
        self.async_future(args)
    }

    pub fn has_native_async(&self) -> bool {
        self.async_impl.is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn async_future(&self, args: A) -> BoxFuture<'static, Result<T>> {
        if let Some(native) = &self.async_impl {
            debug!(op = self.name, path = "native", "dispatching native async implementation");
            return native(args);
        }

        if self.policy == BridgePolicy::RequireNative {
            return Box::pin(std::future::ready(Err(BridgeError::NativeRequired.into())));
        }

        if let Some(notice) = &self.bridge_notice {
            notice
                .once
                .call_once(|| warn!(op = self.name, "{}", notice.message));
        }

        debug!(op = self.name, path = "bridge", "dispatching via worker pool");
        let sync_impl = Arc::clone(&self.sync_impl);
        let pool = Arc::clone(&self.pool);
        Box::pin(async move {
            let handle = pool
                .submit(move || sync_impl(args))
                .map_err(DispatchError::from)?;
            match handle.await {
                Ok(result) => result,
                Err(bridge) => Err(bridge.into()),
            }
        })
    }
}

/// Outcome of a context-detected call: either a result produced on the
/// calling thread, or a future for the async path
///
/// Awaitable on every path; a ready value resolves immediately.
pub enum Dispatched<T> {
    Ready(Option<Result<T>>),
    Deferred(BoxFuture<'static, Result<T>>),
}

impl<T> Dispatched<T> {
    fn ready(result: Result<T>) -> Self {
        Dispatched::Ready(Some(result))
    }

    fn deferred(future: BoxFuture<'static, Result<T>>) -> Self {
        Dispatched::Deferred(future)
    }

    /// Unwrap the result of a synchronously dispatched call
    ///
    /// Fails with `CallerError::DeferredResult` if the call was routed to
    /// the async path; such a value must be awaited instead.
    pub fn into_sync(self) -> Result<T> {
        match self {
            Dispatched::Ready(slot) => {
                slot.expect("dispatched result already consumed by polling")
            }
            Dispatched::Deferred(_) => Err(CallerError::DeferredResult.into()),
        }
    }

    /// Whether the call was routed to the async path
    pub fn is_deferred(&self) -> bool {
        matches!(self, Dispatched::Deferred(_))
    }
}

// Polling never relies on address stability: the ready slot is moved out
// and the deferred future is heap-pinned behind its own box.
impl<T> Unpin for Dispatched<T> {}

impl<T> Future for Dispatched<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut *self {
            Dispatched::Ready(slot) => Poll::Ready(
                slot.take()
                    .expect("dispatched result polled after completion"),
            ),
            Dispatched::Deferred(future) => future.as_mut().poll(cx),
        }
    }
}
