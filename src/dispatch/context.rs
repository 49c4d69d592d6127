/*!
 * Execution Context Probe
 * Answers "is a cooperative runtime driving this thread?" at call time
 */

use crate::core::errors::ContextError;

/// Capability for detecting the caller's execution context
///
/// Injected rather than called inline so dispatch decisions are
/// deterministic under test. The probe runs fresh on every invocation;
/// its answer is never cached. A probe that cannot decide must return an
/// error, never guess a path.
pub trait ExecutionContext: Send + Sync {
    fn is_async(&self) -> Result<bool, ContextError>;
}

/// Probes the ambient tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeProbe;

impl ExecutionContext for RuntimeProbe {
    fn is_async(&self) -> Result<bool, ContextError> {
        Ok(tokio::runtime::Handle::try_current().is_ok())
    }
}

/// Fixed-answer probe for tests and context-aware callers
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe {
    async_mode: bool,
}

impl StaticProbe {
    /// Always report a synchronous calling context
    pub fn sync_context() -> Self {
        Self { async_mode: false }
    }

    /// Always report a running async runtime
    pub fn async_context() -> Self {
        Self { async_mode: true }
    }
}

impl ExecutionContext for StaticProbe {
    fn is_async(&self) -> Result<bool, ContextError> {
        Ok(self.async_mode)
    }
}
