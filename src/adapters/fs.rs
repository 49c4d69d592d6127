/*!
 * File I/O Adapter
 * Dual-mode read/write over std::fs and tokio::fs
 */

use crate::core::errors::{ResourceError, Result};
use crate::dispatch::{unified_operation, Dispatched, Dispatcher, DualModeOperation};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};

/// Dual-mode filesystem facade
///
/// [`FileOps::new`] pairs the blocking implementations with tokio::fs
/// natives, so async callers never touch the worker pool.
/// [`FileOps::bridged`] drops the natives, which is the degraded shape a
/// sync-only backend produces; async callers then bridge.
#[derive(Clone)]
pub struct FileOps {
    read_op: DualModeOperation<PathBuf, String>,
    write_op: DualModeOperation<(PathBuf, String), ()>,
}

impl FileOps {
    pub fn new(dispatcher: &Dispatcher) -> Self {
        let read_op = unified_operation(read_sync)
            .named("fs.read")
            .with_async(|path: PathBuf| -> BoxFuture<'static, Result<String>> {
                Box::pin(async move {
                    tokio::fs::read_to_string(&path)
                        .await
                        .map_err(|err| io_error(&path, err).into())
                })
            })
            .bind(dispatcher);

        let write_op = unified_operation(write_sync)
            .named("fs.write")
            .with_async(
                |(path, content): (PathBuf, String)| -> BoxFuture<'static, Result<()>> {
                    Box::pin(async move {
                        tokio::fs::write(&path, content.as_bytes())
                            .await
                            .map_err(|err| io_error(&path, err).into())
                    })
                },
            )
            .bind(dispatcher);

        Self { read_op, write_op }
    }

    /// Blocking implementations only; async callers bridge through the
    /// worker pool
    pub fn bridged(dispatcher: &Dispatcher) -> Self {
        let read_op = unified_operation(read_sync)
            .named("fs.read")
            .bridge_notice("no native async file backend; bridging blocking i/o")
            .bind(dispatcher);

        let write_op = unified_operation(write_sync)
            .named("fs.write")
            .bridge_notice("no native async file backend; bridging blocking i/o")
            .bind(dispatcher);

        Self { read_op, write_op }
    }

    /// Read a file to a string; context-detected
    pub fn read_file(&self, path: impl Into<PathBuf>) -> Dispatched<String> {
        self.read_op.call(path.into())
    }

    /// Write a string to a file, replacing its contents; context-detected
    pub fn write_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) -> Dispatched<()> {
        self.write_op.call((path.into(), content.into()))
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn read_operation(&self) -> &DualModeOperation<PathBuf, String> {
        &self.read_op
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn write_operation(&self) -> &DualModeOperation<(PathBuf, String), ()> {
        &self.write_op
    }
}

fn read_sync(path: PathBuf) -> Result<String> {
    std::fs::read_to_string(&path).map_err(|err| io_error(&path, err).into())
}

fn write_sync((path, content): (PathBuf, String)) -> Result<()> {
    std::fs::write(&path, content.as_bytes()).map_err(|err| io_error(&path, err).into())
}

// Both paths format failures identically so the error message does not
// leak which path executed.
fn io_error(path: &Path, err: std::io::Error) -> ResourceError {
    ResourceError::Io(format!("{}: {}", path.display(), err))
}
