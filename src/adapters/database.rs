/*!
 * Database Adapter
 * Dual-mode query/execute over injected driver handles
 *
 * The driver is a black box: a blocking handle that returns rows or an
 * affected count, and optionally a genuinely non-blocking counterpart.
 * Most single-connection blocking drivers are not thread-safe, so the
 * adapter takes an explicit [`ConnectionGuard`] choice instead of assuming
 * one: `Serialized` puts a mutex in front of the shared handle,
 * `Concurrent` passes calls through for drivers that pool internally.
 */

use crate::core::errors::{CallerError, ResourceError, Result};
use crate::core::types::ConnectionGuard;
use crate::dispatch::{unified_operation, Dispatched, Dispatcher, DualModeOperation};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// A single column value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// One result row
pub type Row = Vec<SqlValue>;

/// Blocking driver contract: a call returns a value or fails
pub trait SqlDriver: Send + Sync + 'static {
    fn query(&self, sql: &str, params: &[SqlValue]) -> std::result::Result<Vec<Row>, ResourceError>;

    fn execute(&self, sql: &str, params: &[SqlValue]) -> std::result::Result<u64, ResourceError>;
}

/// Non-blocking driver contract, same shape awaited
pub trait AsyncSqlDriver: Send + Sync + 'static {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [SqlValue],
    ) -> BoxFuture<'a, std::result::Result<Vec<Row>, ResourceError>>;

    fn execute<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [SqlValue],
    ) -> BoxFuture<'a, std::result::Result<u64, ResourceError>>;
}

/// Dual-mode database facade
#[derive(Clone)]
pub struct Database {
    query_op: DualModeOperation<(String, Vec<SqlValue>), Vec<Row>>,
    execute_op: DualModeOperation<(String, Vec<SqlValue>), u64>,
}

impl Database {
    /// Blocking driver only; calls from async context bridge through the
    /// worker pool. Defaults to `ConnectionGuard::Serialized`.
    pub fn new(driver: Arc<dyn SqlDriver>, dispatcher: &Dispatcher) -> Self {
        Self::with_options(driver, None, ConnectionGuard::default(), dispatcher)
    }

    pub fn with_options(
        driver: Arc<dyn SqlDriver>,
        async_driver: Option<Arc<dyn AsyncSqlDriver>>,
        guard: ConnectionGuard,
        dispatcher: &Dispatcher,
    ) -> Self {
        let call_guard = match guard {
            ConnectionGuard::Serialized => Some(Arc::new(Mutex::new(()))),
            ConnectionGuard::Concurrent => None,
        };

        let query_op = {
            let driver = Arc::clone(&driver);
            let call_guard = call_guard.clone();
            let mut builder =
                unified_operation(move |(sql, params): (String, Vec<SqlValue>)| {
                    validate_sql(&sql)?;
                    let _held = call_guard.as_ref().map(|guard| guard.lock());
                    Ok(driver.query(&sql, &params)?)
                })
                .named("db.query");
            match &async_driver {
                Some(native) => {
                    let native = Arc::clone(native);
                    builder = builder.with_async(
                        move |(sql, params): (String, Vec<SqlValue>)| -> BoxFuture<'static, Result<Vec<Row>>> {
                            let native = Arc::clone(&native);
                            Box::pin(async move {
                                validate_sql(&sql)?;
                                Ok(native.query(&sql, &params).await?)
                            })
                        },
                    );
                }
                None => {
                    builder = builder.bridge_notice(
                        "no async database driver configured; bridging the blocking driver",
                    );
                }
            }
            builder.bind(dispatcher)
        };

        let execute_op = {
            let driver = Arc::clone(&driver);
            let call_guard = call_guard.clone();
            let mut builder =
                unified_operation(move |(sql, params): (String, Vec<SqlValue>)| {
                    validate_sql(&sql)?;
                    let _held = call_guard.as_ref().map(|guard| guard.lock());
                    Ok(driver.execute(&sql, &params)?)
                })
                .named("db.execute");
            match &async_driver {
                Some(native) => {
                    let native = Arc::clone(native);
                    builder = builder.with_async(
                        move |(sql, params): (String, Vec<SqlValue>)| -> BoxFuture<'static, Result<u64>> {
                            let native = Arc::clone(&native);
                            Box::pin(async move {
                                validate_sql(&sql)?;
                                Ok(native.execute(&sql, &params).await?)
                            })
                        },
                    );
                }
                None => {
                    builder = builder.bridge_notice(
                        "no async database driver configured; bridging the blocking driver",
                    );
                }
            }
            builder.bind(dispatcher)
        };

        info!(
            guard = ?guard,
            native_async = async_driver.is_some(),
            "database adapter ready"
        );

        Self {
            query_op,
            execute_op,
        }
    }

    /// Fetch rows; context-detected
    pub fn query(&self, sql: impl Into<String>, params: &[SqlValue]) -> Dispatched<Vec<Row>> {
        self.query_op.call((sql.into(), params.to_vec()))
    }

    /// Run a statement, returning the affected-row count; context-detected
    pub fn execute(&self, sql: impl Into<String>, params: &[SqlValue]) -> Dispatched<u64> {
        self.execute_op.call((sql.into(), params.to_vec()))
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn query_operation(&self) -> &DualModeOperation<(String, Vec<SqlValue>), Vec<Row>> {
        &self.query_op
    }

    /// Underlying operation, for explicit sync/async invocation
    pub fn execute_operation(&self) -> &DualModeOperation<(String, Vec<SqlValue>), u64> {
        &self.execute_op
    }
}

fn validate_sql(sql: &str) -> Result<()> {
    if sql.trim().is_empty() {
        return Err(CallerError::InvalidArgument("sql must not be empty".into()).into());
    }
    Ok(())
}
