/*!
 * Database Adapter Tests
 * Result parity across contexts, connection guarding, native driver use
 */

use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use unibridge::{
    AsyncSqlDriver, ConnectionGuard, Database, DispatchError, Dispatcher, PoolConfig,
    ResourceError, Row, SqlDriver, SqlValue,
};

/// Driver that records calls and returns canned data
#[derive(Default)]
struct RecordingDriver {
    executes: AtomicU64,
    queries: AtomicU64,
    fail_next: AtomicBool,
}

impl SqlDriver for RecordingDriver {
    fn query(&self, sql: &str, _params: &[SqlValue]) -> Result<Vec<Row>, ResourceError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ResourceError::Database("table is locked".into()));
        }
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(vec![vec![SqlValue::Text(sql.to_string())]])
    }

    fn execute(&self, _sql: &str, params: &[SqlValue]) -> Result<u64, ResourceError> {
        self.executes.fetch_add(1, Ordering::SeqCst);
        Ok(params.len() as u64)
    }
}

/// Driver that flags overlapping entry from concurrent callers
struct OverlapDetector {
    in_call: AtomicBool,
    overlapped: Arc<AtomicBool>,
}

impl SqlDriver for OverlapDetector {
    fn query(&self, _sql: &str, _params: &[SqlValue]) -> Result<Vec<Row>, ResourceError> {
        if self.in_call.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        std::thread::sleep(Duration::from_millis(60));
        self.in_call.store(false, Ordering::SeqCst);
        Ok(vec![])
    }

    fn execute(&self, _sql: &str, _params: &[SqlValue]) -> Result<u64, ResourceError> {
        Ok(0)
    }
}

struct NativeDriver {
    calls: Arc<AtomicUsize>,
}

impl AsyncSqlDriver for NativeDriver {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        _params: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<Vec<Row>, ResourceError>> {
        let calls = Arc::clone(&self.calls);
        let sql = sql.to_string();
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![vec![SqlValue::Text(sql)]])
        })
    }

    fn execute<'a>(
        &'a self,
        _sql: &'a str,
        params: &'a [SqlValue],
    ) -> BoxFuture<'a, Result<u64, ResourceError>> {
        let calls = Arc::clone(&self.calls);
        let affected = params.len() as u64;
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(affected)
        })
    }
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(PoolConfig::with_workers(2))
}

#[test]
fn test_execute_count_from_sync_context() {
    let dispatcher = dispatcher();
    let db = Database::new(Arc::new(RecordingDriver::default()), &dispatcher);

    let params = vec![SqlValue::Integer(1), SqlValue::Text("Acme".into())];
    let affected = db
        .execute("INSERT INTO customers (id, name) VALUES (?, ?)", &params)
        .into_sync()
        .unwrap();
    assert_eq!(affected, 2);
}

#[tokio::test]
async fn test_execute_count_matches_across_contexts() {
    let dispatcher = dispatcher();
    let db = Database::new(Arc::new(RecordingDriver::default()), &dispatcher);

    let params = vec![SqlValue::Integer(1), SqlValue::Text("Acme".into())];
    let sql = "INSERT INTO customers (id, name) VALUES (?, ?)";

    let bridged = db.execute(sql, &params).await.unwrap();
    let direct = db.execute_operation().call_sync((sql.into(), params)).unwrap();
    assert_eq!(bridged, direct);
}

#[tokio::test]
async fn test_driver_error_parity_across_contexts() {
    let dispatcher = dispatcher();
    let driver = Arc::new(RecordingDriver::default());
    let db = Database::new(Arc::clone(&driver) as Arc<dyn SqlDriver>, &dispatcher);

    driver.fail_next.store(true, Ordering::SeqCst);
    let bridged = db.query("SELECT 1", &[]).await.unwrap_err();

    driver.fail_next.store(true, Ordering::SeqCst);
    let direct = db
        .query_operation()
        .call_sync(("SELECT 1".into(), vec![]))
        .unwrap_err();

    assert_eq!(bridged, direct);
    assert_eq!(
        bridged,
        DispatchError::from(ResourceError::Database("table is locked".into()))
    );
}

#[tokio::test]
async fn test_serialized_guard_prevents_overlap() {
    let dispatcher = dispatcher();
    let overlapped = Arc::new(AtomicBool::new(false));
    let driver = Arc::new(OverlapDetector {
        in_call: AtomicBool::new(false),
        overlapped: Arc::clone(&overlapped),
    });
    let db = Database::with_options(
        driver,
        None,
        ConnectionGuard::Serialized,
        &dispatcher,
    );

    let a = db.query("SELECT * FROM quotes", &[]);
    let b = db.query("SELECT * FROM contracts", &[]);
    let (a, b) = tokio::join!(a, b);
    a.unwrap();
    b.unwrap();

    assert!(
        !overlapped.load(Ordering::SeqCst),
        "serialized guard let two calls into the driver at once"
    );
}

#[tokio::test]
async fn test_native_driver_skips_the_pool() {
    let dispatcher = dispatcher();
    let native_calls = Arc::new(AtomicUsize::new(0));
    let db = Database::with_options(
        Arc::new(RecordingDriver::default()),
        Some(Arc::new(NativeDriver {
            calls: Arc::clone(&native_calls),
        })),
        ConnectionGuard::Serialized,
        &dispatcher,
    );

    let rows = db.query("SELECT name FROM customers", &[]).await.unwrap();
    assert_eq!(
        rows,
        vec![vec![SqlValue::Text("SELECT name FROM customers".into())]]
    );
    assert_eq!(native_calls.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.pool_stats().submitted, 0);
}

#[tokio::test]
async fn test_sync_only_driver_still_serves_async_callers() {
    let dispatcher = dispatcher();
    let driver = Arc::new(RecordingDriver::default());
    let db = Database::new(Arc::clone(&driver) as Arc<dyn SqlDriver>, &dispatcher);

    let rows = db.query("SELECT 1", &[]).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(driver.queries.load(Ordering::SeqCst), 1);
    // Served by bridging, not natively.
    assert_eq!(dispatcher.pool_stats().submitted, 1);
}
