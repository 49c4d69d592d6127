/*!
 * Cache Adapter Tests
 * TTL behavior and native dispatch on both paths
 */

use std::time::Duration;
use unibridge::{Cache, Dispatcher, PoolConfig};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(PoolConfig::with_workers(2))
}

#[test]
fn test_set_get_overwrite_sync() {
    let dispatcher = dispatcher();
    let cache: Cache<String> = Cache::new(&dispatcher);

    cache
        .set("customer:7", "Acme Corp".into(), None)
        .into_sync()
        .unwrap();
    cache
        .set("customer:7", "Acme Holdings".into(), None)
        .into_sync()
        .unwrap();

    let value = cache.get("customer:7").into_sync().unwrap();
    assert_eq!(value.as_deref(), Some("Acme Holdings"));
    assert_eq!(cache.get("customer:8").into_sync().unwrap(), None);
}

#[tokio::test]
async fn test_async_callers_never_touch_the_pool() {
    let dispatcher = dispatcher();
    let cache: Cache<u64> = Cache::new(&dispatcher);

    cache.set("quote:99", 1250, None).await.unwrap();
    assert_eq!(cache.get("quote:99").await.unwrap(), Some(1250));
    assert_eq!(dispatcher.pool_stats().submitted, 0);
}

#[tokio::test]
async fn test_value_visible_across_contexts() {
    let dispatcher = dispatcher();
    let cache: Cache<u64> = Cache::new(&dispatcher);

    // Written inline through the explicit sync accessor, read natively.
    cache
        .set_operation()
        .call_sync(("contract:3".into(), 40, None))
        .unwrap();
    assert_eq!(cache.get("contract:3").await.unwrap(), Some(40));
}

#[tokio::test]
async fn test_ttl_expiry_in_async_context() {
    let dispatcher = dispatcher();
    let cache: Cache<&'static str> = Cache::new(&dispatcher);

    cache
        .set("session", "open", Some(Duration::from_millis(20)))
        .await
        .unwrap();
    assert_eq!(cache.get("session").await.unwrap(), Some("open"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(cache.get("session").await.unwrap(), None);
}

#[test]
fn test_purge_reports_removed_count() {
    let dispatcher = dispatcher();
    let cache: Cache<u8> = Cache::new(&dispatcher);

    for key in ["a", "b", "c"] {
        cache
            .set(key, 1, Some(Duration::from_millis(10)))
            .into_sync()
            .unwrap();
    }
    cache.set("keep", 2, None).into_sync().unwrap();

    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(cache.purge_expired(), 3);
    assert_eq!(cache.len(), 1);
}
