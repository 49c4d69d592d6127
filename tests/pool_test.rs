/*!
 * Worker Pool Tests
 * Boundedness, result correlation, panic delivery, and shutdown semantics
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use unibridge::{BridgeError, PoolConfig, WorkerPool};

fn pool_with(workers: usize, queue_capacity: Option<usize>) -> WorkerPool {
    WorkerPool::new(PoolConfig {
        workers,
        queue_capacity,
        name: "test".into(),
    })
}

#[tokio::test]
async fn test_concurrency_never_exceeds_worker_count() {
    let pool = pool_with(2, None);

    // 6 jobs on 2 workers: 4 must queue.
    let handles: Vec<_> = (0..6)
        .map(|n| {
            pool.submit(move || {
                std::thread::sleep(Duration::from_millis(50));
                n
            })
            .unwrap()
        })
        .collect();

    let results = futures::future::join_all(handles).await;
    for (n, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), n);
    }

    let stats = pool.stats();
    assert_eq!(stats.submitted, 6);
    assert_eq!(stats.completed, 6);
    assert!(
        stats.high_water <= 2,
        "high water {} exceeded pool size",
        stats.high_water
    );

    pool.shutdown(true);
}

#[tokio::test]
async fn test_queue_overflow_is_a_bridge_error() {
    let pool = pool_with(1, Some(1));
    let (gate_tx, gate_rx) = flume::unbounded::<()>();

    // First job occupies the single worker.
    let gate = gate_rx.clone();
    let first = pool.submit(move || gate.recv().unwrap()).unwrap();

    // Wait until the worker has actually picked it up.
    let deadline = Instant::now() + Duration::from_secs(2);
    while pool.stats().active < 1 {
        assert!(Instant::now() < deadline, "worker never started the job");
        std::thread::sleep(Duration::from_millis(5));
    }

    // Second job fills the queue; third overflows.
    let gate = gate_rx.clone();
    let second = pool.submit(move || gate.recv().unwrap()).unwrap();
    let overflow = pool.submit(|| ()).map(|_| ()).unwrap_err();
    assert_eq!(overflow, BridgeError::QueueFull { capacity: 1 });

    gate_tx.send(()).unwrap();
    gate_tx.send(()).unwrap();
    first.await.unwrap();
    second.await.unwrap();
    pool.shutdown(true);
}

#[tokio::test]
async fn test_panic_reaches_only_its_own_awaiter() {
    let pool = pool_with(2, None);

    let poisoned = pool.submit(|| panic!("worker job exploded")).unwrap();
    let healthy = pool.submit(|| "fine").unwrap();

    // The healthy submission is unaffected.
    assert_eq!(healthy.await.unwrap(), "fine");

    // The panic surfaces in the task awaiting the poisoned handle.
    let outcome = tokio::spawn(async move { poisoned.await }).await;
    let join_err = outcome.unwrap_err();
    assert!(join_err.is_panic());

    // The pool keeps working afterwards.
    let again = pool.submit(|| 7).unwrap();
    assert_eq!(again.await.unwrap(), 7);

    pool.shutdown(true);
}

#[test]
fn test_shutdown_twice_is_a_noop() {
    let pool = pool_with(2, None);
    pool.shutdown(true);
    pool.shutdown(true);
    assert!(pool.is_closed());
    assert_eq!(
        pool.submit(|| ()).map(|_| ()).unwrap_err(),
        BridgeError::PoolClosed
    );
}

#[test]
fn test_shutdown_waits_for_queued_work() {
    let pool = pool_with(1, None);
    let flag = Arc::new(AtomicBool::new(false));

    let flag_in_job = Arc::clone(&flag);
    let _handle = pool
        .submit(move || {
            std::thread::sleep(Duration::from_millis(50));
            flag_in_job.store(true, Ordering::SeqCst);
        })
        .unwrap();

    pool.shutdown(true);
    assert!(flag.load(Ordering::SeqCst), "shutdown returned before drain");
}

#[tokio::test]
async fn test_dropping_the_handle_discards_the_result() {
    let pool = pool_with(1, None);
    let flag = Arc::new(AtomicBool::new(false));

    let flag_in_job = Arc::clone(&flag);
    let handle = pool
        .submit(move || {
            std::thread::sleep(Duration::from_millis(50));
            flag_in_job.store(true, Ordering::SeqCst);
        })
        .unwrap();
    drop(handle);

    // The job is never preempted; it runs to completion.
    pool.shutdown(true);
    assert!(flag.load(Ordering::SeqCst));
}
