//! Concurrency tests for the one-shot completion token.

mod common;

use common::init_tracing;
use petrel_lifecycle::completion::AsyncCompletion;
use std::sync::{
    Arc, Barrier,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

#[test]
fn test_concurrent_complete_fires_callback_exactly_once() {
    init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let token = AsyncCompletion::new(
        Duration::from_secs(30),
        Some(Box::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })),
        None,
    );

    // Release all threads into complete() at the same instant
    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let token = token.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                token.complete();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(token.is_completed());
    assert!(token.completed_synchronously());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_all_waiters_wake_on_completion() {
    init_tracing();
    let token = AsyncCompletion::new(Duration::from_secs(30), None, None);

    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let token = token.clone();
            tokio::spawn(async move {
                token.wait().await;
                token.is_completed()
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(10)).await;
    token.complete();

    for waiter in waiters {
        assert!(waiter.await.unwrap());
    }
}

#[tokio::test]
async fn test_callback_sees_signaled_handle_before_running() {
    init_tracing();
    // A waiter blocked on the handle must be releasable from inside the
    // callback itself, proving the signal precedes the callback.
    let (probe_tx, probe_rx) = std::sync::mpsc::channel::<bool>();
    let token = AsyncCompletion::new(
        Duration::from_secs(30),
        Some(Box::new(move |completion| {
            let _ = probe_tx.send(completion.is_completed());
        })),
        None,
    );

    token.complete();
    assert_eq!(probe_rx.recv().unwrap(), true);
}
