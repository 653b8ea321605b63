//! Delay and backoff behavior under real time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use delayer::{delay_for, Error, TimerScheduler};
use rand::Rng;

mod common;
use common::{executor, init_tracing};

#[tokio::test]
async fn test_delay_completes_no_earlier_than_requested() {
    init_tracing();
    let scheduler = TimerScheduler::new();
    let start = Instant::now();

    scheduler.delay_for(50, executor()).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(scheduler.pending(), 0);
    scheduler.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_delays_resolve_independently() {
    init_tracing();
    let scheduler = Arc::new(TimerScheduler::new());
    let mut tasks = Vec::new();

    for _ in 0..100 {
        let scheduler = scheduler.clone();
        let exec = executor();
        tasks.push(tokio::spawn(async move {
            let requested = rand::thread_rng().gen_range(10..200u64);
            let start = Instant::now();
            scheduler.delay_for(requested, exec).await.unwrap();
            let elapsed = start.elapsed();

            assert!(
                elapsed >= Duration::from_millis(requested),
                "delay resolved early: requested {requested}ms, took {elapsed:?}"
            );
            assert!(
                elapsed < Duration::from_millis(requested) + Duration::from_secs(1),
                "delay overshot: requested {requested}ms, took {elapsed:?}"
            );
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
    scheduler.shutdown();
}

#[tokio::test]
async fn test_backoff_attempt_zero_waits_min_delay() {
    init_tracing();
    let scheduler = TimerScheduler::new();
    let start = Instant::now();

    scheduler.delay_backoff(0, executor()).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(500));
    scheduler.shutdown();
}

#[tokio::test]
async fn test_shutdown_fails_armed_delays() {
    init_tracing();
    let scheduler = TimerScheduler::new();
    let result = scheduler.delay_for(10_000, executor());

    scheduler.shutdown();

    assert!(matches!(result.await, Err(Error::SchedulerUnavailable)));
}

#[tokio::test]
async fn test_delay_after_shutdown_fails_immediately() {
    init_tracing();
    let scheduler = TimerScheduler::new();
    scheduler.shutdown();

    let result = scheduler.delay_for(5, executor());
    assert!(matches!(result.await, Err(Error::SchedulerUnavailable)));
}

#[tokio::test]
async fn test_global_delay_for() {
    init_tracing();
    let start = Instant::now();
    delay_for(20, executor()).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(20));
}
