use rstest::rstest;
use std::time::Duration;
use thenable::context::{ContextError, StepResult};
use thenable::promise::{Promise, TaskGroup};

#[rstest]
#[tokio::test]
async fn await_fulfilled_promise() {
    assert_eq!(Promise::fulfilled(7).await, Ok(7));
}

#[rstest]
#[tokio::test]
async fn await_rejected_promise() {
    let promise = Promise::<u8>::rejected(ContextError::step_failure("nope"));
    assert_eq!(promise.await, Err(ContextError::step_failure("nope")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn await_promise_settled_by_worker() {
    let group = TaskGroup::new();
    let promise = group.spawn(|resolver| {
        std::thread::sleep(Duration::from_millis(10));
        resolver.fulfill("from worker");
        Ok(())
    });

    let chained = promise.bind(|text| StepResult::Value(text.len()));
    assert_eq!(chained.await, Ok(11));
    group.join().unwrap();
}

#[rstest]
#[tokio::test]
async fn await_from_tokio_task() {
    let (promise, resolver) = Promise::pending();
    let waiter = tokio::spawn(async move { promise.await });
    tokio::time::sleep(Duration::from_millis(5)).await;
    resolver.fulfill(3_u64);
    assert_eq!(waiter.await.unwrap(), Ok(3));
}

#[rstest]
#[tokio::test]
async fn abandoned_promise_reports_failure() {
    let (promise, resolver) = Promise::<i32>::pending();
    let settled = promise.into_future();
    drop(resolver);
    assert_eq!(
        settled.await,
        Err(ContextError::step_failure("promise dropped before settling"))
    );
}
