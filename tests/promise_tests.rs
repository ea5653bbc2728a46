#![cfg(feature = "promise")]

use parking_lot::Mutex;
use rstest::rstest;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thenable::context::{Context, ContextError, StepResult};
use thenable::promise::{Promise, PromiseState};

// =============================================================================
// Single Resolution
// =============================================================================

#[rstest]
fn second_fulfill_is_a_no_op() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let (promise, resolver) = Promise::pending();
    let observed = promise.clone().bind(move |value: i32| {
        counter.fetch_add(1, Ordering::SeqCst);
        StepResult::Value(value)
    });

    assert!(resolver.fulfill(1));
    assert!(!resolver.fulfill(2));
    assert!(!resolver.reject(ContextError::step_failure("late")));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(promise.wait(), Ok(1));
    assert_eq!(observed.wait(), Ok(1));
}

#[rstest]
fn settled_state_is_terminal() {
    let (promise, resolver) = Promise::<&str>::pending();
    assert_eq!(promise.state(), PromiseState::Pending);
    resolver.reject(ContextError::step_failure("first"));
    resolver.fulfill("second");
    assert_eq!(promise.state(), PromiseState::Rejected);
    assert_eq!(promise.error(), Some(ContextError::step_failure("first")));
}

// =============================================================================
// Callback Ordering
// =============================================================================

#[rstest]
fn callbacks_fire_in_registration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let (promise, resolver) = Promise::pending();
    for label in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        drop(promise.clone().map(move |value: u8| order.lock().push((label, value))));
    }

    assert!(order.lock().is_empty());
    resolver.fulfill(5);
    assert_eq!(
        *order.lock(),
        vec![("first", 5), ("second", 5), ("third", 5)]
    );
}

#[rstest]
fn bind_on_settled_promise_runs_before_returning() {
    let ran = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&ran);
    let _next = Promise::fulfilled(()).map(move |()| flag.fetch_add(1, Ordering::SeqCst));
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Adoption
// =============================================================================

#[rstest]
fn returned_promise_is_adopted() {
    let (inner, inner_resolver) = Promise::<String>::pending();
    let outer = Promise::fulfilled(3).bind(move |_| StepResult::Wrapped(inner));

    assert!(outer.is_pending());
    inner_resolver.fulfill("done".to_owned());
    assert_eq!(outer.wait(), Ok("done".to_owned()));
}

#[rstest]
fn adoption_is_transitive() {
    let (deepest, resolver) = Promise::pending();
    let middle = Promise::fulfilled(0).bind(move |_| StepResult::Wrapped(deepest));
    let outer = Promise::fulfilled(0).bind(move |_| StepResult::Wrapped(middle));

    resolver.fulfill(99);
    assert_eq!(outer.wait(), Ok(99));
}

#[rstest]
fn adopted_rejection_propagates() {
    let outer = Promise::fulfilled(1).bind(|_| {
        StepResult::Wrapped(Promise::<i32>::rejected(ContextError::step_failure("inner")))
    });
    assert_eq!(outer.wait(), Err(ContextError::step_failure("inner")));
}

// =============================================================================
// Rejection Handling
// =============================================================================

#[rstest]
fn rejection_skips_bind_and_reaches_catch() {
    let skipped = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&skipped);
    let recovered = Promise::<i32>::rejected(ContextError::step_failure("offline"))
        .bind(move |value| {
            counter.fetch_add(1, Ordering::SeqCst);
            StepResult::Value(value)
        })
        .catch(|error| match error {
            ContextError::StepFailure { message } if message == "offline" => StepResult::Value(0),
            other => StepResult::failed(other),
        });

    assert_eq!(skipped.load(Ordering::SeqCst), 0);
    assert_eq!(recovered.wait(), Ok(0));
}

#[rstest]
fn then_runs_exactly_one_handler() {
    let fulfilled = Promise::fulfilled(2).then(
        |value| StepResult::Value(format!("ok {value}")),
        |error| StepResult::Value(format!("err {error}")),
    );
    let rejected = Promise::<i32>::rejected(ContextError::step_failure("x")).then(
        |value| StepResult::Value(format!("ok {value}")),
        |error| StepResult::Value(format!("err {error}")),
    );

    assert_eq!(fulfilled.wait(), Ok("ok 2".to_owned()));
    assert_eq!(rejected.wait(), Ok("err step failed: x".to_owned()));
}

#[rstest]
#[case::returned_error(Err(ContextError::step_failure("refused")))]
#[case::ok_without_settling(Ok(()))]
fn producer_outcomes(#[case] returned: Result<(), ContextError>) {
    let expect_pending = returned.is_ok();
    let promise: Promise<u32> = Promise::new(move |_| returned);
    assert_eq!(promise.is_pending(), expect_pending);
}

#[rstest]
fn producer_panic_is_rejection() {
    let promise: Promise<u32> = Promise::new(|_| panic!("producer blew up"));
    assert_eq!(
        promise.wait(),
        Err(ContextError::step_failure("producer blew up"))
    );
}

#[rstest]
fn wait_timeout_on_pending_promise() {
    let (promise, _resolver) = Promise::<u8>::pending();
    assert_eq!(promise.wait_timeout(Duration::from_millis(20)), None);
}

// =============================================================================
// Through the Context Protocol
// =============================================================================

fn increment<C: Context<Value = i32>>(context: C) -> C {
    context.bind(|value| StepResult::Value(value + 1))
}

#[rstest]
fn promise_is_a_context() {
    let (promise, resolver) = Promise::pending();
    let incremented = increment(increment(promise));
    resolver.fulfill(40);
    assert_eq!(incremented.wait(), Ok(42));
    assert!(!Promise::<i32>::from_value(1).is_error());
    assert!(Promise::<i32>::from_error(ContextError::step_failure("e")).is_error());
}

// =============================================================================
// Identity Laws
// =============================================================================

fn rewrap(value: i32) -> StepResult<i32, Promise<i32>> {
    StepResult::Wrapped(Promise::<i32>::from_value(value))
}

#[rstest]
fn right_identity_on_fulfilled_promise(#[values(-7, 0, 42)] value: i32) {
    let bound = Promise::<i32>::from_value(value).bind(rewrap);
    assert_eq!(bound.wait(), Promise::<i32>::from_value(value).wait());
}

#[rstest]
fn right_identity_on_pending_promise(#[values(-7, 0, 42)] value: i32) {
    let (promise, resolver) = Promise::<i32>::pending();
    let bound = promise.clone().bind(rewrap);
    assert!(bound.is_pending());

    resolver.fulfill(value);
    assert_eq!(bound.wait(), promise.wait());
    assert_eq!(bound.wait(), Ok(value));
}

#[rstest]
fn right_identity_keeps_rejection() {
    let error = ContextError::step_failure("offline");
    let bound = Promise::<i32>::from_error(error.clone()).bind(rewrap);
    assert_eq!(bound.wait(), Err(error));
}

#[rstest]
fn left_identity_on_promise() {
    let step = |value: i32| -> StepResult<i32, Promise<i32>> {
        StepResult::Wrapped(Promise::from_value(value * 3))
    };
    let bound = Promise::<i32>::from_value(5).bind(step);
    let direct = match step(5) {
        StepResult::Wrapped(promise) => promise,
        StepResult::Value(value) => Promise::from_value(value),
    };
    assert_eq!(bound.wait(), direct.wait());
}

// =============================================================================
// Panicking Continuations
// =============================================================================

#[rstest]
fn panicking_continuation_leaves_promise_usable() {
    let (promise, resolver) = Promise::<i32>::pending();
    let _broken = promise
        .clone()
        .map(|_: i32| -> i32 { panic!("continuation failed") });
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let queued = promise.clone().map(move |value| {
        counter.fetch_add(1, Ordering::SeqCst);
        value * 10
    });

    let settling = panic::catch_unwind(AssertUnwindSafe(|| resolver.fulfill(1)));

    assert!(settling.is_err());
    assert_eq!(promise.state(), PromiseState::Fulfilled);
    assert_eq!(queued.wait_timeout(Duration::from_secs(1)), Some(Ok(10)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        promise
            .clone()
            .map(|value| value + 1)
            .wait_timeout(Duration::from_millis(200)),
        Some(Ok(2))
    );
}

#[rstest]
fn panicking_catch_handler_leaves_rejection_observable() {
    let (promise, resolver) = Promise::<u8>::pending();
    let _broken = promise
        .clone()
        .catch(|_| -> StepResult<u8, Promise<u8>> { panic!("handler failed") });

    let settling =
        panic::catch_unwind(AssertUnwindSafe(|| resolver.reject(ContextError::step_failure("down"))));

    assert!(settling.is_err());
    let recovered = promise.catch(|_| StepResult::Value(0));
    assert_eq!(recovered.peek(), Some(Ok(0)));
}
