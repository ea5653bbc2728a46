//! The read side of a promise and its composition methods.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use crate::context::{Context, ContextError, StepResult};

use super::resolver::Resolver;
use super::state::{Outcome, PromiseState, Shared};

/// A value that becomes available later.
///
/// A `Promise` is a cheap handle to shared state; cloning it yields another
/// handle to the same promise. It starts pending and settles exactly once,
/// either fulfilled with a value or rejected with a [`ContextError`].
///
/// Continuations registered with [`then`](Self::then), [`bind`](Self::bind)
/// or [`catch`](Self::catch) run in registration order on the thread that
/// settles the promise, or immediately on the registering thread if the
/// promise is already settled. These methods consume the handle, so clone it
/// to attach several continuations to the same promise.
///
/// # Examples
///
/// ```rust
/// use thenable::context::StepResult;
/// use thenable::promise::Promise;
///
/// let (source, resolver) = Promise::pending();
/// let doubled = source
///     .bind(|value: i32| StepResult::Value(value * 2))
///     .bind(|value| StepResult::Wrapped(Promise::fulfilled(value + 1)));
///
/// resolver.fulfill(20);
/// assert_eq!(doubled.wait(), Ok(41));
/// ```
pub struct Promise<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Creates a promise and runs `producer` with its resolver right away.
    ///
    /// If the producer returns an error or panics, the promise is rejected
    /// (unless the producer already settled it). To run the producer on a
    /// worker thread use [`TaskGroup::spawn`](super::TaskGroup::spawn).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use thenable::context::ContextError;
    /// use thenable::promise::Promise;
    ///
    /// let ok = Promise::new(|resolver| {
    ///     resolver.fulfill("ready");
    ///     Ok(())
    /// });
    /// assert_eq!(ok.wait(), Ok("ready"));
    ///
    /// let failed: Promise<()> = Promise::new(|_| Err(ContextError::step_failure("no data")));
    /// assert_eq!(failed.wait(), Err(ContextError::step_failure("no data")));
    /// ```
    pub fn new<P>(producer: P) -> Self
    where
        P: FnOnce(Resolver<T>) -> Result<(), ContextError>,
    {
        let (promise, resolver) = Self::pending();
        run_producer(producer, resolver);
        promise
    }

    /// Creates a pending promise together with its resolver.
    pub fn pending() -> (Self, Resolver<T>) {
        let shared = Arc::new(Shared::new());
        let resolver = Resolver::new(Arc::clone(&shared));
        (Self { shared }, resolver)
    }

    /// Creates a promise already fulfilled with `value`.
    pub fn fulfilled(value: T) -> Self {
        let (promise, resolver) = Self::pending();
        resolver.fulfill(value);
        promise
    }

    /// Creates a promise already rejected with `error`.
    pub fn rejected(error: ContextError) -> Self {
        let (promise, resolver) = Self::pending();
        resolver.reject(error);
        promise
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> PromiseState {
        self.shared.state()
    }

    /// Returns `true` while the promise is pending.
    pub fn is_pending(&self) -> bool {
        self.state() == PromiseState::Pending
    }

    /// Returns a copy of the outcome without blocking, if settled.
    pub fn peek(&self) -> Option<Result<T, ContextError>> {
        self.shared.peek()
    }

    /// Registers both continuations and returns the promise of their result.
    ///
    /// Exactly one of the handlers runs. A handler returning
    /// `StepResult::Wrapped(promise)` makes the returned promise adopt the
    /// outcome of `promise` instead of nesting it.
    pub fn then<B, F, G>(self, on_fulfilled: F, on_rejected: G) -> Promise<B>
    where
        B: Clone + Send + 'static,
        F: FnOnce(T) -> StepResult<B, Promise<B>> + Send + 'static,
        G: FnOnce(ContextError) -> StepResult<B, Promise<B>> + Send + 'static,
    {
        let (next, resolver) = Promise::pending();
        self.observe(move |outcome| {
            let result = match outcome {
                Ok(value) => on_fulfilled(value),
                Err(error) => on_rejected(error),
            };
            resolver.adopt(result);
        });
        next
    }

    /// Continues with the value; a rejection passes through untouched.
    pub fn bind<B, F>(self, step: F) -> Promise<B>
    where
        B: Clone + Send + 'static,
        F: FnOnce(T) -> StepResult<B, Promise<B>> + Send + 'static,
    {
        self.then(step, StepResult::failed)
    }

    /// Maps the value with a plain function.
    pub fn map<B, F>(self, function: F) -> Promise<B>
    where
        B: Clone + Send + 'static,
        F: FnOnce(T) -> B + Send + 'static,
    {
        self.bind(move |value| StepResult::Value(function(value)))
    }

    /// Continues with the error; a fulfillment passes through untouched.
    ///
    /// Returning a bare value from `handler` recovers the chain.
    pub fn catch<F>(self, handler: F) -> Self
    where
        F: FnOnce(ContextError) -> StepResult<T, Self> + Send + 'static,
    {
        self.then(StepResult::Value, handler)
    }

    /// Blocks the current thread until the promise settles.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason if the promise is rejected.
    pub fn wait(&self) -> Result<T, ContextError> {
        self.shared.wait()
    }

    /// Blocks for at most `timeout`; `None` if still pending afterwards.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, ContextError>> {
        self.shared.wait_timeout(timeout)
    }

    /// Calls `observer` with the outcome once settled, without creating a new promise.
    pub(crate) fn observe<F>(&self, observer: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        self.shared.subscribe(Box::new(observer));
    }
}

impl<T: Clone + Send + 'static> Context for Promise<T> {
    type Value = T;

    const KIND: &'static str = "Promise";

    fn from_value(value: T) -> Self {
        Self::fulfilled(value)
    }

    fn from_error(error: ContextError) -> Self {
        Self::rejected(error)
    }

    /// The rejection reason; `None` while pending or once fulfilled.
    fn error(&self) -> Option<ContextError> {
        self.shared.error()
    }

    fn bind<F>(self, step: F) -> Self
    where
        F: FnMut(T) -> StepResult<T, Self> + Send + 'static,
    {
        Promise::bind(self, step)
    }

    fn catch<F>(self, handler: F) -> Self
    where
        F: FnMut(ContextError) -> StepResult<T, Self> + Send + 'static,
    {
        Promise::catch(self, handler)
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> fmt::Debug for Promise<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Promise")
            .field("state", &self.state())
            .finish()
    }
}

/// Runs a producer, converting its error or panic into a rejection.
pub(crate) fn run_producer<T, P>(producer: P, resolver: Resolver<T>)
where
    T: Clone + Send + 'static,
    P: FnOnce(Resolver<T>) -> Result<(), ContextError>,
{
    let fallback = resolver.clone();
    match catch_unwind(AssertUnwindSafe(move || producer(resolver))) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            tracing::debug!(%error, "producer returned an error");
            fallback.reject(error);
        }
        Err(payload) => {
            let error = ContextError::from_panic(payload.as_ref());
            tracing::warn!(%error, "producer panicked");
            fallback.reject(error);
        }
    }
}

static_assertions::assert_impl_all!(Promise<i32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Resolver<String>: Send, Sync, Clone);
