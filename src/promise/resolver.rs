//! The write side of a promise.

use std::fmt;
use std::sync::Arc;

use crate::context::{ContextError, StepResult};

use super::handle::Promise;
use super::state::Shared;

/// Settles the promise it was created with.
///
/// A resolver is handed to the producer of a promise. It can be cloned and
/// sent to other threads; whichever clone settles first wins and every later
/// call is a no-op that returns `false`.
///
/// # Examples
///
/// ```rust
/// use thenable::promise::Promise;
///
/// let (promise, resolver) = Promise::pending();
/// assert!(resolver.fulfill(1));
/// assert!(!resolver.fulfill(2));
/// assert_eq!(promise.wait(), Ok(1));
/// ```
pub struct Resolver<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Resolver<T> {
    pub(crate) const fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Fulfills the promise with `value`.
    ///
    /// Returns `true` if this call settled the promise.
    pub fn fulfill(&self, value: T) -> bool {
        self.shared.settle(Ok(value))
    }

    /// Rejects the promise with `error`.
    ///
    /// Returns `true` if this call settled the promise.
    pub fn reject(&self, error: ContextError) -> bool {
        self.shared.settle(Err(error))
    }

    /// Settles the promise from a `Result`.
    pub fn settle(&self, outcome: Result<T, ContextError>) -> bool {
        self.shared.settle(outcome)
    }

    /// Returns `true` if the promise has left the pending state.
    pub fn is_settled(&self) -> bool {
        self.shared.state().is_settled()
    }

    /// Settles the promise from a step result.
    ///
    /// A bare value fulfills it; a wrapped promise is adopted, so this
    /// promise settles with whatever that promise eventually settles with.
    pub(crate) fn adopt(self, result: StepResult<T, Promise<T>>) {
        match result {
            StepResult::Value(value) => {
                self.fulfill(value);
            }
            StepResult::Wrapped(inner) => inner.observe(move |outcome| {
                self.settle(outcome);
            }),
        }
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("Resolver").finish_non_exhaustive()
    }
}
