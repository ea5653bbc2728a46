//! Awaiting promises from async code.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use futures::channel::oneshot;

use crate::context::ContextError;

use super::handle::Promise;
use super::state::Outcome;

/// The future returned by awaiting a [`Promise`].
///
/// It resolves to the promise's outcome once the promise settles. No
/// executor thread is blocked while waiting.
///
/// # Examples
///
/// ```rust
/// use thenable::promise::Promise;
///
/// # futures::executor::block_on(async {
/// let (promise, resolver) = Promise::pending();
/// resolver.fulfill(3);
/// assert_eq!(promise.await, Ok(3));
/// # });
/// ```
#[must_use = "futures do nothing unless polled"]
#[derive(Debug)]
pub struct Settled<T> {
    receiver: oneshot::Receiver<Outcome<T>>,
}

impl<T: Clone + Send + 'static> IntoFuture for Promise<T> {
    type Output = Result<T, ContextError>;
    type IntoFuture = Settled<T>;

    fn into_future(self) -> Self::IntoFuture {
        let (sender, receiver) = oneshot::channel();
        self.observe(move |outcome| {
            // The receiver may already be gone; nobody is listening then.
            let _ = sender.send(outcome);
        });
        Settled { receiver }
    }
}

impl<T> Future for Settled<T> {
    type Output = Result<T, ContextError>;

    fn poll(mut self: Pin<&mut Self>, context: &mut TaskContext<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(context).map(|received| {
            received.unwrap_or_else(|_| {
                Err(ContextError::step_failure(
                    "promise dropped before settling",
                ))
            })
        })
    }
}
