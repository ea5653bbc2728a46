//! The shared state machine behind a promise and its resolvers.
//!
//! # Invariants
//!
//! - The outcome is written at most once; the first resolver wins.
//! - While `draining` is set, new reactions are appended to the queue and
//!   run by the thread that performs the drain. Reactions queued before
//!   settlement run in registration order and the queue is drained exactly
//!   once.
//! - Reactions run with the lock released. A reaction may register further
//!   reactions on the same promise without deadlocking.
//! - A reaction registered during a drain, from any thread, runs on the
//!   draining thread after every reaction already queued. It does not run
//!   on the registering thread.
//! - A panicking reaction does not stop the drain. The remaining reactions
//!   still run, `draining` is cleared, and then the first panic resumes on
//!   the draining thread. Later registrations run immediately as usual.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::context::ContextError;

/// The externally observable lifecycle of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with an error.
    Rejected,
}

impl PromiseState {
    /// Returns `true` if the promise is no longer pending.
    #[inline]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PromiseState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => formatter.write_str("pending"),
            Self::Fulfilled => formatter.write_str("fulfilled"),
            Self::Rejected => formatter.write_str("rejected"),
        }
    }
}

pub(crate) type Outcome<T> = Result<T, ContextError>;

/// A continuation waiting for the outcome.
pub(crate) type Reaction<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

struct Inner<T> {
    outcome: Option<Outcome<T>>,
    queue: VecDeque<Reaction<T>>,
    draining: bool,
}

pub(crate) struct Shared<T> {
    inner: Mutex<Inner<T>>,
    settled: Condvar,
}

impl<T: Clone + Send + 'static> Shared<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                outcome: None,
                queue: VecDeque::new(),
                draining: false,
            }),
            settled: Condvar::new(),
        }
    }

    /// Moves the promise out of pending and runs every queued reaction.
    ///
    /// Returns `false` without touching anything if already settled.
    pub(crate) fn settle(&self, outcome: Outcome<T>) -> bool {
        let mut inner = self.inner.lock();
        if inner.outcome.is_some() {
            tracing::trace!("promise already settled, resolution ignored");
            return false;
        }

        tracing::trace!(
            state = %state_of(&outcome),
            queued = inner.queue.len(),
            "promise settled"
        );
        inner.outcome = Some(outcome.clone());
        inner.draining = true;
        self.settled.notify_all();
        Self::drain(inner, &outcome);
        true
    }

    fn drain(mut inner: MutexGuard<'_, Inner<T>>, outcome: &Outcome<T>) {
        let mut first_panic = None;
        while let Some(reaction) = inner.queue.pop_front() {
            let result = MutexGuard::unlocked(&mut inner, || {
                panic::catch_unwind(AssertUnwindSafe(|| reaction(outcome.clone())))
            });
            if let Err(payload) = result {
                tracing::warn!(remaining = inner.queue.len(), "promise reaction panicked");
                if first_panic.is_none() {
                    first_panic = Some(payload);
                }
            }
        }
        inner.draining = false;
        drop(inner);

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }

    /// Registers a reaction, or runs it right away if already settled.
    pub(crate) fn subscribe(&self, reaction: Reaction<T>) {
        let mut inner = self.inner.lock();
        let ready = if inner.draining {
            None
        } else {
            inner.outcome.clone()
        };

        match ready {
            Some(outcome) => {
                drop(inner);
                reaction(outcome);
            }
            None => inner.queue.push_back(reaction),
        }
    }

    pub(crate) fn state(&self) -> PromiseState {
        self.inner
            .lock()
            .outcome
            .as_ref()
            .map_or(PromiseState::Pending, state_of)
    }

    pub(crate) fn peek(&self) -> Option<Outcome<T>> {
        self.inner.lock().outcome.clone()
    }

    pub(crate) fn error(&self) -> Option<ContextError> {
        self.inner
            .lock()
            .outcome
            .as_ref()
            .and_then(|outcome| outcome.as_ref().err().cloned())
    }

    pub(crate) fn wait(&self) -> Outcome<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(outcome) = &inner.outcome {
                return outcome.clone();
            }
            self.settled.wait(&mut inner);
        }
    }

    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<Outcome<T>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        loop {
            if let Some(outcome) = &inner.outcome {
                return Some(outcome.clone());
            }
            if self.settled.wait_until(&mut inner, deadline).timed_out() {
                return inner.outcome.clone();
            }
        }
    }
}

const fn state_of<T>(outcome: &Outcome<T>) -> PromiseState {
    match outcome {
        Ok(_) => PromiseState::Fulfilled,
        Err(_) => PromiseState::Rejected,
    }
}
