//! Worker threads that run promise producers.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::context::ContextError;

use super::handle::{Promise, run_producer};
use super::resolver::Resolver;

const DEFAULT_PREFIX: &str = "thenable-worker";

/// Runs promise producers on dedicated threads and joins them on request.
///
/// Cloning a `TaskGroup` yields another handle to the same group, so workers
/// may spawn further work into the group they belong to.
///
/// # Examples
///
/// ```rust
/// use thenable::promise::TaskGroup;
///
/// let group = TaskGroup::new();
/// let answer = group.spawn(|resolver| {
///     resolver.fulfill(6 * 7);
///     Ok(())
/// });
///
/// assert_eq!(answer.wait(), Ok(42));
/// group.join().unwrap();
/// ```
#[derive(Clone)]
pub struct TaskGroup {
    prefix: Arc<str>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl TaskGroup {
    /// Creates a group whose threads are named `thenable-worker-<n>`.
    #[must_use]
    pub fn new() -> Self {
        Self::named(DEFAULT_PREFIX)
    }

    /// Creates a group whose threads are named `<prefix>-<n>`.
    #[must_use]
    pub fn named(prefix: impl Into<Arc<str>>) -> Self {
        Self {
            prefix: prefix.into(),
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Runs `producer` on a new thread and returns the promise it settles.
    ///
    /// An error or panic from the producer rejects the promise. If the
    /// thread cannot be started the promise is rejected right away.
    pub fn spawn<T, P>(&self, producer: P) -> Promise<T>
    where
        T: Clone + Send + 'static,
        P: FnOnce(Resolver<T>) -> Result<(), ContextError> + Send + 'static,
    {
        let (promise, resolver) = Promise::pending();
        let fallback = resolver.clone();

        let mut handles = self.handles.lock();
        let name = format!("{}-{}", self.prefix, handles.len());
        tracing::debug!(thread = %name, "spawning promise producer");

        match thread::Builder::new()
            .name(name)
            .spawn(move || run_producer(producer, resolver))
        {
            Ok(handle) => handles.push(handle),
            Err(error) => {
                tracing::warn!(%error, "failed to spawn worker thread");
                fallback.reject(ContextError::step_failure(format!(
                    "failed to spawn worker thread: {error}"
                )));
            }
        }
        promise
    }

    /// Returns the number of threads not yet joined.
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Returns `true` if no thread is waiting to be joined.
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Joins every worker, including workers spawned while joining.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::WorkerPanicked`] if any worker thread
    /// panicked outside its producer.
    pub fn join(&self) -> Result<(), ContextError> {
        let mut panicked = 0;
        let mut joined = 0;
        loop {
            let batch = std::mem::take(&mut *self.handles.lock());
            if batch.is_empty() {
                break;
            }
            for handle in batch {
                joined += 1;
                if handle.join().is_err() {
                    panicked += 1;
                }
            }
        }

        tracing::debug!(joined, panicked, "task group joined");
        if panicked == 0 {
            Ok(())
        } else {
            Err(ContextError::WorkerPanicked { count: panicked })
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskGroup {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TaskGroup")
            .field("prefix", &self.prefix)
            .field("pending", &self.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(TaskGroup: Send, Sync, Clone);
