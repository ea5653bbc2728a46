//! Combinators over collections of promises.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::ContextError;

use super::handle::Promise;

struct Gather<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Waits for every promise and fulfills with their values in input order.
    ///
    /// The result is rejected as soon as any input is rejected; values that
    /// arrive afterwards are dropped. An empty input fulfills immediately
    /// with an empty vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use thenable::promise::Promise;
    ///
    /// let (first, first_resolver) = Promise::pending();
    /// let (second, second_resolver) = Promise::pending();
    /// let both = Promise::all(vec![first, second]);
    ///
    /// second_resolver.fulfill("b");
    /// first_resolver.fulfill("a");
    /// assert_eq!(both.wait(), Ok(vec!["a", "b"]));
    /// ```
    pub fn all<I>(promises: I) -> Promise<Vec<T>>
    where
        I: IntoIterator<Item = Self>,
    {
        let promises: Vec<Self> = promises.into_iter().collect();
        let (combined, resolver) = Promise::pending();
        if promises.is_empty() {
            resolver.fulfill(Vec::new());
            return combined;
        }

        tracing::trace!(inputs = promises.len(), "waiting for all promises");
        let gather = Arc::new(Mutex::new(Gather {
            slots: vec![None; promises.len()],
            remaining: promises.len(),
        }));

        for (index, promise) in promises.into_iter().enumerate() {
            let gather = Arc::clone(&gather);
            let resolver = resolver.clone();
            promise.observe(move |outcome| match outcome {
                Ok(value) => {
                    let complete = {
                        let mut gather = gather.lock();
                        gather.slots[index] = Some(value);
                        gather.remaining -= 1;
                        if gather.remaining == 0 {
                            Some(gather.slots.drain(..).flatten().collect())
                        } else {
                            None
                        }
                    };
                    if let Some(values) = complete {
                        resolver.fulfill(values);
                    }
                }
                Err(error) => {
                    if resolver.reject(error) {
                        tracing::debug!(index, "promise rejected, all() short-circuits");
                    }
                }
            });
        }
        combined
    }

    /// Fulfills with the first value to arrive.
    ///
    /// Rejections are ignored until every input has been rejected, in which
    /// case the result is rejected with [`ContextError::AllRejected`]. An
    /// empty input is rejected immediately.
    pub fn any<I>(promises: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let promises: Vec<Self> = promises.into_iter().collect();
        let count = promises.len();
        let (first, resolver) = Self::pending();
        if count == 0 {
            resolver.reject(ContextError::AllRejected { count });
            return first;
        }

        let rejected = Arc::new(Mutex::new(0_usize));
        for promise in promises {
            let rejected = Arc::clone(&rejected);
            let resolver = resolver.clone();
            promise.observe(move |outcome| match outcome {
                Ok(value) => {
                    resolver.fulfill(value);
                }
                Err(_) => {
                    let exhausted = {
                        let mut rejected = rejected.lock();
                        *rejected += 1;
                        *rejected == count
                    };
                    if exhausted {
                        tracing::debug!(count, "every promise passed to any() was rejected");
                        resolver.reject(ContextError::AllRejected { count });
                    }
                }
            });
        }
        first
    }

    /// Settles the same way as the first input to settle.
    ///
    /// An empty input never settles.
    pub fn race<I>(promises: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let (first, resolver) = Self::pending();
        for promise in promises {
            let resolver = resolver.clone();
            promise.observe(move |outcome| {
                resolver.settle(outcome);
            });
        }
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promise::PromiseState;
    use rstest::rstest;

    #[rstest]
    fn all_of_nothing_is_empty() {
        let combined = Promise::<i32>::all(Vec::new());
        assert_eq!(combined.peek(), Some(Ok(Vec::new())));
    }

    #[rstest]
    fn all_waits_for_the_last_input() {
        let (first, first_resolver) = Promise::pending();
        let second = Promise::fulfilled(2);
        let combined = Promise::all([first, second]);
        assert!(combined.is_pending());
        first_resolver.fulfill(1);
        assert_eq!(combined.wait(), Ok(vec![1, 2]));
    }

    #[rstest]
    fn all_rejects_on_first_rejection() {
        let (pending, _resolver) = Promise::<i32>::pending();
        let combined = Promise::all([
            pending,
            Promise::rejected(ContextError::step_failure("second")),
            Promise::rejected(ContextError::step_failure("third")),
        ]);
        assert_eq!(combined.wait(), Err(ContextError::step_failure("second")));
    }

    #[rstest]
    fn any_of_nothing_is_rejected() {
        let first = Promise::<i32>::any(Vec::new());
        assert_eq!(first.peek(), Some(Err(ContextError::AllRejected { count: 0 })));
    }

    #[rstest]
    fn any_skips_rejections() {
        let (late, late_resolver) = Promise::pending();
        let first = Promise::any([Promise::rejected(ContextError::step_failure("x")), late]);
        assert!(first.is_pending());
        late_resolver.fulfill(7);
        assert_eq!(first.wait(), Ok(7));
    }

    #[rstest]
    fn any_rejects_when_everything_fails() {
        let first = Promise::<i32>::any([
            Promise::rejected(ContextError::step_failure("a")),
            Promise::rejected(ContextError::step_failure("b")),
        ]);
        assert_eq!(first.wait(), Err(ContextError::AllRejected { count: 2 }));
    }

    #[rstest]
    fn race_takes_first_settlement() {
        let (slow, slow_resolver) = Promise::pending();
        let (fast, fast_resolver) = Promise::pending();
        let winner = Promise::race([slow, fast]);
        fast_resolver.reject(ContextError::step_failure("fast"));
        slow_resolver.fulfill(1);
        assert_eq!(winner.state(), PromiseState::Rejected);
    }

    #[rstest]
    fn race_of_nothing_stays_pending() {
        assert!(Promise::<i32>::race(Vec::new()).is_pending());
    }
}
