//! The nested-chain combinator.
//!
//! Dependent steps that each need earlier results usually end up as a
//! pyramid of nested `bind` calls:
//!
//! ```text
//! start.bind(|a| step1(a).bind(|b| step2(a, b).bind(|c| done(a, b, c))))
//! ```
//!
//! [`Nested`] flattens the pyramid into a list of steps. Every value a
//! context produces is appended to an accumulator, and each step receives
//! either the latest value ([`Step::unary`]) or the whole accumulator
//! ([`Step::n_ary`]). The recursion happens inside the `bind` continuation,
//! so contexts that fire zero or several times branch into independent
//! paths, one per firing.
//!
//! When a context along a path is in its error state, the remaining steps of
//! that path are skipped and the error is passed to the handler registered
//! with [`Nested::on_error`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::{Context, ContextError, StepResult};

type UnaryFn<C> = dyn Fn(<C as Context>::Value) -> StepResult<<C as Context>::Value, C> + Send + Sync;
type NAryFn<C> = dyn Fn(&[<C as Context>::Value]) -> StepResult<<C as Context>::Value, C> + Send + Sync;

/// Called with the accumulated values at the end of every path.
pub type FinalCallback<V> = Box<dyn Fn(&[V]) + Send + Sync>;

/// Called with the error that stopped a path.
pub type ErrorHandler = Box<dyn Fn(&ContextError) + Send + Sync>;

/// One step of a nested chain, declared with its calling convention.
pub struct Step<C: Context> {
    kind: StepKind<C>,
}

enum StepKind<C: Context> {
    Unary(Arc<UnaryFn<C>>),
    NAry(Arc<NAryFn<C>>),
}

impl<C: Context> Step<C> {
    /// A step that receives only the latest value.
    pub fn unary<F>(step: F) -> Self
    where
        F: Fn(C::Value) -> StepResult<C::Value, C> + Send + Sync + 'static,
    {
        Self {
            kind: StepKind::Unary(Arc::new(step)),
        }
    }

    /// A step that receives every value accumulated so far, oldest first.
    pub fn n_ary<F>(step: F) -> Self
    where
        F: Fn(&[C::Value]) -> StepResult<C::Value, C> + Send + Sync + 'static,
    {
        Self {
            kind: StepKind::NAry(Arc::new(step)),
        }
    }

    fn call(&self, latest: C::Value, accumulated: &[C::Value]) -> StepResult<C::Value, C> {
        match &self.kind {
            StepKind::Unary(step) => step(latest),
            StepKind::NAry(step) => step(accumulated),
        }
    }
}

impl<C: Context> Clone for Step<C> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            StepKind::Unary(step) => StepKind::Unary(Arc::clone(step)),
            StepKind::NAry(step) => StepKind::NAry(Arc::clone(step)),
        };
        Self { kind }
    }
}

impl<C: Context> fmt::Debug for Step<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            StepKind::Unary(_) => formatter.write_str("Step::Unary"),
            StepKind::NAry(_) => formatter.write_str("Step::NAry"),
        }
    }
}

struct Plan<C: Context> {
    steps: Vec<Step<C>>,
    final_callback: Option<FinalCallback<C::Value>>,
    on_error: Option<ErrorHandler>,
    completed: Mutex<Vec<Vec<C::Value>>>,
}

impl<C> Plan<C>
where
    C: Context + 'static,
    C::Value: Clone + Send + Sync + 'static,
{
    fn finish(&self, accumulated: &[C::Value]) {
        tracing::trace!(values = accumulated.len(), "nested path complete");
        if let Some(callback) = &self.final_callback {
            callback(accumulated);
        }
        self.completed.lock().push(accumulated.to_vec());
    }

    fn report(&self, error: &ContextError) {
        tracing::debug!(%error, context = C::KIND, "nested path stopped");
        if let Some(handler) = &self.on_error {
            handler(error);
        }
    }
}

fn descend<C>(current: C, accumulated: Vec<C::Value>, index: usize, plan: &Arc<Plan<C>>) -> C
where
    C: Context + 'static,
    C::Value: Clone + Send + Sync + 'static,
{
    let reporter = Arc::clone(plan);
    let current = current.catch(move |error| {
        reporter.report(&error);
        StepResult::failed(error)
    });

    let Some(step) = plan.steps.get(index).cloned() else {
        plan.finish(&accumulated);
        return current;
    };

    let plan = Arc::clone(plan);
    current.bind(move |value| {
        let mut accumulated = accumulated.clone();
        accumulated.push(value.clone());
        let next = C::wrap(step.call(value, &accumulated));
        StepResult::Wrapped(descend(next, accumulated, index + 1, &plan))
    })
}

/// Builder for a nested chain.
///
/// # Examples
///
/// ```rust
/// use thenable::compose::{Nested, Step};
/// use thenable::context::{Identity, StepResult};
///
/// let paths = Nested::new(Identity::new(100))
///     .step(Step::unary(|r1| StepResult::Value(r1 * 2)))
///     .step(Step::n_ary(|results: &[i32]| StepResult::Value(results[1] / results[0])))
///     .step(Step::unary(|r3| StepResult::Value(r3)))
///     .run();
///
/// assert_eq!(paths, vec![vec![100, 200, 2]]);
/// ```
pub struct Nested<C: Context> {
    initial: C,
    steps: Vec<Step<C>>,
    final_callback: Option<FinalCallback<C::Value>>,
    on_error: Option<ErrorHandler>,
}

impl<C> Nested<C>
where
    C: Context + 'static,
    C::Value: Clone + Send + Sync + 'static,
{
    /// Starts a chain at `initial`.
    pub fn new(initial: C) -> Self {
        Self {
            initial,
            steps: Vec::new(),
            final_callback: None,
            on_error: None,
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: Step<C>) -> Self {
        self.steps.push(step);
        self
    }

    /// Sets the callback that receives the accumulated values of every
    /// completed path.
    #[must_use]
    pub fn finally<F>(mut self, callback: F) -> Self
    where
        F: Fn(&[C::Value]) + Send + Sync + 'static,
    {
        self.final_callback = Some(Box::new(callback));
        self
    }

    /// Sets the handler for errors that stop a path.
    #[must_use]
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ContextError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(handler));
        self
    }

    /// Runs the chain and returns the accumulated values of every path that
    /// completed before this call returned.
    ///
    /// With promises the steps typically run later, so the returned list is
    /// incomplete; use [`finally`](Self::finally) to observe every path.
    pub fn run(self) -> Vec<Vec<C::Value>> {
        let plan = Arc::new(Plan {
            steps: self.steps,
            final_callback: self.final_callback,
            on_error: self.on_error,
            completed: Mutex::new(Vec::new()),
        });
        tracing::trace!(steps = plan.steps.len(), context = C::KIND, "running nested chain");
        drop(descend(self.initial, Vec::new(), 0, &plan));
        plan.completed.lock().clone()
    }
}

impl<C: Context> fmt::Debug for Nested<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Nested")
            .field("context", &C::KIND)
            .field("steps", &self.steps)
            .field("finally", &self.final_callback.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Runs `steps` against `initial`, calling `final_callback` at the end of
/// every path.
///
/// This is [`Nested`] in a single call.
pub fn nested<C, I>(
    initial: C,
    steps: I,
    final_callback: Option<FinalCallback<C::Value>>,
) -> Vec<Vec<C::Value>>
where
    C: Context + 'static,
    C::Value: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Step<C>>,
{
    let mut chain = steps.into_iter().fold(Nested::new(initial), Nested::step);
    chain.final_callback = final_callback;
    chain.run()
}
