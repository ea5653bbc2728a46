//! The aggregator: collects the results of several contexts into one.
//!
//! Inputs may be of different concrete kinds. Each input fires its `bind`
//! continuation zero times (an absent [`Optional`]), once ([`Identity`],
//! [`Promise`]) or many times ([`Collection`]), so the aggregator cannot
//! know in advance how many values to expect. Every slot therefore starts
//! [`Slot::Empty`], holds [`Slot::One`] value after the first firing and
//! turns into [`Slot::Many`] on the second.
//!
//! Counting firings cannot tell when an aggregate is complete. Instead each
//! input reports *settlement* on its own: a synchronous context settles as
//! soon as its `bind` returns, a promise settles when it is fulfilled or
//! rejected. The aggregate is complete once every input has settled.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::{Collection, Context, ContextError, Identity, Optional, StepResult};
use crate::promise::{Promise, Resolver};

/// The values an input produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<V> {
    /// The input never fired.
    Empty,
    /// The input fired exactly once.
    One(V),
    /// The input fired two or more times, in firing order.
    Many(Vec<V>),
}

impl<V> Slot<V> {
    /// Adds a value, growing `One` into `Many` on the second firing.
    pub fn push(&mut self, value: V) {
        *self = match std::mem::take(self) {
            Self::Empty => Self::One(value),
            Self::One(first) => Self::Many(vec![first, value]),
            Self::Many(mut values) => {
                values.push(value);
                Self::Many(values)
            }
        };
    }

    /// Returns the number of values in the slot.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    /// Returns `true` if the input never fired.
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the value if the input fired exactly once.
    pub const fn as_one(&self) -> Option<&V> {
        match self {
            Self::One(value) => Some(value),
            Self::Empty | Self::Many(_) => None,
        }
    }

    /// Flattens the slot into a vector.
    pub fn into_vec(self) -> Vec<V> {
        match self {
            Self::Empty => Vec::new(),
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self::Empty
    }
}

/// A context that can feed an aggregate.
///
/// Implemented for every context in this crate. Inputs are passed to
/// [`all`] as boxed trait objects so that different kinds can be mixed.
pub trait Aggregatable<V>: Send + 'static {
    /// Registers the continuations that report into `sink`.
    ///
    /// The implementation must call [`SlotSink::record`] for every value,
    /// [`SlotSink::fail`] if the input ends in its error state and
    /// [`SlotSink::settle`] exactly once when the input will not fire again.
    fn feed(self: Box<Self>, sink: SlotSink<V>);

    /// Boxes the input for [`all`].
    fn boxed(self) -> Box<dyn Aggregatable<V>>
    where
        Self: Sized,
    {
        Box::new(self)
    }
}

/// The reporting handle given to one input of an aggregate.
pub struct SlotSink<V> {
    index: usize,
    state: Arc<Mutex<AggregateState<V>>>,
    completion: Resolver<Vec<Slot<V>>>,
}

impl<V: Clone + Send + 'static> SlotSink<V> {
    /// Appends a value to this input's slot.
    pub fn record(&self, value: V) {
        let mut state = self.state.lock();
        state.slots[self.index].push(value);
        state.arities[self.index] += 1;
    }

    /// Records the input's error; only the first one is kept.
    pub fn fail(&self, error: ContextError) {
        let mut state = self.state.lock();
        state.errors[self.index].get_or_insert(error);
    }

    /// Marks the input as finished. Repeated calls are ignored.
    pub fn settle(&self) {
        let (inputs, outcome) = {
            let mut state = self.state.lock();
            if state.settled[self.index] {
                return;
            }
            state.settled[self.index] = true;
            state.remaining -= 1;
            if state.remaining > 0 {
                return;
            }
            (state.slots.len(), state.outcome())
        };

        tracing::debug!(inputs, failed = outcome.is_err(), "aggregate complete");
        self.completion.settle(outcome);
    }
}

impl<V> Clone for SlotSink<V> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            state: Arc::clone(&self.state),
            completion: self.completion.clone(),
        }
    }
}

struct AggregateState<V> {
    slots: Vec<Slot<V>>,
    arities: Vec<usize>,
    settled: Vec<bool>,
    errors: Vec<Option<ContextError>>,
    remaining: usize,
}

impl<V: Clone> AggregateState<V> {
    fn new(inputs: usize) -> Self {
        Self {
            slots: vec![Slot::Empty; inputs],
            arities: vec![0; inputs],
            settled: vec![false; inputs],
            errors: vec![None; inputs],
            remaining: inputs,
        }
    }

    fn first_error(&self) -> Option<ContextError> {
        self.errors.iter().flatten().next().cloned()
    }

    fn outcome(&self) -> Result<Vec<Slot<V>>, ContextError> {
        self.first_error()
            .map_or_else(|| Ok(self.slots.clone()), Err)
    }
}

/// The result of [`all`]: one slot per input, in input order.
///
/// The aggregate is returned before its inputs finish. Inspect it right away
/// when every input is synchronous, or wait for [`completion`](Self::completion)
/// when promises are involved.
pub struct Aggregate<V> {
    state: Arc<Mutex<AggregateState<V>>>,
    completion: Promise<Vec<Slot<V>>>,
}

impl<V: Clone + Send + 'static> Aggregate<V> {
    /// Returns a snapshot of the slots.
    pub fn slots(&self) -> Vec<Slot<V>> {
        self.state.lock().slots.clone()
    }

    /// Returns how many times each input has fired so far.
    pub fn arities(&self) -> Vec<usize> {
        self.state.lock().arities.clone()
    }

    /// Returns the error each input ended with, if any.
    pub fn errors(&self) -> Vec<Option<ContextError>> {
        self.state.lock().errors.clone()
    }

    /// Returns the number of inputs.
    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Returns `true` for an aggregate over no inputs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once every input has settled.
    pub fn is_complete(&self) -> bool {
        self.state.lock().remaining == 0
    }

    /// A promise of the final slots.
    ///
    /// It is fulfilled once every input has settled, or rejected with the
    /// error of the lowest-index input that failed.
    pub fn completion(&self) -> Promise<Vec<Slot<V>>> {
        self.completion.clone()
    }

    /// Wraps the current slots in an [`Identity`].
    ///
    /// The identity is in its error state if any input has failed.
    pub fn into_identity(self) -> Identity<Vec<Slot<V>>> {
        let state = self.state.lock();
        state
            .first_error()
            .map_or_else(|| Identity::new(state.slots.clone()), Identity::failed)
    }
}

impl<V: Clone + Send + 'static> std::fmt::Debug for Aggregate<V>
where
    V: std::fmt::Debug,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        formatter
            .debug_struct("Aggregate")
            .field("slots", &state.slots)
            .field("remaining", &state.remaining)
            .finish()
    }
}

/// Collects the results of several contexts, possibly of different kinds.
///
/// # Examples
///
/// ```rust
/// use thenable::compose::{Aggregatable, Slot, all};
/// use thenable::context::{Collection, Identity, Optional};
///
/// let aggregate = all(vec![
///     Identity::new(1).boxed(),
///     Optional::<i32>::absent().boxed(),
///     Collection::from_vec(vec![2, 3]).boxed(),
/// ]);
///
/// assert!(aggregate.is_complete());
/// assert_eq!(
///     aggregate.slots(),
///     vec![Slot::One(1), Slot::Empty, Slot::Many(vec![2, 3])]
/// );
/// ```
pub fn all<V, I>(inputs: I) -> Aggregate<V>
where
    V: Clone + Send + 'static,
    I: IntoIterator<Item = Box<dyn Aggregatable<V>>>,
{
    let inputs: Vec<_> = inputs.into_iter().collect();
    let state = Arc::new(Mutex::new(AggregateState::new(inputs.len())));
    let (completion, resolver) = Promise::pending();

    if inputs.is_empty() {
        resolver.fulfill(Vec::new());
    }

    for (index, input) in inputs.into_iter().enumerate() {
        input.feed(SlotSink {
            index,
            state: Arc::clone(&state),
            completion: resolver.clone(),
        });
    }

    Aggregate { state, completion }
}

fn feed_synchronous<C>(context: C, sink: SlotSink<C::Value>)
where
    C: Context,
    C::Value: Clone + Send + 'static,
{
    let recorder = sink.clone();
    let reporter = sink.clone();
    let finished = context
        .bind(move |value: C::Value| {
            recorder.record(value.clone());
            StepResult::Value(value)
        })
        .catch(move |error| {
            reporter.fail(error.clone());
            StepResult::failed(error)
        });
    drop(finished);
    sink.settle();
}

impl<V: Clone + Send + 'static> Aggregatable<V> for Identity<V> {
    fn feed(self: Box<Self>, sink: SlotSink<V>) {
        feed_synchronous(*self, sink);
    }
}

impl<V: Clone + Send + 'static> Aggregatable<V> for Optional<V> {
    fn feed(self: Box<Self>, sink: SlotSink<V>) {
        feed_synchronous(*self, sink);
    }
}

impl<V: Clone + Send + 'static> Aggregatable<V> for Collection<V> {
    fn feed(self: Box<Self>, sink: SlotSink<V>) {
        feed_synchronous(*self, sink);
    }
}

impl<V: Clone + Send + 'static> Aggregatable<V> for Promise<V> {
    fn feed(self: Box<Self>, sink: SlotSink<V>) {
        self.observe(move |outcome| {
            match outcome {
                Ok(value) => sink.record(value),
                Err(error) => sink.fail(error),
            }
            sink.settle();
        });
    }
}
