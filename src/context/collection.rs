//! Collection context - zero or more values.
//!
//! `bind` applies the step to every element and flattens exactly one level:
//! wrapped collections returned by the step are spliced in place, bare values
//! are kept as single elements. An empty collection never calls the step.
//!
//! # Examples
//!
//! ```rust
//! use thenable::context::{Collection, StepResult};
//!
//! let pairs = Collection::from_vec(vec![1, 2, 3])
//!     .bind(|x| StepResult::Wrapped(Collection::from_vec(vec![x, x * 10])));
//! assert_eq!(pairs.into_vec(), vec![1, 10, 2, 20, 3, 30]);
//! ```

use super::error::ContextError;
use super::protocol::{Context, StepResult};

/// A context holding an ordered sequence of values, or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<A>(Result<Vec<A>, ContextError>);

impl<A> Collection<A> {
    /// Creates a collection from a sequence.
    #[inline]
    pub const fn from_vec(values: Vec<A>) -> Self {
        Self(Ok(values))
    }

    /// Creates a collection from a possibly missing sequence.
    ///
    /// A missing sequence is coerced to the empty collection.
    #[inline]
    pub fn from_option(values: Option<Vec<A>>) -> Self {
        Self(Ok(values.unwrap_or_default()))
    }

    /// Creates the empty collection.
    #[inline]
    pub const fn empty() -> Self {
        Self(Ok(Vec::new()))
    }

    /// Returns the elements as a slice; empty in the error state.
    #[inline]
    pub fn as_slice(&self) -> &[A] {
        self.0.as_deref().unwrap_or(&[])
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Consumes the collection and returns its elements; empty in the error state.
    #[inline]
    pub fn into_vec(self) -> Vec<A> {
        self.0.unwrap_or_default()
    }

    /// Binds a step to every element, flattening one level.
    ///
    /// If a step returns a collection in its error state, the remaining
    /// elements are not visited and the whole result takes that error.
    pub fn bind<B, F>(self, mut step: F) -> Collection<B>
    where
        F: FnMut(A) -> StepResult<B, Collection<B>>,
    {
        let values = match self.0 {
            Ok(values) => values,
            Err(error) => return Collection(Err(error)),
        };

        let mut flattened = Vec::with_capacity(values.len());
        for value in values {
            match step(value) {
                StepResult::Value(result) => flattened.push(result),
                StepResult::Wrapped(Collection(Ok(inner))) => flattened.extend(inner),
                StepResult::Wrapped(Collection(Err(error))) => return Collection(Err(error)),
            }
        }
        Collection(Ok(flattened))
    }

    /// Maps every element with a plain function.
    #[inline]
    pub fn map<B, F>(self, function: F) -> Collection<B>
    where
        F: FnMut(A) -> B,
    {
        Collection(self.0.map(|values| values.into_iter().map(function).collect()))
    }

    /// Recovers from the error state; returns `self` unchanged otherwise.
    #[inline]
    pub fn catch<F>(self, handler: F) -> Self
    where
        F: FnOnce(ContextError) -> StepResult<A, Self>,
    {
        match self.0 {
            Ok(values) => Self(Ok(values)),
            Err(error) => handler(error).into_context(),
        }
    }

    /// Converts the final state into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the held error if the instance is in its error state.
    #[inline]
    pub fn raise_on_error(self) -> Result<Vec<A>, ContextError> {
        self.0
    }

    /// Calls `observer` with the error, if any.
    #[inline]
    pub fn on_error<F>(&self, observer: F)
    where
        F: FnOnce(&ContextError),
    {
        if let Err(error) = &self.0 {
            observer(error);
        }
    }
}

impl<A> Context for Collection<A> {
    type Value = A;

    const KIND: &'static str = "Collection";

    /// Wraps a single value as a one-element collection.
    #[inline]
    fn from_value(value: A) -> Self {
        Self(Ok(vec![value]))
    }

    #[inline]
    fn from_error(error: ContextError) -> Self {
        Self(Err(error))
    }

    #[inline]
    fn error(&self) -> Option<ContextError> {
        self.0.as_ref().err().cloned()
    }

    #[inline]
    fn bind<F>(self, step: F) -> Self
    where
        F: FnMut(A) -> StepResult<A, Self> + Send + 'static,
    {
        Collection::bind(self, step)
    }

    #[inline]
    fn catch<F>(self, handler: F) -> Self
    where
        F: FnMut(ContextError) -> StepResult<A, Self> + Send + 'static,
    {
        Collection::catch(self, handler)
    }
}

impl<A> Default for Collection<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> From<Vec<A>> for Collection<A> {
    fn from(values: Vec<A>) -> Self {
        Self::from_vec(values)
    }
}

impl<A> FromIterator<A> for Collection<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<A> IntoIterator for Collection<A> {
    type Item = A;
    type IntoIter = std::vec::IntoIter<A>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

#[cfg(feature = "json")]
impl TryFrom<serde_json::Value> for Collection<serde_json::Value> {
    type Error = ContextError;

    /// Accepts JSON arrays and `null` (the empty collection).
    ///
    /// Only arrays are accepted so that an array element can itself be an
    /// array without ambiguity.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Self::empty()),
            serde_json::Value::Array(values) => Ok(Self::from_vec(values)),
            other => Err(ContextError::invalid_representation(
                Self::KIND,
                format!("expected an array or null, got {other}"),
            )),
        }
    }
}
