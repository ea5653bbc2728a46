//! Identity context - the pass-through context.
//!
//! This module provides the `Identity` type, the simplest possible context.
//! It wraps a single value and `bind` simply hands that value to the step.
//! It serves as:
//!
//! - The baseline against which the other contexts are checked
//! - The result context of the aggregator
//! - A carrier for explicit failure through its error state

use super::error::ContextError;
use super::protocol::{Context, StepResult};

/// The identity context - wraps a value without adding any behavior.
///
/// Besides the value, an `Identity` may be in an error state. `bind` on an
/// error-state instance skips the step and keeps the error; `catch` can
/// recover from it.
///
/// # Examples
///
/// ```rust
/// use thenable::context::{Identity, StepResult};
///
/// let wrapped = Identity::new(20)
///     .bind(|value| StepResult::Value(value + 1))
///     .bind(|value| StepResult::Value(value * 2));
/// assert_eq!(wrapped.into_inner(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity<A>(Result<A, ContextError>);

impl<A> Identity<A> {
    /// Creates a new `Identity` wrapping the given value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use thenable::context::Identity;
    ///
    /// let x = Identity::new(42);
    /// assert_eq!(x.into_inner(), Some(42));
    /// ```
    #[inline]
    pub const fn new(value: A) -> Self {
        Self(Ok(value))
    }

    /// Creates an `Identity` in its error state.
    #[inline]
    pub const fn failed(error: ContextError) -> Self {
        Self(Err(error))
    }

    /// Consumes the `Identity` and returns the inner value, if any.
    #[inline]
    pub fn into_inner(self) -> Option<A> {
        self.0.ok()
    }

    /// Returns a reference to the inner value, if any.
    #[inline]
    pub fn as_inner(&self) -> Option<&A> {
        self.0.as_ref().ok()
    }

    /// Binds a step, possibly changing the value type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use thenable::context::{Identity, StepResult};
    ///
    /// let length = Identity::new("hello").bind(|text| StepResult::Value(text.len()));
    /// assert_eq!(length, Identity::new(5));
    /// ```
    #[inline]
    pub fn bind<B, F>(self, step: F) -> Identity<B>
    where
        F: FnOnce(A) -> StepResult<B, Identity<B>>,
    {
        match self.0 {
            Ok(value) => step(value).into_context(),
            Err(error) => Identity(Err(error)),
        }
    }

    /// Maps the value with a plain function.
    #[inline]
    pub fn map<B, F>(self, function: F) -> Identity<B>
    where
        F: FnOnce(A) -> B,
    {
        Identity(self.0.map(function))
    }

    /// Recovers from the error state; returns `self` unchanged otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use thenable::context::{ContextError, Identity, StepResult};
    ///
    /// let recovered = Identity::<i32>::failed(ContextError::step_failure("x"))
    ///     .catch(|_| StepResult::Value(0));
    /// assert_eq!(recovered, Identity::new(0));
    /// ```
    #[inline]
    pub fn catch<F>(self, handler: F) -> Self
    where
        F: FnOnce(ContextError) -> StepResult<A, Self>,
    {
        match self.0 {
            Ok(value) => Self(Ok(value)),
            Err(error) => handler(error).into_context(),
        }
    }

    /// Converts the final state into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the held error if the instance is in its error state.
    #[inline]
    pub fn raise_on_error(self) -> Result<A, ContextError> {
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

impl<A> Context for Identity<A> {
    type Value = A;

    const KIND: &'static str = "Identity";

    #[inline]
    fn from_value(value: A) -> Self {
        Self::new(value)
    }

    #[inline]
    fn from_error(error: ContextError) -> Self {
        Self::failed(error)
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
        Identity::bind(self, step)
    }

    #[inline]
    fn catch<F>(self, handler: F) -> Self
    where
        F: FnMut(ContextError) -> StepResult<A, Self> + Send + 'static,
    {
        Identity::catch(self, handler)
    }
}

impl<A> From<A> for Identity<A> {
    fn from(value: A) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // =========================================================================
    // Basic functionality tests
    // =========================================================================

    #[rstest]
    fn identity_new_creates_wrapper() {
        let wrapped = Identity::new(42);
        assert_eq!(wrapped.as_inner(), Some(&42));
    }

    #[rstest]
    fn identity_into_inner_unwraps() {
        let wrapped = Identity::new(String::from("hello"));
        assert_eq!(wrapped.into_inner().as_deref(), Some("hello"));
    }

    #[rstest]
    fn identity_failed_has_no_inner_value() {
        let wrapped = Identity::<i32>::failed(ContextError::step_failure("gone"));
        assert_eq!(wrapped.as_inner(), None);
        assert!(wrapped.is_error());
    }

    // =========================================================================
    // Bind and catch
    // =========================================================================

    #[rstest]
    fn identity_bind_changes_type() {
        let wrapped = Identity::new(21).bind(|value| StepResult::Value(format!("{}", value * 2)));
        assert_eq!(wrapped, Identity::new("42".to_string()));
    }

    #[rstest]
    fn identity_bind_adopts_wrapped_error() {
        let wrapped = Identity::new(1).bind(|_| {
            StepResult::<i32, _>::failed(ContextError::step_failure("rejected"))
        });
        assert_eq!(
            wrapped.raise_on_error(),
            Err(ContextError::step_failure("rejected"))
        );
    }

    #[rstest]
    fn identity_bind_skips_step_in_error_state() {
        let mut called = false;
        let wrapped = Identity::<i32>::failed(ContextError::step_failure("first")).bind(|value| {
            called = true;
            StepResult::Value(value + 1)
        });
        assert!(!called);
        assert_eq!(wrapped.error(), Some(ContextError::step_failure("first")));
    }

    #[rstest]
    fn identity_catch_ignores_normal_state() {
        let wrapped = Identity::new(7).catch(|_| StepResult::Value(0));
        assert_eq!(wrapped, Identity::new(7));
    }

    #[rstest]
    fn identity_on_error_observes_error() {
        let mut seen = None;
        Identity::<()>::failed(ContextError::step_failure("seen"))
            .on_error(|error| seen = Some(error.clone()));
        assert_eq!(seen, Some(ContextError::step_failure("seen")));
    }

    #[rstest]
    fn identity_map_applies_function() {
        assert_eq!(Identity::new(3).map(|value| value * 3), Identity::new(9));
    }

    #[rstest]
    fn identity_from_value() {
        let wrapped: Identity<i32> = 42.into();
        assert_eq!(wrapped.into_inner(), Some(42));
    }

    // =========================================================================
    // Parameterized tests
    // =========================================================================

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(-1)]
    #[case(i32::MIN)]
    #[case(i32::MAX)]
    fn identity_law_holds_for_integers(#[case] value: i32) {
        let bound = <Identity<i32> as Context>::bind(Identity::from_value(value), |x| {
            StepResult::Wrapped(Identity::from_value(x))
        });
        assert_eq!(bound, Identity::from_value(value));
    }
}
