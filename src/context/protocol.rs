//! The context protocol - the contract every concrete context implements.
//!
//! A *context* wraps a representation (one value, maybe no value, many
//! values, or a value that arrives later) and knows how to continue a
//! computation with it. The protocol is deliberately small:
//!
//! - [`Context::from_value`] and [`Context::from_error`] construct instances
//! - [`Context::bind`] continues with the representation
//! - [`Context::catch`] continues with the error
//!
//! Combinators such as [`nested`](crate::compose::nested) and
//! [`all`](crate::compose::all) only ever talk to a context through this
//! trait.
//!
//! # Auto-wrapping
//!
//! A step bound to a context may either produce a bare value or a complete
//! context instance. [`StepResult`] makes the choice explicit: bare values
//! are wrapped with `from_value` of the same context, wrapped contexts are
//! used as they are.
//!
//! # Laws
//!
//! For every context `C` and value `v`:
//!
//! ```text
//! C::from_value(v).bind(|x| StepResult::Value(x)) == C::from_value(v)
//! C::from_error(e).bind(step)                      == C::from_error(e)
//! ```

use super::error::ContextError;

/// The outcome of a step bound to a context.
///
/// `Value` carries a bare value that the context wraps on the caller's
/// behalf; `Wrapped` carries a finished context instance that is adopted
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use thenable::context::{Context, Identity, StepResult};
///
/// let bare: StepResult<i32, Identity<i32>> = StepResult::Value(1);
/// let wrapped = StepResult::Wrapped(Identity::from_value(1));
///
/// assert!(!bare.is_context());
/// assert!(wrapped.is_context());
/// assert_eq!(bare.into_context(), wrapped.into_context());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult<V, C> {
    /// A bare value, wrapped into the surrounding context.
    Value(V),
    /// A context instance, used as is.
    Wrapped(C),
}

impl<V, C> StepResult<V, C> {
    /// Returns `true` if this result already is a context instance.
    #[inline]
    pub const fn is_context(&self) -> bool {
        matches!(self, Self::Wrapped(_))
    }
}

impl<V, C: Context<Value = V>> StepResult<V, C> {
    /// Resolves the result into a context, wrapping bare values.
    #[inline]
    pub fn into_context(self) -> C {
        match self {
            Self::Value(value) => C::from_value(value),
            Self::Wrapped(context) => context,
        }
    }

    /// Creates a result that puts the surrounding context into its error state.
    #[inline]
    pub fn failed(error: ContextError) -> Self {
        Self::Wrapped(C::from_error(error))
    }
}

impl<V, C: Context<Value = V>> From<Result<V, ContextError>> for StepResult<V, C> {
    fn from(result: Result<V, ContextError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(error) => Self::failed(error),
        }
    }
}

/// A computational context that supports wrapping, binding and catching.
///
/// Every implementation holds either a meaningful representation or an
/// error, never both. `bind` on an error-state instance returns it
/// unchanged without calling the step; `catch` is the mirror image.
///
/// The trait methods require `Send + 'static` steps so that the same
/// combinator can drive synchronous contexts and promises alike. Concrete
/// contexts additionally offer inherent, type-changing `bind` methods with
/// looser bounds.
///
/// # Examples
///
/// ```rust
/// use thenable::context::{Context, Optional, StepResult};
///
/// fn double<C: Context<Value = i32>>(context: C) -> C {
///     context.bind(|value| StepResult::Value(value * 2))
/// }
///
/// assert_eq!(double(Optional::from_value(21)), Optional::present(42));
/// assert_eq!(double(Optional::absent()), Optional::absent());
/// ```
pub trait Context: Sized {
    /// The type of a single value flowing through the context.
    type Value;

    /// A short name of the context, used in logs and error messages.
    const KIND: &'static str;

    /// Constructs a normal-state instance from a single value.
    fn from_value(value: Self::Value) -> Self;

    /// Constructs an error-state instance.
    fn from_error(error: ContextError) -> Self;

    /// Returns a copy of the error if this instance is in its error state.
    fn error(&self) -> Option<ContextError>;

    /// Continues the computation with the representation.
    ///
    /// The context decides how often `step` runs: never when absent or in
    /// error, once for single-valued contexts, once per element for
    /// collections, later for promises.
    fn bind<F>(self, step: F) -> Self
    where
        F: FnMut(Self::Value) -> StepResult<Self::Value, Self> + Send + 'static;

    /// Continues the computation with the error, if any.
    fn catch<F>(self, handler: F) -> Self
    where
        F: FnMut(ContextError) -> StepResult<Self::Value, Self> + Send + 'static;

    /// Returns `true` if this instance is in its error state.
    #[inline]
    fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Wraps a step result into this context.
    #[inline]
    fn wrap(result: StepResult<Self::Value, Self>) -> Self {
        result.into_context()
    }
}
