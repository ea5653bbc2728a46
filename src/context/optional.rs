//! Optional context - a value that may be absent.
//!
//! Absence is terminal for a chain: once a step observes `Absent`, every
//! later `bind` is skipped and the absence propagates unchanged, without any
//! side effect of the skipped steps.

use super::error::ContextError;
use super::protocol::{Context, StepResult};

/// A context holding zero or one value, or an error.
///
/// # Examples
///
/// ```rust
/// use thenable::context::{Optional, StepResult};
///
/// let found = Optional::present(4).bind(|x| StepResult::Value(x * 2));
/// assert_eq!(found, Optional::present(8));
///
/// let missing = Optional::<i32>::absent().bind(|x| StepResult::Value(x * 2));
/// assert!(missing.is_absent());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Optional<A> {
    /// A value is present.
    Present(A),
    /// No value; later steps are skipped.
    Absent,
    /// The error state of the protocol.
    Failed(ContextError),
}

impl<A> Optional<A> {
    /// Creates a present value.
    #[inline]
    pub const fn present(value: A) -> Self {
        Self::Present(value)
    }

    /// Creates the absent marker.
    #[inline]
    pub const fn absent() -> Self {
        Self::Absent
    }

    /// Returns `true` for the absent marker.
    #[inline]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` if a value is present.
    #[inline]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns a reference to the value, if present.
    #[inline]
    pub const fn as_inner(&self) -> Option<&A> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Failed(_) => None,
        }
    }

    /// Consumes the context and returns the value, if present.
    #[inline]
    pub fn into_option(self) -> Option<A> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Failed(_) => None,
        }
    }

    /// Binds a step, possibly changing the value type.
    ///
    /// The step runs only when a value is present.
    #[inline]
    pub fn bind<B, F>(self, step: F) -> Optional<B>
    where
        F: FnOnce(A) -> StepResult<B, Optional<B>>,
    {
        match self {
            Self::Present(value) => step(value).into_context(),
            Self::Absent => Optional::Absent,
            Self::Failed(error) => Optional::Failed(error),
        }
    }

    /// Maps a present value with a plain function.
    #[inline]
    pub fn map<B, F>(self, function: F) -> Optional<B>
    where
        F: FnOnce(A) -> B,
    {
        self.bind(|value| StepResult::Value(function(value)))
    }

    /// Recovers from the error state. Absence is not an error and is kept.
    #[inline]
    pub fn catch<F>(self, handler: F) -> Self
    where
        F: FnOnce(ContextError) -> StepResult<A, Self>,
    {
        match self {
            Self::Failed(error) => handler(error).into_context(),
            other => other,
        }
    }

    /// Converts the final state into a `Result` of an `Option`.
    ///
    /// # Errors
    ///
    /// Returns the held error if the instance is in its error state.
    #[inline]
    pub fn raise_on_error(self) -> Result<Option<A>, ContextError> {
        match self {
            Self::Present(value) => Ok(Some(value)),
            Self::Absent => Ok(None),
            Self::Failed(error) => Err(error),
        }
    }

    /// Calls `observer` with the error, if any.
    #[inline]
    pub fn on_error<F>(&self, observer: F)
    where
        F: FnOnce(&ContextError),
    {
        if let Self::Failed(error) = self {
            observer(error);
        }
    }
}

impl<A> Context for Optional<A> {
    type Value = A;

    const KIND: &'static str = "Optional";

    #[inline]
    fn from_value(value: A) -> Self {
        Self::Present(value)
    }

    #[inline]
    fn from_error(error: ContextError) -> Self {
        Self::Failed(error)
    }

    #[inline]
    fn error(&self) -> Option<ContextError> {
        match self {
            Self::Failed(error) => Some(error.clone()),
            Self::Present(_) | Self::Absent => None,
        }
    }

    #[inline]
    fn bind<F>(self, step: F) -> Self
    where
        F: FnMut(A) -> StepResult<A, Self> + Send + 'static,
    {
        Optional::bind(self, step)
    }

    #[inline]
    fn catch<F>(self, handler: F) -> Self
    where
        F: FnMut(ContextError) -> StepResult<A, Self> + Send + 'static,
    {
        Optional::catch(self, handler)
    }
}

impl<A> From<Option<A>> for Optional<A> {
    fn from(value: Option<A>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl<A> Default for Optional<A> {
    fn default() -> Self {
        Self::Absent
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for Optional<serde_json::Value> {
    /// JSON `null` becomes `Absent`; any other JSON value is present.
    fn from(value: serde_json::Value) -> Self {
        if value.is_null() {
            Self::Absent
        } else {
            Self::Present(value)
        }
    }
}
