//! Error types shared by every context.
//!
//! A context in its error state carries a [`ContextError`]. The same type is
//! used as the rejection reason of a [`Promise`](crate::promise::Promise), so
//! errors flow unchanged between synchronous and asynchronous contexts.

/// Represents the errors a context can hold or a composition can report.
///
/// # Examples
///
/// ```rust
/// use thenable::context::ContextError;
///
/// let error = ContextError::step_failure("lookup failed");
/// assert_eq!(format!("{error}"), "step failed: lookup failed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// A context was constructed from a value it cannot represent.
    ///
    /// Raised eagerly by the constructor, never by `bind`.
    #[error("invalid representation for {context}: {reason}")]
    InvalidRepresentation {
        /// The name of the context that rejected the value.
        context: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A bound step or a promise producer failed.
    #[error("step failed: {message}")]
    StepFailure {
        /// Description of the failure.
        message: String,
    },

    /// Every input of `Promise::any` was rejected.
    #[error("all {count} promises were rejected")]
    AllRejected {
        /// The number of rejected inputs.
        count: usize,
    },

    /// Worker threads of a task group panicked outside of their producer.
    #[error("{count} worker thread(s) panicked")]
    WorkerPanicked {
        /// The number of workers that panicked.
        count: usize,
    },
}

impl ContextError {
    /// Creates a [`ContextError::StepFailure`] with the given message.
    pub fn step_failure(message: impl Into<String>) -> Self {
        Self::StepFailure {
            message: message.into(),
        }
    }

    /// Creates a [`ContextError::InvalidRepresentation`] for the named context.
    pub fn invalid_representation(context: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRepresentation {
            context,
            reason: reason.into(),
        }
    }

    /// Converts a panic payload caught by `catch_unwind` into a step failure.
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "producer panicked".to_string());
        Self::step_failure(message)
    }
}
