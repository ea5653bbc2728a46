//! Computational contexts and the protocol they share.
//!
//! This module provides the [`Context`] trait and the synchronous contexts
//! that implement it:
//!
//! - [`Identity`]: exactly one value
//! - [`Optional`]: zero or one value, short-circuiting on absence
//! - [`Collection`]: zero or more values, flat-mapping on `bind`
//!
//! The asynchronous context lives in [`crate::promise`].
//!
//! Every context can be in an error state carrying a [`ContextError`].
//! `bind` skips the step in that state and `catch` handles it.
//!
//! # Examples
//!
//! ```rust
//! use thenable::context::{Collection, StepResult};
//!
//! // Cartesian product of two collections, then a bare-value step
//! let result = Collection::from_vec(vec![1, 2, 3])
//!     .bind(|_| StepResult::Wrapped(Collection::from_vec(vec![10, 20])))
//!     .bind(|x| StepResult::Value(x + 1));
//! assert_eq!(result.into_vec(), vec![11, 21, 11, 21, 11, 21]);
//! ```

mod collection;
mod error;
mod identity;
mod optional;
mod protocol;

pub use collection::Collection;
pub use error::ContextError;
pub use identity::Identity;
pub use optional::Optional;
pub use protocol::{Context, StepResult};
