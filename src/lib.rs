//! # thenable
//!
//! Monadic composition for Rust: a small context protocol, the contexts that
//! implement it, combinators over them and a thread-safe promise engine.
//!
//! ## Overview
//!
//! Chaining dependent computations usually means nesting callbacks. This
//! library lets the same `bind`/`catch` vocabulary drive very different
//! kinds of computation:
//!
//! - **Contexts**: [`Identity`](context::Identity), [`Optional`](context::Optional)
//!   and [`Collection`](context::Collection), all implementing [`Context`](context::Context)
//! - **Promises**: a [`Promise`](promise::Promise) that settles once, with
//!   FIFO continuations, adoption of returned promises, `all`/`any`/`race`
//!   and worker threads through [`TaskGroup`](promise::TaskGroup)
//! - **Combinators**: [`all`](compose::all) over mixed contexts and
//!   [`Nested`](compose::Nested) chains that replace callback pyramids
//!
//! ## Feature Flags
//!
//! - `context`: the protocol and the synchronous contexts
//! - `promise`: the promise engine
//! - `compose`: the `all` and `nested` combinators
//! - `async`: `.await` support for promises
//! - `json`: JSON entry points for `Optional` and `Collection`
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use thenable::prelude::*;
//!
//! let product = Collection::from_vec(vec![1, 2])
//!     .bind(|x| StepResult::Wrapped(Collection::from_vec(vec![(x, 'a'), (x, 'b')])));
//! assert_eq!(product.into_vec(), vec![(1, 'a'), (1, 'b'), (2, 'a'), (2, 'b')]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use thenable::prelude::*;
/// ```
pub mod prelude {

    #[cfg(feature = "context")]
    pub use crate::context::*;

    #[cfg(feature = "compose")]
    pub use crate::compose::*;

    #[cfg(feature = "promise")]
    pub use crate::promise::*;
}

#[cfg(feature = "context")]
pub mod context;

#[cfg(feature = "promise")]
pub mod promise;

#[cfg(feature = "compose")]
pub mod compose;
