//! A thread-safe promise engine.
//!
//! A [`Promise`] starts pending and settles exactly once, fulfilled with a
//! value or rejected with a [`ContextError`](crate::context::ContextError).
//! Its write side is a [`Resolver`]; any number of resolver clones may race
//! from any number of threads and the first one wins.
//!
//! Promises implement [`Context`](crate::context::Context), so they compose
//! with the same `bind`/`catch` vocabulary as the synchronous contexts. A
//! step returning `StepResult::Wrapped(promise)` is adopted rather than
//! nested, which keeps chains flat.
//!
//! [`TaskGroup`] runs producers on worker threads. With the `async` feature
//! a promise can also be `.await`ed.
//!
//! # Examples
//!
//! ```rust
//! use thenable::context::StepResult;
//! use thenable::promise::{Promise, TaskGroup};
//!
//! let group = TaskGroup::new();
//! let parts: Vec<Promise<u32>> = (1..=3)
//!     .map(|n| {
//!         group.spawn(move |resolver| {
//!             resolver.fulfill(n * 10);
//!             Ok(())
//!         })
//!     })
//!     .collect();
//!
//! let total = Promise::all(parts).bind(|values| StepResult::Value(values.iter().sum::<u32>()));
//! assert_eq!(total.wait(), Ok(60));
//! group.join().unwrap();
//! ```

mod combinators;
mod handle;
mod resolver;
#[cfg(feature = "async")]
mod settled;
mod state;
mod task_group;

pub use handle::Promise;
pub use resolver::Resolver;
#[cfg(feature = "async")]
pub use settled::Settled;
pub use state::PromiseState;
pub use task_group::TaskGroup;
