//! Combinators over contexts.
//!
//! This module provides the two combinators that work on any
//! [`Context`](crate::context::Context):
//!
//! - [`all`]: collect several contexts, possibly of different kinds, into
//!   one [`Aggregate`] with a result [`Slot`] per input
//! - [`Nested`] / [`nested`]: thread a list of dependent steps through a
//!   context while accumulating every intermediate value
//!
//! # Examples
//!
//! ## Aggregation
//!
//! ```
//! use thenable::compose::{Aggregatable, Slot, all};
//! use thenable::context::Identity;
//! use thenable::promise::Promise;
//!
//! let (later, resolver) = Promise::pending();
//! let aggregate = all(vec![Identity::new("now").boxed(), later.boxed()]);
//! assert!(!aggregate.is_complete());
//!
//! resolver.fulfill("later");
//! assert_eq!(
//!     aggregate.completion().wait(),
//!     Ok(vec![Slot::One("now"), Slot::One("later")])
//! );
//! ```
//!
//! ## Nested chains
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use thenable::compose::{Nested, Step};
//! use thenable::context::StepResult;
//! use thenable::promise::Promise;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! let (start, resolver) = Promise::<i32>::pending();
//! Nested::new(start)
//!     .step(Step::unary(|r1| StepResult::Wrapped(Promise::fulfilled(r1 * 2))))
//!     .step(Step::unary(|r2| StepResult::Value(r2 + 40)))
//!     .step(Step::n_ary(|_: &[i32]| StepResult::Value(0)))
//!     .finally(move |results| sink.lock().unwrap().push(results.to_vec()))
//!     .run();
//!
//! resolver.fulfill(100);
//! assert_eq!(*seen.lock().unwrap(), vec![vec![100, 200, 240]]);
//! ```
//!
//! # Laws
//!
//! For a context whose `bind` fires exactly once, a nested chain produces
//! the same values and side effects as the hand-written pyramid:
//!
//! ```text
//! nested(c, [s1, s2, s3], done)
//!     == c.bind(|v1| s1(v1).bind(|v2| s2(v1, v2).bind(|v3| {
//!            let last = s3(v1, v2, v3);
//!            done(v1, v2, v3);
//!            last
//!        })))
//! ```

mod aggregate;
mod nested;

pub use aggregate::{Aggregatable, Aggregate, Slot, SlotSink, all};
pub use nested::{ErrorHandler, FinalCallback, Nested, Step, nested};
