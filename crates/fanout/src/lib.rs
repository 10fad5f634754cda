//! # Fanout
//!
//! Drive an ordered sequence of independent, fallible operations into a
//! single accumulator.
//!
//! A failing step never aborts the sequence: the engine records the failure
//! under the step's key and moves on to the next one. Completion happens
//! exactly once, after every step has run, whatever the failure pattern.
//!
//! ## Core Concepts
//!
//! - **Operation**: A keyed unit of work that mutates the accumulator in place
//! - **Task**: A keyed unit of work that produces a value, for the parallel variant
//! - **Reduced**: The folded accumulator plus the ordered list of failures
//! - **ProgressCallback**: Receives a running "remaining" count as steps finish
//!
//! ## Example
//!
//! ```
//! use fanout::{NoProgress, Operation, reduce};
//!
//! let ops: Vec<Operation<'_, Vec<u32>, String>> = vec![
//!     Operation::new("a", |_acc| Err("unreachable".to_string())),
//!     Operation::new("b", |acc: &mut Vec<u32>| {
//!         acc.push(2);
//!         Ok(())
//!     }),
//! ];
//!
//! let reduced = reduce(Vec::new(), ops, &mut NoProgress);
//! assert_eq!(reduced.accumulator, vec![2]);
//! assert_eq!(reduced.failed_keys(), vec!["a"]);
//! ```

pub mod context;
pub mod error;
pub mod executor;
pub mod types;

// Re-export main types at crate root
pub use context::{NoProgress, ProgressCallback};
pub use error::{Error, Result};
pub use executor::{reduce, reduce_parallel, reduce_then};
pub use types::{Failure, Operation, Reduced, Task};
