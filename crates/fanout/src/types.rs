//! Core types for fan-out/reduce

use std::fmt;

/// Boxed step that mutates the accumulator in place
type StepFn<'a, A, E> = Box<dyn FnOnce(&mut A) -> Result<(), E> + 'a>;

/// Boxed step that produces a value on a worker thread
type TaskFn<'a, T, E> = Box<dyn FnOnce() -> Result<T, E> + Send + 'a>;

/// A keyed step for the sequential engine
///
/// Returning from the closure is the step's single continuation. An `Err`
/// is recorded as a failure; it does not stop the steps that follow.
pub struct Operation<'a, A, E> {
    pub(crate) key: String,
    pub(crate) run: StepFn<'a, A, E>,
}

impl<'a, A, E> Operation<'a, A, E> {
    /// Create a new operation identified by `key`
    pub fn new(key: impl Into<String>, run: impl FnOnce(&mut A) -> Result<(), E> + 'a) -> Self {
        Self {
            key: key.into(),
            run: Box::new(run),
        }
    }

    /// The key this operation reports under
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<A, E> fmt::Debug for Operation<'_, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("key", &self.key).finish()
    }
}

/// A keyed step for the parallel engine
///
/// Tasks never see the accumulator; their values are folded in afterwards,
/// in declaration order.
pub struct Task<'a, T, E> {
    pub(crate) key: String,
    pub(crate) run: TaskFn<'a, T, E>,
}

impl<'a, T, E> Task<'a, T, E> {
    /// Create a new task identified by `key`
    pub fn new(key: impl Into<String>, run: impl FnOnce() -> Result<T, E> + Send + 'a) -> Self {
        Self {
            key: key.into(),
            run: Box::new(run),
        }
    }

    /// The key this task reports under
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T, E> fmt::Debug for Task<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("key", &self.key).finish()
    }
}

/// A step that returned an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<E> {
    pub key: String,
    pub error: E,
}

/// Final state of a fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduced<A, E> {
    /// The accumulator after every step has run
    pub accumulator: A,
    /// Failed steps, in the order they ran
    pub failures: Vec<Failure<E>>,
}

impl<A, E> Reduced<A, E> {
    /// Check if every step succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Keys of the failed steps, in run order
    pub fn failed_keys(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.key.as_str()).collect()
    }

    /// Split into the accumulator and the failures
    pub fn into_parts(self) -> (A, Vec<Failure<E>>) {
        (self.accumulator, self.failures)
    }
}
