//! Error types for the fanout crate

use thiserror::Error;

/// Errors raised by the engine itself (never by individual steps)
#[derive(Error, Debug)]
pub enum Error {
    /// The worker pool for the parallel variant could not be created
    #[error("failed to create fan-out thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for fanout operations
pub type Result<T> = std::result::Result<T, Error>;
