//! Error types for the deployconf crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating, loading or compiling a deploy config
#[derive(Error, Debug)]
pub enum Error {
    /// The expected config document does not exist
    #[error(
        "configuration file {} not found. Run `flotilla init <environment>` to create it.",
        .path.display()
    )]
    NotFound { path: PathBuf },

    /// The config document exists but is not a valid document
    #[error("error loading JSON config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO error while reading a config document or directory
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A host or service entry does not fit the expected shape after defaulting
    #[error("invalid {what}: {source}")]
    Schema {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// Neither the document nor the caller named the environment
    #[error("no environment name given and none set in the configuration")]
    MissingEnvironment,

    /// Two hosts share a name
    #[error("duplicate host '{0}'")]
    DuplicateHost(String),

    /// Two services on one host share a name
    #[error("duplicate service '{service}' on host '{host}'")]
    DuplicateService { host: String, service: String },

    /// A service env value is not a scalar
    #[error("env variable '{key}' of service '{service}' must be a string, number or boolean")]
    InvalidEnvValue { service: String, key: String },

    /// A hook entry is not a script path
    #[error("hook '{event}' must be a script path")]
    InvalidHook { event: String },

    /// The deploy directory to list environments from does not exist
    #[error("deploy directory {} not found", .0.display())]
    DeployDirNotFound(PathBuf),
}

/// Result type for deployconf operations
pub type Result<T> = std::result::Result<T, Error>;
