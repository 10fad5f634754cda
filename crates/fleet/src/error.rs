//! Error types for the fleet crate

use serde::Serialize;
use thiserror::Error;

/// A single host's query failed
///
/// Never fatal: the failing host is recorded in the report and the
/// remaining hosts are still queried.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{host}: {kind}")]
pub struct HostOperationError {
    pub host: String,
    pub kind: HostErrorKind,
}

/// Why a host query failed
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostErrorKind {
    /// The host could not be reached at all
    #[error("unreachable: {0}")]
    Unreachable(String),

    /// The remote command ran but failed
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The host answered with something that could not be understood
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl HostOperationError {
    pub fn unreachable(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            kind: HostErrorKind::Unreachable(reason.into()),
        }
    }

    pub fn command_failed(
        host: impl Into<String>,
        command: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            kind: HostErrorKind::CommandFailed {
                command: command.into(),
                stderr: stderr.into(),
            },
        }
    }

    pub fn malformed(host: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            kind: HostErrorKind::Malformed(detail.into()),
        }
    }
}

/// Errors that stop a report from being produced at all
#[derive(Error, Debug)]
pub enum Error {
    /// `--host` named a host that is not in the environment
    #[error("host '{host}' is not defined in environment '{environment}'")]
    UnknownHost { host: String, environment: String },

    /// The fan-out engine could not start
    #[error(transparent)]
    Engine(#[from] fanout::Error),
}

/// Result type for fleet operations
pub type Result<T> = std::result::Result<T, Error>;
