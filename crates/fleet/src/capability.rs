//! The per-host capability the reports are built from
//!
//! How a host is reached is up to the implementation; the reports only
//! rely on each call producing exactly one result or one error.

use deployconf::Host;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::HostOperationError;

/// Remote queries against a single host
pub trait HostCapability: Send + Sync {
    /// Releases retained on the host, and which one is live
    fn history(&self, host: &Host) -> Result<HostReleases, HostOperationError>;

    /// Overall status label plus a per-service state map
    fn status(&self, host: &Host) -> Result<HostStatus, HostOperationError>;
}

/// A host's release history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostReleases {
    /// The release the host is running, if any
    pub current: Option<String>,
    /// Every release retained on the host
    pub list: Vec<String>,
}

/// A host's status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostStatus {
    pub label: StatusLabel,
    /// Service name → state as reported by the host
    pub services: BTreeMap<String, String>,
}

/// Overall status of a host
///
/// Anything other than `running` or `stopped` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum StatusLabel {
    Running,
    Stopped,
    Other(String),
}

impl StatusLabel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for StatusLabel {
    fn from(label: &str) -> Self {
        match label {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<StatusLabel> for String {
    fn from(label: StatusLabel) -> Self {
        match label {
            StatusLabel::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_parsing() {
        assert_eq!(StatusLabel::from("running"), StatusLabel::Running);
        assert_eq!(StatusLabel::from("stopped"), StatusLabel::Stopped);
        assert_eq!(
            StatusLabel::from("partial"),
            StatusLabel::Other("partial".to_string())
        );
    }

    #[test]
    fn test_status_label_passes_unknown_values_through() {
        let label = StatusLabel::from("Deploying");
        assert_eq!(label.to_string(), "Deploying");
        assert_eq!(String::from(label), "Deploying");
    }

    #[test]
    fn test_status_label_serializes_as_string() {
        let json = serde_json::to_value(StatusLabel::Running).unwrap();
        assert_eq!(json, serde_json::json!("running"));
    }
}
