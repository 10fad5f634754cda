//! # Fleet
//!
//! Environment-wide reports built by querying every host and folding the
//! answers together.
//!
//! - [`collect_history`]: merged release history, one record per release,
//!   with the hosts holding it and whether it is live anywhere
//! - [`collect_status`]: status label and service states per host
//!
//! Both reports are produced even when some hosts fail; those hosts are
//! listed in the report's `failed` set instead of aborting the query.
//!
//! The transport to a host is supplied by the caller through
//! [`HostCapability`].

pub mod capability;
pub mod error;
pub mod history;
pub mod status;
mod sweep;

// Re-export main types at crate root
pub use capability::{HostCapability, HostReleases, HostStatus, StatusLabel};
pub use error::{Error, HostErrorKind, HostOperationError, Result};
pub use history::{
    Coverage, HistoryEntry, HistoryQuery, HistoryReport, MergedRelease, ReleaseRecord,
    absorb_releases, collect_history, merge_releases,
};
pub use status::{HostStatusRow, StatusReport, collect_status};
