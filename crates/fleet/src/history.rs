//! Cross-host release history
//!
//! Every host reports the releases it retains and which one is live. The
//! answers are flattened into one `(release, host, current)` sequence,
//! sorted by release name descending (release names sort chronologically)
//! and folded into one record per release, listing every host that has it.

use deployconf::{CompiledConfig, Host};
use fanout::ProgressCallback;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::capability::{HostCapability, HostReleases};
use crate::error::{Error, HostOperationError, Result};
use crate::sweep::sweep;

/// One release on one host, as reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseRecord {
    pub name: String,
    pub host: String,
    pub current: bool,
}

/// One release across every host that has it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRelease {
    pub name: String,
    /// Short names of the hosts holding this release, sorted
    pub hosts: BTreeSet<String>,
    /// Full names of the hosts holding this release
    ///
    /// Coverage is counted here; two hosts may share a short name.
    #[serde(skip)]
    pub host_names: BTreeSet<String>,
    /// Live on at least one host
    pub current: bool,
}

/// How much of the environment holds a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Coverage {
    /// Every host that reported has it
    Complete,
    /// Some reporting host lacks it
    Partial,
}

/// Which hosts to ask and which releases to keep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Ask only this host
    pub host: Option<String>,
    /// Keep only releases present on every host
    pub all: bool,
    /// Caller only wants the current release
    pub current: bool,
    /// Caller only wants the release before the current one
    pub previous: bool,
}

impl HistoryQuery {
    /// `--current` and `--previous` imply `--all`, unless a single host was picked
    pub fn only_complete(&self) -> bool {
        self.all || ((self.current || self.previous) && self.host.is_none())
    }

    /// The hosts this query targets, in declaration order
    pub fn select_hosts<'a>(&self, config: &'a CompiledConfig) -> Result<Vec<&'a Host>> {
        match &self.host {
            Some(name) => config
                .hosts
                .get(name)
                .map(|host| vec![host])
                .ok_or_else(|| Error::UnknownHost {
                    host: name.clone(),
                    environment: config.environment.clone(),
                }),
            None => Ok(config.hosts.iter().collect()),
        }
    }
}

/// A release paired with its coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryEntry<'a> {
    #[serde(flatten)]
    pub release: &'a MergedRelease,
    pub coverage: Coverage,
}

/// Merged release history of an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryReport {
    pub environment: String,
    /// Merged releases, newest first
    pub releases: Vec<MergedRelease>,
    /// Names of the hosts that were asked
    pub queried: Vec<String>,
    /// Hosts whose history query failed
    pub failed: Vec<HostOperationError>,
    #[serde(skip)]
    only_complete: bool,
}

impl HistoryReport {
    /// Number of hosts that answered
    pub fn reporting_hosts(&self) -> usize {
        self.queried.len().saturating_sub(self.failed.len())
    }

    /// Coverage of a release, judged against the hosts that answered
    ///
    /// A host whose query failed never makes a release partial.
    pub fn coverage(&self, release: &MergedRelease) -> Coverage {
        if release.host_names.len() >= self.reporting_hosts() {
            Coverage::Complete
        } else {
            Coverage::Partial
        }
    }

    /// Releases to show, newest first, filtered as the query asked
    pub fn entries(&self) -> Vec<HistoryEntry<'_>> {
        self.releases
            .iter()
            .map(|release| HistoryEntry {
                release,
                coverage: self.coverage(release),
            })
            .filter(|entry| !self.only_complete || entry.coverage == Coverage::Complete)
            .collect()
    }

    /// The newest listed release that is live somewhere
    pub fn current(&self) -> Option<&MergedRelease> {
        self.entries()
            .into_iter()
            .find(|entry| entry.release.current)
            .map(|entry| entry.release)
    }

    /// The listed release just before the current one
    pub fn previous(&self) -> Option<&MergedRelease> {
        let entries = self.entries();
        let index = entries.iter().position(|entry| entry.release.current)?;
        entries.get(index + 1).map(|entry| entry.release)
    }

    /// Names of the hosts that failed to report
    pub fn failed_hosts(&self) -> Vec<&str> {
        self.failed.iter().map(|e| e.host.as_str()).collect()
    }
}

/// Flatten one host's answer into release records
pub fn absorb_releases(records: &mut Vec<ReleaseRecord>, host: &str, releases: HostReleases) {
    let HostReleases { current, list } = releases;
    for name in list {
        let is_current = current.as_deref() == Some(name.as_str());
        records.push(ReleaseRecord {
            name,
            host: host.to_string(),
            current: is_current,
        });
    }
}

/// Merge release records from all hosts into one record per release
///
/// `short_name` maps a host name to the alias listed in the merged record.
/// Output is sorted by release name, descending.
pub fn merge_releases(
    mut records: Vec<ReleaseRecord>,
    short_name: impl Fn(&str) -> String,
) -> Vec<MergedRelease> {
    records.sort_by(|a, b| b.name.cmp(&a.name));

    let mut merged: Vec<MergedRelease> = Vec::new();
    for record in records {
        let alias = short_name(&record.host);
        match merged.last_mut() {
            // Sorted input: a repeated name is always the latest record
            Some(last) if last.name == record.name => {
                last.hosts.insert(alias);
                last.host_names.insert(record.host);
                last.current |= record.current;
            }
            _ => merged.push(MergedRelease {
                name: record.name,
                hosts: BTreeSet::from([alias]),
                host_names: BTreeSet::from([record.host]),
                current: record.current,
            }),
        }
    }
    merged
}

/// Ask the selected hosts for their history and merge the answers
///
/// A host that fails is listed in [`HistoryReport::failed`]; every other
/// host's releases still make it into the report.
pub fn collect_history<C, P>(
    config: &CompiledConfig,
    capability: &C,
    query: &HistoryQuery,
    jobs: usize,
    progress: &mut P,
) -> Result<HistoryReport>
where
    C: HostCapability + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let hosts = query.select_hosts(config)?;

    let reduced = sweep(
        Vec::new(),
        &hosts,
        |host| capability.history(host),
        absorb_releases,
        jobs,
        progress,
    )?;
    let (records, failures) = reduced.into_parts();

    log::debug!(
        "history: {} record(s) from {} host(s), {} failed",
        records.len(),
        hosts.len(),
        failures.len()
    );

    let releases = merge_releases(records, |host| {
        config
            .hosts
            .get(host)
            .map(|h| h.short_name.clone())
            .unwrap_or_else(|| Host::default_short_name(host))
    });

    Ok(HistoryReport {
        environment: config.environment.clone(),
        releases,
        queried: hosts.iter().map(|h| h.name.clone()).collect(),
        failed: failures.into_iter().map(|f| f.error).collect(),
        only_complete: query.only_complete(),
    })
}
