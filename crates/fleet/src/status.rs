//! Per-host status table

use deployconf::CompiledConfig;
use fanout::ProgressCallback;
use serde::Serialize;
use crate::capability::{HostCapability, HostStatus};
use crate::error::{HostOperationError, Result};
use crate::sweep::sweep;

/// One host's line in the status table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostStatusRow {
    pub host: String,
    #[serde(flatten)]
    pub status: HostStatus,
}

/// Status of every host in an environment
///
/// A host whose query failed is absent from `hosts` and listed in `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub environment: String,
    /// Answering hosts, in declaration order
    pub hosts: Vec<HostStatusRow>,
    /// Hosts whose status query failed
    pub failed: Vec<HostOperationError>,
}

impl StatusReport {
    /// Status of one host, if it answered
    pub fn get(&self, host: &str) -> Option<&HostStatus> {
        self.hosts
            .iter()
            .find(|row| row.host == host)
            .map(|row| &row.status)
    }

    /// Names of the hosts that answered, in declaration order
    pub fn host_names(&self) -> Vec<&str> {
        self.hosts.iter().map(|row| row.host.as_str()).collect()
    }

    /// Names of the hosts that failed to report
    pub fn failed_hosts(&self) -> Vec<&str> {
        self.failed.iter().map(|e| e.host.as_str()).collect()
    }
}

/// Ask every host for its status
pub fn collect_status<C, P>(
    config: &CompiledConfig,
    capability: &C,
    jobs: usize,
    progress: &mut P,
) -> Result<StatusReport>
where
    C: HostCapability + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let hosts: Vec<_> = config.hosts.iter().collect();

    let reduced = sweep(
        Vec::new(),
        &hosts,
        |host| capability.status(host),
        |table: &mut Vec<HostStatusRow>, host, status| {
            table.push(HostStatusRow {
                host: host.to_string(),
                status,
            });
        },
        jobs,
        progress,
    )?;
    let (hosts, failures) = reduced.into_parts();

    Ok(StatusReport {
        environment: config.environment.clone(),
        hosts,
        failed: failures.into_iter().map(|f| f.error).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{HostReleases, StatusLabel};
    use deployconf::Host;
    use fanout::NoProgress;
    use serde_json::json;
    use std::collections::BTreeMap;

    /// `down` hosts fail; every other host reports its services running
    struct FakeFleet {
        down: Vec<&'static str>,
    }

    impl HostCapability for FakeFleet {
        fn history(&self, host: &Host) -> std::result::Result<HostReleases, HostOperationError> {
            Err(HostOperationError::unreachable(&host.name, "not used"))
        }

        fn status(&self, host: &Host) -> std::result::Result<HostStatus, HostOperationError> {
            if self.down.iter().any(|down| *down == host.name) {
                return Err(HostOperationError::command_failed(
                    &host.name,
                    "systemctl is-active web",
                    "connection reset",
                ));
            }
            let label = if host.name == "c" { "deploying" } else { "running" };
            Ok(HostStatus {
                label: StatusLabel::from(label),
                services: host
                    .services
                    .map(|s| (s.name.clone(), "active".to_string()))
                    .into_iter()
                    .collect(),
            })
        }
    }

    fn config() -> CompiledConfig {
        CompiledConfig::from_value(
            json!({
                "app": { "name": "shop", "path": "." },
                "environment": "production",
                "defaults": { "hosts": { "services": [ { "name": "web" } ] } },
                "hosts": [ { "name": "c" }, { "name": "a" }, { "name": "b" } ]
            }),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_failed_host_is_omitted_and_recorded() {
        let fleet = FakeFleet { down: vec!["b"] };

        let report = collect_status(&config(), &fleet, 1, &mut NoProgress).unwrap();

        assert_eq!(report.host_names(), vec!["c", "a"]);
        assert!(report.get("b").is_none());
        assert_eq!(report.failed_hosts(), vec!["b"]);
    }

    #[test]
    fn test_status_labels_pass_through() {
        let fleet = FakeFleet { down: Vec::new() };

        let report = collect_status(&config(), &fleet, 1, &mut NoProgress).unwrap();

        assert_eq!(report.get("a").unwrap().label, StatusLabel::Running);
        assert_eq!(
            report.get("c").unwrap().label,
            StatusLabel::Other("deploying".to_string())
        );
        assert_eq!(report.get("a").unwrap().services["web"], "active");
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_rows_follow_declaration_order() {
        let fleet = FakeFleet { down: Vec::new() };

        let report = collect_status(&config(), &fleet, 3, &mut NoProgress).unwrap();

        assert_eq!(report.host_names(), vec!["c", "a", "b"]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["hosts"][0]["host"], "c");
        assert_eq!(json["hosts"][0]["label"], "deploying");
        assert_eq!(
            json["hosts"][1]["services"],
            serde_json::to_value(BTreeMap::from([("web", "active")])).unwrap()
        );
    }

    #[test]
    fn test_parallel_status_matches_sequential() {
        let fleet = FakeFleet { down: vec!["a"] };

        let sequential = collect_status(&config(), &fleet, 1, &mut NoProgress).unwrap();
        let parallel = collect_status(&config(), &fleet, 3, &mut NoProgress).unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_all_hosts_failing_gives_empty_table() {
        let fleet = FakeFleet {
            down: vec!["a", "b", "c"],
        };

        let report = collect_status(&config(), &fleet, 1, &mut NoProgress).unwrap();

        assert!(report.hosts.is_empty());
        assert_eq!(report.failed.len(), 3);
    }
}
