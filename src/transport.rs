//! Host queries over the system `ssh` client
//!
//! Releases live under `/opt/<app>/releases/<name>` with `/opt/<app>/current`
//! a symlink to the live one. Services are systemd units named after the
//! service.

use anyhow::{Result, bail};
use deployconf::Host;
use fleet::{HostCapability, HostOperationError, HostReleases, HostStatus, StatusLabel};
use std::collections::BTreeMap;

use crate::runner::{self, Captured};

/// Root under which each app keeps its releases
const APP_ROOT: &str = "/opt";

/// Separates the `readlink` answer from the release listing
const SECTION_MARK: &str = "--releases--";

/// `ssh` exits with this code when the connection itself failed
const SSH_CONNECTION_FAILED: i32 = 255;

/// Queries hosts by running commands over `ssh`
#[derive(Debug, Clone)]
pub struct SshTransport {
    program: String,
}

impl SshTransport {
    /// Use the `ssh` found on `PATH`
    pub fn new() -> Result<Self> {
        if !runner::command_exists("ssh") {
            bail!("`ssh` was not found on PATH; it is needed to reach hosts");
        }
        Ok(Self {
            program: "ssh".to_string(),
        })
    }

    fn exec(&self, host: &Host, remote: &str) -> Result<Captured, HostOperationError> {
        let captured = runner::run_capture(&self.program, &ssh_args(host, remote))
            .map_err(|e| HostOperationError::unreachable(&host.name, format!("{e:#}")))?;

        if captured.code == Some(SSH_CONNECTION_FAILED) {
            return Err(HostOperationError::unreachable(&host.name, captured.stderr));
        }
        Ok(captured)
    }
}

impl HostCapability for SshTransport {
    fn history(&self, host: &Host) -> Result<HostReleases, HostOperationError> {
        let remote = history_command(&host.app.name);
        let captured = self.exec(host, &remote)?;
        if !captured.success() {
            return Err(HostOperationError::command_failed(
                &host.name,
                remote,
                captured.stderr,
            ));
        }
        parse_history(&captured.stdout)
            .ok_or_else(|| HostOperationError::malformed(&host.name, "missing release listing"))
    }

    fn status(&self, host: &Host) -> Result<HostStatus, HostOperationError> {
        let services = host.services.names();
        if services.is_empty() {
            return Ok(HostStatus {
                label: StatusLabel::Stopped,
                services: BTreeMap::new(),
            });
        }

        let remote = status_command(&services);
        // `systemctl is-active` exits non-zero when any unit is inactive
        let captured = self.exec(host, &remote)?;
        summarize_status(&services, &captured.stdout).ok_or_else(|| {
            if captured.success() {
                HostOperationError::malformed(&host.name, "one state per service expected")
            } else {
                HostOperationError::command_failed(&host.name, remote, captured.stderr)
            }
        })
    }
}

/// Arguments for `ssh`, ending with the remote command
pub fn ssh_args(host: &Host, remote: &str) -> Vec<String> {
    let credentials = &host.credentials;
    let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];

    if let Some(port) = credentials.port {
        args.push("-p".to_string());
        args.push(port.to_string());
    }
    if let Some(pem) = &credentials.pem {
        args.push("-i".to_string());
        args.push(pem.display().to_string());
    }
    if credentials.password.is_some() && credentials.pem.is_none() {
        log::debug!(
            "{}: password set but ssh runs in batch mode; relying on keys or agent",
            host.name
        );
    }

    args.push(match &credentials.username {
        Some(user) => format!("{user}@{}", host.name),
        None => host.name.clone(),
    });
    args.push(remote.to_string());
    args
}

fn history_command(app: &str) -> String {
    let dir = format!("{APP_ROOT}/{app}");
    format!(
        "readlink {current} || true; echo {SECTION_MARK}; ls -1 {releases}",
        current = quote(&format!("{dir}/current")),
        releases = quote(&format!("{dir}/releases")),
    )
}

fn status_command(services: &[&str]) -> String {
    let units: Vec<String> = services.iter().map(|s| quote(s)).collect();
    format!("systemctl is-active {}", units.join(" "))
}

/// Single-quote for a POSIX shell
fn quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// Parse `readlink` output, the section mark, then one release per line
///
/// `None` if the section mark is missing.
pub fn parse_history(stdout: &str) -> Option<HostReleases> {
    let (head, listing) = stdout.split_once(SECTION_MARK)?;

    let current = head
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let list = listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    Some(HostReleases { current, list })
}

/// Pair each service with its `systemctl is-active` line and label the host
///
/// All `active` is running, none is stopped, anything in between is partial.
/// `None` if the line count does not match the service count.
pub fn summarize_status(services: &[&str], stdout: &str) -> Option<HostStatus> {
    let states: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if states.len() != services.len() {
        return None;
    }

    let active = states.iter().filter(|state| **state == "active").count();
    let label = if active == states.len() {
        StatusLabel::Running
    } else if active == 0 {
        StatusLabel::Stopped
    } else {
        StatusLabel::Other("partial".to_string())
    };

    let services = services
        .iter()
        .zip(states)
        .map(|(service, state)| ((*service).to_string(), state.to_string()))
        .collect();

    Some(HostStatus { label, services })
}

#[cfg(test)]
mod tests {
    use super::*;
    use deployconf::CompiledConfig;
    use serde_json::json;

    fn host(entry: serde_json::Value) -> Host {
        let config = CompiledConfig::from_value(
            json!({
                "app": { "name": "shop", "path": "." },
                "environment": "staging",
                "hosts": [ entry ]
            }),
            None,
        )
        .unwrap();
        config.hosts.first().unwrap().clone()
    }

    #[test]
    fn test_ssh_args_minimal() {
        let host = host(json!({ "name": "app1.example.com" }));
        let args = ssh_args(&host, "uptime");
        assert_eq!(
            args,
            vec!["-o", "BatchMode=yes", "app1.example.com", "uptime"]
        );
    }

    #[test]
    fn test_ssh_args_with_credentials() {
        let host = host(json!({
            "name": "app1.example.com",
            "username": "deploy",
            "pem": "/keys/deploy.pem",
            "port": 2222
        }));
        let args = ssh_args(&host, "uptime");
        assert_eq!(
            args,
            vec![
                "-o",
                "BatchMode=yes",
                "-p",
                "2222",
                "-i",
                "/keys/deploy.pem",
                "deploy@app1.example.com",
                "uptime",
            ]
        );
    }

    #[test]
    fn test_history_command_quotes_paths() {
        assert_eq!(
            history_command("shop"),
            "readlink '/opt/shop/current' || true; echo --releases--; ls -1 '/opt/shop/releases'"
        );
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_parse_history() {
        let stdout = "/opt/shop/releases/r20160612\n--releases--\nr20160610\nr20160612\n\n";
        let releases = parse_history(stdout).unwrap();
        assert_eq!(releases.current.as_deref(), Some("r20160612"));
        assert_eq!(releases.list, vec!["r20160610", "r20160612"]);
    }

    #[test]
    fn test_parse_history_without_current() {
        let releases = parse_history("\n--releases--\nr1\n").unwrap();
        assert_eq!(releases.current, None);
        assert_eq!(releases.list, vec!["r1"]);
    }

    #[test]
    fn test_parse_history_requires_section_mark() {
        assert!(parse_history("r1\nr2\n").is_none());
    }

    #[test]
    fn test_summarize_status_labels() {
        let services = ["web", "worker"];

        let all = summarize_status(&services, "active\nactive\n").unwrap();
        assert_eq!(all.label, StatusLabel::Running);
        assert_eq!(all.services["worker"], "active");

        let none = summarize_status(&services, "inactive\nfailed\n").unwrap();
        assert_eq!(none.label, StatusLabel::Stopped);
        assert_eq!(none.services["worker"], "failed");

        let some = summarize_status(&services, "active\ninactive\n").unwrap();
        assert_eq!(some.label, StatusLabel::Other("partial".to_string()));
    }

    #[test]
    fn test_summarize_status_line_mismatch() {
        assert!(summarize_status(&["web", "worker"], "active\n").is_none());
    }
}
