//! `flotilla status` - running/stopped state of every host's services

use anyhow::Result;
use colored::Colorize;
use deployconf::CompiledConfig;
use fleet::{HostStatus, StatusReport, collect_status};

use crate::Context;
use crate::cli::StatusArgs;
use crate::progress::HostSpinner;
use crate::transport::SshTransport;
use crate::ui;

pub fn run(ctx: &Context, args: &StatusArgs) -> Result<()> {
    let config = CompiledConfig::load_local(&args.environment)?;
    let transport = SshTransport::new()?;

    let mut spinner = HostSpinner::new(
        |n| format!("Querying {n} host(s) for service status..."),
        ctx.quiet || args.json,
    );
    let report = collect_status(&config, &transport, args.jobs, &mut spinner)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &StatusReport) {
    println!();
    let width = report
        .hosts
        .iter()
        .map(|row| row.host.chars().count())
        .max()
        .unwrap_or(0)
        + 2;
    for row in &report.hosts {
        println!(
            "{}{}  {}",
            ui::column(&row.host, width).bold(),
            ui::status_label(&row.status.label),
            format_services(&row.status).dimmed()
        );
    }
    println!();

    if !report.failed.is_empty() {
        for failed in &report.failed {
            ui::error(&failed.to_string());
        }
        ui::warn(&format!(
            "Unable to query {} host(s): {}",
            report.failed.len(),
            report.failed_hosts().join(", ")
        ));
    }
}

/// `{ web: active, worker: inactive }`
fn format_services(status: &HostStatus) -> String {
    let pairs: Vec<String> = status
        .services
        .iter()
        .map(|(service, state)| format!("{service}: {state}"))
        .collect();
    format!("{{ {} }}", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet::StatusLabel;
    use std::collections::BTreeMap;

    #[test]
    fn test_format_services_sorted() {
        let status = HostStatus {
            label: StatusLabel::Other("partial".to_string()),
            services: BTreeMap::from([
                ("worker".to_string(), "inactive".to_string()),
                ("web".to_string(), "active".to_string()),
            ]),
        };

        assert_eq!(format_services(&status), "{ web: active, worker: inactive }");
    }
}
