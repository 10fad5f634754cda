//! `flotilla history` - merged release history across an environment

use anyhow::{Result, bail};
use colored::Colorize;
use deployconf::CompiledConfig;
use fleet::{Coverage, HistoryEntry, HistoryQuery, HistoryReport, collect_history};
use serde_json::json;

use crate::Context;
use crate::cli::HistoryArgs;
use crate::progress::HostSpinner;
use crate::transport::SshTransport;
use crate::ui;

const RELEASE_WIDTH: usize = 24;

pub fn run(ctx: &Context, args: &HistoryArgs) -> Result<()> {
    let config = CompiledConfig::load_local(&args.environment)?;
    let query = HistoryQuery {
        host: args.host.clone(),
        all: args.all,
        current: args.current,
        previous: args.previous,
    };
    let transport = SshTransport::new()?;

    let single_name = args.current || args.previous;
    let mut spinner = HostSpinner::new(
        |n| format!("Pulling history from {n} host(s)..."),
        ctx.quiet || args.json || single_name,
    );
    let report = collect_history(&config, &transport, &query, args.jobs, &mut spinner)?;

    if single_name {
        return print_single(&report, args.current);
    }
    if args.json {
        let doc = json!({
            "environment": report.environment,
            "releases": report.entries(),
            "failed": report.failed,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    print_table(&report);
    Ok(())
}

/// `--current` / `--previous`: just the release name, for scripts
fn print_single(report: &HistoryReport, current: bool) -> Result<()> {
    let (found, which) = if current {
        (report.current(), "current")
    } else {
        (report.previous(), "previous")
    };

    for failed in &report.failed {
        log::warn!("{failed}");
    }

    match found {
        Some(release) => {
            println!("{}", release.name);
            Ok(())
        }
        None => bail!(
            "no {which} release found for environment '{}'",
            report.environment
        ),
    }
}

fn print_table(report: &HistoryReport) {
    println!();
    println!(
        "  {}{}",
        ui::column("Release", RELEASE_WIDTH).yellow().bold().underline(),
        "Hosts".yellow().bold().underline()
    );

    let entries = report.entries();
    if entries.is_empty() {
        ui::dim("no releases found");
    }
    for entry in &entries {
        println!("  {}", format_entry(entry));
    }

    println!("  {}", "* currents highlighted".dimmed());
    println!();

    if !report.failed.is_empty() {
        println!(
            "  {} Unable to query hosts: {}",
            "=> Failure:".red().bold(),
            report.failed_hosts().join(", ")
        );
        for failed in &report.failed {
            log::info!("{failed}");
        }
        println!();
    }
}

fn format_entry(entry: &HistoryEntry<'_>) -> String {
    let release = entry.release;
    let mut name = ui::column(&release.name, RELEASE_WIDTH).normal();
    if release.current {
        name = name.cyan().bold();
    }

    let count = release.host_names.len();
    match entry.coverage {
        Coverage::Complete => format!("{name}All  ({count})"),
        Coverage::Partial => {
            let hosts: Vec<&str> = release.hosts.iter().map(String::as_str).collect();
            format!(
                "{}Some ({count}) {}",
                name.italic(),
                hosts.join(", ").dimmed()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet::MergedRelease;
    use std::collections::BTreeSet;

    fn release(name: &str, hosts: &[&str], current: bool) -> MergedRelease {
        let hosts: BTreeSet<String> = hosts.iter().map(|h| (*h).to_string()).collect();
        MergedRelease {
            name: name.to_string(),
            host_names: hosts.iter().map(|h| format!("{h}.example.com")).collect(),
            hosts,
            current,
        }
    }

    #[test]
    fn test_format_complete_entry() {
        colored::control::set_override(false);
        let release = release("r2", &["app1", "app2"], true);
        let entry = HistoryEntry {
            release: &release,
            coverage: Coverage::Complete,
        };

        let line = format_entry(&entry);

        assert!(line.starts_with("r2 "));
        assert!(line.ends_with("All  (2)"));
    }

    #[test]
    fn test_format_partial_entry_lists_hosts() {
        colored::control::set_override(false);
        let release = release("r1", &["app2", "app1"], false);
        let entry = HistoryEntry {
            release: &release,
            coverage: Coverage::Partial,
        };

        let line = format_entry(&entry);

        assert!(line.ends_with("Some (2) app1, app2"));
    }

    #[test]
    fn test_shared_alias_counts_every_host() {
        colored::control::set_override(false);
        let mut release = release("r3", &["web"], true);
        release.host_names = BTreeSet::from([
            "web.us.example.com".to_string(),
            "web.eu.example.com".to_string(),
        ]);
        let entry = HistoryEntry {
            release: &release,
            coverage: Coverage::Complete,
        };

        assert!(format_entry(&entry).ends_with("All  (2)"));
    }
}
