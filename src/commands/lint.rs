//! `flotilla lint` - compile an environment and check what it points at

use anyhow::{Result, bail};
use colored::Colorize;
use deployconf::CompiledConfig;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, environment: &str) -> Result<()> {
    // Compile errors (bad JSON, bad env values, duplicates) surface here
    let config = CompiledConfig::load_local(environment)?;

    ui::header(&format!("Environment: {}", config.environment));
    ui::kv("App", &config.app.name);
    ui::kv("Path", &config.app.path.display().to_string());
    ui::kv("Hosts", &config.hosts.len().to_string());

    ui::section("Hosts");
    for host in &config.hosts {
        let login = host
            .credentials
            .username
            .as_deref()
            .map_or_else(String::new, |user| format!("{user}@"));
        println!(
            "  {} {}{} {}",
            "•".cyan(),
            login.dimmed(),
            host.name.bold(),
            format!("({})", host.short_name).dimmed()
        );
        for service in &host.services {
            println!("      {}", service.name);
            if ctx.verbose > 0 {
                for (key, value) in &service.env {
                    ui::dim(&format!("      {key}={value}"));
                }
            }
        }
    }

    if !config.hooks.is_empty() {
        ui::section("Hooks");
        for (event, hook) in config.hooks.iter() {
            ui::kv(event, &hook.script_path.display().to_string());
        }
    }

    println!();
    let problems = find_problems(&config, environment);
    if problems.is_empty() {
        ui::success("Configuration is valid");
        return Ok(());
    }

    for problem in &problems {
        ui::warn(problem);
    }
    bail!("{} problem(s) found in '{environment}'", problems.len())
}

/// Things that compile fine but will not work at deploy time
fn find_problems(config: &CompiledConfig, environment: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if config.environment != environment {
        problems.push(format!(
            "document names environment '{}' but is stored as '{environment}'",
            config.environment
        ));
    }
    if !config.app.path.is_dir() {
        problems.push(format!(
            "app path {} does not exist",
            config.app.path.display()
        ));
    }
    if config.hosts.is_empty() {
        problems.push("no hosts defined".to_string());
    }

    for host in &config.hosts {
        if host.services.is_empty() {
            problems.push(format!("host '{}' has no services", host.name));
        }
        if let Some(pem) = &host.credentials.pem
            && !pem.is_file()
        {
            problems.push(format!(
                "host '{}': pem file {} does not exist",
                host.name,
                pem.display()
            ));
        }
        for service in &host.services {
            if let Some(settings) = &service.settings_path
                && !settings.is_file()
            {
                problems.push(format!(
                    "service '{}' on '{}': settings file {} does not exist",
                    service.name,
                    host.name,
                    settings.display()
                ));
            }
        }
    }

    for (event, hook) in config.hooks.iter() {
        if !hook.script_path.is_file() {
            problems.push(format!(
                "hook '{event}': script {} does not exist",
                hook.script_path.display()
            ));
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn compile_in(dir: &TempDir, document: &str) -> CompiledConfig {
        let path = dir.path().join("staging.flotilla.json");
        std::fs::write(&path, document).unwrap();
        CompiledConfig::from_file(&path, Some("staging")).unwrap()
    }

    #[test]
    fn test_clean_config_has_no_problems() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("web.settings.json"), "{}").unwrap();
        std::fs::write(dir.path().join("pre.sh"), "#!/bin/sh\n").unwrap();

        let config = compile_in(
            &dir,
            r#"{
                "app": { "name": "shop", "path": "." },
                "hosts": [ { "name": "app1", "services": [ { "name": "web", "settingsPath": "web.settings.json" } ] } ],
                "hooks": { "preDeploy": "pre.sh" }
            }"#,
        );

        assert!(find_problems(&config, "staging").is_empty());
    }

    #[test]
    fn test_missing_files_are_reported() {
        let dir = TempDir::new().unwrap();
        let config = compile_in(
            &dir,
            r#"{
                "app": { "name": "shop", "path": "./missing-app" },
                "hosts": [
                    { "name": "app1", "services": [ { "name": "web", "settingsPath": "nope.json" } ] },
                    { "name": "app2" }
                ],
                "hooks": { "postDeploy": "hooks/post.sh" }
            }"#,
        );

        let problems = find_problems(&config, "staging");

        assert_eq!(problems.len(), 4);
        assert!(problems[0].starts_with("app path"));
        assert!(problems.iter().any(|p| p.contains("settings file")));
        assert!(problems.iter().any(|p| p == "host 'app2' has no services"));
        assert!(problems.iter().any(|p| p.starts_with("hook 'postDeploy'")));
    }

    #[test]
    fn test_environment_name_mismatch() {
        let dir = TempDir::new().unwrap();
        let config = compile_in(
            &dir,
            r#"{
                "app": { "name": "shop", "path": "." },
                "environment": "production",
                "hosts": [ { "name": "app1", "services": [ { "name": "web" } ] } ]
            }"#,
        );

        let problems = find_problems(&config, "staging");

        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("'production'"));
    }
}
