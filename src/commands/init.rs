//! `flotilla init` - write a starter config for a new environment

use anyhow::{Context as _, Result, bail};
use deployconf::{CompiledConfig, paths};
use serde_json::{Value, json};
use std::path::Path;

use crate::Context;
use crate::cli::InitArgs;
use crate::ui;

pub fn run(ctx: &Context, args: &InitArgs) -> Result<()> {
    let path = paths::expected_config_path(&args.environment)?;
    let app_name = match &args.app_name {
        Some(name) => name.clone(),
        None => default_app_name()?,
    };

    let document = starter_document(&args.environment, &app_name, &args.app_path);
    write_new(&path, &document)?;

    // Refuse to leave behind a document that does not compile
    CompiledConfig::from_file(&path, Some(&args.environment))
        .with_context(|| format!("generated config {} does not compile", path.display()))?;

    ui::success(&format!("Created {}", path.display()));
    if !ctx.quiet {
        ui::dim("Edit the hosts list, then run `flotilla lint` to check it.");
    }
    Ok(())
}

fn default_app_name() -> Result<String> {
    let cwd = paths::current_dir()?;
    Ok(cwd
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app")
        .to_string())
}

/// A minimal document with one placeholder host running one service
fn starter_document(environment: &str, app_name: &str, app_path: &str) -> Value {
    json!({
        "app": {
            "name": app_name,
            "path": app_path,
        },
        "environment": environment,
        "defaults": {
            "hosts": {
                "username": "deploy",
                "services": [ { "name": app_name } ],
            },
            "services": {
                "env": { "PORT": 3000 },
            },
        },
        "hosts": [
            { "name": format!("{app_name}-1.example.com") },
        ],
        "hooks": {
            "--comment": "Map hook events to script paths, relative to this file",
        },
    })
}

/// Write `document` to `path`, creating parent directories; never overwrites
fn write_new(path: &Path, document: &Value) -> Result<()> {
    if path.exists() {
        bail!("{} already exists; not overwriting", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
