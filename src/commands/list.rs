//! `flotilla list` - environments with a config in the deploy directory

use anyhow::Result;
use colored::Colorize;
use deployconf::paths;

use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let dir = paths::deploy_dir()?;
    let environments = paths::list_environments(&dir)?;

    if !ctx.quiet {
        ui::header("Environments");
        ui::kv("Deploy dir", &dir.display().to_string());
        println!();
    }

    if environments.is_empty() {
        ui::info("No environments found. Run `flotilla init <environment>` to create one.");
        return Ok(());
    }

    for environment in &environments {
        if ctx.quiet {
            println!("{environment}");
        } else {
            let file = paths::config_path_in(&dir, environment);
            println!("  {} {}", "•".cyan(), environment.bold());
            ui::dim(&format!("  {}", file.display()));
        }
    }

    Ok(())
}
