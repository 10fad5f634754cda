//! `flotilla show` - compiled configuration as JSON

use anyhow::Result;
use deployconf::CompiledConfig;

pub fn run(environment: &str) -> Result<()> {
    let config = CompiledConfig::load_local(environment)?;
    println!("{}", serde_json::to_string_pretty(&config.to_json())?);
    Ok(())
}
