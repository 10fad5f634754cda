//! Compile a raw document into a fully-resolved configuration
//!
//! Compilation:
//! 1. Resolves `app.path` against the base directory
//! 2. Applies `defaults.hosts` to every host entry (one level deep)
//! 3. Applies `defaults.services` to every service entry, resolves its
//!    `settingsPath` and merges its `env` per key over the default env
//! 4. Resolves hook script paths, skipping comments and empty entries
//! 5. Drops the `defaults` section

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::CompiledConfig;
use crate::error::{Error, Result};
use crate::merge::{apply_defaults, merge_env};
use crate::model::{App, Credentials, Hook, Hooks, Host, Registry, Service};
use crate::paths::{absolute_dir, resolve_path};
use crate::raw::{COMMENT_KEY, RawConfig, RawDefaults};

/// Host entry after defaulting, as far as the typed model cares
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostEntry {
    name: String,
    short_name: Option<String>,
    username: Option<String>,
    password: Option<String>,
    pem: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    services: Vec<Map<String, Value>>,
}

/// Service entry after defaulting; `env` is merged separately
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEntry {
    name: String,
    settings_path: Option<String>,
}

/// Compile `raw` with relative paths resolved against `base_dir`
///
/// `base_dir` is made absolute against the working directory first. The
/// environment name must be present on the document; see
/// [`RawConfig::with_fallback_environment`].
pub fn compile(raw: RawConfig, base_dir: &Path) -> Result<CompiledConfig> {
    let base = absolute_dir(base_dir)?;
    let RawConfig {
        app,
        environment,
        defaults,
        hosts,
        hooks,
    } = raw;

    let environment = environment
        .filter(|e| !e.is_empty())
        .ok_or(Error::MissingEnvironment)?;

    let app = App {
        path: resolve_path(&base, &app.path),
        name: app.name,
    };

    let hooks: Hooks = Arc::new(compile_hooks(&hooks, &base)?);

    log::debug!(
        "compiling '{}' ({environment}): {} host(s), base {}",
        app.name,
        hosts.len(),
        base.display()
    );

    let compiled_hosts = hosts
        .into_iter()
        .map(|entry| compile_host(entry, &defaults, &base, &environment, &app, &hooks))
        .collect::<Result<Vec<_>>>()?;

    let hosts = Registry::new(compiled_hosts).map_err(Error::DuplicateHost)?;

    Ok(CompiledConfig {
        app,
        environment,
        hosts,
        hooks,
    })
}

fn compile_host(
    mut entry: Map<String, Value>,
    defaults: &RawDefaults,
    base: &Path,
    environment: &str,
    app: &App,
    hooks: &Hooks,
) -> Result<Host> {
    apply_defaults(&mut entry, &defaults.hosts);

    let entry: HostEntry =
        serde_json::from_value(Value::Object(entry)).map_err(|source| Error::Schema {
            what: "host entry".to_string(),
            source,
        })?;

    let services = entry
        .services
        .into_iter()
        .map(|service| compile_service(service, &defaults.services, base))
        .collect::<Result<Vec<_>>>()?;

    let services = Registry::new(services).map_err(|service| Error::DuplicateService {
        host: entry.name.clone(),
        service,
    })?;

    let short_name = entry
        .short_name
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Host::default_short_name(&entry.name));

    Ok(Host {
        short_name,
        credentials: Credentials {
            username: entry.username,
            password: entry.password,
            pem: entry
                .pem
                .map(|pem| PathBuf::from(shellexpand::tilde(&pem).as_ref())),
            port: entry.port,
        },
        services,
        environment: environment.to_string(),
        app: app.clone(),
        hooks: Arc::clone(hooks),
        name: entry.name,
    })
}

fn compile_service(
    mut entry: Map<String, Value>,
    defaults: &Map<String, Value>,
    base: &Path,
) -> Result<Service> {
    apply_defaults(&mut entry, defaults);

    let env_value = entry.remove("env");
    let parsed: ServiceEntry =
        serde_json::from_value(Value::Object(entry)).map_err(|source| Error::Schema {
            what: "service entry".to_string(),
            source,
        })?;

    // The env gets its own per-key pass, independent of the outer defaults
    let env = merge_env(&parsed.name, env_value.as_ref(), defaults.get("env"))?;

    Ok(Service {
        settings_path: parsed
            .settings_path
            .filter(|p| !p.is_empty())
            .map(|p| resolve_path(base, &p)),
        name: parsed.name,
        env,
    })
}

fn compile_hooks(hooks: &Map<String, Value>, base: &Path) -> Result<BTreeMap<String, Hook>> {
    let mut compiled = BTreeMap::new();
    for (event, value) in hooks {
        if event == COMMENT_KEY {
            continue;
        }
        match value {
            Value::Null => {}
            Value::String(script) if script.is_empty() => {}
            Value::String(script) => {
                compiled.insert(event.clone(), Hook::new(event, resolve_path(base, script)));
            }
            _ => {
                return Err(Error::InvalidHook {
                    event: event.clone(),
                });
            }
        }
    }
    Ok(compiled)
}
