//! Compiled configuration and the ways to obtain one

use serde_json::{Value, json};
use std::path::Path;

use crate::compiler::compile;
use crate::error::Result;
use crate::model::{App, Hooks, Host, Registry, Service};
use crate::paths;
use crate::raw::RawConfig;

/// A fully-resolved environment configuration
///
/// Immutable after construction. Paths are absolute and every host and
/// service has its defaults applied; the raw `defaults` section is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledConfig {
    pub app: App,
    pub environment: String,
    pub hosts: Registry<Host>,
    pub hooks: Hooks,
}

impl CompiledConfig {
    /// Compile a source document file, resolving paths against its directory
    ///
    /// `environment` is used only when the document does not name one.
    pub fn from_file(path: &Path, environment: Option<&str>) -> Result<Self> {
        let raw = RawConfig::load(path)?.with_fallback_environment(environment);
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        log::debug!("Loading config from {}", path.display());
        compile(raw, base)
    }

    /// Compile an in-memory document, resolving paths against the working directory
    pub fn from_value(value: Value, environment: Option<&str>) -> Result<Self> {
        let raw = RawConfig::from_value(value)?.with_fallback_environment(environment);
        compile(raw, &paths::current_dir()?)
    }

    /// Load an environment's document from the deploy directory
    pub fn load_local(environment: &str) -> Result<Self> {
        let path = paths::expected_config_path(environment)?;
        Self::from_file(&path, Some(environment))
    }

    /// Services of a host, empty when the host is unknown
    pub fn services(&self, host: &str) -> &[Service] {
        self.hosts
            .get(host)
            .map(|h| h.services.as_slice())
            .unwrap_or_default()
    }

    /// One service on one host
    pub fn service(&self, host: &str, service: &str) -> Option<&Service> {
        self.hosts.get(host).and_then(|h| h.services.get(service))
    }

    /// JSON view of the compiled configuration
    ///
    /// Roughly the reverse of loading, minus the `defaults` section, which
    /// has already been folded into every host and service.
    pub fn to_json(&self) -> Value {
        let hosts: Vec<Value> = self.hosts.map(|host| {
            json!({
                "name": host.name,
                "shortName": host.short_name,
                "username": host.credentials.username,
                "services": host.services,
            })
        });

        let hooks: serde_json::Map<String, Value> = self
            .hooks
            .iter()
            .map(|(event, hook)| (event.clone(), json!(hook.script_path)))
            .collect();

        json!({
            "environment": self.environment,
            "app": self.app,
            "hosts": hosts,
            "hooks": hooks,
        })
    }
}
