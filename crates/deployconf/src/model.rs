//! Compiled entities: app, hosts, services, hooks
//!
//! Everything here is read-only once built. Reconfiguring means compiling
//! again and getting a new [`crate::CompiledConfig`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Event name → hook, shared read-only between a config and its hosts
pub type Hooks = Arc<BTreeMap<String, Hook>>;

/// Something with a unique name inside a [`Registry`]
pub trait Named {
    fn name(&self) -> &str;
}

/// The application being deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct App {
    pub name: String,
    /// Absolute path to the application sources
    pub path: PathBuf,
}

/// A script bound to a deployment lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub event_name: String,
    pub script_path: PathBuf,
}

impl Hook {
    pub fn new(event_name: impl Into<String>, script_path: impl Into<PathBuf>) -> Self {
        Self {
            event_name: event_name.into(),
            script_path: script_path.into(),
        }
    }
}

/// A service running on a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    /// Absolute path to the service's settings file, if any
    pub settings_path: Option<PathBuf>,
    /// Environment variables, defaults already merged in
    pub env: BTreeMap<String, String>,
}

impl Named for Service {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Connection details for a host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Private key path, tilde-expanded
    pub pem: Option<PathBuf>,
    pub port: Option<u16>,
}

/// A host in an environment
///
/// `environment`, `app` and `hooks` are copies taken at construction, for
/// attribution only. They are not a live link back into the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub short_name: String,
    pub credentials: Credentials,
    pub services: Registry<Service>,
    pub environment: String,
    pub app: App,
    pub hooks: Hooks,
}

impl Host {
    /// Display alias used when no `shortName` is configured: the first DNS
    /// label, or the whole name for IP addresses
    pub fn default_short_name(name: &str) -> String {
        if name.parse::<std::net::IpAddr>().is_ok() {
            return name.to_string();
        }
        name.split('.')
            .next()
            .filter(|label| !label.is_empty())
            .unwrap_or(name)
            .to_string()
    }

    /// Hook script for an event, if one is configured
    pub fn hook(&self, event: &str) -> Option<&Path> {
        self.hooks.get(event).map(|h| h.script_path.as_path())
    }
}

impl Named for Host {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An ordered collection with unique names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Registry<T> {
    items: Vec<T>,
}

impl<T: Named> Registry<T> {
    /// Build a registry, returning the first repeated name on conflict
    pub fn new(items: Vec<T>) -> Result<Self, String> {
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|prev| prev.name() == item.name()) {
                return Err(item.name().to_string());
            }
        }
        Ok(Self { items })
    }

    /// Look up an item by exact name
    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| item.name() == name)
    }

    /// Check whether an item with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in order
    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Named::name).collect()
    }
}

impl<T> Registry<T> {
    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First item, if any
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// Iterate in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Transform every item, keeping order
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Vec<U> {
        self.items.iter().map(f).collect()
    }

    /// The items as a slice
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
