//! # Deployconf
//!
//! Compile a declarative environment description into per-host,
//! per-service deploy configuration.
//!
//! A source document names the app, its hosts and the services on each
//! host, plus a `defaults` section. Compilation applies those defaults one
//! level deep, merges service env variables per key, resolves every path
//! against the document's directory and throws the `defaults` away.
//!
//! ## Example
//!
//! ```
//! use deployconf::{RawConfig, compile};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let raw = RawConfig::from_value(json!({
//!     "app": { "name": "shop", "path": "../app" },
//!     "environment": "staging",
//!     "defaults": { "hosts": { "username": "deploy" } },
//!     "hosts": [ { "name": "app1.example.com" } ]
//! }))?;
//!
//! let config = compile(raw, Path::new("/srv/shop/deploy"))?;
//! assert_eq!(config.app.path, Path::new("/srv/shop/app"));
//! assert_eq!(config.hosts.first().unwrap().short_name, "app1");
//! # Ok::<(), deployconf::Error>(())
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod paths;
pub mod raw;

// Re-export main types at crate root
pub use compiler::compile;
pub use config::CompiledConfig;
pub use error::{Error, Result};
pub use model::{App, Credentials, Hook, Hooks, Host, Named, Registry, Service};
pub use raw::{RawApp, RawConfig, RawDefaults};
