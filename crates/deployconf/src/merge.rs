//! One-level default merging
//!
//! Defaults fill in keys that an entry leaves out. A key the entry sets is
//! never touched, whatever its value, and nested objects are not merged
//! recursively. The one exception is a service's `env`, which gets its own
//! one-level pass in [`merge_env`].

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Fill keys missing from `entry` with clones of the values in `defaults`
pub fn apply_defaults(entry: &mut Map<String, Value>, defaults: &Map<String, Value>) {
    for (key, value) in defaults {
        if !entry.contains_key(key) {
            entry.insert(key.clone(), value.clone());
        }
    }
}

/// Merge a service's env on top of the default env, per key
///
/// Service keys win; default keys the service does not list are inherited.
/// Numbers and booleans are stringified. A `null` on the service removes
/// the variable instead of inheriting the default.
pub fn merge_env(
    service: &str,
    env: Option<&Value>,
    defaults: Option<&Value>,
) -> Result<BTreeMap<String, String>> {
    let mut merged = Map::new();
    if let Some(Value::Object(env)) = env {
        merged.clone_from(env);
    }
    if let Some(Value::Object(defaults)) = defaults {
        apply_defaults(&mut merged, defaults);
    }

    let mut out = BTreeMap::new();
    for (key, value) in merged {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::InvalidEnvValue {
                    service: service.to_string(),
                    key,
                });
            }
        };
        out.insert(key, value);
    }
    Ok(out)
}
