//! Path resolution and the on-disk location convention
//!
//! Each environment has exactly one source document:
//! `<cwd>/deploy/<environment>.flotilla.json`.
//!
//! # Environment Variables
//!
//! - `FLOTILLA_DEPLOY_DIR` - Override the deploy directory (tilde-expanded;
//!   relative values resolve against the working directory)

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable for deploy directory override
pub const ENV_DEPLOY_DIR: &str = "FLOTILLA_DEPLOY_DIR";

/// Default deploy directory name, relative to the working directory
pub const DEFAULT_DEPLOY_DIR: &str = "deploy";

/// File name suffix of an environment's source document
pub const CONFIG_SUFFIX: &str = ".flotilla.json";

/// Get the deploy directory for this process
///
/// Priority:
/// 1. `FLOTILLA_DEPLOY_DIR` env var
/// 2. `<cwd>/deploy`
pub fn deploy_dir() -> Result<PathBuf> {
    let cwd = current_dir()?;
    Ok(deploy_dir_from(std::env::var(ENV_DEPLOY_DIR).ok(), &cwd))
}

/// Resolve the deploy directory from an optional override and a working directory
pub fn deploy_dir_from(override_dir: Option<String>, cwd: &Path) -> PathBuf {
    match override_dir.filter(|d| !d.trim().is_empty()) {
        Some(dir) => {
            let expanded = shellexpand::tilde(&dir);
            let path = resolve_path(cwd, expanded.as_ref());
            log::debug!("Using deploy dir from {}: {}", ENV_DEPLOY_DIR, path.display());
            path
        }
        None => cwd.join(DEFAULT_DEPLOY_DIR),
    }
}

/// The expected source document path for an environment
pub fn expected_config_path(environment: &str) -> Result<PathBuf> {
    Ok(config_path_in(&deploy_dir()?, environment))
}

/// The source document path for an environment inside `dir`
pub fn config_path_in(dir: &Path, environment: &str) -> PathBuf {
    dir.join(format!("{environment}{CONFIG_SUFFIX}"))
}

/// List environment names that have a source document in `dir`, sorted
pub fn list_environments(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(Error::DeployDirNotFound(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str().and_then(|n| n.strip_suffix(CONFIG_SUFFIX))
            && !name.is_empty()
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Resolve `raw` against `base` into a normalized path
///
/// Absolute `raw` values are only normalized. `base` is expected to be
/// absolute already; see [`absolute_dir`].
pub fn resolve_path(base: &Path, raw: &str) -> PathBuf {
    normalize(&base.join(raw))
}

/// Make a directory path absolute against the working directory
pub fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        Ok(normalize(dir))
    } else {
        Ok(normalize(&current_dir()?.join(dir)))
    }
}

/// The process working directory
pub fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|source| Error::Io {
        path: PathBuf::from("."),
        source,
    })
}

/// Lexically collapse `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !matches!(out.components().next_back(), Some(Component::RootDir) | None) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
