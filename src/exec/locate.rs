//! Wrapped binary resolution

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static HELM_COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*helm[23]?$").expect("valid regex"));

/// Name of the binary to wrap when invoked as `invoked_as`.
///
/// Installed as `helm` (or `helm2`/`helm3`) the wrapper delegates to the
/// same name with one more leading underscore, so wrappers can be chained:
/// `helm` → `_helm` → `__helm`. Any other name wraps plain `helm`.
pub fn wrapped_binary_name(invoked_as: &str) -> String {
    if HELM_COMMAND.is_match(invoked_as) {
        format!("_{invoked_as}")
    } else {
        "helm".to_string()
    }
}

/// Pick the binary to run: the configured one, or the one derived from argv[0].
pub fn resolve_binary(configured: Option<&Path>, argv0: &OsStr) -> Result<PathBuf> {
    let name = match configured {
        Some(path) => path.to_path_buf(),
        None => {
            let invoked_as =
                Path::new(argv0).file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            PathBuf::from(wrapped_binary_name(&invoked_as))
        }
    };

    find_executable(&name, env::var_os("PATH").as_deref())
        .ok_or_else(|| Error::BinaryNotFound { name: name.display().to_string() })
}

/// Look `name` up on `path_var` unless it already contains a separator.
pub fn find_executable(name: &Path, path_var: Option<&OsStr>) -> Option<PathBuf> {
    if name.components().count() > 1 || name.is_absolute() {
        return is_executable(name).then(|| name.to_path_buf());
    }

    env::split_paths(path_var?)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata().map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
