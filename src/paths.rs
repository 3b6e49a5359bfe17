//! Root directory resolution and path helpers.

use std::{
    env,
    path::{MAIN_SEPARATOR, Path, PathBuf, absolute},
};

use path_clean::PathClean;

use crate::error::{Error, Result};

/// Environment variable that relocates the root directory.
pub const HOME_OVERRIDE_VAR: &str = "SHELLICAN_HOME";

/// Directory name that holds all collections.
pub const ROOT_DIR_NAME: &str = ".shellican";

/// Resolve the root directory from the process environment.
pub fn root_dir() -> Result<PathBuf> {
    let override_dir = env::var(HOME_OVERRIDE_VAR).ok();
    root_from(override_dir.as_deref(), dirs::home_dir())
}

/// Compute the root directory from an optional override and a home directory.
///
/// An empty override counts as unset. A relative override is anchored at the
/// current directory. Nothing is created on disk.
pub fn root_from(override_dir: Option<&str>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(raw) = override_dir.filter(|value| !value.is_empty()) {
        let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
        let base = absolute(&expanded).map_err(|error| Error::Io {
            path: expanded,
            source: error,
        })?;
        return Ok(base.join(ROOT_DIR_NAME));
    }
    let home = home.ok_or(Error::HomeDirMissing)?;
    Ok(home.join(ROOT_DIR_NAME))
}

/// Normalize a path for comparisons by cleaning and canonicalizing when possible.
pub fn normalize_path(path: &Path) -> PathBuf {
    match dunce::canonicalize(path) {
        Ok(canonical) => canonical,
        Err(_) => path.clean(),
    }
}

/// Render a path for display, using a tilde prefix for the home directory.
pub fn display_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~{}{}", MAIN_SEPARATOR, stripped.display());
    }
    path.display().to_string()
}

/// Check that a name can be used as a single directory component.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name.contains('/') || name.contains(MAIN_SEPARATOR) {
        Some("name must not contain path separators")
    } else if name.starts_with('.') {
        Some("name must not start with '.'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
