//! Implementation of the `shellican create-shell` command.

use std::{
    fs,
    path::{Path, PathBuf},
};

use inquire::{Confirm, error::InquireError};
use minijinja::context;

use crate::{
    error::{Error, Result},
    paths::{display_path, root_dir, validate_name},
    templates,
};

/// Execute the create-shell command.
pub async fn run(collection: String, name: Option<String>, force: bool) -> Result<()> {
    let root = root_dir()?;
    if !root.join(&collection).is_dir() {
        return Err(Error::CollectionNotFound { name: collection });
    }

    let home = dirs::home_dir().ok_or(Error::HomeDirMissing)?;
    let bin_dir = home.join(".local").join("bin");
    let helper_name = name.unwrap_or_else(|| format!("{collection}-shell"));

    let path = write_helper(&bin_dir, &collection, &helper_name, force, confirm_overwrite)?;
    println!("Helper created at: {}", display_path(&path));
    println!("Shell helper for '{collection}' created successfully.");
    Ok(())
}

/// Render the helper script for a collection.
pub(crate) fn helper_script(collection: &str) -> Result<String> {
    templates::render(templates::SHELL_HELPER, context! { collection => collection })
}

/// Write an executable helper into `bin_dir`.
///
/// `confirm` is consulted when the helper exists and `force` is off.
pub(crate) fn write_helper(
    bin_dir: &Path,
    collection: &str,
    helper_name: &str,
    force: bool,
    confirm: impl Fn(&Path) -> Result<bool>,
) -> Result<PathBuf> {
    if cfg!(not(unix)) {
        return Err(Error::UnsupportedPlatform {
            operation: "create-shell",
        });
    }
    validate_name(helper_name)?;
    if !bin_dir.is_dir() {
        return Err(Error::BinDirMissing {
            path: bin_dir.to_path_buf(),
        });
    }

    let path = bin_dir.join(helper_name);
    if path.exists() && !force && !confirm(&path)? {
        return Err(Error::PathExists { path });
    }

    let script = helper_script(collection)?;
    fs::write(&path, script).map_err(|error| Error::ConfigWrite {
        path: path.clone(),
        source: error,
    })?;
    make_executable(&path)?;
    Ok(path)
}

/// Set mode 0755 on a written helper.
#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|error| {
        Error::ConfigWrite {
            path: path.to_path_buf(),
            source: error,
        }
    })
}

/// Helpers are only written on unix.
#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Ask before replacing an existing helper.
fn confirm_overwrite(path: &Path) -> Result<bool> {
    let message = format!("{} already exists. Overwrite?", display_path(path));
    match Confirm::new(&message).with_default(false).prompt() {
        Ok(value) => Ok(value),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            Err(Error::PromptCanceled)
        }
        Err(error) => Err(Error::PromptFailed {
            message: error.to_string(),
        }),
    }
}
