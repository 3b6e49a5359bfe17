//! Implementation of the `shellican import` command.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use reqwest::Response;
use url::Url;
use walkdir::WalkDir;

use crate::{
    archive::{self, ArchiveFormat},
    commands::ColorChoice,
    config::COLLECTION_FILE_NAME,
    diagnostics::Diagnostics,
    error::{Error, Result},
    paths::{display_path, root_dir, validate_name},
};

/// Maximum download size in bytes (10 MB).
const MAX_DOWNLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Suffixes stripped from a source when inferring the collection name.
const NAME_SUFFIXES: [&str; 4] = [".git", ".tar.gz", ".tgz", ".zip"];

/// Where an import reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    /// An archive fetched over HTTPS.
    Download {
        /// Archive URL.
        url: String,
        /// Archive format.
        format: ArchiveFormat,
    },
    /// A git repository cloned with the `git` binary.
    Git(String),
    /// A local archive file.
    Archive {
        /// Archive path.
        path: PathBuf,
        /// Archive format.
        format: ArchiveFormat,
    },
    /// A local directory copied recursively.
    Folder(PathBuf),
}

impl Source {
    /// Classify a source string.
    fn classify(source: &str) -> Result<Self> {
        let is_url = source.starts_with("http://") || source.starts_with("https://");
        if is_url && let Some(format) = ArchiveFormat::detect(source) {
            return Ok(Self::Download {
                url: source.to_string(),
                format,
            });
        }
        if is_url || source.starts_with("git@") || source.ends_with(".git") {
            return Ok(Self::Git(source.to_string()));
        }

        let path = PathBuf::from(source);
        if path.is_dir() {
            return Ok(Self::Folder(path));
        }
        if path.is_file()
            && let Some(format) = ArchiveFormat::detect(source)
        {
            return Ok(Self::Archive { path, format });
        }
        Err(Error::UnknownSource {
            source_path: source.to_string(),
        })
    }
}

/// Execute the import command.
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    source: String,
    name: Option<String>,
) -> Result<()> {
    let root = root_dir()?;
    let mut diagnostics = Diagnostics::new(verbose, color.enabled());

    let name = match name {
        Some(name) => {
            validate_name(&name)?;
            name
        }
        None => infer_name(&source)?,
    };

    println!("Importing '{name}' from {source}");
    let path = import(&root, &source, &name, &mut diagnostics).await?;
    println!("Collection '{name}' imported to {}", display_path(&path));

    diagnostics.print_warning_summary();
    Ok(())
}

/// Infer a collection name from the last component of a source.
pub(crate) fn infer_name(source: &str) -> Result<String> {
    let trimmed = source.trim_end_matches(['/', '\\']);
    let base = trimmed.rsplit(['/', '\\', ':']).next().unwrap_or(trimmed);
    let name = NAME_SUFFIXES
        .iter()
        .find_map(|suffix| base.strip_suffix(suffix))
        .unwrap_or(base);
    validate_name(name)?;
    Ok(name.to_string())
}

/// Import `source` as collection `name` under `root`.
///
/// A failed import removes whatever it created.
pub(crate) async fn import(
    root: &Path,
    source: &str,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<PathBuf> {
    let kind = Source::classify(source)?;
    let target = root.join(name);
    if target.exists() {
        return Err(Error::CollectionExists { path: target });
    }
    fs::create_dir_all(root).map_err(|error| Error::ConfigWrite {
        path: root.to_path_buf(),
        source: error,
    })?;

    diagnostics.note(format!("Importing into {}", display_path(&target)));
    let outcome = match kind {
        Source::Download { url, format } => match download_source(&url).await {
            Ok(data) => archive::extract(&data, format, &target, Path::new(&url)),
            Err(error) => Err(error),
        },
        Source::Git(url) => git_clone(&url, &target),
        Source::Archive { path, format } => fs::read(&path)
            .map_err(|error| Error::ArchiveRead {
                path: path.clone(),
                message: error.to_string(),
            })
            .and_then(|data| archive::extract(&data, format, &target, &path)),
        Source::Folder(path) => copy_dir(&path, &target),
    };

    if let Err(error) = outcome {
        remove_partial(&target, diagnostics);
        return Err(error);
    }

    if !target.join(COLLECTION_FILE_NAME).is_file() {
        diagnostics.warn(format!(
            "imported collection has no {COLLECTION_FILE_NAME}; its runnables cannot be run until one is added"
        ));
    }
    Ok(target)
}

/// Download an archive over HTTPS.
async fn download_source(url_str: &str) -> Result<Vec<u8>> {
    let url = Url::parse(url_str).map_err(|_| Error::InvalidUrl {
        url: url_str.to_string(),
    })?;

    // Reject HTTP
    if url.scheme() == "http" {
        return Err(Error::HttpNotAllowed {
            url: url_str.to_string(),
        });
    }

    let response = reqwest::get(url)
        .await
        .and_then(Response::error_for_status)
        .map_err(|error| Error::Download {
            url: url_str.to_string(),
            message: error.to_string(),
        })?;

    if let Some(len) = response.content_length()
        && len > MAX_DOWNLOAD_SIZE
    {
        return Err(Error::FileTooLarge {
            size: len,
            max: MAX_DOWNLOAD_SIZE,
        });
    }

    let bytes = response.bytes().await.map_err(|error| Error::Download {
        url: url_str.to_string(),
        message: error.to_string(),
    })?;

    let size = bytes.len() as u64;
    if size > MAX_DOWNLOAD_SIZE {
        return Err(Error::FileTooLarge {
            size,
            max: MAX_DOWNLOAD_SIZE,
        });
    }
    Ok(bytes.to_vec())
}

/// Clone a repository with the system `git`.
fn git_clone(url: &str, target: &Path) -> Result<()> {
    let status = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(target)
        .stdin(Stdio::null())
        .status()
        .map_err(|error| Error::ImportFailed {
            source_path: url.to_string(),
            message: if error.kind() == ErrorKind::NotFound {
                "git is not installed".to_string()
            } else {
                format!("failed to run git: {error}")
            },
        })?;

    if !status.success() {
        return Err(Error::ImportFailed {
            source_path: url.to_string(),
            message: format!("git clone exited with {status}"),
        });
    }
    Ok(())
}

/// Recursively copy a directory, keeping file permissions.
fn copy_dir(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target).map_err(|error| Error::ConfigWrite {
        path: target.to_path_buf(),
        source: error,
    })?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|error| Error::ImportFailed {
            source_path: source.display().to_string(),
            message: error.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| Error::ImportFailed {
                source_path: source.display().to_string(),
                message: "failed to compute relative path".to_string(),
            })?;
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|error| Error::ConfigWrite {
                path: dest.clone(),
                source: error,
            })?;
        } else if entry.file_type().is_symlink() {
            copy_link(entry.path(), &dest)?;
        } else {
            // fs::copy carries the permission bits over.
            fs::copy(entry.path(), &dest).map_err(|error| Error::ConfigWrite {
                path: dest.clone(),
                source: error,
            })?;
        }
    }
    Ok(())
}

/// Recreate a symlink at `dest` pointing where `source` points.
#[cfg(unix)]
fn copy_link(source: &Path, dest: &Path) -> Result<()> {
    use std::os::unix::fs::symlink;

    let link = fs::read_link(source).map_err(|error| Error::Io {
        path: source.to_path_buf(),
        source: error,
    })?;
    symlink(&link, dest).map_err(|error| Error::ConfigWrite {
        path: dest.to_path_buf(),
        source: error,
    })
}

/// Without unix symlinks, copy what the link points at.
#[cfg(not(unix))]
fn copy_link(source: &Path, dest: &Path) -> Result<()> {
    if source.is_dir() {
        return copy_dir(source, dest);
    }
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|error| Error::ConfigWrite {
            path: dest.to_path_buf(),
            source: error,
        })
}

/// Remove a partially imported collection.
fn remove_partial(target: &Path, diagnostics: &mut Diagnostics) {
    if !target.exists() {
        return;
    }
    if let Err(error) = fs::remove_dir_all(target) {
        diagnostics.warn(format!(
            "failed to clean up {}: {error}",
            display_path(target)
        ));
    }
}
