//! Error types for the shellican CLI.

use std::{
    io,
    path::PathBuf,
    process::{ExitCode, ExitStatus},
    result::Result as StdResult,
};

use thiserror::Error;

/// Result type for shellican operations.
pub type Result<T> = StdResult<T, Error>;

/// Why a spawned hook or main action did not succeed.
#[derive(Debug, Error)]
pub enum ProcessFailure {
    /// The process could not be started.
    #[error("failed to spawn: {0}")]
    Spawn(#[source] io::Error),
    /// The process ran but exited unsuccessfully.
    #[error("exited with {0}")]
    Status(ExitStatus),
}

/// Errors that can occur while running the CLI.
#[derive(Debug, Error)]
pub enum Error {
    /// Home directory resolution failed.
    #[error("Failed to resolve the home directory.")]
    HomeDirMissing,
    /// The requested collection directory does not exist.
    #[error("Collection not found: {name}")]
    CollectionNotFound {
        /// Requested collection name.
        name: String,
    },
    /// The collection directory exists but carries no collection.yml.
    #[error("Collection '{name}' has no collection.yml at {path}")]
    CollectionConfigMissing {
        /// Collection name.
        name: String,
        /// Collection directory that was searched.
        path: PathBuf,
    },
    /// The runnable address did not consist of exactly one name.
    #[error("Invalid command: expected exactly one runnable name, got {count} components {components:?}")]
    InvalidRunnableAddress {
        /// Number of components supplied.
        count: usize,
        /// The offending components.
        components: Vec<String>,
    },
    /// The runnable is not declared in the collection's allow-list.
    #[error("Runnable '{runnable}' is not listed in {collection}/collection.yml")]
    RunnableNotListed {
        /// Collection name.
        collection: String,
        /// Requested runnable name.
        runnable: String,
    },
    /// The runnable directory does not exist.
    #[error("Runnable directory not found: {path}")]
    RunnableDirMissing {
        /// Expected runnable directory.
        path: PathBuf,
    },
    /// The runnable target exists but is not a directory.
    #[error("Target is a file, expected a directory with runnable.yml: {path}")]
    InvalidRunnableTarget {
        /// Path of the non-directory target.
        path: PathBuf,
    },
    /// The runnable directory carries no runnable.yml.
    #[error("Directory found but no runnable.yml: {path}")]
    RunnableConfigMissing {
        /// Runnable directory that was searched.
        path: PathBuf,
    },
    /// The runnable declares no `run` command.
    #[error("No 'run' command specified in {path}")]
    RunMissing {
        /// Runnable directory.
        path: PathBuf,
    },
    /// A before-hook failed, so the main action was skipped.
    #[error("Pre-hook failed: {hook}: {source}")]
    PreHookFailed {
        /// Hook command text.
        hook: String,
        /// How the hook failed.
        source: ProcessFailure,
    },
    /// The main action failed.
    #[error("Execution failed: {command}: {source}")]
    ExecutionFailed {
        /// Command text or script path.
        command: String,
        /// How the action failed.
        source: ProcessFailure,
    },
    /// A filesystem operation failed for a reason other than "not found".
    #[error("Failed to access {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A configuration file could not be read.
    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A configuration file could not be parsed.
    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },
    /// A configuration value could not be serialized.
    #[error("Failed to serialize config: {source}")]
    ConfigSerialize {
        /// Underlying serialization error.
        source: serde_yaml::Error,
    },
    /// Output could not be serialized as JSON.
    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize {
        /// Underlying serialization error.
        source: serde_json::Error,
    },
    /// A configuration or scaffold file could not be written.
    #[error("Failed to write {path}: {source}")]
    ConfigWrite {
        /// Path that failed to write.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A collection or runnable name cannot be used as a directory name.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName {
        /// Rejected name.
        name: String,
        /// Why the name was rejected.
        reason: &'static str,
    },
    /// A collection already exists at the target location.
    #[error("Collection already exists: {path}")]
    CollectionExists {
        /// Existing collection directory.
        path: PathBuf,
    },
    /// A runnable already exists at the target location.
    #[error("Runnable already exists: {path}")]
    RunnableExists {
        /// Existing runnable directory.
        path: PathBuf,
    },
    /// A required path already exists.
    #[error("Path already exists: {path}. Use --force to overwrite.")]
    PathExists {
        /// Path that already exists.
        path: PathBuf,
    },
    /// No user bin directory is available for shell helpers.
    #[error("Could not find a suitable bin directory ({path}). Please create it and add it to PATH.")]
    BinDirMissing {
        /// Expected bin directory.
        path: PathBuf,
    },
    /// The operation is not supported on this platform.
    #[error("{operation} is not supported on this platform")]
    UnsupportedPlatform {
        /// Operation that was attempted.
        operation: &'static str,
    },
    /// An import step failed.
    #[error("Import from {source_path} failed: {message}")]
    ImportFailed {
        /// Import source as given by the user.
        source_path: String,
        /// Error message.
        message: String,
    },
    /// The import source matched no known kind.
    #[error("Unknown source type or source not found: {source_path}")]
    UnknownSource {
        /// Import source as given by the user.
        source_path: String,
    },
    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL.
        url: String,
    },
    /// HTTP URL not allowed.
    #[error("HTTP URLs not allowed for security. Use HTTPS: {url}")]
    HttpNotAllowed {
        /// The HTTP URL.
        url: String,
    },
    /// Failed to download from URL.
    #[error("Failed to download from {url}: {message}")]
    Download {
        /// URL that failed.
        url: String,
        /// Error message.
        message: String,
    },
    /// Downloaded file too large.
    #[error("File too large: {size} bytes (max {max} bytes)")]
    FileTooLarge {
        /// Actual size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },
    /// An archive could not be read or extracted.
    #[error("Failed to read archive {path}: {message}")]
    ArchiveRead {
        /// Archive path or URL.
        path: PathBuf,
        /// Error message.
        message: String,
    },
    /// An archive could not be written.
    #[error("Failed to write archive {path}: {message}")]
    ArchiveWrite {
        /// Archive path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
    /// A pager was specified but could not be parsed.
    #[error("Invalid pager command: {message}")]
    PagerParse {
        /// Error message describing the parse failure.
        message: String,
    },
    /// A pager command could not be spawned.
    #[error("Failed to run pager `{pager}`: {source}")]
    PagerSpawn {
        /// Pager command that failed to spawn.
        pager: String,
        /// Underlying spawn error.
        source: io::Error,
    },
    /// A pager process exited with a non-zero status.
    #[error("Pager `{pager}` exited with status {status}")]
    PagerStatus {
        /// Pager command that exited.
        pager: String,
        /// Exit status returned by the pager.
        status: ExitStatus,
    },
    /// Failed to write to a pager process.
    #[error("Failed to write to pager `{pager}`: {source}")]
    PagerWrite {
        /// Pager command that failed to receive input.
        pager: String,
        /// Underlying write error.
        source: io::Error,
    },
    /// An interactive prompt was interrupted or canceled.
    #[error("Prompt canceled.")]
    PromptCanceled,
    /// An interactive prompt failed.
    #[error("Prompt failed: {message}")]
    PromptFailed {
        /// Error message describing the prompt failure.
        message: String,
    },
    /// A template could not be rendered.
    #[error("Failed to render template: {message}")]
    TemplateRender {
        /// Error message describing the render failure.
        message: String,
    },
}

impl Error {
    /// Map errors to exit codes for CLI termination.
    ///
    /// A main action that exits with a status code hands that code through.
    pub fn exit_code(&self) -> ExitCode {
        if let Self::ExecutionFailed {
            source: ProcessFailure::Status(status),
            ..
        } = self
            && let Some(code) = status.code()
            && let Ok(code) = u8::try_from(code)
            && code != 0
        {
            return ExitCode::from(code);
        }
        ExitCode::from(1)
    }
}
