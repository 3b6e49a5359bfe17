#![warn(missing_docs)]
//! Library support for the shellican CLI.
//!
//! Collections live under `~/.shellican` (or `$SHELLICAN_HOME/.shellican`).
//! Each collection directory holds a `collection.yml` that lists its
//! runnables, and each runnable directory holds a `runnable.yml` describing
//! the command to run, its hooks, and its environment.

/// Gzip tarball and zip handling for import and export.
mod archive;
/// Command-line interface wiring and dispatch.
mod cli;
/// Command implementations.
mod commands;
/// Collection and runnable configuration files.
mod config;
/// Common diagnostics and warning aggregation.
mod diagnostics;
/// Error handling for the crate.
mod error;
/// Hook and main action execution.
mod executor;
/// Pager output helpers.
mod pager;
/// Color palette and styling for CLI output.
mod palette;
/// Root resolution and path utilities.
mod paths;
/// Resolution of a collection and runnable into an execution context.
mod resolve;
/// Scaffolding templates.
mod templates;
/// Test fixtures for collection trees.
#[cfg(test)]
mod testutil;

pub use crate::{
    config::{CollectionConfig, Environments, Hooks, RunnableConfig},
    diagnostics::Diagnostics,
    error::{Error, ProcessFailure, Result},
    executor::{MainAction, PostHookWarning, execute},
    paths::root_dir,
    resolve::{ExecutionContext, merge_environments, resolve},
};

/// Run the CLI, returning a structured error on failure.
pub async fn run() -> Result<()> {
    cli::run().await
}
