//! Execution of a resolved runnable with its before and after hooks.
//!
//! A run moves through three phases in order: before-hooks, the main action,
//! then after-hooks. A failing before-hook or main action stops the run. A
//! failing after-hook is reported as a warning and the run still succeeds.
//!
//! Every child inherits the caller's stdio and environment, with the merged
//! environment layered on top, and runs in the runnable's directory.

use std::{
    fmt,
    path::{Component, Path, PathBuf},
    process::Command,
    result::Result as StdResult,
};

use crate::{
    config::Environments,
    diagnostics::Diagnostics,
    error::{Error, ProcessFailure, Result},
    resolve::ExecutionContext,
};

/// Shell used for inline commands and hooks.
pub const SHELL: &str = "/bin/sh";

/// Value of `$0` for inline commands, so that extra args start at `$1`.
const INLINE_ARGV0: &str = "shellican";

/// How the main action of a runnable is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainAction {
    /// `run` names a file in the runnable directory; spawn it directly.
    Script(PathBuf),
    /// `run` is shell text; pass it to `/bin/sh -c`.
    Inline(String),
}

impl MainAction {
    /// Decide how `run` is launched by probing for a file of that name.
    ///
    /// `run` is always looked up inside the runnable directory, so a leading
    /// `/` does not escape it.
    pub fn plan(runnable_path: &Path, run: &str) -> Self {
        let relative: PathBuf = Path::new(run)
            .components()
            .filter(|component| !matches!(component, Component::Prefix(_) | Component::RootDir))
            .collect();
        let candidate = runnable_path.join(relative);
        if candidate.is_file() {
            Self::Script(candidate)
        } else {
            Self::Inline(run.to_string())
        }
    }

    /// Short mode label for display.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Script(_) => "script",
            Self::Inline(_) => "inline",
        }
    }
}

/// A failed after-hook. It never fails the run.
#[derive(Debug)]
pub struct PostHookWarning {
    /// Hook command text.
    pub hook: String,
    /// How the hook failed.
    pub failure: ProcessFailure,
}

impl fmt::Display for PostHookWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "post-hook failed: {}: {}", self.hook, self.failure)
    }
}

/// Run a resolved runnable, passing `args` to every hook and the main action.
pub fn execute(
    context: &ExecutionContext,
    args: &[String],
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let config = &context.config;
    let run = config.run.trim();
    if run.is_empty() {
        return Err(Error::RunMissing {
            path: context.runnable_path.clone(),
        });
    }

    if !config.before.is_empty() {
        diagnostics.note(">> Running pre-hooks...");
    }
    for hook in config.before.iter() {
        run_inline(hook, args, context).map_err(|failure| Error::PreHookFailed {
            hook: hook.to_string(),
            source: failure,
        })?;
    }

    let action = MainAction::plan(&context.runnable_path, run);
    let (command, outcome) = match &action {
        MainAction::Script(path) => (
            path.display().to_string(),
            run_script(path, args, context),
        ),
        MainAction::Inline(text) => (text.clone(), run_inline(text, args, context)),
    };
    outcome.map_err(|failure| Error::ExecutionFailed {
        command,
        source: failure,
    })?;

    if !config.after.is_empty() {
        diagnostics.note(">> Running post-hooks...");
    }
    for hook in config.after.iter() {
        if let Err(failure) = run_inline(hook, args, context) {
            let warning = PostHookWarning {
                hook: hook.to_string(),
                failure,
            };
            diagnostics.warn(warning.to_string());
        }
    }

    Ok(())
}

/// Run shell text through `/bin/sh -c`, binding `args` to `$1`, `$2`, ...
fn run_inline(
    text: &str,
    args: &[String],
    context: &ExecutionContext,
) -> StdResult<(), ProcessFailure> {
    let mut command = Command::new(SHELL);
    command.arg("-c").arg(text).arg(INLINE_ARGV0).args(args);
    spawn_and_wait(command, &context.runnable_path, &context.environments)
}

/// Spawn a script file directly with `args` as its arguments.
fn run_script(
    path: &Path,
    args: &[String],
    context: &ExecutionContext,
) -> StdResult<(), ProcessFailure> {
    let mut command = Command::new(path);
    command.args(args);
    spawn_and_wait(command, &context.runnable_path, &context.environments)
}

/// Run a child to completion with inherited stdio and layered environment.
fn spawn_and_wait(
    mut command: Command,
    cwd: &Path,
    environments: &Environments,
) -> StdResult<(), ProcessFailure> {
    let status = command
        .current_dir(cwd)
        .envs(environments)
        .status()
        .map_err(ProcessFailure::Spawn)?;

    if status.success() {
        Ok(())
    } else {
        Err(ProcessFailure::Status(status))
    }
}
