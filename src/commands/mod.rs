//! CLI command implementations.

use std::io::{self, IsTerminal};

/// Output color handling selection.
#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    /// Colorize only when output is a TTY.
    Auto,
    /// Always colorize output.
    Always,
    /// Never colorize output.
    Never,
}

impl ColorChoice {
    /// Determine whether color output should be enabled.
    pub(crate) fn enabled(self) -> bool {
        match self {
            Self::Auto => io::stdout().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

// Command modules are ordered alphabetically - maintain this order.
/// Create-shell command implementation.
pub mod create_shell;
/// Export command implementation.
pub mod export;
/// Import command implementation.
pub mod import;
/// List command implementation.
pub mod list;
/// New command implementation.
pub mod new;
/// Run command implementation.
pub mod run;
/// Show command implementation.
pub mod show;
