//! Warning aggregation and progress notes.

use crate::palette;

/// Aggregates warnings for a command run and gates verbose notes.
#[derive(Debug, Default)]
pub struct Diagnostics {
    /// Whether verbose notes are printed.
    verbose: bool,
    /// Whether warnings are styled.
    use_color: bool,
    /// Collected warning messages.
    warnings: Vec<String>,
}

impl Diagnostics {
    /// Create a new diagnostics collector.
    pub fn new(verbose: bool, use_color: bool) -> Self {
        Self {
            verbose,
            use_color,
            warnings: Vec::new(),
        }
    }

    /// Record a warning and print it immediately.
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        eprintln!(
            "{} {message}",
            palette::fmt_warning_heading("Warning:", self.use_color)
        );
        self.warnings.push(message);
    }

    /// Print a progress note when verbose output is enabled.
    pub(crate) fn note(&self, message: impl Into<String>) {
        if self.verbose {
            eprintln!("{}", palette::fmt_description(&message.into(), self.use_color));
        }
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Print a warning summary when warnings were emitted.
    pub(crate) fn print_warning_summary(&self) {
        if self.warnings.is_empty() {
            return;
        }

        eprintln!("Completed with {} warning(s).", self.warnings.len());
    }
}
