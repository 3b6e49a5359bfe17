//! Color palette and styling for CLI output.
//!
//! Every styled string goes through a `fmt_*` helper that takes the resolved
//! color choice, so plain output stays byte-for-byte free of escape codes.

use owo_colors::{OwoColorize, Style};

/// Style for collection and runnable names.
pub fn name() -> Style {
    Style::new().cyan().bold()
}

/// Style for section headings like "Runnables:".
pub fn heading() -> Style {
    Style::new().white().bold()
}

/// Style for labels like "Help:" or "Run:".
pub fn label() -> Style {
    Style::new().blue()
}

/// Style for description text.
pub fn description() -> Style {
    Style::new().dimmed()
}

/// Style for path values.
pub fn path() -> Style {
    Style::new().white()
}

/// Style for warning headings.
pub fn warning_heading() -> Style {
    Style::new().yellow().bold()
}

/// Apply a style when color is enabled.
fn styled(text: &str, style: Style, use_color: bool) -> String {
    if use_color {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

/// Format a collection or runnable name.
pub fn fmt_name(text: &str, use_color: bool) -> String {
    styled(text, name(), use_color)
}

/// Format a section heading.
pub fn fmt_heading(text: &str, use_color: bool) -> String {
    styled(text, heading(), use_color)
}

/// Format a label.
pub fn fmt_label(text: &str, use_color: bool) -> String {
    styled(text, label(), use_color)
}

/// Format description text.
pub fn fmt_description(text: &str, use_color: bool) -> String {
    styled(text, description(), use_color)
}

/// Format a path.
pub fn fmt_path(text: &str, use_color: bool) -> String {
    styled(text, path(), use_color)
}

/// Format a warning heading.
pub fn fmt_warning_heading(text: &str, use_color: bool) -> String {
    styled(text, warning_heading(), use_color)
}
