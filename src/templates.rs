//! Templates for scaffolded files and shell helpers.

use std::result::Result as StdResult;

use minijinja::{Environment, Error as TemplateError, ErrorKind, Value};

use crate::error::{Error, Result};

/// Initial `collection.yml` for a new collection.
///
/// Values go through `yaml_string` so any name stays a valid YAML scalar.
pub const COLLECTION_CONFIG: &str = r#"name: {{ name|yaml_string }}
help: {{ ("Usage for " ~ name)|yaml_string }}
readme: "README.md"
runnables: []
environments:
  COLLECTION_ENV: "value"
"#;

/// Initial `runnable.yml` for a new runnable.
pub const RUNNABLE_CONFIG: &str = r#"name: {{ name|yaml_string }}
help: {{ ("Usage for " ~ name)|yaml_string }}
readme: "README.md"
run: {{ ("echo " ~ ("Hello from " ~ name)|shell_quote)|yaml_string }}
# before: "echo 'Running before'"
# after:
#   - "echo 'Running after'"
environments:
  RUNNABLE_ENV: "value"
"#;

/// Initial README for a collection or runnable.
pub const README: &str = "# {{ name }}\n\nDescription for {{ name }}\n";

/// Wrapper script that forwards to `shellican run <collection>`.
pub const SHELL_HELPER: &str = "#!/bin/sh\nexec shellican run {{ collection|shell_quote }} \"$@\"\n";

/// Render a template with the given context.
pub fn render(template: &str, context: Value) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_filter("yaml_string", yaml_string);
    env.add_filter("shell_quote", shell_quote);
    env.render_str(template, context)
        .map_err(|error| Error::TemplateRender {
            message: error.to_string(),
        })
}

/// Render a string as a double-quoted YAML scalar.
///
/// JSON string syntax is a subset of YAML's double-quoted style.
fn yaml_string(value: &str) -> StdResult<String, TemplateError> {
    serde_json::to_string(value)
        .map_err(|error| TemplateError::new(ErrorKind::InvalidOperation, error.to_string()))
}

/// Quote a string as one POSIX shell word.
fn shell_quote(value: &str) -> String {
    shell_words::quote(value).into_owned()
}
