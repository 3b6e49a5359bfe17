//! Implementation of the `shellican show` command.

use std::{fs, path::Path};

use textwrap::Options;

use crate::{
    commands::ColorChoice,
    config::{CollectionConfig, Environments, Hooks, RunnableConfig},
    diagnostics::Diagnostics,
    error::{Error, Result},
    executor::MainAction,
    pager::write_output,
    palette,
    paths::{display_path, root_dir},
};

/// Column where values start after a label.
const LABEL_WIDTH: usize = 12;

/// Width used to wrap help text.
const WRAP_WIDTH: usize = 80;

/// Execute the show command.
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    collection: String,
    runnable: Option<String>,
    readme: bool,
    pager: Option<String>,
) -> Result<()> {
    let root = root_dir()?;
    let use_color = color.enabled();
    let mut diagnostics = Diagnostics::new(verbose, use_color);

    let output = match runnable {
        None => render_collection(&root, &collection, readme, use_color, &mut diagnostics)?,
        Some(runnable) => render_runnable(
            &root,
            &collection,
            &runnable,
            readme,
            use_color,
            &mut diagnostics,
        )?,
    };

    write_output(&output, pager.as_deref())?;
    diagnostics.print_warning_summary();
    Ok(())
}

/// Render the details of a collection.
pub(crate) fn render_collection(
    root: &Path,
    name: &str,
    readme: bool,
    use_color: bool,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let path = root.join(name);
    let config = CollectionConfig::load(&path)?.ok_or_else(|| {
        if path.is_dir() {
            Error::CollectionConfigMissing {
                name: name.to_string(),
                path: path.clone(),
            }
        } else {
            Error::CollectionNotFound {
                name: name.to_string(),
            }
        }
    })?;

    let mut output = String::new();
    push_field(&mut output, "Collection:", &palette::fmt_name(name, use_color), use_color);
    push_field(&mut output, "Path:", &palette::fmt_path(&display_path(&path), use_color), use_color);
    push_field(&mut output, "Summary:", &config.summary, use_color);
    push_help(&mut output, &config.help, use_color);

    let runnables = if config.runnables.is_empty() {
        "-".to_string()
    } else {
        config.runnables.join(", ")
    };
    push_field(&mut output, "Runnables:", &runnables, use_color);
    push_environments(&mut output, &config.environments, use_color);

    if readme {
        push_readme(&mut output, config.readme_path(&path).as_deref(), use_color, diagnostics);
    }
    Ok(output)
}

/// Render the details of a runnable.
pub(crate) fn render_runnable(
    root: &Path,
    collection: &str,
    name: &str,
    readme: bool,
    use_color: bool,
    diagnostics: &mut Diagnostics,
) -> Result<String> {
    let collection_path = root.join(collection);
    let path = collection_path.join(name);
    let Some(config) = RunnableConfig::load(&path)? else {
        if path.exists() {
            return Err(Error::RunnableConfigMissing { path });
        }
        return Err(Error::RunnableDirMissing { path });
    };

    let listed = CollectionConfig::load(&collection_path)?
        .is_some_and(|collection_config| collection_config.lists(name));
    if !listed {
        diagnostics.warn(format!(
            "'{name}' is not listed in {collection}/collection.yml and cannot be run"
        ));
    }

    let mut output = String::new();
    let title = format!(
        "{} (Collection: {})",
        palette::fmt_name(name, use_color),
        palette::fmt_name(collection, use_color)
    );
    push_field(&mut output, "Runnable:", &title, use_color);
    push_field(&mut output, "Path:", &palette::fmt_path(&display_path(&path), use_color), use_color);
    push_field(&mut output, "Summary:", &config.summary, use_color);
    push_help(&mut output, &config.help, use_color);

    let run = config.run.trim();
    if run.is_empty() {
        push_field(&mut output, "Run:", "-", use_color);
    } else {
        let action = MainAction::plan(&path, run);
        push_field(&mut output, "Mode:", action.mode(), use_color);
        push_field(&mut output, "Run:", run, use_color);
    }
    push_hooks(&mut output, "Before:", &config.before, use_color);
    push_hooks(&mut output, "After:", &config.after, use_color);
    push_environments(&mut output, &config.environments, use_color);

    if readme {
        push_readme(&mut output, config.readme_path(&path).as_deref(), use_color, diagnostics);
    }
    Ok(output)
}

/// Append a `Label:    value` line.
fn push_field(output: &mut String, label: &str, value: &str, use_color: bool) {
    let padding = " ".repeat(LABEL_WIDTH.saturating_sub(label.len()));
    output.push_str(&format!(
        "{}{padding}{value}\n",
        palette::fmt_label(label, use_color)
    ));
}

/// Append help text, wrapped under the value column.
fn push_help(output: &mut String, help: &str, use_color: bool) {
    let help = help.trim();
    if help.is_empty() {
        push_field(output, "Help:", "", use_color);
        return;
    }
    let indent = " ".repeat(LABEL_WIDTH);
    let options = Options::new(WRAP_WIDTH).subsequent_indent(&indent);
    push_field(output, "Help:", &textwrap::fill(help, options), use_color);
}

/// Append one hook per line, or nothing when none are declared.
fn push_hooks(output: &mut String, label: &str, hooks: &Hooks, use_color: bool) {
    for (index, hook) in hooks.iter().enumerate() {
        let label = if index == 0 { label } else { "" };
        push_field(output, label, hook, use_color);
    }
}

/// Append declared environment variables.
fn push_environments(output: &mut String, environments: &Environments, use_color: bool) {
    if environments.is_empty() {
        return;
    }
    output.push_str(&palette::fmt_heading("Environments:", use_color));
    output.push('\n');
    for (key, value) in environments {
        output.push_str(&format!("  {key}={value}\n"));
    }
}

/// Append the readme contents, warning when it cannot be read.
fn push_readme(
    output: &mut String,
    readme_path: Option<&Path>,
    use_color: bool,
    diagnostics: &mut Diagnostics,
) {
    let Some(readme_path) = readme_path else {
        output.push_str("No readme specified in configuration.\n");
        return;
    };
    match fs::read_to_string(readme_path) {
        Ok(contents) => {
            output.push('\n');
            output.push_str(&palette::fmt_heading("--- README ---", use_color));
            output.push('\n');
            output.push_str(&contents);
            if !contents.ends_with('\n') {
                output.push('\n');
            }
        }
        Err(error) => diagnostics.warn(format!(
            "failed to read README at {}: {error}",
            display_path(readme_path)
        )),
    }
}
