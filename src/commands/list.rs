//! Implementation of the `shellican list` command.

use std::{fs, io::ErrorKind, path::Path};

use serde::Serialize;

use crate::{
    commands::ColorChoice,
    config::{CollectionConfig, RunnableConfig},
    error::{Error, Result},
    palette,
    paths::root_dir,
};

/// Placeholder for entries without help text.
const NO_DESCRIPTION: &str = "No description";

/// One row of list output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Entry {
    /// Collection or runnable name.
    pub(crate) name: String,
    /// Help text, or a placeholder.
    pub(crate) description: String,
}

/// Execute the list command.
pub async fn run(color: ColorChoice, collection: Option<String>, json: bool) -> Result<()> {
    let root = root_dir()?;
    let use_color = color.enabled();

    let (entries, empty_message) = match collection {
        None => (collection_entries(&root)?, "No collections found."),
        Some(collection) => (runnable_entries(&root, &collection)?, "No runnables found."),
    };

    if json {
        let rendered = serde_json::to_string_pretty(&entries)
            .map_err(|error| Error::JsonSerialize { source: error })?;
        println!("{rendered}");
        return Ok(());
    }

    if entries.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }

    print!("{}", format_table(&entries, use_color));
    Ok(())
}

/// Collect every collection directory under `root`, sorted by name.
pub(crate) fn collection_entries(root: &Path) -> Result<Vec<Entry>> {
    let dir_entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => {
            return Err(Error::Io {
                path: root.to_path_buf(),
                source: error,
            });
        }
    };

    let mut entries = Vec::new();
    for dir_entry in dir_entries.filter_map(|entry| entry.ok()) {
        let path = dir_entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = dir_entry.file_name().to_string_lossy().to_string();
        // A broken collection.yml still lists; it just has no description.
        let help = CollectionConfig::load(&path)
            .ok()
            .flatten()
            .map(|config| config.help);
        entries.push(Entry {
            name,
            description: describe(help),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Collect the declared runnables of a collection, in declared order.
pub(crate) fn runnable_entries(root: &Path, collection: &str) -> Result<Vec<Entry>> {
    let collection_path = root.join(collection);
    if !collection_path.is_dir() {
        return Err(Error::CollectionNotFound {
            name: collection.to_string(),
        });
    }
    let config = CollectionConfig::load(&collection_path)?.ok_or_else(|| {
        Error::CollectionConfigMissing {
            name: collection.to_string(),
            path: collection_path.clone(),
        }
    })?;

    let entries = config
        .runnables
        .iter()
        .map(|name| {
            let help = RunnableConfig::load(&collection_path.join(name))
                .ok()
                .flatten()
                .map(|config| config.help);
            Entry {
                name: name.clone(),
                description: describe(help),
            }
        })
        .collect();
    Ok(entries)
}

/// Use help text as a description, falling back to a placeholder.
fn describe(help: Option<String>) -> String {
    help.map(|help| help.trim().to_string())
        .filter(|help| !help.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

/// Render entries as an aligned two-column table with a header.
fn format_table(entries: &[Entry], use_color: bool) -> String {
    let width = entries
        .iter()
        .map(|entry| entry.name.chars().count())
        .chain(["NAME".len()])
        .max()
        .unwrap_or_default();

    let mut output = format!(
        "{}{}  {}\n",
        palette::fmt_heading("NAME", use_color),
        " ".repeat(width - "NAME".len()),
        palette::fmt_heading("DESCRIPTION", use_color)
    );
    for entry in entries {
        let padding = " ".repeat(width - entry.name.chars().count());
        output.push_str(&format!(
            "{}{padding}  {}\n",
            palette::fmt_name(&entry.name, use_color),
            palette::fmt_description(&entry.description, use_color)
        ));
    }
    output
}
