//! Implementation of the `shellican new` command.

use std::{
    fs,
    path::{Path, PathBuf},
};

use minijinja::context;

use crate::{
    commands::ColorChoice,
    config::{COLLECTION_FILE_NAME, CollectionConfig, RUNNABLE_FILE_NAME},
    diagnostics::Diagnostics,
    error::{Error, Result},
    paths::{display_path, root_dir, validate_name},
    templates,
};

/// Execute the new command.
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    collection: String,
    runnable: Option<String>,
) -> Result<()> {
    let root = root_dir()?;
    let mut diagnostics = Diagnostics::new(verbose, color.enabled());

    match runnable {
        None => {
            let path = create_collection(&root, &collection, &mut diagnostics)?;
            println!("Collection '{collection}' created at {}", display_path(&path));
        }
        Some(runnable) => {
            let path = create_runnable(&root, &collection, &runnable, &mut diagnostics)?;
            println!(
                "Runnable '{runnable}' created and added to collection at {}",
                display_path(&path)
            );
        }
    }

    diagnostics.print_warning_summary();
    Ok(())
}

/// Scaffold a new collection directory under `root`.
pub(crate) fn create_collection(
    root: &Path,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<PathBuf> {
    validate_name(name)?;
    let path = root.join(name);
    if path.exists() {
        return Err(Error::CollectionExists { path });
    }

    fs::create_dir_all(&path).map_err(|error| Error::ConfigWrite {
        path: path.clone(),
        source: error,
    })?;

    let config = templates::render(templates::COLLECTION_CONFIG, context! { name => name })?;
    let config_path = path.join(COLLECTION_FILE_NAME);
    fs::write(&config_path, config).map_err(|error| Error::ConfigWrite {
        path: config_path,
        source: error,
    })?;

    write_readme(&path, name, diagnostics)?;
    Ok(path)
}

/// Scaffold a new runnable and add it to the collection's `runnables`.
pub(crate) fn create_runnable(
    root: &Path,
    collection: &str,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<PathBuf> {
    validate_name(name)?;
    let collection_path = root.join(collection);
    if !collection_path.is_dir() {
        return Err(Error::CollectionNotFound {
            name: collection.to_string(),
        });
    }

    let mut collection_config = CollectionConfig::load(&collection_path)?.ok_or_else(|| {
        Error::CollectionConfigMissing {
            name: collection.to_string(),
            path: collection_path.clone(),
        }
    })?;

    let path = collection_path.join(name);
    if path.exists() {
        return Err(Error::RunnableExists { path });
    }

    fs::create_dir_all(&path).map_err(|error| Error::ConfigWrite {
        path: path.clone(),
        source: error,
    })?;

    let config = templates::render(templates::RUNNABLE_CONFIG, context! { name => name })?;
    let config_path = path.join(RUNNABLE_FILE_NAME);
    fs::write(&config_path, config).map_err(|error| Error::ConfigWrite {
        path: config_path,
        source: error,
    })?;

    write_readme(&path, name, diagnostics)?;

    if !collection_config.lists(name) {
        collection_config.runnables.push(name.to_string());
        collection_config.save(&collection_path)?;
    }

    Ok(path)
}

/// Write a starter README; a failed write is only a warning.
fn write_readme(dir: &Path, name: &str, diagnostics: &mut Diagnostics) -> Result<()> {
    let readme = templates::render(templates::README, context! { name => name })?;
    let readme_path = dir.join("README.md");
    if let Err(error) = fs::write(&readme_path, readme) {
        diagnostics.warn(format!(
            "failed to create {}: {error}",
            display_path(&readme_path)
        ));
    }
    Ok(())
}
