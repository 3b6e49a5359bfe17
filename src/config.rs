//! Collection and runnable configuration files.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned, de::Error as _};
use serde_yaml::Value;

use crate::error::{Error, Result};

/// File name of a collection's configuration.
pub const COLLECTION_FILE_NAME: &str = "collection.yml";

/// File name of a runnable's configuration.
pub const RUNNABLE_FILE_NAME: &str = "runnable.yml";

/// Environment variables declared by a collection or runnable.
pub type Environments = BTreeMap<String, String>;

/// Declared metadata and policy for a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Display name.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// One-line summary.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Usage text.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub help: String,
    /// Documentation file relative to the collection directory.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    /// Runnables that may be resolved, in display order.
    #[serde(deserialize_with = "null_as_default")]
    pub runnables: Vec<String>,
    /// Variables exported to every runnable of the collection.
    #[serde(deserialize_with = "scalar_map")]
    pub environments: Environments,
}

/// Declared metadata and actions for a single runnable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnableConfig {
    /// Display name.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// One-line summary.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub summary: String,
    /// Usage text.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub help: String,
    /// Documentation file relative to the runnable directory.
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    /// Script path relative to the runnable directory, or an inline command.
    #[serde(deserialize_with = "null_as_default")]
    pub run: String,
    /// Commands run before the main action.
    #[serde(skip_serializing_if = "Hooks::is_empty")]
    pub before: Hooks,
    /// Commands run after a successful main action.
    #[serde(skip_serializing_if = "Hooks::is_empty")]
    pub after: Hooks,
    /// Variables exported to this runnable, overriding collection entries.
    #[serde(deserialize_with = "scalar_map")]
    pub environments: Environments,
}

/// Ordered hook commands for one phase.
///
/// Config files may declare a phase as a single string or as a list; both
/// load into this shape. Blank entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<RawHooks>", into = "Vec<String>")]
pub struct Hooks(Vec<String>);

/// Hook declarations as they appear on disk.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawHooks {
    /// `before: "make build"`
    Single(String),
    /// `before: ["make", "make test"]`
    Many(Vec<String>),
}

impl From<Option<RawHooks>> for Hooks {
    fn from(raw: Option<RawHooks>) -> Self {
        let commands = match raw {
            None => Vec::new(),
            Some(RawHooks::Single(command)) => vec![command],
            Some(RawHooks::Many(commands)) => commands,
        };
        Self::new(commands)
    }
}

impl From<Hooks> for Vec<String> {
    fn from(hooks: Hooks) -> Self {
        hooks.0
    }
}

impl Hooks {
    /// Build a hook list, dropping blank commands.
    pub fn new(commands: impl IntoIterator<Item = String>) -> Self {
        Self(
            commands
                .into_iter()
                .filter(|command| !command.trim().is_empty())
                .collect(),
        )
    }

    /// Whether no hooks are declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate hooks in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl CollectionConfig {
    /// Load `collection.yml` from a collection directory.
    ///
    /// Returns `Ok(None)` when the directory has no config file.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        load_yaml(&dir.join(COLLECTION_FILE_NAME))
    }

    /// Write `collection.yml` into a collection directory.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(COLLECTION_FILE_NAME);
        let contents =
            serde_yaml::to_string(self).map_err(|error| Error::ConfigSerialize { source: error })?;
        fs::write(&path, contents).map_err(|error| Error::ConfigWrite { path, source: error })
    }

    /// Whether a runnable name is on the allow-list, compared verbatim.
    pub fn lists(&self, runnable: &str) -> bool {
        self.runnables.iter().any(|name| name == runnable)
    }

    /// Absolute readme path, when one is declared.
    pub fn readme_path(&self, dir: &Path) -> Option<PathBuf> {
        readme_path(self.readme.as_deref(), dir)
    }
}

impl RunnableConfig {
    /// Load `runnable.yml` from a runnable directory.
    ///
    /// Returns `Ok(None)` when the directory has no config file.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        load_yaml(&dir.join(RUNNABLE_FILE_NAME))
    }

    /// Absolute readme path, when one is declared.
    pub fn readme_path(&self, dir: &Path) -> Option<PathBuf> {
        readme_path(self.readme.as_deref(), dir)
    }
}

/// Join a declared readme onto its owning directory.
fn readme_path(readme: Option<&str>, dir: &Path) -> Option<PathBuf> {
    readme
        .map(str::trim)
        .filter(|readme| !readme.is_empty())
        .map(|readme| dir.join(readme))
}

/// Read and parse a YAML file, treating a missing file as `None`.
fn load_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(Error::ConfigRead {
                path: path.to_path_buf(),
                source: error,
            });
        }
    };

    if contents.trim().is_empty() {
        return Ok(Some(T::default()));
    }

    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|error| Error::ConfigParse {
            path: path.to_path_buf(),
            source: error,
        })
}

/// Deserialize an explicit `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> StdResult<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a mapping whose values may be any YAML scalar.
fn scalar_map<'de, D>(deserializer: D) -> StdResult<Environments, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    let mut environments = Environments::new();
    for (key, value) in raw.unwrap_or_default() {
        let value = match value {
            Value::Null => String::new(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            Value::String(text) => text,
            _ => {
                return Err(D::Error::custom(format!(
                    "environment value for '{key}' must be a scalar"
                )));
            }
        };
        environments.insert(key, value);
    }
    Ok(environments)
}
