//! Resolution of a (collection, runnable) pair into an execution plan.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf, absolute},
};

use crate::{
    config::{CollectionConfig, Environments, RunnableConfig},
    error::{Error, Result},
};

/// A resolved runnable, ready to hand to the executor.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Directory holding the runnable's files; the working directory of every child.
    pub runnable_path: PathBuf,
    /// The runnable's own configuration.
    pub config: RunnableConfig,
    /// Collection entries overlaid with runnable entries.
    pub environments: Environments,
}

/// Resolve a runnable address inside a collection under `root`.
///
/// `components` is the runnable address split into names; only a single name
/// is accepted. The runnable must be listed in the collection's `runnables`,
/// regardless of what exists on disk. The resulting `runnable_path` is
/// absolute even when `root` is not.
pub fn resolve(root: &Path, collection: &str, components: &[String]) -> Result<ExecutionContext> {
    let collection_path = root.join(collection);
    let collection_path = absolute(&collection_path).map_err(|error| Error::Io {
        path: collection_path,
        source: error,
    })?;
    if !collection_path.exists() {
        return Err(Error::CollectionNotFound {
            name: collection.to_string(),
        });
    }

    let collection_config =
        CollectionConfig::load(&collection_path)?.ok_or_else(|| Error::CollectionConfigMissing {
            name: collection.to_string(),
            path: collection_path.clone(),
        })?;

    let [runnable] = components else {
        return Err(Error::InvalidRunnableAddress {
            count: components.len(),
            components: components.to_vec(),
        });
    };

    if !collection_config.lists(runnable) {
        return Err(Error::RunnableNotListed {
            collection: collection.to_string(),
            runnable: runnable.clone(),
        });
    }

    let runnable_path = collection_path.join(runnable);
    let metadata = match fs::metadata(&runnable_path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(Error::RunnableDirMissing {
                path: runnable_path,
            });
        }
        Err(error) => {
            return Err(Error::Io {
                path: runnable_path,
                source: error,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(Error::InvalidRunnableTarget {
            path: runnable_path,
        });
    }

    let Some(config) = RunnableConfig::load(&runnable_path)? else {
        return Err(Error::RunnableConfigMissing {
            path: runnable_path,
        });
    };

    let environments = merge_environments(&collection_config.environments, &config.environments);

    Ok(ExecutionContext {
        runnable_path,
        config,
        environments,
    })
}

/// Overlay runnable variables on collection variables into a fresh map.
pub fn merge_environments(collection: &Environments, runnable: &Environments) -> Environments {
    collection
        .iter()
        .chain(runnable.iter())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        config::Environments,
        error::Error,
        resolve::{merge_environments, resolve},
        testutil::TestFixture,
    };

    /// Build a single-component runnable address.
    fn address(name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    /// Build an environment map from pairs.
    fn env(pairs: &[(&str, &str)]) -> Environments {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn resolves_listed_runnable_with_merged_environment() {
        let fixture = TestFixture::new()
            .with_collection(
                "demo",
                "runnables:\n  - greet\nenvironments:\n  A: \"1\"\n  B: \"2\"\n",
            )
            .with_runnable(
                "demo",
                "greet",
                "run: echo hello $1\nenvironments:\n  B: \"3\"\n  C: \"4\"\n",
            );

        let context = resolve(fixture.root(), "demo", &address("greet")).expect("resolve");
        assert_eq!(context.runnable_path, fixture.runnable_dir("demo", "greet"));
        assert_eq!(context.config.run, "echo hello $1");
        assert_eq!(
            context.environments,
            env(&[("A", "1"), ("B", "3"), ("C", "4")])
        );
    }

    #[test]
    fn runnable_entries_win_on_collision() {
        let merged = merge_environments(&env(&[("KEY", "collection")]), &env(&[("KEY", "runnable")]));
        assert_eq!(merged, env(&[("KEY", "runnable")]));
    }

    #[test]
    fn missing_collection_directory() {
        let fixture = TestFixture::new();
        let error = resolve(fixture.root(), "nope", &address("x")).expect_err("should fail");
        assert!(matches!(error, Error::CollectionNotFound { name } if name == "nope"));
    }

    #[test]
    fn bare_directory_is_not_a_collection() {
        let fixture = TestFixture::new().with_dir("demo");
        let error = resolve(fixture.root(), "demo", &address("x")).expect_err("should fail");
        assert!(matches!(error, Error::CollectionConfigMissing { .. }));
    }

    #[test]
    fn nested_address_is_rejected_even_when_path_exists() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables:\n  - greet\n")
            .with_runnable("demo", "greet", "run: echo hi\n");
        fs::create_dir_all(fixture.runnable_dir("demo", "greet").join("nested"))
            .expect("create nested dir");

        let components = vec!["greet".to_string(), "nested".to_string()];
        let error = resolve(fixture.root(), "demo", &components).expect_err("should fail");
        assert!(matches!(
            error,
            Error::InvalidRunnableAddress { count: 2, ref components } if components.len() == 2
        ));

        let error = resolve(fixture.root(), "demo", &[]).expect_err("should fail");
        assert!(matches!(error, Error::InvalidRunnableAddress { count: 0, .. }));
    }

    #[test]
    fn unlisted_runnable_is_denied_even_if_present() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables:\n  - greet\n")
            .with_runnable("demo", "secret", "run: echo secret\n");

        let error = resolve(fixture.root(), "demo", &address("secret")).expect_err("should fail");
        assert!(matches!(
            error,
            Error::RunnableNotListed { ref runnable, .. } if runnable == "secret"
        ));
    }

    #[test]
    fn listed_runnable_without_directory() {
        let fixture = TestFixture::new().with_collection("demo", "runnables:\n  - ghost\n");
        let error = resolve(fixture.root(), "demo", &address("ghost")).expect_err("should fail");
        assert!(matches!(error, Error::RunnableDirMissing { .. }));
    }

    #[test]
    fn file_is_not_a_runnable_target() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables:\n  - tool.sh\n")
            .with_collection_file("demo", "tool.sh", "echo hi\n");

        let error = resolve(fixture.root(), "demo", &address("tool.sh")).expect_err("should fail");
        assert!(matches!(error, Error::InvalidRunnableTarget { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn other_stat_errors_keep_their_source() {
        use std::io::ErrorKind;

        let fixture = TestFixture::new()
            .with_collection("demo", "runnables:\n  - tool.sh/child\n")
            .with_collection_file("demo", "tool.sh", "echo hi\n");

        let error =
            resolve(fixture.root(), "demo", &address("tool.sh/child")).expect_err("should fail");
        let Error::Io { path, source } = error else {
            panic!("expected an io error, got {error:?}");
        };
        assert_eq!(path, fixture.collection_dir("demo").join("tool.sh/child"));
        assert_eq!(source.kind(), ErrorKind::NotADirectory);
    }

    #[test]
    fn directory_without_runnable_config() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables:\n  - empty\n")
            .with_dir("demo/empty");

        let error = resolve(fixture.root(), "demo", &address("empty")).expect_err("should fail");
        assert!(matches!(error, Error::RunnableConfigMissing { .. }));
    }
}
