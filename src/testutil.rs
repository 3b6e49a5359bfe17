//! Test utilities for setting up collection trees.
//!
//! This module provides a `TestFixture` builder for creating isolated roots
//! populated with collections, runnables, and scripts.

#![allow(dead_code)]

use std::{
    env, fs,
    path::{Component, Path, PathBuf},
};

use tempfile::TempDir;

use crate::config::{COLLECTION_FILE_NAME, RUNNABLE_FILE_NAME};

/// Test fixture for creating an isolated root directory.
pub struct TestFixture {
    /// Temp directory that owns everything.
    _temp: TempDir,
    /// Root under which collections live.
    root: PathBuf,
}

impl TestFixture {
    /// Create a fixture with an empty root directory.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let root = temp.path().join(".shellican");
        fs::create_dir_all(&root).expect("create root dir");
        Self { _temp: temp, root }
    }

    /// Add a collection directory with the given `collection.yml` contents.
    pub fn with_collection(self, name: &str, yaml: &str) -> Self {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).expect("create collection dir");
        fs::write(dir.join(COLLECTION_FILE_NAME), yaml).expect("write collection config");
        self
    }

    /// Add a runnable directory with the given `runnable.yml` contents.
    pub fn with_runnable(self, collection: &str, name: &str, yaml: &str) -> Self {
        let dir = self.runnable_dir(collection, name);
        fs::create_dir_all(&dir).expect("create runnable dir");
        fs::write(dir.join(RUNNABLE_FILE_NAME), yaml).expect("write runnable config");
        self
    }

    /// Add a plain file directly inside a collection directory.
    pub fn with_collection_file(self, collection: &str, name: &str, contents: &str) -> Self {
        let dir = self.root.join(collection);
        fs::create_dir_all(&dir).expect("create collection dir");
        fs::write(dir.join(name), contents).expect("write file");
        self
    }

    /// Add an empty directory relative to the root.
    pub fn with_dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.root.join(relative)).expect("create dir");
        self
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get a collection directory path.
    pub fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// Get a runnable directory path.
    pub fn runnable_dir(&self, collection: &str, name: &str) -> PathBuf {
        self.root.join(collection).join(name)
    }

    /// Get a scratch directory outside the root.
    pub fn scratch_dir(&self) -> PathBuf {
        let dir = self._temp.path().join("scratch");
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    /// Read a file from a runnable directory.
    pub fn read_runnable_file(&self, collection: &str, name: &str, file: &str) -> String {
        fs::read_to_string(self.runnable_dir(collection, name).join(file))
            .expect("read runnable file")
    }

    /// Write an executable script.
    pub fn write_script(&self, path: &Path, contents: &str) {
        fs::write(path, contents).expect("write script");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))
                .expect("chmod script");
        }
    }
}

/// Express an absolute path relative to the current directory.
pub fn relative_to_cwd(path: &Path) -> PathBuf {
    let cwd = env::current_dir().expect("current dir");
    let mut relative: PathBuf = cwd
        .components()
        .filter(|component| matches!(component, Component::Normal(_)))
        .map(|_| Component::ParentDir)
        .collect();
    relative.push(path.strip_prefix("/").expect("absolute path"));
    relative
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_collection_tree() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables: [greet]\n")
            .with_runnable("demo", "greet", "run: echo hi\n");

        assert!(fixture.collection_dir("demo").join(COLLECTION_FILE_NAME).is_file());
        assert!(fixture.runnable_dir("demo", "greet").join(RUNNABLE_FILE_NAME).is_file());
    }
}
