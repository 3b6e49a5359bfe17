//! Implementation of the `shellican export` command.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    archive::{self, ArchiveFormat},
    commands::ColorChoice,
    diagnostics::Diagnostics,
    error::{Error, Result},
    paths::{display_path, normalize_path, root_dir},
};

/// Execute the export command.
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    collection: String,
    output: Option<String>,
    force: bool,
) -> Result<()> {
    let root = root_dir()?;
    let mut diagnostics = Diagnostics::new(verbose, color.enabled());
    let output = output.map_or_else(
        || PathBuf::from(format!("{collection}.tar.gz")),
        PathBuf::from,
    );

    let path = export(&root, &collection, &output, force, &mut diagnostics)?;
    println!(
        "Collection '{collection}' exported to {}",
        display_path(&path)
    );
    diagnostics.print_warning_summary();
    Ok(())
}

/// Archive a collection to `output`.
///
/// A `.zip` output writes a zip archive; anything else writes a gzip tarball.
/// A failed write removes the partial output.
pub(crate) fn export(
    root: &Path,
    collection: &str,
    output: &Path,
    force: bool,
    diagnostics: &mut Diagnostics,
) -> Result<PathBuf> {
    let dir = root.join(collection);
    if !dir.is_dir() {
        return Err(Error::CollectionNotFound {
            name: collection.to_string(),
        });
    }
    if output.exists() && !force {
        return Err(Error::PathExists {
            path: output.to_path_buf(),
        });
    }

    let parent = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if normalize_path(parent).starts_with(normalize_path(&dir)) {
        return Err(Error::ArchiveWrite {
            path: output.to_path_buf(),
            message: "output must be outside the collection directory".to_string(),
        });
    }

    let format = ArchiveFormat::detect(&output.to_string_lossy()).unwrap_or(ArchiveFormat::TarGz);
    if let Err(error) = archive::write(&dir, output, format) {
        remove_partial(output, diagnostics);
        return Err(error);
    }
    Ok(output.to_path_buf())
}

/// Remove a partially written archive.
fn remove_partial(output: &Path, diagnostics: &mut Diagnostics) {
    match fs::remove_file(output) {
        Ok(()) => {}
        Err(error) if error.kind() == ErrorKind::NotFound => {}
        Err(error) => diagnostics.warn(format!(
            "failed to clean up {}: {error}",
            display_path(output)
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        archive::{self, ArchiveFormat},
        commands::export::export,
        diagnostics::Diagnostics,
        error::Error,
        testutil::TestFixture,
    };

    #[test]
    fn exports_tarball_relative_to_collection() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables: [greet]\n")
            .with_runnable("demo", "greet", "run: echo hi\n");
        let output = fixture.scratch_dir().join("demo.tar.gz");

        export(fixture.root(), "demo", &output, false, &mut Diagnostics::default()).expect("export");

        let target = fixture.scratch_dir().join("check");
        let data = fs::read(&output).expect("read");
        archive::extract(&data, ArchiveFormat::TarGz, &target, &output).expect("extract");
        assert!(target.join("collection.yml").is_file());
        assert!(target.join("greet").join("runnable.yml").is_file());
    }

    #[test]
    fn zip_suffix_selects_zip_format() {
        let fixture = TestFixture::new().with_collection("demo", "runnables: []\n");
        let output = fixture.scratch_dir().join("demo.zip");

        export(fixture.root(), "demo", &output, false, &mut Diagnostics::default()).expect("export");

        let data = fs::read(&output).expect("read");
        assert!(data.starts_with(b"PK"));
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let fixture = TestFixture::new().with_collection("demo", "runnables: []\n");
        let output = fixture.scratch_dir().join("demo.tar.gz");
        fs::write(&output, "existing").expect("write");

        let error = export(fixture.root(), "demo", &output, false, &mut Diagnostics::default()).expect_err("exists");
        assert!(matches!(error, Error::PathExists { .. }));
        assert_eq!(fs::read_to_string(&output).expect("read"), "existing");

        export(fixture.root(), "demo", &output, true, &mut Diagnostics::default()).expect("forced");
        assert_ne!(fs::read(&output).expect("read"), b"existing");
    }

    #[test]
    fn refuses_output_inside_collection() {
        let fixture = TestFixture::new().with_collection("demo", "runnables: []\n");
        let output = fixture.collection_dir("demo").join("demo.tar.gz");
        let error = export(fixture.root(), "demo", &output, false, &mut Diagnostics::default()).expect_err("inside");
        assert!(matches!(error, Error::ArchiveWrite { .. }));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn failed_write_removes_partial_archive() {
        use std::os::unix::fs::symlink;

        let fixture = TestFixture::new().with_collection("demo", "runnables: []\n");
        symlink(
            "missing-target",
            fixture.collection_dir("demo").join("dangling"),
        )
        .expect("symlink");
        let output = fixture.scratch_dir().join("demo.tar.gz");

        let error = export(fixture.root(), "demo", &output, false, &mut Diagnostics::default())
            .expect_err("dangling link");
        assert!(matches!(error, Error::ArchiveWrite { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn missing_collection_is_an_error() {
        let fixture = TestFixture::new();
        let output = fixture.scratch_dir().join("absent.tar.gz");
        let error = export(fixture.root(), "absent", &output, false, &mut Diagnostics::default()).expect_err("missing");
        assert!(matches!(error, Error::CollectionNotFound { .. }));
        assert!(!output.exists());
    }
}
