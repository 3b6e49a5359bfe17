//! Gzip tarball and zip handling for collection import and export.
//!
//! Archives hold the contents of a collection directory with paths relative to
//! the collection root.

use std::{
    fs::{self, File},
    io::{self, Cursor, Read, Write},
    path::Path,
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use tar::{Archive, Builder};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::error::{Error, Result};

/// Supported archive formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArchiveFormat {
    /// A gzip-compressed tarball.
    TarGz,
    /// A zip archive.
    Zip,
}

impl ArchiveFormat {
    /// Detect the format from a file name or URL.
    pub(crate) fn detect(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Extract archive bytes into `target`, creating it.
///
/// `label` names the archive in error messages.
pub(crate) fn extract(data: &[u8], format: ArchiveFormat, target: &Path, label: &Path) -> Result<()> {
    fs::create_dir_all(target).map_err(|error| Error::ConfigWrite {
        path: target.to_path_buf(),
        source: error,
    })?;
    match format {
        ArchiveFormat::TarGz => extract_tar_gz(data, target, label),
        ArchiveFormat::Zip => extract_zip(data, target, label),
    }
}

/// Unpack a gzip tarball. The tar crate refuses entries escaping `target`.
fn extract_tar_gz(data: &[u8], target: &Path, label: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(data));
    archive.set_preserve_permissions(true);
    archive.unpack(target).map_err(|error| Error::ArchiveRead {
        path: label.to_path_buf(),
        message: error.to_string(),
    })
}

/// Unpack a zip archive, restoring unix modes when recorded.
fn extract_zip(data: &[u8], target: &Path, label: &Path) -> Result<()> {
    let read_error = |message: String| Error::ArchiveRead {
        path: label.to_path_buf(),
        message,
    };

    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|error| read_error(error.to_string()))?;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|error| read_error(error.to_string()))?;
        let Some(relative) = file.enclosed_name() else {
            return Err(read_error(format!(
                "path traversal detected: {}",
                file.name()
            )));
        };
        let out_path = target.join(relative);

        if file.is_dir() {
            fs::create_dir_all(&out_path).map_err(|error| Error::ConfigWrite {
                path: out_path.clone(),
                source: error,
            })?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|error| Error::ConfigWrite {
                    path: parent.to_path_buf(),
                    source: error,
                })?;
            }
            let mut outfile = File::create(&out_path).map_err(|error| Error::ConfigWrite {
                path: out_path.clone(),
                source: error,
            })?;
            io::copy(&mut file, &mut outfile).map_err(|error| Error::ConfigWrite {
                path: out_path.clone(),
                source: error,
            })?;
        }

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o7777)).map_err(
                |error| Error::ConfigWrite {
                    path: out_path.clone(),
                    source: error,
                },
            )?;
        }
    }
    Ok(())
}

/// Write the contents of `dir` to `output` in the given format.
pub(crate) fn write(dir: &Path, output: &Path, format: ArchiveFormat) -> Result<()> {
    let file = File::create(output).map_err(|error| Error::ArchiveWrite {
        path: output.to_path_buf(),
        message: error.to_string(),
    })?;
    match format {
        ArchiveFormat::TarGz => write_tar_gz(dir, file, output),
        ArchiveFormat::Zip => write_zip(dir, file, output),
    }
}

/// Write a gzip tarball rooted at the collection directory.
fn write_tar_gz(dir: &Path, file: File, output: &Path) -> Result<()> {
    let write_error = |error: io::Error| Error::ArchiveWrite {
        path: output.to_path_buf(),
        message: error.to_string(),
    };

    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    builder.append_dir_all(".", dir).map_err(write_error)?;
    builder
        .into_inner()
        .and_then(GzEncoder::finish)
        .map_err(write_error)?;
    Ok(())
}

/// Write a zip archive, recording unix modes.
fn write_zip(dir: &Path, file: File, output: &Path) -> Result<()> {
    let write_error = |message: String| Error::ArchiveWrite {
        path: output.to_path_buf(),
        message,
    };

    let mut zip = ZipWriter::new(file);
    let base_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|error| write_error(error.to_string()))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(dir)
            .map_err(|_| write_error("failed to compute relative path".to_string()))?;
        let archive_path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let metadata = entry
            .metadata()
            .map_err(|error| write_error(error.to_string()))?;
        let options = with_mode(base_options, &metadata);

        if metadata.is_dir() {
            zip.add_directory(&archive_path, options)
                .map_err(|error| write_error(error.to_string()))?;
        } else if metadata.is_file() {
            zip.start_file(&archive_path, options)
                .map_err(|error| write_error(error.to_string()))?;
            let mut contents = Vec::new();
            File::open(path)
                .and_then(|mut source| source.read_to_end(&mut contents))
                .map_err(|error| Error::Io {
                    path: path.to_path_buf(),
                    source: error,
                })?;
            zip.write_all(&contents)
                .map_err(|error| write_error(error.to_string()))?;
        }
    }

    zip.finish().map_err(|error| write_error(error.to_string()))?;
    Ok(())
}

/// Carry the entry's permission bits into the zip options.
#[cfg(unix)]
fn with_mode(options: SimpleFileOptions, metadata: &fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    options.unix_permissions(metadata.permissions().mode() & 0o7777)
}

/// Non-unix archives use the zip defaults.
#[cfg(not(unix))]
fn with_mode(options: SimpleFileOptions, _metadata: &fs::Metadata) -> SimpleFileOptions {
    options
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        io::{Cursor, Write},
        path::Path,
    };

    use zip::{ZipWriter, write::SimpleFileOptions};

    use crate::{
        archive::{ArchiveFormat, extract, write},
        error::Error,
        testutil::TestFixture,
    };

    #[test]
    fn detects_formats_by_suffix() {
        assert_eq!(ArchiveFormat::detect("tools.tar.gz"), Some(ArchiveFormat::TarGz));
        assert_eq!(ArchiveFormat::detect("tools.TGZ"), Some(ArchiveFormat::TarGz));
        assert_eq!(
            ArchiveFormat::detect("https://example.com/tools.zip"),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(ArchiveFormat::detect("tools.tar"), None);
    }

    #[test]
    fn tarball_keeps_layout_and_modes() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables: [greet]\n")
            .with_runnable("demo", "greet", "run: ./greet.sh\n");
        let script = fixture.runnable_dir("demo", "greet").join("greet.sh");
        fixture.write_script(&script, "#!/bin/sh\necho hi\n");

        let output = fixture.scratch_dir().join("demo.tar.gz");
        write(&fixture.collection_dir("demo"), &output, ArchiveFormat::TarGz).expect("write");

        let target = fixture.scratch_dir().join("unpacked");
        let data = fs::read(&output).expect("read archive");
        extract(&data, ArchiveFormat::TarGz, &target, &output).expect("extract");
        assert!(target.join("collection.yml").is_file());
        assert_eq!(
            fs::read_to_string(target.join("greet").join("runnable.yml")).expect("read"),
            "run: ./greet.sh\n"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(target.join("greet").join("greet.sh"))
                .expect("metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn zip_keeps_layout_and_modes() {
        let fixture = TestFixture::new()
            .with_collection("demo", "runnables: [greet]\n")
            .with_runnable("demo", "greet", "run: ./greet.sh\n");
        let script = fixture.runnable_dir("demo", "greet").join("greet.sh");
        fixture.write_script(&script, "#!/bin/sh\necho hi\n");

        let output = fixture.scratch_dir().join("demo.zip");
        write(&fixture.collection_dir("demo"), &output, ArchiveFormat::Zip).expect("write");

        let target = fixture.scratch_dir().join("unpacked");
        let data = fs::read(&output).expect("read archive");
        extract(&data, ArchiveFormat::Zip, &target, &output).expect("extract");
        assert!(target.join("collection.yml").is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(target.join("greet").join("greet.sh"))
                .expect("metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn zip_rejects_path_traversal() {
        let fixture = TestFixture::new();
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            zip.start_file("../escape.txt", SimpleFileOptions::default())
                .expect("start file");
            zip.write_all(b"nope").expect("write");
            zip.finish().expect("finish");
        }

        let target = fixture.scratch_dir().join("unpacked");
        let error = extract(&data, ArchiveFormat::Zip, &target, Path::new("evil.zip"))
            .expect_err("traversal");
        assert!(matches!(error, Error::ArchiveRead { .. }));
        assert!(!fixture.scratch_dir().join("escape.txt").exists());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let fixture = TestFixture::new();
        let target = fixture.scratch_dir().join("unpacked");
        let error = extract(b"not an archive", ArchiveFormat::TarGz, &target, Path::new("bad.tgz"))
            .expect_err("corrupt");
        assert!(matches!(error, Error::ArchiveRead { .. }));
    }
}
