//! Single-file copy with soft failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

/// Options for [`copy_file`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// Check that the source is listed in its directory before copying.
    pub validate_presence: bool,
}

/// Why a copy was skipped.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("{} is not present in {}", name, dir.display())]
    SourceAbsent { dir: PathBuf, name: String },

    #[error("failed to create destination directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a copy request.
#[derive(Debug)]
pub enum CopyOutcome {
    /// The file was copied.
    Copied { bytes: u64 },
    /// Nothing was copied.
    Skipped(CopyError),
}

impl CopyOutcome {
    /// Check if the file was copied.
    pub fn is_copied(&self) -> bool {
        matches!(self, Self::Copied { .. })
    }
}

/// Check whether `name` is listed in `dir`.
///
/// An unreadable directory counts as "not present" and is logged.
pub fn source_present(dir: impl AsRef<Path>, name: &str) -> bool {
    let dir = dir.as_ref();
    match fs::read_dir(dir) {
        Ok(entries) => {
            let present = entries
                .filter_map(Result::ok)
                .any(|entry| entry.file_name() == name);
            if present {
                info!(dir = %dir.display(), name, "source present");
            } else {
                warn!(dir = %dir.display(), name, "source not present");
            }
            present
        }
        Err(err) => {
            error!(dir = %dir.display(), name, "cannot list source directory: {err}");
            false
        }
    }
}

/// Copy `source` to the file path `destination`.
///
/// Missing destination directories are created and an existing destination
/// file is replaced. Failures never panic; they are logged and returned as
/// [`CopyOutcome::Skipped`].
pub fn copy_file(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: CopyOptions,
) -> CopyOutcome {
    let (source, destination) = (source.as_ref(), destination.as_ref());

    match try_copy(source, destination, options) {
        Ok(bytes) => {
            info!(from = %source.display(), to = %destination.display(), bytes, "copied file");
            CopyOutcome::Copied { bytes }
        }
        Err(err) => {
            warn!("copy skipped: {err}");
            CopyOutcome::Skipped(err)
        }
    }
}

fn try_copy(source: &Path, destination: &Path, options: CopyOptions) -> Result<u64, CopyError> {
    if options.validate_presence {
        let dir = source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if name.is_empty() || !source_present(dir, &name) {
            return Err(CopyError::SourceAbsent {
                dir: dir.to_path_buf(),
                name,
            });
        }
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            warn!(path = %parent.display(), "destination directory missing, creating it");
            fs::create_dir_all(parent).map_err(|source| CopyError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    fs::copy(source, destination).map_err(|err| CopyError::Copy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_source_present() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("here.txt"), "x").unwrap();

        assert!(source_present(temp.path(), "here.txt"));
        assert!(!source_present(temp.path(), "gone.txt"));
        assert!(!source_present(temp.path().join("missing"), "here.txt"));
    }

    #[test]
    fn test_missing_source_is_soft() {
        let temp = TempDir::new().unwrap();
        let outcome = copy_file(
            temp.path().join("nope.txt"),
            temp.path().join("out/nope.txt"),
            CopyOptions::default(),
        );

        assert!(matches!(outcome, CopyOutcome::Skipped(CopyError::Copy { .. })));
    }
}
