//! CSV persistence of inventory tables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use filescope_core::FileRecord;

/// Errors raised while writing or reading a table.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The parent directory of the output file could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the table failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Reading the table failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The header row does not list the inventory columns in order.
    #[error("unexpected header in {}: expected [{expected}], found [{found}]", path.display())]
    SchemaMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

impl PersistError {
    /// The file or directory the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::CreateDir { path, .. }
            | Self::Write { path, .. }
            | Self::Read { path, .. }
            | Self::SchemaMismatch { path, .. } => path,
        }
    }
}

/// Write rows as comma-separated text with a header row.
///
/// Missing parent directories are created. The header is written even when
/// `records` is empty. An existing file is replaced.
pub fn write_table(path: impl AsRef<Path>, records: &[FileRecord]) -> Result<(), PersistError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            debug!(path = %parent.display(), "creating output directory");
            fs::create_dir_all(parent).map_err(|source| PersistError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let write_err = |source: csv::Error| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(write_err)?;

    writer.write_record(FileRecord::COLUMNS).map_err(write_err)?;
    for record in records {
        writer.serialize(record).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;

    info!(path = %path.display(), rows = records.len(), "wrote inventory table");
    Ok(())
}

/// Read a table written by [`write_table`].
pub fn read_table(path: impl AsRef<Path>) -> Result<Vec<FileRecord>, PersistError> {
    let path = path.as_ref();
    let read_err = |source: csv::Error| PersistError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    if !headers.iter().eq(FileRecord::COLUMNS) {
        return Err(PersistError::SchemaMismatch {
            path: path.to_path_buf(),
            expected: FileRecord::COLUMNS.join(","),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let records = reader
        .deserialize()
        .collect::<Result<Vec<FileRecord>, _>>()
        .map_err(read_err)?;

    debug!(path = %path.display(), rows = records.len(), "read inventory table");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_table_has_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/out/table.csv");

        write_table(&path, &[]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), FileRecord::COLUMNS.join(","));
        assert!(read_table(&path).unwrap().is_empty());
    }

    #[test]
    fn test_header_mismatch_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("other.csv");
        fs::write(&path, "directory,filename,size\n/a,b,1\n").unwrap();

        let err = read_table(&path).unwrap_err();
        assert!(matches!(err, PersistError::SchemaMismatch { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_create_dir_failure() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let err = write_table(blocker.join("sub/table.csv"), &[]).unwrap_err();
        assert!(matches!(err, PersistError::CreateDir { .. }));
    }
}
