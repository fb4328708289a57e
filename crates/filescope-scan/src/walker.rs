//! JWalk-based directory walker.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use jwalk::{DirEntry, Parallelism, WalkDir};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use filescope_core::{
    InventoryConfig, InventoryError, InventoryWarning, RawFileMeta, Timestamps, WalkStats,
    WarningKind,
};

use crate::owner::OwnerResolver;
use crate::progress::WalkProgress;

/// Files between two progress snapshots.
const PROGRESS_INTERVAL: u64 = 1000;

type EntryResult = Result<DirEntry<((), ())>, jwalk::Error>;

/// Walks a root and yields every regular file below it.
///
/// The walk is serial and sorted by file name within each directory, so two
/// walks of an unchanged tree yield the same sequence.
pub struct FileWalker {
    progress_tx: broadcast::Sender<WalkProgress>,
}

impl FileWalker {
    /// Create a new walker.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to walk progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<WalkProgress> {
        self.progress_tx.subscribe()
    }

    /// Resolve the root to its canonical form, failing if it is not a directory.
    pub fn validate_root(root: &Path) -> Result<PathBuf, InventoryError> {
        let root_path = root.canonicalize().map_err(|e| InventoryError::io(root, e))?;
        if !root_path.is_dir() {
            return Err(InventoryError::RootNotADirectory { path: root_path });
        }
        Ok(root_path)
    }

    /// Start a walk. Nothing is read until the returned iterator is polled.
    pub fn walk(&self, config: &InventoryConfig) -> Result<FileEntries<'_>, InventoryError> {
        let root_path = Self::validate_root(&config.root)?;
        let matcher = Arc::new(config.ignore_matcher()?);

        let mut walker = WalkDir::new(&root_path)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .min_depth(0)
            .max_depth(config.max_depth.map(|d| d as usize).unwrap_or(usize::MAX));

        if !matcher.is_empty() {
            walker = walker.process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|entry| match entry {
                    Ok(e) => !matcher.is_match(e.file_name()),
                    Err(_) => true,
                });
            });
        }

        debug!(root = %root_path.display(), "starting walk");

        Ok(FileEntries {
            entries: Box::new(walker.into_iter()),
            root: root_path,
            follow_symlinks: config.follow_symlinks,
            owners: OwnerResolver::new(),
            stats: WalkStats::new(),
            warnings_count: 0,
            progress_tx: &self.progress_tx,
            start: Instant::now(),
            finished: false,
            pending: None,
        })
    }

    /// Walk to completion and gather files, counters and warnings.
    pub fn collect(&self, config: &InventoryConfig) -> Result<WalkOutput, InventoryError> {
        let mut entries = self.walk(config)?;
        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for item in entries.by_ref() {
            match item {
                WalkItem::File(meta) => files.push(meta),
                WalkItem::Skipped(warning) | WalkItem::Warning(warning) => warnings.push(warning),
            }
        }

        Ok(WalkOutput {
            root: entries.root,
            files,
            stats: entries.stats,
            warnings,
        })
    }
}

impl Default for FileWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of a walk.
#[derive(Debug)]
pub enum WalkItem {
    /// A regular file with all of its metadata.
    File(RawFileMeta),
    /// An entry that could not be read and produced no record.
    Skipped(InventoryWarning),
    /// A soft problem that did not prevent the record (e.g. unknown owner).
    Warning(InventoryWarning),
}

/// Everything a completed walk produced.
#[derive(Debug)]
pub struct WalkOutput {
    /// Canonical root.
    pub root: PathBuf,
    /// Files in walk order.
    pub files: Vec<RawFileMeta>,
    /// Walk counters.
    pub stats: WalkStats,
    /// Warnings in walk order.
    pub warnings: Vec<InventoryWarning>,
}

/// Lazy iterator over the files of a walk.
pub struct FileEntries<'a> {
    entries: Box<dyn Iterator<Item = EntryResult>>,
    root: PathBuf,
    follow_symlinks: bool,
    owners: OwnerResolver,
    stats: WalkStats,
    warnings_count: u64,
    progress_tx: &'a broadcast::Sender<WalkProgress>,
    start: Instant,
    finished: bool,
    pending: Option<WalkItem>,
}

impl FileEntries<'_> {
    fn skip(&mut self, warning: InventoryWarning) -> WalkItem {
        warn!(path = %warning.path.display(), "{}", warning.message);
        self.stats.record_skip();
        self.warnings_count += 1;
        WalkItem::Skipped(warning)
    }

    fn send_progress(&self, current_path: PathBuf, finished: bool) {
        let _ = self.progress_tx.send(WalkProgress {
            files_scanned: self.stats.files,
            dirs_scanned: self.stats.dirs,
            bytes_scanned: self.stats.total_bytes,
            current_path,
            warnings_count: self.warnings_count,
            elapsed: self.start.elapsed(),
            finished,
        });
    }

    /// Turn a metadata record into a file item.
    fn file_item(&mut self, path: PathBuf, metadata: &Metadata, depth: u32) -> WalkItem {
        let timestamps = match read_timestamps(metadata) {
            Ok(t) => t,
            Err(err) => return self.skip(InventoryWarning::metadata(&path, &err)),
        };

        let (owner, owner_err) = self.owners.resolve(metadata);
        let size_bytes = metadata.len();
        self.stats.record_file(size_bytes, depth);

        if self.stats.files % PROGRESS_INTERVAL == 0 {
            self.send_progress(path.clone(), false);
        }

        let meta = RawFileMeta {
            path,
            size_bytes,
            timestamps,
            owner,
        };

        match owner_err {
            // The warning goes out first, the complete record on the next poll.
            Some(err) => {
                let warning = InventoryWarning::owner_unavailable(&meta.path, &err);
                warn!(path = %meta.path.display(), error = %err, "owner unavailable, using sentinel");
                self.warnings_count += 1;
                self.pending = Some(WalkItem::File(meta));
                WalkItem::Warning(warning)
            }
            None => WalkItem::File(meta),
        }
    }
}

impl Iterator for FileEntries<'_> {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        if let Some(item) = self.pending.take() {
            return Some(item);
        }

        loop {
            let Some(entry_result) = self.entries.next() else {
                if !self.finished {
                    self.finished = true;
                    self.send_progress(self.root.clone(), true);
                    debug!(
                        files = self.stats.files,
                        skipped = self.stats.skipped,
                        dirs = self.stats.dirs,
                        "walk finished"
                    );
                }
                return None;
            };

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    let warning = InventoryWarning::new(path, err.to_string(), WarningKind::ReadError);
                    return Some(self.skip(warning));
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if entry.depth() > 0 {
                    self.stats.record_dir();
                }
                continue;
            }

            let path = entry.path();
            let metadata = if file_type.is_symlink() && !self.follow_symlinks {
                // Links to files are listed with their target's metadata; links
                // to directories are never descended.
                match fs::metadata(&path) {
                    Ok(m) if m.is_dir() => continue,
                    Ok(m) => m,
                    Err(err) => return Some(self.skip(InventoryWarning::metadata(&path, &err))),
                }
            } else {
                match entry.metadata() {
                    Ok(m) => m,
                    Err(err) => {
                        let warning = match err.io_error() {
                            Some(io_err) => InventoryWarning::metadata(&path, io_err),
                            None => InventoryWarning::new(
                                &path,
                                format!("Metadata read failed: {err}"),
                                WarningKind::MetadataError,
                            ),
                        };
                        return Some(self.skip(warning));
                    }
                }
            };

            // Sockets, fifos and devices are not inventoried.
            if !metadata.is_file() {
                continue;
            }

            // Rows store paths as text; a lossy conversion could collide with
            // another file's key.
            if path.to_str().is_none() {
                return Some(self.skip(InventoryWarning::invalid_name(&path)));
            }

            return Some(self.file_item(path, &metadata, entry.depth() as u32));
        }
    }
}

fn read_timestamps(metadata: &Metadata) -> std::io::Result<Timestamps> {
    Ok(Timestamps::new(
        created_time(metadata)?,
        metadata.modified()?,
        metadata.accessed()?,
    ))
}

/// Birth time where the filesystem records one, inode change time otherwise.
#[cfg(unix)]
fn created_time(metadata: &Metadata) -> std::io::Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    if let Ok(created) = metadata.created() {
        return Ok(created);
    }
    let secs = metadata.ctime();
    let nanos = metadata.ctime_nsec().clamp(0, 999_999_999) as u32;
    Ok(if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
    })
}

#[cfg(not(unix))]
fn created_time(metadata: &Metadata) -> std::io::Result<SystemTime> {
    metadata.created()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.txt"), "another file here").unwrap();
        fs::write(root.join(".hidden"), "h").unwrap();

        temp
    }

    fn names(output: &WalkOutput) -> Vec<String> {
        output
            .files
            .iter()
            .map(|f| f.path.strip_prefix(&output.root).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_basic_walk() {
        let temp = create_test_tree();
        let output = FileWalker::new().collect(&InventoryConfig::new(temp.path())).unwrap();

        assert_eq!(output.stats.files, 5);
        assert_eq!(output.stats.dirs, 3);
        assert_eq!(output.stats.total_bytes, 5 + 17 + 4 + 17 + 1);
        assert_eq!(output.stats.max_depth, 3);
        assert!(output.warnings.is_empty());
        assert!(output.files.iter().all(|f| f.path.is_absolute()));
    }

    #[test]
    fn test_walk_is_deterministic() {
        let temp = create_test_tree();
        let config = InventoryConfig::new(temp.path());
        let walker = FileWalker::new();

        let first = names(&walker.collect(&config).unwrap());
        let second = names(&walker.collect(&config).unwrap());
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        // Depth-first with names sorted per directory is lexicographic here.
        assert_eq!(first, sorted);
    }

    #[test]
    fn test_skip_hidden_and_ignore_patterns() {
        let temp = create_test_tree();
        let config = InventoryConfig::builder()
            .root(temp.path())
            .include_hidden(false)
            .ignore_patterns(vec!["dir2".to_string(), "file3*".to_string()])
            .build()
            .unwrap();

        let output = FileWalker::new().collect(&config).unwrap();
        let found = names(&output);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|n| !n.contains("dir2")));
        assert!(found.iter().all(|n| !n.ends_with(".hidden")));
        assert!(found.iter().all(|n| !n.ends_with("file3.txt")));
    }

    #[test]
    fn test_max_depth() {
        let temp = create_test_tree();
        let config = InventoryConfig::builder()
            .root(temp.path())
            .max_depth(Some(1))
            .build()
            .unwrap();

        let output = FileWalker::new().collect(&config).unwrap();
        assert_eq!(output.stats.files, 2);
    }

    #[test]
    fn test_invalid_root() {
        let temp = create_test_tree();

        let missing = FileWalker::validate_root(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(missing, InventoryError::RootNotFound { .. }));

        let not_dir = FileWalker::validate_root(&temp.path().join("file1.txt")).unwrap_err();
        assert!(matches!(not_dir, InventoryError::RootNotADirectory { .. }));
        assert!(not_dir.is_invalid_root());
    }

    #[cfg(unix)]
    #[test]
    fn test_unfollowed_links_list_files_not_directories() {
        use std::os::unix::fs::symlink;

        let temp = create_test_tree();
        symlink(temp.path().join("file1.txt"), temp.path().join("link.txt")).unwrap();
        symlink(temp.path().join("dir1"), temp.path().join("dir_link")).unwrap();

        let output = FileWalker::new().collect(&InventoryConfig::new(temp.path())).unwrap();
        assert_eq!(output.stats.files, 6);
        assert_eq!(output.stats.dirs, 3);
        assert!(output.warnings.is_empty());

        let link = output
            .files
            .iter()
            .find(|f| f.path.ends_with("link.txt"))
            .unwrap();
        assert_eq!(link.size_bytes, 5);
        assert!(output.files.iter().all(|f| !f.path.starts_with(output.root.join("dir_link"))));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_is_skipped_with_warning() {
        let temp = create_test_tree();
        let dangling = temp.path().join("dangling");
        std::os::unix::fs::symlink(temp.path().join("gone.txt"), &dangling).unwrap();

        let output = FileWalker::new().collect(&InventoryConfig::new(temp.path())).unwrap();
        assert_eq!(output.stats.files, 5);
        assert_eq!(output.stats.skipped, 1);
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].kind, WarningKind::MetadataError);
        assert!(output.warnings[0].path.ends_with("dangling"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_followed_is_skipped() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path().join("gone.txt"), temp.path().join("dangling"))
            .unwrap();
        let config = InventoryConfig::builder()
            .root(temp.path())
            .follow_symlinks(true)
            .build()
            .unwrap();

        let output = FileWalker::new().collect(&config).unwrap();
        assert_eq!(output.stats.files, 5);
        assert_eq!(output.stats.skipped, 1);
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].path.ends_with("dangling"));
        assert!(matches!(
            output.warnings[0].kind,
            WarningKind::ReadError | WarningKind::MetadataError
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = create_test_tree();
        fs::write(temp.path().join(OsStr::from_bytes(b"a\xff")), "x").unwrap();
        fs::write(temp.path().join(OsStr::from_bytes(b"a\xfe")), "y").unwrap();

        let output = FileWalker::new().collect(&InventoryConfig::new(temp.path())).unwrap();
        assert_eq!(output.stats.files, 5);
        assert!(output.files.iter().all(|f| f.path.to_str().is_some()));
        assert_eq!(output.warnings.len(), 2);
        assert!(output.warnings.iter().all(|w| w.kind == WarningKind::InvalidName));
        assert_ne!(output.warnings[0].path, output.warnings[1].path);
    }

    #[test]
    fn test_final_progress_is_sent() {
        let temp = create_test_tree();
        let walker = FileWalker::new();
        let mut rx = walker.subscribe();

        walker.collect(&InventoryConfig::new(temp.path())).unwrap();

        let mut last = None;
        while let Ok(progress) = rx.try_recv() {
            last = Some(progress);
        }
        let last = last.expect("final progress snapshot");
        assert!(last.finished);
        assert_eq!(last.files_scanned, 5);
    }
}
