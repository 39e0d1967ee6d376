//! Recursive tree scanning
//!
//! A scan walks one root with `walkdir`, never following links, and keys
//! every entry below the root by its exact relative path. Failures on
//! individual entries are logged and skipped; only a failure to read the root
//! itself aborts the scan.

use dirsync_types::{Entry, EntryKind, Error, Result, ScanResult, SyncLogger, TreeSide};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Outcome of scanning one tree
#[derive(Debug)]
pub struct TreeScan {
    /// Entries below the root
    pub entries: ScanResult,
    /// Per-entry failures that were logged and skipped
    pub errors: Vec<Error>,
}

/// Walks a directory tree into a [`ScanResult`]
pub struct TreeScanner<'a> {
    logger: &'a dyn SyncLogger,
}

impl<'a> TreeScanner<'a> {
    /// Create a scanner reporting per-entry failures to `logger`
    pub fn new(logger: &'a dyn SyncLogger) -> Self {
        Self { logger }
    }

    /// Scan everything reachable below `root`, excluding `root` itself
    pub fn scan(&self, root: &Path, side: TreeSide) -> Result<TreeScan> {
        let root = absolutize(root).map_err(|e| Error::ResolvePath {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut entries = ScanResult::new();
        let mut errors = Vec::new();

        for item in WalkDir::new(&root).follow_links(false) {
            let entry = match item {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(Error::walk(side, &root, err.to_string()));
                }
                Err(err) => {
                    let path = err.path().unwrap_or(&root).to_path_buf();
                    self.logger
                        .error(format_args!("{} error: {}", path.display(), err));
                    errors.push(Error::ScanEntry {
                        side,
                        path,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            if entry.depth() == 0 {
                if !entry.file_type().is_dir() && !entry.path_is_symlink() {
                    return Err(Error::NotADirectory { side, path: root });
                }
                continue;
            }

            let relative = match entry.path().strip_prefix(&root) {
                Ok(relative) => relative,
                Err(err) => {
                    self.logger.error(format_args!(
                        "failed to resolve rel path ({}): {}",
                        entry.path().display(),
                        err
                    ));
                    errors.push(Error::ScanEntry {
                        side,
                        path: entry.path().to_path_buf(),
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            let kind = EntryKind::from_file_type(entry.file_type());
            if !entries.insert(Entry::new(relative, entry.path(), kind)) {
                let error = Error::ScanEntry {
                    side,
                    path: entry.path().to_path_buf(),
                    message: "duplicate relative path".to_string(),
                };
                self.logger.error(format_args!("{}", error));
                errors.push(error);
            }
        }

        debug!(
            "Scanned {} entries in {} '{}'",
            entries.len(),
            side,
            root.display()
        );
        Ok(TreeScan { entries, errors })
    }
}

/// Resolve `path` against the working directory without touching the filesystem
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty path"));
    }
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::RecordingLogger;
    use dirsync_types::display_path;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("file1.txt"), "content1").unwrap();
        fs::write(temp_dir.path().join("file2.txt"), "content2").unwrap();
        fs::create_dir(temp_dir.path().join("subdir")).unwrap();
        fs::write(temp_dir.path().join("subdir/file3.txt"), "content3").unwrap();
        temp_dir
    }

    #[test]
    fn test_scan_excludes_root_and_uses_relative_keys() {
        let tree = sample_tree();
        let logger = RecordingLogger::new();

        let scan = TreeScanner::new(&logger)
            .scan(tree.path(), TreeSide::Source)
            .unwrap();

        let keys: Vec<_> = scan.entries.paths().map(display_path).collect();
        assert_eq!(keys, ["file1.txt", "file2.txt", "subdir", "subdir/file3.txt"]);
        assert!(scan.errors.is_empty());
        assert!(logger.records().is_empty());

        let subdir = scan.entries.get("subdir").unwrap();
        assert!(subdir.is_dir());
        assert_eq!(subdir.path(), tree.path().join("subdir"));
        assert_eq!(
            scan.entries.get("subdir/file3.txt").unwrap().kind(),
            EntryKind::File
        );
    }

    #[test]
    fn test_scan_empty_root() {
        let tree = TempDir::new().unwrap();
        let logger = RecordingLogger::new();

        let scan = TreeScanner::new(&logger)
            .scan(tree.path(), TreeSide::Destination)
            .unwrap();
        assert!(scan.entries.is_empty());
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        let tree = TempDir::new().unwrap();
        let logger = RecordingLogger::new();

        let result = TreeScanner::new(&logger).scan(&tree.path().join("missing"), TreeSide::Source);
        assert!(matches!(
            result,
            Err(Error::Walk {
                side: TreeSide::Source,
                ..
            })
        ));
    }

    #[test]
    fn test_scan_file_root_is_rejected() {
        let tree = sample_tree();
        let logger = RecordingLogger::new();

        let result =
            TreeScanner::new(&logger).scan(&tree.path().join("file1.txt"), TreeSide::Source);
        assert!(matches!(result, Err(Error::NotADirectory { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_reports_symlinks_without_following() {
        let tree = sample_tree();
        std::os::unix::fs::symlink(tree.path().join("subdir"), tree.path().join("link")).unwrap();
        let logger = RecordingLogger::new();

        let scan = TreeScanner::new(&logger)
            .scan(tree.path(), TreeSide::Source)
            .unwrap();

        assert_eq!(scan.entries.get("link").unwrap().kind(), EntryKind::Symlink);
        assert!(!scan.entries.contains("link/file3.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let tree = sample_tree();
        let sealed = tree.path().join("sealed");
        fs::create_dir(&sealed).unwrap();
        fs::write(sealed.join("inner.txt"), "hidden").unwrap();
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&sealed).is_ok() {
            // Permission bits do not bind a privileged user.
            fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }
        let logger = RecordingLogger::new();

        let scan = TreeScanner::new(&logger).scan(tree.path(), TreeSide::Source);
        fs::set_permissions(&sealed, fs::Permissions::from_mode(0o755)).unwrap();
        let scan = scan.unwrap();

        assert_eq!(scan.errors.len(), 1);
        assert!(matches!(
            &scan.errors[0],
            Error::ScanEntry { side: TreeSide::Source, path, .. } if *path == sealed
        ));
        let errors = logger.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with(&format!("{} error:", sealed.display())));

        assert!(scan.entries.contains("sealed"));
        assert!(!scan.entries.contains("sealed/inner.txt"));
        assert!(scan.entries.contains("file1.txt"));
        assert!(scan.entries.contains("subdir/file3.txt"));
    }

    #[test]
    fn test_absolutize() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("src")).unwrap(), cwd.join("src"));
        assert_eq!(absolutize(&cwd.join("abs")).unwrap(), cwd.join("abs"));
        assert!(absolutize(Path::new("")).is_err());
    }
}
