//! Unified test utilities for dirsync integration tests

use dirsync_sync::{RecordingLogger, SyncEngine, SyncOptions, SyncRequest};
use dirsync_types::{Result, SyncReport};
use filetime::{set_file_mtime, FileTime};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use walkdir::WalkDir;

/// What a tree holds at one relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Directory
    Dir,
    /// Regular file with its content
    File(Vec<u8>),
}

/// Read a tree into `relative path -> node`, excluding the root
pub fn snapshot(root: &Path) -> BTreeMap<String, Node> {
    let mut tree = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.expect("walk test tree");
        let relative = entry
            .path()
            .strip_prefix(root)
            .expect("entry below root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let node = if entry.file_type().is_dir() {
            Node::Dir
        } else {
            Node::File(fs::read(entry.path()).expect("read test file"))
        };
        tree.insert(relative, node);
    }
    tree
}

/// A source and destination pair inside one temporary directory
pub struct MirrorFixture {
    _root: TempDir,
    /// Source root (always exists)
    pub source: PathBuf,
    /// Destination root (not created until asked)
    pub destination: PathBuf,
    /// Logger shared with every engine built by [`MirrorFixture::run`]
    pub logger: Arc<RecordingLogger>,
}

impl MirrorFixture {
    /// Empty source, no destination
    pub fn empty() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let source = root.path().join("source");
        let destination = root.path().join("target");
        fs::create_dir(&source).expect("create source root");
        Self {
            _root: root,
            source,
            destination,
            logger: Arc::new(RecordingLogger::new()),
        }
    }

    /// `file1.txt`, `file2.txt` and `subdir/file3.txt` in the source
    pub fn standard() -> Self {
        let fixture = Self::empty();
        fixture.source_file("file1.txt", "content1");
        fixture.source_file("file2.txt", "content2");
        fixture.source_file("subdir/file3.txt", "content3");
        fixture
    }

    /// Standard source plus an existing destination holding `target_only.txt`
    pub fn with_target_only() -> Self {
        let fixture = Self::standard();
        fixture.destination_file("target_only.txt", "target content");
        fixture
    }

    /// Write a source file, creating parents
    pub fn source_file(&self, relative: &str, content: &str) -> PathBuf {
        write_file(&self.source, relative, content)
    }

    /// Create a source directory, with parents
    pub fn source_dir(&self, relative: &str) -> PathBuf {
        let path = self.source.join(relative);
        fs::create_dir_all(&path).expect("create source dir");
        path
    }

    /// Write a destination file, creating the root and parents
    pub fn destination_file(&self, relative: &str, content: &str) -> PathBuf {
        write_file(&self.destination, relative, content)
    }

    /// Create a destination directory, with parents
    pub fn destination_dir(&self, relative: &str) -> PathBuf {
        let path = self.destination.join(relative);
        fs::create_dir_all(&path).expect("create destination dir");
        path
    }

    /// Run one sync with the shared recording logger
    pub fn run(&self, options: SyncOptions) -> Result<SyncReport> {
        let engine = SyncEngine::new(Arc::clone(&self.logger));
        engine.sync(&SyncRequest::new(&self.source, &self.destination).with_options(options))
    }

    /// Snapshot of the source tree
    pub fn source_tree(&self) -> BTreeMap<String, Node> {
        snapshot(&self.source)
    }

    /// Snapshot of the destination tree
    pub fn destination_tree(&self) -> BTreeMap<String, Node> {
        snapshot(&self.destination)
    }
}

/// Pin the modification time of `path` to `secs` since the epoch
pub fn set_mtime(path: &Path, secs: i64) {
    set_file_mtime(path, FileTime::from_unix_time(secs, 0)).expect("set mtime");
}

fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, content).expect("write test file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_fixture_layout() {
        let fixture = MirrorFixture::standard();

        let tree = fixture.source_tree();
        assert_eq!(
            tree.keys().collect::<Vec<_>>(),
            ["file1.txt", "file2.txt", "subdir", "subdir/file3.txt"]
        );
        assert_eq!(tree["subdir"], Node::Dir);
        assert_eq!(tree["file2.txt"], Node::File(b"content2".to_vec()));
        assert!(!fixture.destination.exists());
    }
}
