//! Core data types for dirsync
//!
//! Scan results, entry metadata, and the run report produced by the sync
//! engine.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Unique identifier for a sync run
pub type RunId = uuid::Uuid;

/// Coarse kind of a filesystem object, as reported by the directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (never followed)
    Symlink,
    /// Anything else: fifo, socket, device node
    Other,
}

impl EntryKind {
    /// Classify a file type without touching the file contents
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Detailed status of an entry, fetched on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Permission bits (`0o777` style; `0o755`/`0o644` on platforms without modes)
    pub permissions: u32,
    /// Kind at the time of the status call
    pub kind: EntryKind,
}

impl EntryMetadata {
    /// Extract the fields dirsync compares from a std metadata value
    pub fn from_std(metadata: &fs::Metadata) -> io::Result<Self> {
        Ok(Self {
            size: metadata.len(),
            modified: metadata.modified()?,
            permissions: permission_bits(metadata),
            kind: EntryKind::from_file_type(metadata.file_type()),
        })
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o755,
        (false, true) => 0o444,
        (false, false) => 0o644,
    }
}

/// One filesystem object discovered during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    relative: PathBuf,
    path: PathBuf,
    kind: EntryKind,
}

impl Entry {
    /// Create an entry from its path relative to the scan root and its absolute path
    pub fn new(relative: impl Into<PathBuf>, path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            relative: relative.into(),
            path: path.into(),
            kind,
        }
    }

    /// Path relative to the scan root
    pub fn relative_path(&self) -> &Path {
        &self.relative
    }

    /// Absolute path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Coarse kind reported by the directory entry
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Read size, mtime and mode with a status call; links are not followed
    pub fn metadata(&self) -> io::Result<EntryMetadata> {
        let metadata = fs::symlink_metadata(&self.path)?;
        EntryMetadata::from_std(&metadata)
    }
}

/// Turn a root-relative path into a scan key
///
/// Only plain name components are kept, byte for byte. Returns `None` for
/// the root itself (an empty path) and for paths that are not plain
/// descendants (absolute, or containing `..`).
pub fn relative_key(relative: &Path) -> Option<PathBuf> {
    let mut key = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => key.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!key.as_os_str().is_empty()).then_some(key)
}

/// Render a scan key for logs and reports
///
/// Components are joined with `/` regardless of platform. Names that are
/// not valid UTF-8 are rendered lossily; never use the result for I/O.
pub fn display_path(key: &Path) -> String {
    let mut shown = String::new();
    for part in key.components() {
        if !shown.is_empty() {
            shown.push('/');
        }
        shown.push_str(&part.as_os_str().to_string_lossy());
    }
    shown
}

/// Mapping from relative path to entry for one scanned tree
///
/// Keys are compared component by component, which places every directory
/// before all of its descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    entries: BTreeMap<PathBuf, Entry>,
}

impl ScanResult {
    /// Create an empty scan result
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry under its normalized key
    ///
    /// Returns `false` (and keeps the existing entry) when the key is the
    /// root or is already present.
    pub fn insert(&mut self, entry: Entry) -> bool {
        let Some(key) = relative_key(entry.relative_path()) else {
            return false;
        };
        match self.entries.entry(key) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Look up an entry by key
    pub fn get(&self, key: impl AsRef<Path>) -> Option<&Entry> {
        self.entries.get(key.as_ref())
    }

    /// Whether the key is present
    pub fn contains(&self, key: impl AsRef<Path>) -> bool {
        self.entries.contains_key(key.as_ref())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in ascending order
    pub fn paths(&self) -> impl DoubleEndedIterator<Item = &Path> + '_ {
        self.entries.keys().map(PathBuf::as_path)
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Path, &Entry)> + '_ {
        self.entries.iter().map(|(key, entry)| (key.as_path(), entry))
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = (&'a PathBuf, &'a Entry);
    type IntoIter = btree_map::Iter<'a, PathBuf, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// What the engine did to a destination path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ActionKind {
    /// Entry was missing at the destination and has been created
    Copy,
    /// Entry existed but was stale and has been rewritten
    Overwrite,
    /// Destination-only entry has been removed
    Delete,
}

/// One performed action, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncAction {
    /// Action taken
    pub kind: ActionKind,
    /// Relative path the action applied to, rendered with [`display_path`]
    pub path: String,
    /// Whether the path is a directory
    pub is_dir: bool,
}

impl SyncAction {
    /// Create a new action record
    pub fn new(kind: ActionKind, path: impl Into<String>, is_dir: bool) -> Self {
        Self {
            kind,
            path: path.into(),
            is_dir,
        }
    }
}

/// A path-local failure recorded during a run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncFailure {
    /// Relative path (or absolute path for scan failures)
    pub path: String,
    /// Rendered error
    pub message: String,
}

/// Counters aggregated over a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncStats {
    /// Files created at the destination
    pub files_copied: u64,
    /// Stale entries rewritten
    pub entries_overwritten: u64,
    /// Directories created at the destination
    pub directories_created: u64,
    /// Destination-only entries removed
    pub entries_deleted: u64,
    /// Bytes streamed into destination files
    pub bytes_copied: u64,
    /// Matched entries already in sync
    pub entries_in_sync: u64,
    /// Destination-only entries left in place
    pub entries_left: u64,
    /// Path-local failures
    pub errors: u64,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl SyncStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions that changed the destination
    pub fn changes(&self) -> u64 {
        self.files_copied
            + self.directories_created
            + self.entries_overwritten
            + self.entries_deleted
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncReport {
    /// Run identifier, also attached to log events
    pub run_id: RunId,
    /// Absolute source root
    pub source: PathBuf,
    /// Absolute destination root
    pub destination: PathBuf,
    /// Whether the run only planned its actions
    pub dry_run: bool,
    /// Actions in execution order
    pub actions: Vec<SyncAction>,
    /// Path-local failures in the order they occurred
    pub failures: Vec<SyncFailure>,
    /// Aggregated counters
    pub stats: SyncStats,
    /// When the run started
    pub started_at: SystemTime,
}

impl SyncReport {
    /// Create an empty report for a run
    pub fn new(run_id: RunId, source: PathBuf, destination: PathBuf, dry_run: bool) -> Self {
        Self {
            run_id,
            source,
            destination,
            dry_run,
            actions: Vec::new(),
            failures: Vec::new(),
            stats: SyncStats::new(),
            started_at: SystemTime::now(),
        }
    }

    /// Record a performed action and bump the matching counter
    pub fn record(&mut self, action: SyncAction, bytes: u64) {
        match (action.kind, action.is_dir) {
            (ActionKind::Copy, true) => self.stats.directories_created += 1,
            (ActionKind::Copy, false) => self.stats.files_copied += 1,
            (ActionKind::Overwrite, _) => self.stats.entries_overwritten += 1,
            (ActionKind::Delete, _) => self.stats.entries_deleted += 1,
        }
        self.stats.bytes_copied += bytes;
        self.actions.push(action);
    }

    /// Record a path-local failure
    pub fn record_failure(&mut self, path: impl Into<String>, error: &crate::Error) {
        self.stats.errors += 1;
        self.failures.push(SyncFailure {
            path: path.into(),
            message: error.to_string(),
        });
    }

    /// Actions of one kind, in order
    pub fn actions_of(&self, kind: ActionKind) -> impl Iterator<Item = &SyncAction> + '_ {
        self.actions.iter().filter(move |action| action.kind == kind)
    }

    /// Whether the run finished without path-local failures
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
