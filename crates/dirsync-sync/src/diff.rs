//! Update decisions and action ordering
//!
//! Nothing in here writes to the filesystem. [`compare`] decides whether a
//! matched pair of entries needs the source copied over the destination; the
//! ordering helpers turn scan results into the exact sequences the engine
//! walks.

use dirsync_types::{Entry, EntryKind, Error, ScanResult};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Why a destination entry must be rewritten
#[derive(Debug)]
pub enum UpdateReason {
    /// One side is a directory, the other is not
    DirectoryMismatch,
    /// Coarse entry kinds differ (e.g. file vs symlink)
    KindMismatch {
        /// Kind in the source tree
        source: EntryKind,
        /// Kind in the destination tree
        destination: EntryKind,
    },
    /// Sizes differ
    SizeMismatch {
        /// Source size in bytes
        source: u64,
        /// Destination size in bytes
        destination: u64,
    },
    /// Source was modified strictly after the destination
    SourceNewer,
    /// Status could not be read on one side; re-copy to be safe
    MetadataUnavailable(Error),
}

impl fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryMismatch => f.write_str("directory/file mismatch"),
            Self::KindMismatch {
                source,
                destination,
            } => write!(f, "type changed from {:?} to {:?}", destination, source),
            Self::SizeMismatch {
                source,
                destination,
            } => write!(f, "size {} differs from {}", destination, source),
            Self::SourceNewer => f.write_str("source is newer"),
            Self::MetadataUnavailable(error) => write!(f, "{}", error),
        }
    }
}

/// Outcome of comparing a matched source/destination pair
#[derive(Debug)]
pub enum Verdict {
    /// Nothing to do
    InSync,
    /// The apply step must run for this path
    Update(UpdateReason),
}

impl Verdict {
    /// Whether the apply step must run
    pub fn needs_update(&self) -> bool {
        matches!(self, Self::Update(_))
    }
}

/// Decide whether `destination` must be rewritten from `source`
///
/// Directory-ness and kind come from the scan. Size and modification time are
/// read lazily and only for non-directories. Equal size with a source mtime
/// equal to or older than the destination's is treated as in sync.
pub fn compare(source: &Entry, destination: &Entry) -> Verdict {
    if source.is_dir() != destination.is_dir() {
        return Verdict::Update(UpdateReason::DirectoryMismatch);
    }
    if source.kind() != destination.kind() {
        return Verdict::Update(UpdateReason::KindMismatch {
            source: source.kind(),
            destination: destination.kind(),
        });
    }
    if source.is_dir() {
        return Verdict::InSync;
    }

    let source_meta = match source.metadata() {
        Ok(meta) => meta,
        Err(e) => {
            return Verdict::Update(UpdateReason::MetadataUnavailable(Error::metadata(
                source.path(),
                &e,
            )))
        }
    };
    let destination_meta = match destination.metadata() {
        Ok(meta) => meta,
        Err(e) => {
            return Verdict::Update(UpdateReason::MetadataUnavailable(Error::metadata(
                destination.path(),
                &e,
            )))
        }
    };

    if source_meta.size != destination_meta.size {
        return Verdict::Update(UpdateReason::SizeMismatch {
            source: source_meta.size,
            destination: destination_meta.size,
        });
    }
    if source_meta.modified > destination_meta.modified {
        return Verdict::Update(UpdateReason::SourceNewer);
    }
    Verdict::InSync
}

/// Destination keys that were never reconciled, ascending
pub fn destination_only<'a>(
    destination: &'a ScanResult,
    reconciled: &HashSet<&Path>,
) -> Vec<&'a Path> {
    destination
        .paths()
        .filter(|path| !reconciled.contains(path))
        .collect()
}

/// Order in which destination-only entries are removed
///
/// Every non-directory first, ascending; then directories descending, so a
/// directory comes after everything that sorts below it.
pub fn deletion_order<'a>(destination: &ScanResult, only: &[&'a Path]) -> Vec<&'a Path> {
    let is_dir = |path: &Path| destination.get(path).is_some_and(Entry::is_dir);

    let mut files: Vec<&'a Path> = only.iter().copied().filter(|path| !is_dir(path)).collect();
    files.sort_unstable();

    let mut directories: Vec<&'a Path> =
        only.iter().copied().filter(|path| is_dir(path)).collect();
    directories.sort_unstable();
    directories.reverse();

    files.extend(directories);
    files
}
