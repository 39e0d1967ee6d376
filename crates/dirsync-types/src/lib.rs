//! Core type system and error handling for dirsync
//!
//! This crate provides the foundational types shared by the dirsync crates:
//!
//! - **Error handling**: run-fatal and path-local errors with severity levels
//! - **Scan results**: entries keyed by their exact relative path, iterated in
//!   parent-before-child order
//! - **Run reports**: ordered action log, failures and counters
//! - **Traits**: the [`SyncLogger`] collaborator the engine reports to
//!
//! # Features
//!
//! - `serde`: Enable serialization support for reports and errors
//!
//! # Examples
//!
//! ```rust
//! use dirsync_types::{display_path, Entry, EntryKind, ScanResult};
//!
//! let mut scan = ScanResult::new();
//! scan.insert(Entry::new("subdir/file3.txt", "/src/subdir/file3.txt", EntryKind::File));
//! scan.insert(Entry::new("subdir", "/src/subdir", EntryKind::Directory));
//!
//! let order: Vec<_> = scan.paths().map(display_path).collect();
//! assert_eq!(order, ["subdir", "subdir/file3.txt"]);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{ApplyStage, DeleteTarget, Error, ErrorKind, ErrorSeverity, TreeSide};
pub use result::Result;
pub use traits::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::Path;

    #[test]
    fn test_relative_key_normalizes_components() {
        assert_eq!(
            relative_key(Path::new("a/b/c.txt")).as_deref(),
            Some(Path::new("a/b/c.txt"))
        );
        assert_eq!(relative_key(Path::new("./a")).as_deref(), Some(Path::new("a")));
        assert_eq!(relative_key(Path::new("")), None);
        assert_eq!(relative_key(Path::new("../escape")), None);
        assert_eq!(relative_key(Path::new("/abs")), None);
        assert_eq!(display_path(Path::new("a/./b/c.txt")), "a/b/c.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_keep_distinct_keys() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let ff = Path::new(OsStr::from_bytes(b"\xff"));
        let fe = Path::new(OsStr::from_bytes(b"\xfe"));
        let mut scan = ScanResult::new();
        assert!(scan.insert(Entry::new(ff, "/src/ff", EntryKind::File)));
        assert!(scan.insert(Entry::new(fe, "/src/fe", EntryKind::File)));

        assert_eq!(scan.len(), 2);
        assert_eq!(scan.get(ff).map(Entry::path), Some(Path::new("/src/ff")));
        assert_eq!(scan.get(fe).map(Entry::path), Some(Path::new("/src/fe")));
        // Both render the same way; only the keys tell them apart.
        assert_eq!(display_path(ff), display_path(fe));
    }

    #[test]
    fn test_scan_result_rejects_duplicates_and_root() {
        let mut scan = ScanResult::new();
        assert!(scan.insert(Entry::new("file1.txt", "/src/file1.txt", EntryKind::File)));
        assert!(!scan.insert(Entry::new("file1.txt", "/src/other", EntryKind::File)));
        assert!(!scan.insert(Entry::new("", "/src", EntryKind::Directory)));

        assert_eq!(scan.len(), 1);
        assert_eq!(scan.get("file1.txt").map(Entry::path), Some(Path::new("/src/file1.txt")));
    }

    #[test]
    fn test_report_counters() {
        let mut report = SyncReport::new(RunId::new_v4(), "/src".into(), "/dst".into(), false);
        report.record(SyncAction::new(ActionKind::Copy, "subdir", true), 0);
        report.record(SyncAction::new(ActionKind::Copy, "subdir/file3.txt", false), 8);
        report.record(SyncAction::new(ActionKind::Overwrite, "file1.txt", false), 8);
        report.record(SyncAction::new(ActionKind::Delete, "target_only.txt", false), 0);

        assert_eq!(report.stats.directories_created, 1);
        assert_eq!(report.stats.files_copied, 1);
        assert_eq!(report.stats.entries_overwritten, 1);
        assert_eq!(report.stats.entries_deleted, 1);
        assert_eq!(report.stats.bytes_copied, 16);
        assert_eq!(report.stats.changes(), 4);
        assert_eq!(report.actions_of(ActionKind::Copy).count(), 2);
        assert!(report.is_clean());
    }

    #[test]
    fn test_entry_metadata_is_lazy() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("content.txt");
        std::fs::write(&path, b"content1").unwrap();

        let entry = Entry::new("content.txt", &path, EntryKind::File);
        assert_eq!(entry.metadata().unwrap().size, 8);

        std::fs::remove_file(&path).unwrap();
        assert!(entry.metadata().is_err());
    }

    proptest! {
        #[test]
        fn test_parent_sorts_before_descendants(
            parts in prop::collection::vec("[a-z0-9_-][a-z0-9._-]{0,5}", 1..5),
            child in "[a-z0-9_-][a-z0-9._-]{0,5}",
        ) {
            let parent = parts.join("/");
            let descendant = format!("{}/{}", parent, child);

            let mut scan = ScanResult::new();
            scan.insert(Entry::new(descendant.clone(), "/d", EntryKind::File));
            scan.insert(Entry::new(parent.clone(), "/p", EntryKind::Directory));

            let order: Vec<_> = scan.paths().collect();
            let parent_at = order.iter().position(|key| *key == Path::new(&parent));
            let child_at = order.iter().position(|key| *key == Path::new(&descendant));
            prop_assert!(parent_at < child_at);
        }
    }
}
