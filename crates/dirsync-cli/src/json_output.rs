//! JSON output structures for the dirsync CLI

use chrono::{DateTime, Utc};
use dirsync_types::{SyncAction, SyncFailure, SyncReport, SyncStats};
use serde::{Deserialize, Serialize};

/// Complete JSON output for a sync run
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResultJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Actions in execution order
    pub actions: Vec<SyncAction>,
    /// Path-local failures
    pub failures: Vec<SyncFailure>,
    /// Sync statistics
    pub stats: SyncStatsJson,
    /// Overall result
    pub result: OperationResult,
}

/// Operation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// dirsync version
    pub version: String,
    /// Run identifier
    pub run_id: String,
    /// Timestamp when the run started
    pub timestamp: String,
    /// Source path
    pub source_path: String,
    /// Destination path
    pub destination_path: String,
    /// Whether the destination was left untouched
    pub dry_run: bool,
}

/// Sync statistics in JSON format
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncStatsJson {
    /// Files created at the destination
    pub files_copied: u64,
    /// Directories created at the destination
    pub directories_created: u64,
    /// Stale entries rewritten
    pub entries_overwritten: u64,
    /// Destination-only entries removed
    pub entries_deleted: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Entries that were already in sync
    pub entries_in_sync: u64,
    /// Destination-only entries left in place
    pub entries_left: u64,
    /// Number of errors
    pub errors: u64,
    /// Duration in seconds
    pub duration_seconds: f64,
}

/// Overall operation result
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether every path was handled without error
    pub success: bool,
    /// Result message
    pub message: String,
}

impl SyncResultJson {
    /// Build the JSON document for a finished run
    pub fn new(report: &SyncReport) -> Self {
        let success = report.is_clean();
        let message = if success {
            format!("Sync completed with {} changes", report.stats.changes())
        } else {
            format!("Sync completed with {} errors", report.stats.errors)
        };

        Self {
            metadata: OperationMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                run_id: report.run_id.to_string(),
                timestamp: DateTime::<Utc>::from(report.started_at).to_rfc3339(),
                source_path: report.source.display().to_string(),
                destination_path: report.destination.display().to_string(),
                dry_run: report.dry_run,
            },
            actions: report.actions.clone(),
            failures: report.failures.clone(),
            stats: SyncStatsJson::from_stats(&report.stats),
            result: OperationResult { success, message },
        }
    }
}

impl SyncStatsJson {
    /// Create SyncStatsJson from SyncStats
    pub fn from_stats(stats: &SyncStats) -> Self {
        Self {
            files_copied: stats.files_copied,
            directories_created: stats.directories_created,
            entries_overwritten: stats.entries_overwritten,
            entries_deleted: stats.entries_deleted,
            bytes_copied: stats.bytes_copied,
            entries_in_sync: stats.entries_in_sync,
            entries_left: stats.entries_left,
            errors: stats.errors,
            duration_seconds: stats.duration.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirsync_types::{ActionKind, RunId};
    use std::path::PathBuf;

    #[test]
    fn test_json_document_shape() {
        let mut report = SyncReport::new(
            RunId::nil(),
            PathBuf::from("/src"),
            PathBuf::from("/dst"),
            false,
        );
        report.record(SyncAction::new(ActionKind::Copy, "subdir", true), 0);
        report.record(SyncAction::new(ActionKind::Copy, "subdir/file3.txt", false), 8);

        let value = serde_json::to_value(SyncResultJson::new(&report)).unwrap();

        assert_eq!(value["metadata"]["run_id"], RunId::nil().to_string());
        assert_eq!(value["actions"][1]["kind"], "copy");
        assert_eq!(value["actions"][1]["path"], "subdir/file3.txt");
        assert_eq!(value["stats"]["files_copied"], 1);
        assert_eq!(value["stats"]["directories_created"], 1);
        assert_eq!(value["stats"]["bytes_copied"], 8);
        assert_eq!(value["result"]["success"], true);
    }
}
