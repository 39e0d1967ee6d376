//! Main synchronization engine

use crate::diff::{self, UpdateReason, Verdict};
use crate::scanner::{absolutize, TreeScanner};
use dirsync_types::{
    display_path, ActionKind, ApplyStage, DeleteTarget, Entry, Error, Result, RunId, ScanResult,
    SyncAction, SyncLogger, SyncReport, TreeSide,
};
use filetime::FileTime;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Synchronization request
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Source directory path
    pub source: PathBuf,
    /// Destination directory path
    pub destination: PathBuf,
    /// Sync options
    pub options: SyncOptions,
    /// Run ID for tracking
    pub run_id: RunId,
}

impl SyncRequest {
    /// Create a new sync request with default options
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            options: SyncOptions::default(),
            run_id: RunId::new_v4(),
        }
    }

    /// Set sync options
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }
}

/// Synchronization options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Delete destination entries that don't exist in the source
    pub delete_missing: bool,
    /// Plan and log actions without touching the destination
    pub dry_run: bool,
}

impl SyncOptions {
    /// Create options for mirror sync (delete extra entries)
    pub fn mirror() -> Self {
        Self {
            delete_missing: true,
            ..Self::default()
        }
    }

    /// Toggle dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What reconciling one source entry does at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconcile {
    /// Nothing exists at the destination path yet
    Copy,
    /// A stale entry exists and is rewritten in place
    Overwrite,
}

impl Reconcile {
    fn action(self) -> ActionKind {
        match self {
            Self::Copy => ActionKind::Copy,
            Self::Overwrite => ActionKind::Overwrite,
        }
    }

    /// Progressive form for the action log, bare form for failures
    fn verbs(self) -> (&'static str, &'static str) {
        match self {
            Self::Copy => ("copying", "copy"),
            Self::Overwrite => ("overwriting", "overwrite"),
        }
    }
}

/// One-way directory mirror
///
/// Reconciles source entries in ascending key order, so every parent
/// directory is handled before its children, then optionally removes
/// destination-only entries.
pub struct SyncEngine {
    logger: Arc<dyn SyncLogger>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine").finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Create an engine reporting every action and failure to `logger`
    pub fn new<L: SyncLogger + 'static>(logger: L) -> Self {
        Self {
            logger: Arc::new(logger),
        }
    }

    /// Create an engine sharing an existing logger
    pub fn with_logger(logger: Arc<dyn SyncLogger>) -> Self {
        Self { logger }
    }

    /// Perform synchronization
    ///
    /// Returns `Err` only for run-fatal failures; everything scoped to a
    /// single path is logged and recorded in the report.
    pub fn sync(&self, request: &SyncRequest) -> Result<SyncReport> {
        let span = info_span!("sync", run_id = %request.run_id);
        let _enter = span.enter();
        let start_time = Instant::now();
        let options = request.options;

        let (source, source_mode) = resolve_source(&request.source)?;
        let destination = absolutize(&request.destination).map_err(|e| Error::ResolvePath {
            path: request.destination.clone(),
            message: e.to_string(),
        })?;

        info!(
            "Starting sync: {} -> {}{}",
            source.display(),
            destination.display(),
            if options.dry_run { " (dry run)" } else { "" }
        );

        let mut report = SyncReport::new(
            request.run_id,
            source.clone(),
            destination.clone(),
            options.dry_run,
        );
        let scanner = TreeScanner::new(self.logger.as_ref());

        let source_scan = scanner.scan(&source, TreeSide::Source)?;
        for error in &source_scan.errors {
            report.record_failure(failure_path(error), error);
        }
        debug!("Found {} entries in source", source_scan.entries.len());

        let destination_entries = if self.prepare_destination(&destination, source_mode, options)? {
            let scan = scanner.scan(&destination, TreeSide::Destination)?;
            for error in &scan.errors {
                report.record_failure(failure_path(error), error);
            }
            scan.entries
        } else {
            ScanResult::new()
        };
        debug!("Found {} entries in destination", destination_entries.len());

        let mut reconciled: HashSet<&Path> = HashSet::with_capacity(source_scan.entries.len());
        for (key, entry) in source_scan.entries.iter() {
            reconciled.insert(key);
            let path = display_path(key);
            let target = destination.join(key);

            let kind = match destination_entries.get(key) {
                Some(existing) => match diff::compare(entry, existing) {
                    Verdict::InSync => {
                        report.stats.entries_in_sync += 1;
                        continue;
                    }
                    Verdict::Update(reason) => {
                        if let UpdateReason::MetadataUnavailable(error) = &reason {
                            self.logger.error(format_args!("{}", error));
                        }
                        debug!("{} is stale: {}", path, reason);
                        Reconcile::Overwrite
                    }
                },
                None => Reconcile::Copy,
            };

            self.reconcile(kind, &path, entry, &target, options.dry_run, &mut report);
        }

        let destination_only = diff::destination_only(&destination_entries, &reconciled);
        if !destination_only.is_empty() {
            if options.delete_missing {
                self.delete_missing(
                    &destination_entries,
                    &destination_only,
                    options.dry_run,
                    &mut report,
                );
            } else {
                report.stats.entries_left = destination_only.len() as u64;
                debug!(
                    "Leaving {} destination-only entries in place",
                    destination_only.len()
                );
            }
        }

        report.stats.duration = start_time.elapsed();
        info!(
            "Sync finished in {:?}: {} changes, {} errors",
            report.stats.duration,
            report.stats.changes(),
            report.stats.errors
        );
        Ok(report)
    }

    /// Make sure the destination root exists; returns whether it can be scanned
    fn prepare_destination(
        &self,
        destination: &Path,
        mode: u32,
        options: SyncOptions,
    ) -> Result<bool> {
        match fs::symlink_metadata(destination) {
            Ok(_) => return Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::ResolvePath {
                    path: destination.to_path_buf(),
                    message: e.to_string(),
                })
            }
        }

        self.logger.info(format_args!(
            "creating destination directory: {}",
            destination.display()
        ));
        if options.dry_run {
            return Ok(false);
        }

        create_dir_with_mode(destination, mode).map_err(|e| Error::CreateDestination {
            path: destination.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(true)
    }

    fn reconcile(
        &self,
        kind: Reconcile,
        path: &str,
        entry: &Entry,
        target: &Path,
        dry_run: bool,
        report: &mut SyncReport,
    ) {
        let (progressive, verb) = kind.verbs();
        self.logger.info(format_args!("{} {}", progressive, path));

        let outcome = if dry_run {
            Ok(0)
        } else {
            apply(entry, target)
        };

        match outcome {
            Ok(bytes) => report.record(SyncAction::new(kind.action(), path, entry.is_dir()), bytes),
            Err(error) => {
                self.logger.error(format_args!("failed to {}: {}", verb, error));
                report.record_failure(path, &error);
            }
        }
    }

    fn delete_missing(
        &self,
        destination: &ScanResult,
        destination_only: &[&Path],
        dry_run: bool,
        report: &mut SyncReport,
    ) {
        for key in diff::deletion_order(destination, destination_only) {
            let Some(entry) = destination.get(key) else {
                continue;
            };
            let path = display_path(key);
            self.logger.info(format_args!("deleting {}", path));
            if dry_run {
                report.record(SyncAction::new(ActionKind::Delete, path, entry.is_dir()), 0);
                continue;
            }

            let (target, outcome) = if entry.is_dir() {
                (DeleteTarget::Directory, fs::remove_dir(entry.path()))
            } else {
                (DeleteTarget::File, fs::remove_file(entry.path()))
            };
            match outcome {
                Ok(()) => {
                    report.record(SyncAction::new(ActionKind::Delete, path, entry.is_dir()), 0);
                }
                Err(e) => {
                    let error = Error::delete(entry.path(), target, &e);
                    self.logger.error(format_args!("{}", error));
                    report.record_failure(path, &error);
                }
            }
        }
    }
}

/// Create `target` from `source`; returns the number of bytes written
///
/// Directories are created with their missing ancestors and the source's
/// permission bits. Files are streamed and get the source mtime.
pub fn apply(source: &Entry, target: &Path) -> Result<u64> {
    let metadata = source
        .metadata()
        .map_err(|e| Error::apply(source.path(), ApplyStage::ReadMetadata, &e))?;

    if source.is_dir() {
        create_dir_with_mode(target, metadata.permissions)
            .map_err(|e| Error::apply(target, ApplyStage::CreateDirectory, &e))?;
        return Ok(0);
    }

    let mut reader = File::open(source.path())
        .map_err(|e| Error::apply(source.path(), ApplyStage::OpenSource, &e))?;
    let mut writer =
        File::create(target).map_err(|e| Error::apply(target, ApplyStage::CreateDestination, &e))?;
    let bytes = io::copy(&mut reader, &mut writer)
        .map_err(|e| Error::apply(target, ApplyStage::CopyContent, &e))?;
    drop(writer);

    filetime::set_file_times(
        target,
        FileTime::now(),
        FileTime::from_system_time(metadata.modified),
    )
    .map_err(|e| Error::apply(target, ApplyStage::SetModificationTime, &e))?;

    Ok(bytes)
}

fn resolve_source(source: &Path) -> Result<(PathBuf, u32)> {
    let root = absolutize(source).map_err(|e| Error::ResolvePath {
        path: source.to_path_buf(),
        message: e.to_string(),
    })?;

    match fs::metadata(&root) {
        Ok(metadata) if metadata.is_dir() => {
            let mode = mode_of(&metadata);
            Ok((root, mode))
        }
        Ok(_) => Err(Error::NotADirectory {
            side: TreeSide::Source,
            path: root,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::SourceNotFound { path: root }),
        Err(e) => Err(Error::ResolvePath {
            path: root,
            message: e.to_string(),
        }),
    }
}

fn failure_path(error: &Error) -> String {
    error
        .path()
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(_metadata: &fs::Metadata) -> u32 {
    0o755
}

fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}
