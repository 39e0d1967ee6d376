//! One-way directory mirroring for dirsync
//!
//! This crate holds the moving parts of a sync run:
//!
//! - **Tree scanning**: walk a root without following links and key every
//!   entry by its `/`-separated relative path
//! - **Update decisions**: kind, size and modification-time comparison of
//!   matched entries
//! - **Sync engine**: reconcile source entries in parent-before-child order,
//!   then optionally remove destination-only entries, files first
//! - **Loggers**: `tracing`-backed and in-memory [`SyncLogger`] sinks
//!
//! # Examples
//!
//! ```rust,no_run
//! use dirsync_sync::{SyncEngine, SyncOptions, SyncRequest, TracingLogger};
//!
//! # fn example() -> dirsync_types::Result<()> {
//! let engine = SyncEngine::new(TracingLogger::new());
//! let request = SyncRequest::new("source_dir", "dest_dir").with_options(SyncOptions::mirror());
//! let report = engine.sync(&request)?;
//! println!(
//!     "{} changes, {} errors",
//!     report.stats.changes(),
//!     report.stats.errors
//! );
//! # Ok(())
//! # }
//! ```
//!
//! [`SyncLogger`]: dirsync_types::SyncLogger

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod diff;
pub mod engine;
pub mod logger;
pub mod scanner;

pub use diff::{UpdateReason, Verdict};
pub use engine::{SyncEngine, SyncOptions, SyncRequest};
pub use logger::{LogRecord, RecordingLogger, TracingLogger, LOG_TARGET};
pub use scanner::{TreeScan, TreeScanner};
