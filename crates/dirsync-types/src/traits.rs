//! Core traits for dirsync operations

use std::fmt;
use std::sync::Arc;

/// Logging collaborator handed to the sync engine
///
/// Two severities, each taking pre-formatted arguments. Implementations must
/// never panic: a failing sink must not abort a sync run.
pub trait SyncLogger: Send + Sync {
    /// Record an informational event (an action about to happen)
    fn info(&self, message: fmt::Arguments<'_>);

    /// Record a failure scoped to a path or phase
    fn error(&self, message: fmt::Arguments<'_>);
}

impl<T: SyncLogger + ?Sized> SyncLogger for &T {
    fn info(&self, message: fmt::Arguments<'_>) {
        (**self).info(message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        (**self).error(message);
    }
}

impl<T: SyncLogger + ?Sized> SyncLogger for Box<T> {
    fn info(&self, message: fmt::Arguments<'_>) {
        (**self).info(message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        (**self).error(message);
    }
}

impl<T: SyncLogger + ?Sized> SyncLogger for Arc<T> {
    fn info(&self, message: fmt::Arguments<'_>) {
        (**self).info(message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        (**self).error(message);
    }
}
