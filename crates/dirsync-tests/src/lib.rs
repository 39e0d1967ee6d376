//! dirsync testing suite
//!
//! Shared fixtures for the end-to-end tests in `tests/`. The fixtures build
//! real source and destination trees in temporary directories and read them
//! back for comparison.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Tree builders and snapshot helpers used across all test files.
pub mod test_utils;

pub use test_utils::{snapshot, MirrorFixture, Node};
