//! Result type alias for dirsync operations

use crate::Error;

/// Result type alias for dirsync operations
pub type Result<T> = std::result::Result<T, Error>;
