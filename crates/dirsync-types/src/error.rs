//! Error types and handling for dirsync
//!
//! Errors come in two tiers. Run-fatal errors (unusable source root, a
//! destination root that cannot be created, a root that cannot be walked)
//! stop the run and are returned to the caller. Path-local errors are scoped
//! to a single entry; the engine logs them, records them in the run report
//! and moves on to the next path.

use std::fmt;
use std::path::PathBuf;

/// How far an error reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Only one path is affected, the run continues
    Low,
    /// The run cannot start or cannot continue
    High,
}

/// Which of the two trees an operation was working on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TreeSide {
    /// The tree being mirrored
    Source,
    /// The tree receiving the mirror
    Destination,
}

impl fmt::Display for TreeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// Sub-step of the apply step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ApplyStage {
    /// Reading the source entry's status
    ReadMetadata,
    /// Creating a destination directory
    CreateDirectory,
    /// Opening the source file for reading
    OpenSource,
    /// Creating or truncating the destination file
    CreateDestination,
    /// Streaming the file content
    CopyContent,
    /// Propagating the modification time
    SetModificationTime,
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::ReadMetadata => "read file info",
            Self::CreateDirectory => "create directory",
            Self::OpenSource => "open source file",
            Self::CreateDestination => "create destination file",
            Self::CopyContent => "copy file content",
            Self::SetModificationTime => "set modification time",
        };
        f.write_str(stage)
    }
}

/// What the deletion pass was removing when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeleteTarget {
    /// Any non-directory entry
    File,
    /// An (expected to be empty) directory
    Directory,
}

impl fmt::Display for DeleteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// Main error type for dirsync operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Source root does not exist
    #[error("source directory does not exist: {path}")]
    SourceNotFound {
        /// Path given as source
        path: PathBuf,
    },

    /// A root that must be a directory is something else
    #[error("{side} is not a directory: {path}")]
    NotADirectory {
        /// Which root was checked
        side: TreeSide,
        /// Offending path
        path: PathBuf,
    },

    /// A root could not be resolved to an absolute path
    #[error("failed to resolve absolute path ({path}): {message}")]
    ResolvePath {
        /// Path that could not be resolved
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Destination root could not be created
    #[error("failed to create destination directory ({path}): {message}")]
    CreateDestination {
        /// Destination root
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// A root could not be walked at all
    #[error("failed to walk {side} dir ({path}): {message}")]
    Walk {
        /// Which tree was being walked
        side: TreeSide,
        /// Root of the walk
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// One entry below a root could not be read during the walk
    #[error("failed to read {side} entry ({path}): {message}")]
    ScanEntry {
        /// Which tree was being walked
        side: TreeSide,
        /// Entry that failed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Status of a single entry could not be read
    #[error("failed to read file info ({path}): {message}")]
    Metadata {
        /// Entry whose status failed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Apply step failed for a single path
    #[error("failed to {stage} ({path}): {message}")]
    Apply {
        /// Path being materialized
        path: PathBuf,
        /// Failing sub-step
        stage: ApplyStage,
        /// Underlying error message
        message: String,
    },

    /// Removing a destination-only entry failed
    #[error("failed to delete {target} ({path}): {message}")]
    Delete {
        /// Whether a file or a directory was being removed
        target: DeleteTarget,
        /// Path being removed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unusable source or destination root
    Root,
    /// Tree scanning errors
    Scan,
    /// Errors materializing an entry at the destination
    Apply,
    /// Errors removing a destination-only entry
    Delete,
    /// Configuration errors
    Config,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceNotFound { .. }
            | Self::NotADirectory { .. }
            | Self::ResolvePath { .. }
            | Self::CreateDestination { .. } => ErrorKind::Root,
            Self::Walk { .. } | Self::ScanEntry { .. } | Self::Metadata { .. } => ErrorKind::Scan,
            Self::Apply { .. } => ErrorKind::Apply,
            Self::Delete { .. } => ErrorKind::Delete,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ScanEntry { .. }
            | Self::Metadata { .. }
            | Self::Apply { .. }
            | Self::Delete { .. } => ErrorSeverity::Low,
            Self::SourceNotFound { .. }
            | Self::NotADirectory { .. }
            | Self::ResolvePath { .. }
            | Self::CreateDestination { .. }
            | Self::Walk { .. }
            | Self::Config { .. } => ErrorSeverity::High,
        }
    }

    /// Whether this error must stop the whole run
    pub fn is_fatal(&self) -> bool {
        self.severity() >= ErrorSeverity::High
    }

    /// Path the error is scoped to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::SourceNotFound { path }
            | Self::NotADirectory { path, .. }
            | Self::ResolvePath { path, .. }
            | Self::CreateDestination { path, .. }
            | Self::Walk { path, .. }
            | Self::ScanEntry { path, .. }
            | Self::Metadata { path, .. }
            | Self::Apply { path, .. }
            | Self::Delete { path, .. } => Some(path),
            Self::Config { .. } => None,
        }
    }

    /// Create a new apply error for the given sub-step
    pub fn apply(path: impl Into<PathBuf>, stage: ApplyStage, error: &std::io::Error) -> Self {
        Self::Apply {
            path: path.into(),
            stage,
            message: error.to_string(),
        }
    }

    /// Create a new delete error
    pub fn delete(path: impl Into<PathBuf>, target: DeleteTarget, error: &std::io::Error) -> Self {
        Self::Delete {
            target,
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Create a new metadata error
    pub fn metadata(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::Metadata {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// Create a new walk error
    pub fn walk<S: Into<String>>(side: TreeSide, path: impl Into<PathBuf>, message: S) -> Self {
        Self::Walk {
            side,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    proptest! {
        #[test]
        fn test_path_local_errors_never_fatal(message in ".*", path in "[a-z/]{1,24}") {
            let errors = vec![
                Error::ScanEntry { side: TreeSide::Source, path: PathBuf::from(&path), message: message.clone() },
                Error::Metadata { path: PathBuf::from(&path), message: message.clone() },
                Error::Apply { path: PathBuf::from(&path), stage: ApplyStage::CopyContent, message: message.clone() },
                Error::Delete { target: DeleteTarget::File, path: PathBuf::from(&path), message: message.clone() },
            ];

            for error in errors {
                prop_assert_eq!(error.severity(), ErrorSeverity::Low);
                prop_assert!(!error.is_fatal());
                prop_assert_eq!(error.path(), Some(std::path::Path::new(&path)));
            }
        }
    }

    #[rstest]
    #[case(Error::SourceNotFound { path: PathBuf::from("/missing") }, ErrorKind::Root)]
    #[case(Error::CreateDestination { path: PathBuf::from("/ro/dst"), message: "denied".into() }, ErrorKind::Root)]
    #[case(Error::walk(TreeSide::Source, "/src", "denied"), ErrorKind::Scan)]
    #[case(Error::config("source cannot be empty"), ErrorKind::Config)]
    fn test_run_fatal_errors(#[case] error: Error, #[case] kind: ErrorKind) {
        assert_eq!(error.kind(), kind);
        assert!(error.is_fatal());
    }

    #[test]
    fn test_apply_error_names_stage_and_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::apply("subdir/file3.txt", ApplyStage::CreateDestination, &io);

        let rendered = error.to_string();
        assert!(rendered.contains("create destination file"));
        assert!(rendered.contains("subdir/file3.txt"));
        assert_eq!(error.kind(), ErrorKind::Apply);
    }

    #[test]
    fn test_walk_error_names_side() {
        let error = Error::walk(TreeSide::Destination, "/dst", "boom");
        assert_eq!(error.to_string(), "failed to walk destination dir (/dst): boom");
    }

    #[test]
    fn test_delete_error_names_target() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::delete("/dst/locked", DeleteTarget::Directory, &io);

        assert_eq!(error.to_string(), "failed to delete directory (/dst/locked): denied");
        assert_eq!(error.kind(), ErrorKind::Delete);
        assert!(ErrorSeverity::Low < ErrorSeverity::High);
        assert!(!error.is_fatal());
    }
}
