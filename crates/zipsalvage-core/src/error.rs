//! Error types for batch extraction and recovery.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Why a member's stored path cannot be mapped under the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRejection {
    /// Nothing remains after normalization (e.g. `"/"` or `"./"`).
    Empty,
    /// Stored path contains a NUL byte.
    NullByte,
    /// Stored path is absolute (root, drive or UNC prefix).
    Absolute,
    /// Parent-traversal segments climb above the destination.
    EscapesRoot,
    /// Normalized path is nested deeper than allowed.
    TooDeep {
        /// Number of path segments.
        depth: usize,
        /// Maximum allowed segments.
        max: usize,
    },
    /// A single path segment is longer than the host allows.
    ComponentTooLong {
        /// Segment length in bytes.
        len: usize,
        /// Maximum allowed length in bytes.
        max: usize,
    },
    /// The host filesystem refused the resolved path.
    Unresolvable(String),
    /// Path lies inside the directory reserved for recovered files.
    Reserved,
}

impl std::fmt::Display for PathRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "path is empty after normalization"),
            Self::NullByte => write!(f, "path contains a null byte"),
            Self::Absolute => write!(f, "path is absolute"),
            Self::EscapesRoot => write!(f, "path escapes the destination directory"),
            Self::TooDeep { depth, max } => {
                write!(f, "path depth {depth} exceeds maximum {max}")
            }
            Self::ComponentTooLong { len, max } => {
                write!(f, "path component of {len} bytes exceeds maximum {max}")
            }
            Self::Unresolvable(reason) => write!(f, "path cannot be created: {reason}"),
            Self::Reserved => write!(f, "path is reserved for recovered files"),
        }
    }
}

/// Errors that can occur while extracting or recovering archive members.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed outside of a member write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not a readable ZIP container.
    #[error("not a valid archive: {path}: {reason}")]
    NotAnArchive {
        /// Path of the rejected file.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// Member's stored path cannot be mapped to a safe destination path.
    #[error("cannot extract '{name}': {reason}")]
    PathExtractionFailed {
        /// Stored member name.
        name: String,
        /// What is wrong with the path.
        reason: PathRejection,
    },

    /// Member is absent from the archive's central directory.
    #[error("member not found in archive: {name}")]
    MemberNotFound {
        /// Stored member name.
        name: String,
    },

    /// Member uses a compression method (or encryption) that cannot be decoded.
    #[error("unsupported compression for '{name}': {detail}")]
    UnsupportedCompression {
        /// Stored member name.
        name: String,
        /// Diagnostic from the archive reader.
        detail: String,
    },

    /// Member data could not be decoded (checksum mismatch, truncation).
    #[error("corrupt member '{name}': {reason}")]
    CorruptMember {
        /// Stored member name.
        name: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Writing extracted output failed (disk full, permission denied, ...).
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        /// Output path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Archive discovery failed below the source root.
    #[error("cannot scan {root}: {reason}")]
    Discovery {
        /// Root being scanned.
        root: PathBuf,
        /// Walker diagnostic.
        reason: String,
    },

    /// Archive name pattern is not a valid glob.
    #[error("invalid archive pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Processing was cancelled through a `CancellationToken`.
    #[error("operation cancelled")]
    Cancelled,
}

impl ExtractionError {
    /// Returns `true` if this error concerns a single member only.
    ///
    /// Member failures are absorbed into the failed/still-failed lists so
    /// that one bad entry never interrupts a batch.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipsalvage_core::ExtractionError;
    ///
    /// let err = ExtractionError::MemberNotFound {
    ///     name: "a.txt".into(),
    /// };
    /// assert!(err.is_member_failure());
    /// assert!(!ExtractionError::Cancelled.is_member_failure());
    /// ```
    #[must_use]
    pub const fn is_member_failure(&self) -> bool {
        matches!(
            self,
            Self::PathExtractionFailed { .. }
                | Self::MemberNotFound { .. }
                | Self::UnsupportedCompression { .. }
                | Self::CorruptMember { .. }
        )
    }

    /// Returns `true` if this error aborts processing of the current archive.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_member_failure()
    }

    /// Returns `true` if the failure stems from the member's stored path.
    #[must_use]
    pub const fn is_path_failure(&self) -> bool {
        matches!(self, Self::PathExtractionFailed { .. })
    }

    /// Returns the stored member name this error refers to, if any.
    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::PathExtractionFailed { name, .. }
            | Self::MemberNotFound { name }
            | Self::UnsupportedCompression { name, .. }
            | Self::CorruptMember { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractionError::Cancelled;
        assert_eq!(err.to_string(), "operation cancelled");
    }

    #[test]
    fn test_path_extraction_failed_display() {
        let err = ExtractionError::PathExtractionFailed {
            name: "/etc/../passwd".into(),
            reason: PathRejection::Absolute,
        };
        let display = err.to_string();
        assert!(display.contains("/etc/../passwd"));
        assert!(display.contains("absolute"));
    }

    #[test]
    fn test_rejection_display() {
        let reason = PathRejection::TooDeep { depth: 70, max: 64 };
        assert_eq!(reason.to_string(), "path depth 70 exceeds maximum 64");

        let reason = PathRejection::ComponentTooLong { len: 300, max: 255 };
        assert!(reason.to_string().contains("300 bytes"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExtractionError = io_err.into();
        assert!(matches!(err, ExtractionError::Io(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_member_failures_are_absorbed() {
        let absorbed = [
            ExtractionError::PathExtractionFailed {
                name: "x".into(),
                reason: PathRejection::EscapesRoot,
            },
            ExtractionError::MemberNotFound { name: "x".into() },
            ExtractionError::UnsupportedCompression {
                name: "x".into(),
                detail: "method 99".into(),
            },
            ExtractionError::CorruptMember {
                name: "x".into(),
                reason: "bad crc".into(),
            },
        ];
        for err in &absorbed {
            assert!(err.is_member_failure(), "{err} should be absorbed");
            assert_eq!(err.member_name(), Some("x"));
        }
    }

    #[test]
    fn test_infrastructure_failures_are_fatal() {
        let fatal = [
            ExtractionError::NotAnArchive {
                path: PathBuf::from("broken.zip"),
                reason: "no end of central directory".into(),
            },
            ExtractionError::WriteFailure {
                path: PathBuf::from("out/a.txt"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            },
            ExtractionError::Cancelled,
        ];
        for err in &fatal {
            assert!(err.is_fatal(), "{err} should be fatal");
            assert_eq!(err.member_name(), None);
        }
    }

    #[test]
    fn test_only_path_failures_are_path_failures() {
        let err = ExtractionError::PathExtractionFailed {
            name: "../x".into(),
            reason: PathRejection::EscapesRoot,
        };
        assert!(err.is_path_failure());

        let err = ExtractionError::MemberNotFound { name: "x".into() };
        assert!(!err.is_path_failure());
    }

    #[test]
    fn test_write_failure_source_chain() {
        use std::error::Error;

        let err = ExtractionError::WriteFailure {
            path: PathBuf::from("out/a.txt"),
            source: std::io::Error::other("disk full"),
        };
        assert!(err.source().is_some());
    }
}
