//! Mapping of reader and filesystem failures onto [`ExtractionError`].
//!
//! Per-member problems become member failures; anything that says the
//! output side or the archive container is broken stays fatal.

use std::io;
use std::path::Path;

use zip::result::ZipError;

use crate::ExtractionError;
use crate::error::PathRejection;

/// Classifies a failure to open an archive container.
///
/// Truncated or malformed data surfaces from the reader as I/O errors too;
/// those still mean the file is not a usable archive.
pub fn open_error(err: ZipError, archive: &Path) -> ExtractionError {
    match err {
        ZipError::Io(source)
            if !matches!(
                source.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
            ) =>
        {
            ExtractionError::Io(source)
        }
        other => ExtractionError::NotAnArchive {
            path: archive.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

/// Classifies a failure to access one member of an open archive.
pub fn member_error(err: ZipError, name: &str) -> ExtractionError {
    match err {
        ZipError::FileNotFound => ExtractionError::MemberNotFound {
            name: name.to_string(),
        },
        ZipError::UnsupportedArchive(detail) => ExtractionError::UnsupportedCompression {
            name: name.to_string(),
            detail: detail.to_string(),
        },
        ZipError::Io(source) => read_error(source, name),
        other => ExtractionError::CorruptMember {
            name: name.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Classifies an error raised while decoding member data.
pub fn read_error(err: io::Error, name: &str) -> ExtractionError {
    if err.kind() == io::ErrorKind::Unsupported {
        ExtractionError::UnsupportedCompression {
            name: name.to_string(),
            detail: err.to_string(),
        }
    } else {
        ExtractionError::CorruptMember {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Classifies an error raised while creating or writing output for a member.
///
/// Failures caused by the shape of the member's path (a file where a
/// directory is needed, a name the filesystem refuses) are path failures;
/// everything else is a `WriteFailure`.
pub fn write_error(err: io::Error, name: &str, path: &Path) -> ExtractionError {
    if is_path_shaped(&err) {
        ExtractionError::PathExtractionFailed {
            name: name.to_string(),
            reason: PathRejection::Unresolvable(err.to_string()),
        }
    } else {
        ExtractionError::WriteFailure {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Returns `true` for filesystem errors that stem from the requested path.
#[must_use]
pub fn is_path_shaped(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotADirectory
            | io::ErrorKind::IsADirectory
            | io::ErrorKind::AlreadyExists
            | io::ErrorKind::InvalidFilename
            | io::ErrorKind::NotFound
    )
}

/// Returns `true` for transient contention that is not worth aborting for.
#[must_use]
pub fn is_contention(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ResourceBusy
    )
}
