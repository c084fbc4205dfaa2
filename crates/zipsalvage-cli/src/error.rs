//! Error conversion utilities for CLI.
//!
//! Converts zipsalvage-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use std::path::Path;
use zipsalvage_core::ExtractionError;

/// Converts `ExtractionError` to user-friendly anyhow error with context.
///
/// `subject` is the archive or source directory being processed.
pub fn convert_extraction_error(err: ExtractionError, subject: &Path) -> anyhow::Error {
    match err {
        ExtractionError::Discovery { root, reason } => {
            anyhow!(
                "Cannot scan '{}': {}\n\
                 HINT: SOURCE must be an existing, readable directory.",
                root.display(),
                reason
            )
        }
        ExtractionError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid archive pattern '{pattern}': {reason}\n\
                 HINT: Patterns use glob syntax and match file names only, e.g. '*takeout*.zip'."
            )
        }
        ExtractionError::NotAnArchive { reason, .. } => {
            anyhow!(
                "Invalid archive '{}': {}\n\
                 HINT: The file may be truncated or may not be a ZIP archive.",
                subject.display(),
                reason
            )
        }
        ExtractionError::WriteFailure { path, source } => {
            anyhow!(
                "Cannot write '{}' while processing '{}': {}\n\
                 HINT: Check free disk space and permissions on the output directory.",
                path.display(),
                subject.display(),
                source
            )
        }
        ExtractionError::Io(io_err) => {
            anyhow!(
                "I/O error while processing '{}': {}",
                subject.display(),
                io_err
            )
        }
        ExtractionError::Cancelled => {
            anyhow!("Processing of '{}' was cancelled", subject.display())
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing '{}'", subject.display())),
    }
}

/// Adds context to a core result about the archive or source directory.
pub fn add_archive_context<T>(
    result: Result<T, ExtractionError>,
    subject: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_extraction_error(e, subject))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_not_an_archive() {
        let err = ExtractionError::NotAnArchive {
            path: PathBuf::from("broken.zip"),
            reason: "invalid Zip archive: Could not find EOCD".to_string(),
        };
        let converted = convert_extraction_error(err, Path::new("broken.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("Invalid archive"));
        assert!(msg.contains("broken.zip"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_discovery_error() {
        let err = ExtractionError::Discovery {
            root: PathBuf::from("/missing"),
            reason: "No such file or directory".to_string(),
        };
        let converted = convert_extraction_error(err, Path::new("/missing"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("Cannot scan '/missing'"));
        assert!(msg.contains("SOURCE"));
    }

    #[test]
    fn test_convert_write_failure() {
        let err = ExtractionError::WriteFailure {
            path: PathBuf::from("/out/a.txt"),
            source: io::Error::new(io::ErrorKind::StorageFull, "no space left"),
        };
        let converted = convert_extraction_error(err, Path::new("a.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("/out/a.txt"));
        assert!(msg.contains("disk space"));
    }

    #[test]
    fn test_member_errors_keep_their_message() {
        let err = ExtractionError::MemberNotFound {
            name: "x.txt".to_string(),
        };
        let converted = convert_extraction_error(err, Path::new("a.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("Error processing 'a.zip'"));
        assert!(msg.contains("member not found in archive: x.txt"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ExtractionError::Io(io_err);
        let converted = convert_extraction_error(err, Path::new("archive.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
    }
}
