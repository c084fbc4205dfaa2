//! Archive listing.

use std::path::Path;
use std::path::PathBuf;

use tracing::trace;

use crate::ArchiveHandle;
use crate::Result;
use crate::types::MemberEntry;

/// Members of one archive, as recorded in its central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveListing {
    /// Archive path.
    pub path: PathBuf,
    /// Members in central-directory order.
    pub members: Vec<MemberEntry>,
}

impl ArchiveListing {
    /// Sum of compressed member sizes.
    #[must_use]
    pub fn total_compressed(&self) -> u64 {
        self.members.iter().map(|m| m.compressed_size).sum()
    }

    /// Sum of uncompressed member sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.members.iter().map(|m| m.size).sum()
    }

    /// Number of file (non-directory) members.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.members.iter().filter(|m| !m.is_dir).count()
    }
}

/// Lists archive contents without extracting.
///
/// No files are written to disk during this operation.
///
/// # Errors
///
/// Returns `Io` if the file cannot be opened and `NotAnArchive` if it is not
/// a readable ZIP container.
///
/// # Examples
///
/// ```no_run
/// use zipsalvage_core::describe_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let listing = describe_archive("takeout-001.zip")?;
/// for member in &listing.members {
///     println!("{} ({}, made by {})", member.name, member.host, member.version_string());
/// }
/// # Ok(())
/// # }
/// ```
pub fn describe_archive<P: AsRef<Path>>(archive_path: P) -> Result<ArchiveListing> {
    let mut archive = ArchiveHandle::open(archive_path.as_ref())?;
    let members = archive.list_members()?;

    for member in &members {
        trace!(
            name = %member.name,
            modified = ?member.modified,
            host = %member.host,
            version = %member.version_string(),
            compressed = member.compressed_size,
            size = member.size,
            "member"
        );
    }

    Ok(ArchiveListing {
        path: archive.path().to_path_buf(),
        members,
    })
}
