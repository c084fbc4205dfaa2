//! Read-only access to one ZIP archive.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use zip::ZipArchive;

use crate::ExtractionError;
use crate::PathPolicy;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::CopyFailure;
use crate::copy::copy_member;
use crate::error::PathRejection;
use crate::extraction::atomic::write_atomic;
use crate::extraction::classify;
use crate::types::DestDir;
use crate::types::HostSystem;
use crate::types::MemberEntry;
use crate::types::MemberTimestamp;
use crate::types::SafePath;

/// Upper bound on the buffer reserved from a member's declared size.
const MAX_PREALLOCATION: usize = 16 * 1024 * 1024;

/// An open, read-only ZIP archive.
///
/// The underlying file is owned by the handle and closed when it is dropped,
/// on every exit path.
///
/// # Examples
///
/// ```no_run
/// use zipsalvage_core::ArchiveHandle;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = ArchiveHandle::open("takeout-001.zip")?;
/// for member in archive.list_members()? {
///     println!("{} ({} bytes)", member.name, member.size);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArchiveHandle {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl ArchiveHandle {
    /// Opens an archive for reading.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the file cannot be opened and
    /// `ExtractionError::NotAnArchive` if it is not a readable ZIP container.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| classify::open_error(e, &path))?;
        Ok(Self { path, zip })
    }

    /// Path the archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }

    /// Lists every member in central-directory order.
    ///
    /// Entries are read raw, without decompression, so listing succeeds even
    /// for members whose compression method is not supported.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::NotAnArchive` if an entry header cannot be
    /// read.
    pub fn list_members(&mut self) -> Result<Vec<MemberEntry>> {
        let mut members = Vec::with_capacity(self.zip.len());

        for index in 0..self.zip.len() {
            let file = self
                .zip
                .by_index_raw(index)
                .map_err(|e| classify::open_error(e, &self.path))?;

            let modified = file.last_modified().map(|dt| MemberTimestamp {
                year: dt.year(),
                month: dt.month(),
                day: dt.day(),
                hour: dt.hour(),
                minute: dt.minute(),
                second: dt.second(),
            });
            let host = if file.unix_mode().is_some() {
                HostSystem::Unix
            } else {
                HostSystem::Dos
            };

            members.push(MemberEntry {
                index,
                name: file.name().to_string(),
                compressed_size: file.compressed_size(),
                size: file.size(),
                modified,
                host,
                version_made_by: file.version_made_by(),
                compression: format!("{:?}", file.compression()),
                crc32: file.crc32(),
                is_dir: file.is_dir(),
            });
        }

        Ok(members)
    }

    /// Extracts a member by name, preserving its normalized relative path.
    ///
    /// Returns the number of bytes written (0 for directories).
    ///
    /// # Errors
    ///
    /// - `PathExtractionFailed` if the stored path cannot be mapped under `dest`
    /// - `MemberNotFound`, `UnsupportedCompression`, `CorruptMember` for
    ///   problems with the member itself
    /// - `WriteFailure` if the output cannot be written
    pub fn extract_member(
        &mut self,
        name: &str,
        dest: &DestDir,
        policy: &PathPolicy,
    ) -> Result<u64> {
        let index = self
            .zip
            .index_for_name(name)
            .ok_or_else(|| ExtractionError::MemberNotFound {
                name: name.to_string(),
            })?;
        let mut buffer = CopyBuffer::new();
        self.extract_index(index, name, dest, policy, &mut buffer)
    }

    /// Extracts the member at `index` (a listed entry), preserving its path.
    ///
    /// Duplicate stored names are legal in ZIP, so the engine addresses
    /// members by position rather than by name.
    ///
    /// # Errors
    ///
    /// Same as [`ArchiveHandle::extract_member`].
    pub fn extract_entry(
        &mut self,
        entry: &MemberEntry,
        dest: &DestDir,
        policy: &PathPolicy,
        buffer: &mut CopyBuffer,
    ) -> Result<u64> {
        self.extract_index(entry.index, &entry.name, dest, policy, buffer)
    }

    fn extract_index(
        &mut self,
        index: usize,
        name: &str,
        dest: &DestDir,
        policy: &PathPolicy,
        buffer: &mut CopyBuffer,
    ) -> Result<u64> {
        let safe = SafePath::from_stored_name(name, policy)?;
        let target = dest.join(&safe);
        if dest.is_reserved(&target) {
            return Err(ExtractionError::PathExtractionFailed {
                name: name.to_string(),
                reason: PathRejection::Reserved,
            });
        }

        let mut file = self
            .zip
            .by_index(index)
            .map_err(|e| classify::member_error(e, name))?;

        let parent = target.parent().unwrap_or_else(|| dest.as_path());
        std::fs::create_dir_all(parent).map_err(|e| classify::write_error(e, name, parent))?;
        ensure_contained(dest, parent, name)?;

        if file.is_dir() {
            std::fs::create_dir_all(&target)
                .map_err(|e| classify::write_error(e, name, &target))?;
            ensure_contained(dest, &target, name)?;
            return Ok(0);
        }

        write_atomic(&mut file, &target, buffer).map_err(|failure| match failure {
            CopyFailure::Read(e) => classify::read_error(e, name),
            CopyFailure::Write(e) => classify::write_error(e, name, &target),
        })
    }

    /// Reads a member's decompressed bytes, bypassing path handling.
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if no member has this stored name
    /// - `UnsupportedCompression` if the method (or encryption) is not supported
    /// - `CorruptMember` if the data fails to decode or verify
    pub fn read_member_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .zip
            .by_name(name)
            .map_err(|e| classify::member_error(e, name))?;

        let capacity = usize::try_from(file.size())
            .unwrap_or(0)
            .min(MAX_PREALLOCATION);
        let mut bytes = Vec::with_capacity(capacity);
        let mut buffer = CopyBuffer::new();
        copy_member(&mut file, &mut bytes, &mut buffer).map_err(|failure| match failure {
            CopyFailure::Read(e) => classify::read_error(e, name),
            CopyFailure::Write(e) => ExtractionError::Io(e),
        })?;
        Ok(bytes)
    }

    /// Streams a member's raw bytes into `target`, ignoring its stored path.
    ///
    /// Used by recovery so that large members are never held in memory.
    /// The parent of `target` must exist.
    ///
    /// # Errors
    ///
    /// Same member errors as [`ArchiveHandle::read_member_bytes`], plus
    /// `WriteFailure` or `PathExtractionFailed` (`Unresolvable`) when the
    /// target cannot be written.
    pub fn write_member_to(
        &mut self,
        name: &str,
        target: &Path,
        buffer: &mut CopyBuffer,
    ) -> Result<u64> {
        let mut file = self
            .zip
            .by_name(name)
            .map_err(|e| classify::member_error(e, name))?;

        write_atomic(&mut file, target, buffer).map_err(|failure| match failure {
            CopyFailure::Read(e) => classify::read_error(e, name),
            CopyFailure::Write(e) => classify::write_error(e, name, target),
        })
    }
}

/// Rejects output locations that resolve outside the destination, which can
/// happen when the destination tree already contains symlinks.
fn ensure_contained(dest: &DestDir, path: &Path, name: &str) -> Result<()> {
    if dest.contains(path) {
        Ok(())
    } else {
        Err(ExtractionError::PathExtractionFailed {
            name: name.to_string(),
            reason: PathRejection::EscapesRoot,
        })
    }
}

/// Returns `true` if a stored name denotes a directory entry.
#[must_use]
pub fn is_directory_name(name: &str) -> bool {
    name.ends_with('/') || name.ends_with('\\')
}
