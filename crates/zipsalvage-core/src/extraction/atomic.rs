//! Atomic member writes.
//!
//! Member data is streamed into a temporary file next to the target and
//! renamed into place once complete, so an interrupted or failed member never
//! leaves a truncated file behind.

use std::io::Read;
use std::path::Path;

use tempfile::Builder;

use crate::copy::CopyBuffer;
use crate::copy::CopyFailure;
use crate::copy::copy_member;

const TEMP_PREFIX: &str = ".zipsalvage-";

/// Streams `reader` into `target`, replacing any existing file atomically.
///
/// The parent directory of `target` must already exist. Returns the number
/// of bytes written.
///
/// # Errors
///
/// Returns [`CopyFailure::Read`] if the member stream fails and
/// [`CopyFailure::Write`] if the temporary file cannot be created, written
/// or renamed. In every error case the temporary file is removed.
pub fn write_atomic<R: Read + ?Sized>(
    reader: &mut R,
    target: &Path,
    buffer: &mut CopyBuffer,
) -> Result<u64, CopyFailure> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));

    let mut temp = Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)
        .map_err(CopyFailure::Write)?;

    let written = copy_member(reader, temp.as_file_mut(), buffer)?;

    temp.persist(target)
        .map_err(|e| CopyFailure::Write(e.error))?;

    Ok(written)
}
