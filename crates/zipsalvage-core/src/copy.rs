//! Member data copy that keeps read and write failures apart.
//!
//! A failing read means the member is damaged (bad CRC, truncated stream)
//! and is a per-member problem; a failing write means the output side is
//! broken and aborts the archive. `std::io::copy` merges the two, so the
//! engines use [`copy_member`] instead.

use std::io::Read;
use std::io::Write;
use std::io::{self};

/// Buffer size for member copies (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer for member copies.
///
/// One buffer is allocated per archive and reused for every member.
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new copy buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Side of a copy that failed.
#[derive(Debug)]
pub enum CopyFailure {
    /// The member stream could not be decoded.
    Read(io::Error),
    /// The destination could not be written.
    Write(io::Error),
}

/// Copies a member stream into `writer`, returning the number of bytes.
///
/// # Errors
///
/// Returns [`CopyFailure::Read`] or [`CopyFailure::Write`] depending on
/// which side failed. Interrupted reads are retried.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::copy::CopyBuffer;
/// use zipsalvage_core::copy::copy_member;
///
/// let mut buffer = CopyBuffer::new();
/// let mut input: &[u8] = b"member data";
/// let mut output = Vec::new();
///
/// let copied = copy_member(&mut input, &mut output, &mut buffer).unwrap();
/// assert_eq!(copied, 11);
/// ```
pub fn copy_member<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> Result<u64, CopyFailure> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyFailure::Read(e)),
        };

        writer
            .write_all(&buffer.buf[..bytes_read])
            .map_err(CopyFailure::Write)?;

        total = total.saturating_add(bytes_read as u64);
    }

    Ok(total)
}
