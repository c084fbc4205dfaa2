//! Test utilities for building ZIP fixtures.
//!
//! Archives are generated in memory with `zip::ZipWriter`, so tests never
//! depend on binary files checked into the repository.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

const LOCAL_HEADER_SIGNATURE: &[u8] = b"PK\x03\x04";
const CENTRAL_HEADER_SIGNATURE: &[u8] = b"PK\x01\x02";

/// Builder for in-memory ZIP fixtures.
///
/// Entries are written in the order they are added, with a fixed timestamp
/// and Unix permissions so that listings are reproducible.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::test_utils::ZipFixture;
///
/// let bytes = ZipFixture::new()
///     .file("Takeout/notes.txt", b"hello")
///     .file("/etc/../passwd", b"root")
///     .directory("Takeout/Photos/")
///     .to_bytes();
/// assert!(bytes.starts_with(b"PK"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZipFixture {
    entries: Vec<(String, Option<Vec<u8>>)>,
    method: Option<CompressionMethod>,
}

impl ZipFixture {
    /// Creates an empty fixture; members are stored uncompressed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compresses every member with Deflate.
    #[must_use]
    pub fn deflated(mut self) -> Self {
        self.method = Some(CompressionMethod::Deflated);
        self
    }

    /// Adds a file member with the given stored name.
    #[must_use]
    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push((name.to_string(), Some(data.to_vec())));
        self
    }

    /// Adds a directory member (the name should end with `/`).
    #[must_use]
    pub fn directory(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    /// Serializes the archive.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(self.method.unwrap_or(CompressionMethod::Stored))
            .last_modified_time(fixed_timestamp())
            .unix_permissions(0o644);

        for (name, data) in &self.entries {
            match data {
                Some(data) => {
                    zip.start_file(name.as_str(), options).unwrap();
                    zip.write_all(data).unwrap();
                }
                None => {
                    zip.add_directory(name.as_str(), options.unix_permissions(0o755))
                        .unwrap();
                }
            }
        }

        zip.finish().unwrap().into_inner()
    }

    /// Writes the archive to `path` and returns the path.
    pub fn write_to(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

fn fixed_timestamp() -> zip::DateTime {
    zip::DateTime::from_date_and_time(2020, 9, 3, 20, 3, 0).unwrap()
}

/// Flips the first byte of `needle` inside a stored archive.
///
/// With stored (uncompressed) members the content appears verbatim, so this
/// produces a CRC mismatch for the member holding `needle`.
pub fn corrupt_stored_content(bytes: &mut [u8], needle: &[u8]) {
    let position = bytes
        .windows(needle.len())
        .position(|window| window == needle)
        .unwrap();
    bytes[position] ^= 0xFF;
}

/// Rewrites the compression method of every member header.
///
/// Useful for producing members the reader cannot decode (e.g. method 99).
pub fn patch_compression_method(bytes: &mut [u8], method: u16) {
    let encoded = method.to_le_bytes();
    for (signature, offset) in [(LOCAL_HEADER_SIGNATURE, 8), (CENTRAL_HEADER_SIGNATURE, 10)] {
        let positions: Vec<usize> = bytes
            .windows(signature.len())
            .enumerate()
            .filter(|(_, window)| *window == signature)
            .map(|(position, _)| position)
            .collect();
        for position in positions {
            bytes[position + offset..position + offset + 2].copy_from_slice(&encoded);
        }
    }
}

/// Writes a file that looks like an archive by name but is not one.
pub fn write_corrupt_archive(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref().to_path_buf();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, b"PK\x03\x04 truncated header, no central directory").unwrap();
    path
}
