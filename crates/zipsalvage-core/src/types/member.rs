//! Archive member metadata.

/// Operating system family that produced a member.
///
/// ZIP records the creating host in the "version made by" field; the reader
/// only exposes whether a Unix mode is present, which is what distinguishes
/// the two families that matter for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSystem {
    /// MS-DOS / Windows (FAT, NTFS attributes).
    Dos,
    /// Unix-like host (mode bits present).
    Unix,
}

impl std::fmt::Display for HostSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dos => write!(f, "Windows/DOS"),
            Self::Unix => write!(f, "Unix"),
        }
    }
}

/// DOS-style modification timestamp stored with a member.
///
/// ZIP timestamps carry no time zone and have two-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberTimestamp {
    /// Calendar year (1980-2107).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-58, even).
    pub second: u8,
}

impl std::fmt::Display for MemberTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// One entry of an archive's central directory.
///
/// Read once when the archive is listed and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    /// Position in the central directory.
    pub index: usize,
    /// Stored name, exactly as recorded (may be absolute or contain `..`).
    pub name: String,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Last modification time, if recorded.
    pub modified: Option<MemberTimestamp>,
    /// Creating host family.
    pub host: HostSystem,
    /// ZIP specification version that produced the entry (major, minor).
    pub version_made_by: (u8, u8),
    /// Compression method name.
    pub compression: String,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl MemberEntry {
    /// Flat name of the member (final path segment).
    #[must_use]
    pub fn file_name(&self) -> String {
        crate::sanitize::sanitize(&self.name)
    }

    /// Formats the "version made by" pair as `major.minor`.
    #[must_use]
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.version_made_by.0, self.version_made_by.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry(name: &str) -> MemberEntry {
        MemberEntry {
            index: 0,
            name: name.to_string(),
            compressed_size: 10,
            size: 20,
            modified: Some(MemberTimestamp {
                year: 2020,
                month: 9,
                day: 3,
                hour: 20,
                minute: 3,
                second: 0,
            }),
            host: HostSystem::Unix,
            version_made_by: (2, 0),
            compression: "Deflated".to_string(),
            crc32: 0,
            is_dir: false,
        }
    }

    #[test]
    fn test_timestamp_display() {
        let entry = sample_entry("a.txt");
        let modified = entry.modified.map(|t| t.to_string());
        assert_eq!(modified.as_deref(), Some("2020-09-03 20:03:00"));
    }

    #[test]
    fn test_file_name_is_final_segment() {
        assert_eq!(sample_entry("Takeout/Mail/All.mbox").file_name(), "All.mbox");
    }

    #[test]
    fn test_version_string() {
        assert_eq!(sample_entry("a").version_string(), "2.0");
    }

    #[test]
    fn test_host_display() {
        assert_eq!(HostSystem::Unix.to_string(), "Unix");
        assert_eq!(HostSystem::Dos.to_string(), "Windows/DOS");
    }
}
