//! Normalized relative path for direct (path-preserving) extraction.

use crate::ExtractionError;
use crate::PathPolicy;
use crate::Result;
use crate::error::PathRejection;
use crate::sanitize::clean_segment;
use std::borrow::Cow;
use std::path::Path;
use std::path::PathBuf;

/// A member path that is safe to join under a destination directory.
///
/// `SafePath` is always relative, never contains `.` or `..` components, and
/// every segment is storable on the host filesystem.
///
/// # Security Properties
///
/// - Can ONLY be constructed through [`SafePath::from_stored_name`]
/// - NO `From<PathBuf>` implementation
///
/// # Examples
///
/// ```
/// use zipsalvage_core::PathPolicy;
/// use zipsalvage_core::types::SafePath;
///
/// let policy = PathPolicy::default();
///
/// let safe = SafePath::from_stored_name("Takeout/./Drive/notes.txt", &policy).unwrap();
/// assert_eq!(safe.as_path(), std::path::Path::new("Takeout/Drive/notes.txt"));
///
/// // Absolute member names are refused unless the policy allows them.
/// assert!(SafePath::from_stored_name("/etc/../passwd", &policy).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Normalizes a stored member name.
    ///
    /// # Normalization Steps
    ///
    /// 1. Reject NUL bytes
    /// 2. Treat `\` as a separator
    /// 3. Detect root, drive (`C:`) and share (`//server/share`) prefixes;
    ///    reject them, or strip them when `allow_absolute_paths` is set
    /// 4. Drop empty and `.` segments, collapse `..` into the previous
    ///    segment (a `..` with nothing to collapse escapes the destination)
    /// 5. Replace host-illegal characters with `_`
    /// 6. Enforce segment length and path depth limits
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::PathExtractionFailed` with the matching
    /// [`PathRejection`].
    pub fn from_stored_name(name: &str, policy: &PathPolicy) -> Result<Self> {
        let reject = |reason| {
            Err(ExtractionError::PathExtractionFailed {
                name: name.to_string(),
                reason,
            })
        };

        if name.contains('\0') {
            return reject(PathRejection::NullByte);
        }

        let unified = name.replace('\\', "/");
        let (relative, absolute) = strip_prefixes(&unified);
        if absolute && !policy.allow_absolute_paths {
            return reject(PathRejection::Absolute);
        }

        let mut segments: Vec<Cow<'_, str>> = Vec::new();
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return reject(PathRejection::EscapesRoot);
                    }
                }
                other => {
                    let cleaned = clean_segment(other);
                    if cleaned.is_empty() {
                        continue;
                    }
                    if cleaned.len() > policy.max_component_len {
                        return reject(PathRejection::ComponentTooLong {
                            len: cleaned.len(),
                            max: policy.max_component_len,
                        });
                    }
                    segments.push(cleaned);
                }
            }
        }

        if segments.is_empty() {
            return reject(PathRejection::Empty);
        }
        if segments.len() > policy.max_path_depth {
            return reject(PathRejection::TooDeep {
                depth: segments.len(),
                max: policy.max_path_depth,
            });
        }

        Ok(Self(segments.iter().map(AsRef::<str>::as_ref).collect()))
    }

    /// Returns the normalized relative path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.components().count()
    }
}

impl std::fmt::Display for SafePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Splits off drive, share and root prefixes.
///
/// Returns the remaining relative part and whether any prefix was found.
/// Prefixes are detected the same way on every host so that a given archive
/// extracts identically everywhere.
fn strip_prefixes(path: &str) -> (&str, bool) {
    let mut rest = path;
    let mut absolute = false;

    // "//server/share/..." (a third slash means plain leading separators)
    if let Some(unc) = rest.strip_prefix("//")
        && !unc.starts_with('/')
    {
        let mut parts = unc.splitn(3, '/');
        let _server = parts.next();
        let _share = parts.next();
        rest = parts.next().unwrap_or("");
        absolute = true;
    }

    // "C:..." drive letter, absolute or drive-relative
    let bytes = rest.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        rest = &rest[2..];
        absolute = true;
    }

    let trimmed = rest.trim_start_matches('/');
    if trimmed.len() != rest.len() {
        absolute = true;
    }
    (trimmed, absolute)
}
