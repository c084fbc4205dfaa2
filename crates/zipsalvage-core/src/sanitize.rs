//! Flat file names for recovered members.
//!
//! Recovery never trusts a member's directory structure: only the final
//! segment of the stored name is kept, cleaned of characters the host cannot
//! store, and bounded in length.

use std::borrow::Cow;

/// Character substituted for anything the host filesystem cannot store.
pub const PLACEHOLDER: char = '_';

/// Longest file name produced by [`sanitize`], in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Extensions longer than this are not preserved when truncating.
const MAX_KEPT_EXTENSION: usize = 16;

#[cfg(windows)]
const HOST_ILLEGAL: &[char] = &[':', '<', '>', '|', '"', '?', '*'];

#[cfg(not(windows))]
const HOST_ILLEGAL: &[char] = &[];

/// Returns `true` if `c` cannot appear in a file name on this host.
#[must_use]
pub fn is_illegal_char(c: char) -> bool {
    if c == '\0' {
        return true;
    }
    if cfg!(windows) && c.is_ascii_control() {
        return true;
    }
    HOST_ILLEGAL.contains(&c)
}

/// Replaces host-illegal characters in a single path segment.
///
/// On Windows trailing dots and spaces are also removed, since the
/// filesystem silently drops them.
pub(crate) fn clean_segment(segment: &str) -> Cow<'_, str> {
    let cleaned = if segment.chars().any(is_illegal_char) {
        Cow::Owned(
            segment
                .chars()
                .map(|c| if is_illegal_char(c) { PLACEHOLDER } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(segment)
    };

    if cfg!(windows) {
        let trimmed = cleaned.trim_end_matches(['.', ' ']);
        if trimmed.len() != cleaned.len() {
            return Cow::Owned(trimmed.to_string());
        }
    }
    cleaned
}

/// Derives a flat, safe file name from a member's stored name.
///
/// Only the last meaningful segment survives: both `/` and `\` separate
/// segments, and empty, `.` and `..` segments are skipped. A name with no
/// usable segment becomes `"_"`.
///
/// The function is pure and idempotent on its own output.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::sanitize;
///
/// assert_eq!(sanitize("../../a../../b..r"), "b..r");
/// assert_eq!(sanitize("/etc/../passwd"), "passwd");
/// assert_eq!(sanitize("C:\\Users\\me\\photo.jpg"), "photo.jpg");
/// assert_eq!(sanitize("Takeout/Drive/"), "Drive");
/// assert_eq!(sanitize(".."), "_");
/// ```
#[must_use]
pub fn sanitize(stored_name: &str) -> String {
    let Some(segment) = stored_name
        .rsplit(['/', '\\'])
        .find(|segment| !matches!(*segment, "" | "." | ".."))
    else {
        return PLACEHOLDER.to_string();
    };

    let cleaned = clean_segment(segment);
    let truncated = truncate_keeping_extension(&cleaned, MAX_NAME_LEN);
    let name = if cfg!(windows) {
        truncated.trim_end_matches(['.', ' '])
    } else {
        truncated.as_str()
    };

    if name.is_empty() || name == "." || name == ".." {
        PLACEHOLDER.to_string()
    } else {
        name.to_string()
    }
}

/// Shortens `name` to at most `max` bytes on a character boundary,
/// keeping a short extension intact.
pub(crate) fn truncate_keeping_extension(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_KEPT_EXTENSION.min(max / 2) => {
            let extension = &name[dot..];
            let stem = floor_char_boundary(&name[..dot], max - extension.len());
            format!("{stem}{extension}")
        }
        _ => floor_char_boundary(name, max).to_string(),
    }
}

fn floor_char_boundary(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
