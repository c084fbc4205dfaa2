//! Archive discovery below a source root.

use std::path::Path;
use std::path::PathBuf;

use glob::MatchOptions;
use glob::Pattern;
use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

use crate::BatchConfig;
use crate::ExtractionError;
use crate::Result;
use crate::config::DEFAULT_PATTERN;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Finds archive files by file-name pattern.
///
/// The walk is sorted by file name, does not follow symlinks, and skips
/// excluded directories entirely. Unreadable subdirectories are logged and
/// skipped.
///
/// # Examples
///
/// ```no_run
/// use zipsalvage_core::ArchiveFinder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archives = ArchiveFinder::new("/mnt/takeout")
///     .with_pattern("takeout-*.zip")
///     .with_max_depth(Some(2))
///     .find()?;
///
/// for archive in archives {
///     println!("{}", archive.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveFinder {
    root: PathBuf,
    pattern: String,
    max_depth: Option<usize>,
    excluded: Vec<PathBuf>,
}

impl ArchiveFinder {
    /// Creates a finder for `*.zip` files at any depth below `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pattern: DEFAULT_PATTERN.to_string(),
            max_depth: None,
            excluded: Vec::new(),
        }
    }

    /// Creates a finder from a batch configuration.
    ///
    /// The output and recovery roots are excluded so that a rerun never
    /// picks up archives that an earlier run extracted.
    #[must_use]
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(&config.source_root)
            .with_pattern(config.pattern.clone())
            .with_max_depth(config.max_depth)
            .exclude(&config.output_root)
            .exclude(&config.recovery_root)
    }

    /// Sets the file-name glob (matched case-insensitively).
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Limits recursion depth (`Some(1)` = only files directly in the root).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Skips a directory subtree.
    #[must_use]
    pub fn exclude(mut self, path: impl AsRef<Path>) -> Self {
        self.excluded.push(path.as_ref().to_path_buf());
        self
    }

    /// Root directory being searched.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the root and returns matching archive paths in walk order.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::InvalidPattern` for a malformed glob and
    /// `ExtractionError::Discovery` if the root cannot be read.
    pub fn find(&self) -> Result<Vec<PathBuf>> {
        let pattern = Pattern::new(&self.pattern).map_err(|e| ExtractionError::InvalidPattern {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })?;

        let root = self
            .root
            .canonicalize()
            .map_err(|e| ExtractionError::Discovery {
                root: self.root.clone(),
                reason: e.to_string(),
            })?;
        if !root.is_dir() {
            return Err(ExtractionError::Discovery {
                root: self.root.clone(),
                reason: "not a directory".to_string(),
            });
        }

        // Only existing directories can contain anything worth pruning.
        let excluded: Vec<PathBuf> = self
            .excluded
            .iter()
            .filter_map(|path| path.canonicalize().ok())
            .filter(|path| path != &root)
            .collect();

        let mut walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut archives = Vec::new();
        let entries = walker
            .into_iter()
            .filter_entry(|entry| !excluded.iter().any(|path| entry.path() == path));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable path during discovery");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if pattern.matches_with(&name, MATCH_OPTIONS) {
                debug!(archive = %entry.path().display(), "discovered");
                archives.push(entry.into_path());
            }
        }

        Ok(archives)
    }
}

/// Discovers the archives a batch will process.
///
/// # Errors
///
/// Same as [`ArchiveFinder::find`].
pub fn discover_archives(config: &BatchConfig) -> Result<Vec<PathBuf>> {
    ArchiveFinder::from_config(config).find()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_finds_matching_files_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.zip");
        touch(temp.path(), "a.zip");
        touch(temp.path(), "notes.txt");
        touch(temp.path(), "nested/c.zip");

        let found = ArchiveFinder::new(temp.path()).find().unwrap();
        assert_eq!(file_names(&found), ["a.zip", "b.zip", "c.zip"]);
    }

    #[test]
    fn test_pattern_is_case_insensitive() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "takeout-001.ZIP");
        touch(temp.path(), "Takeout-002.zip");
        touch(temp.path(), "other.zip");

        let found = ArchiveFinder::new(temp.path())
            .with_pattern("*takeout*.zip")
            .find()
            .unwrap();
        assert_eq!(file_names(&found), ["Takeout-002.zip", "takeout-001.ZIP"]);
    }

    #[test]
    fn test_max_depth() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "top.zip");
        touch(temp.path(), "one/mid.zip");
        touch(temp.path(), "one/two/deep.zip");

        let found = ArchiveFinder::new(temp.path())
            .with_max_depth(Some(2))
            .find()
            .unwrap();
        assert_eq!(file_names(&found), ["mid.zip", "top.zip"]);
    }

    #[test]
    fn test_excluded_directories_are_pruned() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "input.zip");
        touch(temp.path(), "out/extracted.zip");

        let config = BatchConfig::new(temp.path(), temp.path().join("out"));
        let found = discover_archives(&config).unwrap();
        assert_eq!(file_names(&found), ["input.zip"]);
    }

    #[test]
    fn test_directories_matching_pattern_are_ignored() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("folder.zip")).unwrap();

        let found = ArchiveFinder::new(temp.path()).find().unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let result = ArchiveFinder::new(temp.path().join("missing")).find();
        assert!(matches!(result, Err(ExtractionError::Discovery { .. })));
    }

    #[test]
    fn test_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        let result = ArchiveFinder::new(temp.path()).with_pattern("[").find();
        assert!(matches!(result, Err(ExtractionError::InvalidPattern { .. })));
    }
}
