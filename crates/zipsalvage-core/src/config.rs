//! Batch configuration.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

/// Knobs for direct (path-preserving) extraction.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::PathPolicy;
///
/// let strict = PathPolicy::default();
/// assert!(!strict.allow_absolute_paths);
///
/// let lenient = PathPolicy {
///     allow_absolute_paths: true,
///     ..Default::default()
/// };
/// assert!(lenient.allow_absolute_paths);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    /// Strip root, drive and share prefixes instead of rejecting the member.
    pub allow_absolute_paths: bool,

    /// Maximum number of segments in a normalized member path.
    pub max_path_depth: usize,

    /// Maximum length of a single path segment in bytes.
    pub max_component_len: usize,
}

impl Default for PathPolicy {
    /// Default values:
    /// - `allow_absolute_paths`: false (absolute members go to recovery)
    /// - `max_path_depth`: 64
    /// - `max_component_len`: 255
    fn default() -> Self {
        Self {
            allow_absolute_paths: false,
            max_path_depth: 64,
            max_component_len: 255,
        }
    }
}

/// What to do when two recovered members sanitize to the same file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Append ` (1)`, ` (2)`, ... before the extension.
    #[default]
    Suffix,
    /// Replace the earlier file with the later one.
    Overwrite,
    /// Leave the later member in the still-failed list.
    Reject,
}

/// Where recovered members are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryLayout {
    /// `recovery_root/<archive file stem>/<name>`.
    #[default]
    PerArchive,
    /// `recovery_root/<name>` for every archive of the batch.
    Flat,
}

/// Delay inserted after each member operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Run at full speed.
    #[default]
    None,
    /// Sleep for a fixed duration.
    Fixed(Duration),
}

/// Configuration for a batch run.
///
/// Passed to [`BatchDriver`](crate::BatchDriver) at construction; nothing in
/// the library reads process-wide paths.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::BatchConfig;
/// use zipsalvage_core::CollisionPolicy;
///
/// let config = BatchConfig::new("/mnt/takeout", "/srv/extracted")
///     .with_pattern("*takeout*.zip")
///     .with_collision_policy(CollisionPolicy::Reject);
///
/// assert_eq!(config.recovery_root, std::path::Path::new("/srv/extracted/_recovered"));
/// ```
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for archives.
    pub source_root: PathBuf,

    /// Glob matched against archive file names (case-insensitive).
    pub pattern: String,

    /// Maximum recursion depth below `source_root` (`None` = unlimited).
    pub max_depth: Option<usize>,

    /// Destination tree for direct extraction.
    pub output_root: PathBuf,

    /// Destination for recovered members.
    pub recovery_root: PathBuf,

    /// Flat or per-archive recovery directories.
    pub recovery_layout: RecoveryLayout,

    /// Handling of recovery name collisions.
    pub collision_policy: CollisionPolicy,

    /// Direct extraction path handling.
    pub path_policy: PathPolicy,

    /// Delay between member operations.
    pub pacing: Pacing,
}

/// Name of the recovery directory created under the output root by default.
pub const DEFAULT_RECOVERY_DIR: &str = "_recovered";

/// Archive pattern used when none is configured.
pub const DEFAULT_PATTERN: &str = "*.zip";

impl BatchConfig {
    /// Creates a configuration with default policies.
    ///
    /// The recovery root defaults to `<output_root>/_recovered`.
    #[must_use]
    pub fn new(source_root: impl AsRef<Path>, output_root: impl AsRef<Path>) -> Self {
        let output_root = output_root.as_ref().to_path_buf();
        Self {
            source_root: source_root.as_ref().to_path_buf(),
            pattern: DEFAULT_PATTERN.to_string(),
            max_depth: None,
            recovery_root: output_root.join(DEFAULT_RECOVERY_DIR),
            output_root,
            recovery_layout: RecoveryLayout::default(),
            collision_policy: CollisionPolicy::default(),
            path_policy: PathPolicy::default(),
            pacing: Pacing::default(),
        }
    }

    /// Sets the archive file name pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Limits discovery recursion depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the recovery root directory.
    #[must_use]
    pub fn with_recovery_root(mut self, recovery_root: impl AsRef<Path>) -> Self {
        self.recovery_root = recovery_root.as_ref().to_path_buf();
        self
    }

    /// Sets the recovery layout.
    #[must_use]
    pub fn with_recovery_layout(mut self, layout: RecoveryLayout) -> Self {
        self.recovery_layout = layout;
        self
    }

    /// Sets the collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Sets the direct extraction path policy.
    #[must_use]
    pub fn with_path_policy(mut self, policy: PathPolicy) -> Self {
        self.path_policy = policy;
        self
    }

    /// Sets member pacing.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Directory name an archive gets under [`RecoveryLayout::PerArchive`]
    /// before it is made unique within the batch.
    #[must_use]
    pub fn archive_dir_name(archive: &Path) -> String {
        archive
            .file_stem()
            .map(|s| crate::sanitize::sanitize(&s.to_string_lossy()))
            .unwrap_or_else(|| "_".to_string())
    }

    /// Recovery directory for one archive under the configured layout.
    ///
    /// `dir_name` is the archive's batch-unique directory name; it is ignored
    /// under [`RecoveryLayout::Flat`].
    #[must_use]
    pub fn recovery_dir_for(&self, dir_name: &str) -> PathBuf {
        match self.recovery_layout {
            RecoveryLayout::Flat => self.recovery_root.clone(),
            RecoveryLayout::PerArchive => self.recovery_root.join(dir_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path_policy() {
        let policy = PathPolicy::default();
        assert!(!policy.allow_absolute_paths);
        assert_eq!(policy.max_path_depth, 64);
        assert_eq!(policy.max_component_len, 255);
    }

    #[test]
    fn test_new_config_defaults() {
        let config = BatchConfig::new("src", "out");
        assert_eq!(config.pattern, "*.zip");
        assert_eq!(config.recovery_root, PathBuf::from("out").join("_recovered"));
        assert_eq!(config.recovery_layout, RecoveryLayout::PerArchive);
        assert_eq!(config.collision_policy, CollisionPolicy::Suffix);
        assert_eq!(config.pacing, Pacing::None);
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn test_builder_methods() {
        let config = BatchConfig::new("src", "out")
            .with_pattern("*takeout*.zip")
            .with_max_depth(Some(2))
            .with_recovery_root("rescued")
            .with_recovery_layout(RecoveryLayout::Flat)
            .with_pacing(Pacing::Fixed(Duration::from_millis(50)));

        assert_eq!(config.pattern, "*takeout*.zip");
        assert_eq!(config.max_depth, Some(2));
        assert_eq!(config.recovery_root, PathBuf::from("rescued"));
        assert_eq!(config.recovery_layout, RecoveryLayout::Flat);
        assert_eq!(config.pacing, Pacing::Fixed(Duration::from_millis(50)));
    }

    #[test]
    fn test_recovery_dir_per_archive() {
        let config = BatchConfig::new("src", "out").with_recovery_root("rescued");
        let name = BatchConfig::archive_dir_name(Path::new("src/a/takeout-001.zip"));
        assert_eq!(name, "takeout-001");
        let dir = config.recovery_dir_for("takeout-001 (1)");
        assert_eq!(dir, PathBuf::from("rescued").join("takeout-001 (1)"));
    }

    #[test]
    fn test_recovery_dir_flat() {
        let config = BatchConfig::new("src", "out")
            .with_recovery_root("rescued")
            .with_recovery_layout(RecoveryLayout::Flat);
        let dir = config.recovery_dir_for("takeout-001");
        assert_eq!(dir, PathBuf::from("rescued"));
    }
}
