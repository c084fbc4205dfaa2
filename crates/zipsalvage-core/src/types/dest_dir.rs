//! Canonical destination directory.

use crate::ExtractionError;
use crate::Result;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use super::SafePath;

/// A destination directory for extraction or recovery output.
///
/// Once constructed, a `DestDir` is an existing directory represented by its
/// absolute canonical path, so joined member paths can be checked for
/// containment with a plain prefix comparison.
///
/// A subtree can be reserved (the recovery directory, when it lives inside
/// the output root) so direct extraction never writes into it.
///
/// # Examples
///
/// ```no_run
/// use zipsalvage_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/srv/extracted")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir {
    root: PathBuf,
    reserved: Option<PathBuf>,
}

impl DestDir {
    /// Wraps an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::Io` if the path cannot be resolved or is not
    /// a directory.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let canonical = path.canonicalize().map_err(|e| {
            ExtractionError::Io(io::Error::new(
                e.kind(),
                format!("cannot resolve destination {}: {e}", path.display()),
            ))
        })?;

        if !canonical.is_dir() {
            return Err(ExtractionError::Io(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("destination is not a directory: {}", path.display()),
            )));
        }

        Ok(Self {
            root: canonical,
            reserved: None,
        })
    }

    /// Creates the directory (and its parents) if needed, then wraps it.
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::WriteFailure` if the directory cannot be
    /// created, or the errors of [`DestDir::new`].
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        std::fs::create_dir_all(&path).map_err(|source| ExtractionError::WriteFailure {
            path: path.clone(),
            source,
        })?;
        Self::new(path)
    }

    /// Reserves `path` and everything below it.
    ///
    /// `path` is compared component-wise against joined member paths, so it
    /// should be spelled from [`DestDir::as_path`].
    #[must_use]
    pub fn with_reserved(mut self, path: impl Into<PathBuf>) -> Self {
        self.reserved = Some(path.into());
        self
    }

    /// Returns the canonical path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.root
    }

    /// Returns `true` if `path` falls in the reserved subtree.
    #[must_use]
    pub fn is_reserved(&self, path: &Path) -> bool {
        self.reserved
            .as_deref()
            .is_some_and(|reserved| path.starts_with(reserved))
    }

    /// Joins a normalized member path to this directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &SafePath) -> PathBuf {
        self.root.join(safe_path.as_path())
    }

    /// Joins a single flat file name to this directory.
    #[inline]
    #[must_use]
    pub fn join_name(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Returns `true` if `path` lies inside this directory once its existing
    /// ancestors are canonicalized.
    ///
    /// Used after parent directories have been created, to catch escapes
    /// through symlinks left in the destination tree.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.canonicalize()
            .is_ok_and(|canonical| canonical.starts_with(&self.root))
    }
}
