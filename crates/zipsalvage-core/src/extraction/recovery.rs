//! Recovery of members that failed direct extraction.
//!
//! Each failed member is re-read by name and written under its sanitized
//! final path segment in a flat recovery directory. The stored directory
//! structure is never used to build an output path.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::ArchiveHandle;
use crate::CancellationToken;
use crate::CollisionPolicy;
use crate::ExtractionError;
use crate::Result;
use crate::archive::is_directory_name;
use crate::config::Pacing;
use crate::control::Pacer;
use crate::copy::CopyBuffer;
use crate::error::PathRejection;
use crate::extraction::classify::is_contention;
use crate::report::BatchObserver;
use crate::report::MemberOutcome;
use crate::report::RecoveryResult;
use crate::sanitize::MAX_NAME_LEN;
use crate::sanitize::sanitize;
use crate::types::DestDir;

/// Names already written within one recovery scope.
///
/// On case-insensitive hosts names differing only in case collide.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::CollisionPolicy;
/// use zipsalvage_core::NameRegistry;
///
/// let mut registry = NameRegistry::new();
/// let policy = CollisionPolicy::Suffix;
///
/// assert_eq!(registry.claim("photo.jpg", policy).as_deref(), Some("photo.jpg"));
/// assert_eq!(registry.claim("photo.jpg", policy).as_deref(), Some("photo (1).jpg"));
/// assert_eq!(registry.claim("photo.jpg", CollisionPolicy::Reject), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves an output name for `name` under `policy`.
    ///
    /// Returns `None` only under [`CollisionPolicy::Reject`] when the name is
    /// taken.
    pub fn claim(&mut self, name: &str, policy: CollisionPolicy) -> Option<String> {
        if self.used.insert(key(name)) {
            return Some(name.to_string());
        }

        match policy {
            CollisionPolicy::Overwrite => Some(name.to_string()),
            CollisionPolicy::Reject => None,
            CollisionPolicy::Suffix => {
                let (stem, extension) = split_extension(name);
                (1usize..)
                    .map(|n| suffixed(stem, extension, n))
                    .find(|candidate| self.used.insert(key(candidate)))
            }
        }
    }

    /// Gives back a name whose write did not happen.
    pub fn release(&mut self, name: &str) {
        self.used.remove(&key(name));
    }

    /// Returns `true` if `name` is taken.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(&key(name))
    }

    /// Number of names taken.
    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Returns `true` if no name is taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

fn key(name: &str) -> String {
    if cfg!(any(windows, target_os = "macos")) {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

fn suffixed(stem: &str, extension: &str, n: usize) -> String {
    let suffix = format!(" ({n})");
    let budget = MAX_NAME_LEN.saturating_sub(suffix.len() + extension.len());
    let mut end = budget.min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{suffix}{extension}", &stem[..end])
}

/// Re-extracts failed members into a flat directory.
///
/// # Examples
///
/// ```no_run
/// use zipsalvage_core::ArchiveHandle;
/// use zipsalvage_core::CollisionPolicy;
/// use zipsalvage_core::NameRegistry;
/// use zipsalvage_core::NoopObserver;
/// use zipsalvage_core::RecoveryEngine;
/// use zipsalvage_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = ArchiveHandle::open("takeout-001.zip")?;
/// let dest = DestDir::create("/srv/extracted/_recovered")?;
/// let engine = RecoveryEngine::new(CollisionPolicy::Suffix);
/// let mut registry = NameRegistry::new();
///
/// let failed = vec!["/etc/../passwd".to_string()];
/// let result = engine.recover(&mut archive, &failed, &dest, &mut registry, &mut NoopObserver)?;
/// assert_eq!(result.recovered, ["/etc/../passwd"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RecoveryEngine {
    collision_policy: CollisionPolicy,
    pacer: Arc<dyn Pacer>,
    cancel: CancellationToken,
}

impl RecoveryEngine {
    /// Creates an engine with no pacing and a fresh cancellation token.
    #[must_use]
    pub fn new(collision_policy: CollisionPolicy) -> Self {
        Self {
            collision_policy,
            pacer: Arc::new(Pacing::None),
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the pacer invoked after each member.
    #[must_use]
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Sets the cancellation token checked between members.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Recovers `failed` members, in the order given, into `dest`.
    ///
    /// Every name ends up in exactly one of the result lists. Directory
    /// members have no content and count as recovered.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled`, or a `WriteFailure` that is not transient
    /// contention, which aborts the archive.
    pub fn recover(
        &self,
        archive: &mut ArchiveHandle,
        failed: &[String],
        dest: &DestDir,
        registry: &mut NameRegistry,
        observer: &mut dyn BatchObserver,
    ) -> Result<RecoveryResult> {
        let total = failed.len();
        let mut result = RecoveryResult::new();
        let mut buffer = CopyBuffer::new();

        for (position, name) in failed.iter().enumerate() {
            self.cancel.check()?;

            let outcome = match self.recover_one(archive, name, dest, registry, &mut buffer) {
                Ok(()) => {
                    result.recovered.push(name.clone());
                    MemberOutcome::Recovered
                }
                Err(err) if err.is_member_failure() => {
                    warn!(name = %name, error = %err, "recovery failed");
                    result.still_failed.push(name.clone());
                    MemberOutcome::StillFailed
                }
                Err(ExtractionError::WriteFailure { ref source, .. }) if is_contention(source) => {
                    warn!(name = %name, error = %source, "recovery write contended");
                    result.still_failed.push(name.clone());
                    MemberOutcome::StillFailed
                }
                Err(err) => {
                    error!(name = %name, error = %err, "recovery write failed");
                    observer.on_member(name, MemberOutcome::StillFailed, position + 1, total);
                    return Err(err);
                }
            };

            observer.on_member(name, outcome, position + 1, total);
            self.pacer.pause();
        }

        info!(
            archive = %archive.path().display(),
            recovered = result.recovered.len(),
            still_failed = result.still_failed.len(),
            "recovery finished"
        );
        Ok(result)
    }

    fn recover_one(
        &self,
        archive: &mut ArchiveHandle,
        name: &str,
        dest: &DestDir,
        registry: &mut NameRegistry,
        buffer: &mut CopyBuffer,
    ) -> Result<()> {
        if is_directory_name(name) {
            debug!(name = %name, "directory member, nothing to recover");
            return Ok(());
        }

        let sanitized = sanitize(name);
        let Some(output_name) = registry.claim(&sanitized, self.collision_policy) else {
            return Err(ExtractionError::PathExtractionFailed {
                name: name.to_string(),
                reason: PathRejection::Unresolvable(format!(
                    "recovery name '{sanitized}' already used"
                )),
            });
        };

        let target = dest.join_name(&output_name);
        match archive.write_member_to(name, &target, buffer) {
            Ok(bytes) => {
                debug!(name = %name, output = %target.display(), bytes, "recovered");
                Ok(())
            }
            Err(err) => {
                if self.collision_policy != CollisionPolicy::Overwrite {
                    registry.release(&output_name);
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for RecoveryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryEngine")
            .field("collision_policy", &self.collision_policy)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
