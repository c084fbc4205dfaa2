//! Direct (path-preserving) extraction of one archive.

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::ArchiveHandle;
use crate::CancellationToken;
use crate::PathPolicy;
use crate::Result;
use crate::config::Pacing;
use crate::control::Pacer;
use crate::copy::CopyBuffer;
use crate::report::BatchObserver;
use crate::report::ExtractionResult;
use crate::report::MemberOutcome;
use crate::types::DestDir;
use crate::types::MemberEntry;

/// Extracts every member of an archive at its normalized relative path.
///
/// Members that fail for member-specific reasons (unsafe path, unsupported
/// method, corrupt data) land in the failed list and the loop continues.
/// Failures of the output side abort the archive.
///
/// # Examples
///
/// ```no_run
/// use zipsalvage_core::ArchiveHandle;
/// use zipsalvage_core::ExtractionEngine;
/// use zipsalvage_core::NoopObserver;
/// use zipsalvage_core::PathPolicy;
/// use zipsalvage_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut archive = ArchiveHandle::open("takeout-001.zip")?;
/// let dest = DestDir::create("/srv/extracted")?;
/// let engine = ExtractionEngine::new(PathPolicy::default());
///
/// let result = engine.extract(&mut archive, &dest, &mut NoopObserver)?;
/// println!("{} extracted, {} to recover", result.extracted.len(), result.failed.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ExtractionEngine {
    policy: PathPolicy,
    pacer: Arc<dyn Pacer>,
    cancel: CancellationToken,
}

impl ExtractionEngine {
    /// Creates an engine with no pacing and a fresh cancellation token.
    #[must_use]
    pub fn new(policy: PathPolicy) -> Self {
        Self {
            policy,
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

    /// Path policy applied to stored names.
    #[must_use]
    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    /// Lists the archive and extracts every member.
    ///
    /// # Errors
    ///
    /// Returns the listing error, `Cancelled`, or the first fatal
    /// (non-member) error such as `WriteFailure`.
    pub fn extract(
        &self,
        archive: &mut ArchiveHandle,
        dest: &DestDir,
        observer: &mut dyn BatchObserver,
    ) -> Result<ExtractionResult> {
        let members = archive.list_members()?;
        self.extract_members(archive, &members, dest, observer)
    }

    /// Extracts an already listed set of members, in order.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` or the first fatal (non-member) error.
    pub fn extract_members(
        &self,
        archive: &mut ArchiveHandle,
        members: &[MemberEntry],
        dest: &DestDir,
        observer: &mut dyn BatchObserver,
    ) -> Result<ExtractionResult> {
        let total = members.len();
        let mut result = ExtractionResult::new(total);
        let mut buffer = CopyBuffer::new();

        for (position, member) in members.iter().enumerate() {
            self.cancel.check()?;

            trace!(
                name = %member.name,
                modified = ?member.modified,
                host = %member.host,
                version = %member.version_string(),
                compressed = member.compressed_size,
                size = member.size,
                "member"
            );

            let outcome = match archive.extract_entry(member, dest, &self.policy, &mut buffer) {
                Ok(bytes) => {
                    debug!(name = %member.name, bytes, "extracted");
                    result.extracted.push(member.name.clone());
                    MemberOutcome::Extracted
                }
                Err(err) if err.is_member_failure() => {
                    warn!(name = %member.name, error = %err, "direct extraction failed");
                    result.failed.push(member.name.clone());
                    MemberOutcome::Failed
                }
                Err(err) => return Err(err),
            };

            observer.on_member(&member.name, outcome, position + 1, total);
            self.pacer.pause();
        }

        info!(
            archive = %archive.path().display(),
            found = result.found,
            extracted = result.extracted.len(),
            failed = result.failed.len(),
            "direct extraction finished"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for ExtractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("policy", &self.policy)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}
