//! Per-archive results, batch statistics and progress observation.

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::ExtractionError;
use crate::types::MemberEntry;

const BYTES_PER_GB: f64 = 1_000_000_000.0;

/// Outcome of direct extraction for one archive.
///
/// Member names appear in listing order. `extracted.len() + failed.len()`
/// equals `found` once the engine has visited every member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Members written at their normalized path.
    pub extracted: Vec<String>,
    /// Members that could not be extracted directly.
    pub failed: Vec<String>,
    /// Number of members declared by the archive.
    pub found: usize,
}

impl ExtractionResult {
    /// Creates an empty result for an archive with `found` members.
    #[must_use]
    pub fn new(found: usize) -> Self {
        Self {
            extracted: Vec::new(),
            failed: Vec::new(),
            found,
        }
    }

    /// Returns `true` if every declared member was accounted for.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.extracted.len() + self.failed.len() == self.found
    }

    /// Returns `true` if any member needs recovery.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Outcome of recovery for the failed members of one archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Members written under a flat, sanitized name.
    pub recovered: Vec<String>,
    /// Members that could not be recovered either.
    pub still_failed: Vec<String>,
}

impl RecoveryResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of members recovery was attempted for.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.recovered.len() + self.still_failed.len()
    }
}

/// Running totals across a batch.
///
/// # Examples
///
/// ```
/// use zipsalvage_core::AggregateStats;
///
/// let mut stats = AggregateStats::default();
/// stats.total_uncompressed = 2_500_000_000;
/// assert!((stats.uncompressed_gb() - 2.5).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Archives that completed extraction and recovery.
    pub archives_processed: usize,
    /// Archives aborted by a fatal error.
    pub archives_failed: usize,
    /// Members listed across all readable archives.
    pub files_found: usize,
    /// Members extracted directly.
    pub files_extracted: usize,
    /// Members written by recovery.
    pub files_recovered: usize,
    /// Members that failed both extraction and recovery.
    pub files_still_failed: usize,
    /// Distinct final-component names seen across the batch.
    pub unique_names: BTreeSet<String>,
    /// Sum of compressed member sizes in bytes.
    pub total_compressed: u64,
    /// Sum of uncompressed member sizes in bytes.
    pub total_uncompressed: u64,
}

impl AggregateStats {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the listing of one successfully opened archive.
    pub fn record_listing(&mut self, members: &[MemberEntry]) {
        self.files_found += members.len();
        for member in members {
            self.total_compressed = self.total_compressed.saturating_add(member.compressed_size);
            self.total_uncompressed = self.total_uncompressed.saturating_add(member.size);
            self.unique_names.insert(member.file_name());
        }
    }

    /// Adds the direct extraction outcome of one archive.
    pub fn record_extraction(&mut self, result: &ExtractionResult) {
        self.files_extracted += result.extracted.len();
    }

    /// Adds the recovery outcome of one archive.
    pub fn record_recovery(&mut self, result: &RecoveryResult) {
        self.files_recovered += result.recovered.len();
        self.files_still_failed += result.still_failed.len();
    }

    /// Members extracted directly or through recovery.
    #[must_use]
    pub fn total_extracted(&self) -> usize {
        self.files_extracted + self.files_recovered
    }

    /// Number of distinct final-component names.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.unique_names.len()
    }

    /// Compressed total in gigabytes (10^9 bytes).
    #[must_use]
    pub fn compressed_gb(&self) -> f64 {
        self.total_compressed as f64 / BYTES_PER_GB
    }

    /// Uncompressed total in gigabytes (10^9 bytes).
    #[must_use]
    pub fn uncompressed_gb(&self) -> f64 {
        self.total_uncompressed as f64 / BYTES_PER_GB
    }

    /// Folds another set of statistics into this one.
    pub fn merge(&mut self, other: &Self) {
        self.archives_processed += other.archives_processed;
        self.archives_failed += other.archives_failed;
        self.files_found += other.files_found;
        self.files_extracted += other.files_extracted;
        self.files_recovered += other.files_recovered;
        self.files_still_failed += other.files_still_failed;
        self.unique_names.extend(other.unique_names.iter().cloned());
        self.total_compressed = self.total_compressed.saturating_add(other.total_compressed);
        self.total_uncompressed = self
            .total_uncompressed
            .saturating_add(other.total_uncompressed);
    }
}

/// Processing state of one archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveState {
    /// Discovered, not yet opened.
    Pending,
    /// Direct extraction in progress.
    Extracting,
    /// Recovery of failed members in progress.
    Recovering,
    /// Extraction and recovery finished.
    Done,
    /// Aborted by a fatal error.
    Failed,
}

impl std::fmt::Display for ArchiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Extracting => "extracting",
            Self::Recovering => "recovering",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Final record for an archive that was processed to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Archive path.
    pub path: PathBuf,
    /// Final state (always `Done`).
    pub state: ArchiveState,
    /// Direct extraction outcome.
    pub extraction: ExtractionResult,
    /// Recovery outcome (empty if nothing failed).
    pub recovery: RecoveryResult,
}

/// An archive aborted by a fatal error.
#[derive(Debug)]
pub struct ArchiveFailure {
    /// Archive path.
    pub path: PathBuf,
    /// Error that aborted the archive.
    pub error: ExtractionError,
}

/// Report of a complete batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Totals across the batch.
    pub stats: AggregateStats,
    /// Archives processed to completion, in discovery order.
    pub archives: Vec<ArchiveSummary>,
    /// Archives aborted by a fatal error, in discovery order.
    pub failures: Vec<ArchiveFailure>,
    /// Whether the batch stopped because of cancellation.
    pub cancelled: bool,
    /// Wall-clock duration.
    pub duration: Duration,
}

impl BatchReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any archive was aborted.
    #[must_use]
    pub fn has_fatal_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns `true` if every archive completed and the batch ran to the end.
    ///
    /// Member-level failures do not count against success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.cancelled && !self.has_fatal_failures()
    }
}

/// What happened to a single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberOutcome {
    /// Extracted at its normalized path.
    Extracted,
    /// Direct extraction failed; queued for recovery.
    Failed,
    /// Written under a flat, sanitized name.
    Recovered,
    /// Recovery failed too.
    StillFailed,
}

/// Observer for batch progress.
///
/// The driver calls these hooks in order: `on_batch_start`, then for each
/// archive `on_archive_start`, `on_state_change` and `on_member` as work
/// proceeds, and `on_archive_complete` or `on_archive_failed`; finally
/// `on_batch_complete`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use zipsalvage_core::ArchiveState;
/// use zipsalvage_core::ArchiveSummary;
/// use zipsalvage_core::BatchObserver;
/// use zipsalvage_core::BatchReport;
/// use zipsalvage_core::ExtractionError;
/// use zipsalvage_core::MemberOutcome;
///
/// struct Printer;
///
/// impl BatchObserver for Printer {
///     fn on_batch_start(&mut self, archives: usize) {
///         println!("{archives} archives");
///     }
///     fn on_archive_start(&mut self, path: &Path, current: usize, total: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///     fn on_state_change(&mut self, _path: &Path, _state: ArchiveState) {}
///     fn on_member(&mut self, name: &str, outcome: MemberOutcome, _current: usize, _total: usize) {
///         println!("{name}: {outcome:?}");
///     }
///     fn on_archive_complete(&mut self, _summary: &ArchiveSummary) {}
///     fn on_archive_failed(&mut self, path: &Path, error: &ExtractionError) {
///         eprintln!("{}: {error}", path.display());
///     }
///     fn on_batch_complete(&mut self, _report: &BatchReport) {}
/// }
/// ```
pub trait BatchObserver {
    /// Called once with the number of discovered archives.
    fn on_batch_start(&mut self, archives: usize);

    /// Called when an archive is about to be opened (`current` is 1-indexed).
    fn on_archive_start(&mut self, path: &Path, current: usize, total: usize);

    /// Called on every state transition of the current archive.
    fn on_state_change(&mut self, path: &Path, state: ArchiveState);

    /// Called after each member operation (`current` is 1-indexed within
    /// the current phase).
    fn on_member(&mut self, name: &str, outcome: MemberOutcome, current: usize, total: usize);

    /// Called when an archive finished extraction and recovery.
    fn on_archive_complete(&mut self, summary: &ArchiveSummary);

    /// Called when a fatal error aborted an archive.
    fn on_archive_failed(&mut self, path: &Path, error: &ExtractionError);

    /// Called once at the end of the batch.
    fn on_batch_complete(&mut self, report: &BatchReport);
}

/// No-op implementation of `BatchObserver`.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {
    fn on_batch_start(&mut self, _archives: usize) {}

    fn on_archive_start(&mut self, _path: &Path, _current: usize, _total: usize) {}

    fn on_state_change(&mut self, _path: &Path, _state: ArchiveState) {}

    fn on_member(&mut self, _name: &str, _outcome: MemberOutcome, _current: usize, _total: usize) {
    }

    fn on_archive_complete(&mut self, _summary: &ArchiveSummary) {}

    fn on_archive_failed(&mut self, _path: &Path, _error: &ExtractionError) {}

    fn on_batch_complete(&mut self, _report: &BatchReport) {}
}
