//! Batch survey: counts and sizes across archives without extracting.

use tracing::info;
use tracing::warn;

use crate::ArchiveFinder;
use crate::Result;
use crate::report::AggregateStats;
use crate::report::ArchiveFailure;

use super::ArchiveListing;
use super::describe_archive;

/// Result of surveying a source tree.
#[derive(Debug, Default)]
pub struct SurveyReport {
    /// Readable archives in discovery order.
    pub archives: Vec<ArchiveListing>,
    /// Archives that could not be read.
    pub failures: Vec<ArchiveFailure>,
    /// Totals over the readable archives (extraction counters stay zero).
    pub stats: AggregateStats,
}

/// Lists every discovered archive and aggregates member names and sizes.
///
/// Unreadable archives are reported in [`SurveyReport::failures`] and do not
/// contribute to the totals.
///
/// # Errors
///
/// Returns the discovery error if the source tree cannot be walked.
pub fn survey(finder: &ArchiveFinder) -> Result<SurveyReport> {
    let mut report = SurveyReport::default();

    for path in finder.find()? {
        match describe_archive(&path) {
            Ok(listing) => {
                report.stats.record_listing(&listing.members);
                report.stats.archives_processed += 1;
                report.archives.push(listing);
            }
            Err(error) => {
                warn!(archive = %path.display(), error = %error, "cannot read archive");
                report.stats.archives_failed += 1;
                report.failures.push(ArchiveFailure { path, error });
            }
        }
    }

    info!(
        "Found {} files total with {} unique names.",
        report.stats.files_found,
        report.stats.unique_count()
    );
    info!(
        "Total compressed size: {:.2} GB, uncompressed: {:.2} GB",
        report.stats.compressed_gb(),
        report.stats.uncompressed_gb()
    );
    Ok(report)
}
