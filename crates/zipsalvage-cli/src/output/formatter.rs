//! Output formatter trait for CLI results.

use anyhow::Result;
use serde::Serialize;
use zipsalvage_core::ArchiveListing;
use zipsalvage_core::BatchReport;
use zipsalvage_core::SurveyReport;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the outcome of an extraction batch
    fn format_batch_report(&self, report: &BatchReport) -> Result<()>;

    /// Format survey totals
    fn format_survey(&self, report: &SurveyReport) -> Result<()>;

    /// Format archive listing (names only)
    fn format_listing_short(&self, listing: &ArchiveListing) -> Result<()>;

    /// Format archive listing with member metadata
    fn format_listing_long(&self, listing: &ArchiveListing, human_readable: bool) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    /// Result data from an operation that finished but did not fully succeed.
    pub fn partial(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: Some(data),
            error: Some(error.into()),
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Describes why a finished batch is not a success, if it is not.
pub fn batch_problem(report: &BatchReport) -> Option<String> {
    if report.cancelled {
        Some(format!(
            "cancelled after {} of the discovered archives",
            report.archives.len() + report.failures.len()
        ))
    } else if report.has_fatal_failures() {
        Some(format!("{} archive(s) failed", report.failures.len()))
    } else {
        None
    }
}
