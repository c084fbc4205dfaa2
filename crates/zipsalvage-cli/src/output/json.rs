//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::batch_problem;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use zipsalvage_core::ArchiveListing;
use zipsalvage_core::ArchiveSummary;
use zipsalvage_core::BatchReport;
use zipsalvage_core::MemberEntry;
use zipsalvage_core::SurveyReport;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    path: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct ArchiveOutput {
    path: String,
    state: String,
    found: usize,
    extracted: usize,
    failed: usize,
    recovered: Vec<String>,
    still_failed: Vec<String>,
}

impl From<&ArchiveSummary> for ArchiveOutput {
    fn from(summary: &ArchiveSummary) -> Self {
        Self {
            path: summary.path.display().to_string(),
            state: summary.state.to_string(),
            found: summary.extraction.found,
            extracted: summary.extraction.extracted.len(),
            failed: summary.extraction.failed.len(),
            recovered: summary.recovery.recovered.clone(),
            still_failed: summary.recovery.still_failed.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    archives_processed: usize,
    archives_failed: usize,
    files_found: usize,
    files_extracted: usize,
    files_recovered: usize,
    files_still_failed: usize,
    unique_names: usize,
    total_compressed: u64,
    total_uncompressed: u64,
    cancelled: bool,
    duration_ms: u128,
    archives: Vec<ArchiveOutput>,
    failures: Vec<FailureOutput>,
}

#[derive(Debug, Serialize)]
struct MemberOutput {
    name: String,
    size: u64,
    compressed_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
    host: String,
    version: String,
    compression: String,
    crc32: u32,
    is_dir: bool,
}

impl From<&MemberEntry> for MemberOutput {
    fn from(member: &MemberEntry) -> Self {
        Self {
            name: member.name.clone(),
            size: member.size,
            compressed_size: member.compressed_size,
            modified: member.modified.map(|m| m.to_string()),
            host: member.host.to_string(),
            version: member.version_string(),
            compression: member.compression.clone(),
            crc32: member.crc32,
            is_dir: member.is_dir,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListingOutput {
    path: String,
    total_entries: usize,
    total_size: u64,
    total_compressed: u64,
    members: Vec<MemberOutput>,
}

impl From<&ArchiveListing> for ListingOutput {
    fn from(listing: &ArchiveListing) -> Self {
        Self {
            path: listing.path.display().to_string(),
            total_entries: listing.members.len(),
            total_size: listing.total_size(),
            total_compressed: listing.total_compressed(),
            members: listing.members.iter().map(MemberOutput::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SurveyArchiveOutput {
    path: String,
    members: usize,
    compressed: u64,
    uncompressed: u64,
}

#[derive(Debug, Serialize)]
struct SurveyOutput {
    archives_processed: usize,
    archives_failed: usize,
    files_found: usize,
    unique_names: usize,
    total_compressed: u64,
    total_uncompressed: u64,
    archives: Vec<SurveyArchiveOutput>,
    failures: Vec<FailureOutput>,
}

fn batch_output(report: &BatchReport) -> BatchOutput {
    let stats = &report.stats;
    BatchOutput {
        archives_processed: stats.archives_processed,
        archives_failed: stats.archives_failed,
        files_found: stats.files_found,
        files_extracted: stats.files_extracted,
        files_recovered: stats.files_recovered,
        files_still_failed: stats.files_still_failed,
        unique_names: stats.unique_count(),
        total_compressed: stats.total_compressed,
        total_uncompressed: stats.total_uncompressed,
        cancelled: report.cancelled,
        duration_ms: report.duration.as_millis(),
        archives: report.archives.iter().map(ArchiveOutput::from).collect(),
        failures: report
            .failures
            .iter()
            .map(|f| FailureOutput {
                path: f.path.display().to_string(),
                error: f.error.to_string(),
            })
            .collect(),
    }
}

fn survey_output(report: &SurveyReport) -> SurveyOutput {
    let stats = &report.stats;
    SurveyOutput {
        archives_processed: stats.archives_processed,
        archives_failed: stats.archives_failed,
        files_found: stats.files_found,
        unique_names: stats.unique_count(),
        total_compressed: stats.total_compressed,
        total_uncompressed: stats.total_uncompressed,
        archives: report
            .archives
            .iter()
            .map(|a| SurveyArchiveOutput {
                path: a.path.display().to_string(),
                members: a.members.len(),
                compressed: a.total_compressed(),
                uncompressed: a.total_size(),
            })
            .collect(),
        failures: report
            .failures
            .iter()
            .map(|f| FailureOutput {
                path: f.path.display().to_string(),
                error: f.error.to_string(),
            })
            .collect(),
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_batch_report(&self, report: &BatchReport) -> Result<()> {
        let data = batch_output(report);
        match batch_problem(report) {
            Some(problem) => Self::output(&JsonOutput::partial("extract", data, problem)),
            None => Self::output(&JsonOutput::success("extract", data)),
        }
    }

    fn format_survey(&self, report: &SurveyReport) -> Result<()> {
        Self::output(&JsonOutput::success("survey", survey_output(report)))
    }

    fn format_listing_short(&self, listing: &ArchiveListing) -> Result<()> {
        Self::output(&JsonOutput::success("list", ListingOutput::from(listing)))
    }

    fn format_listing_long(&self, listing: &ArchiveListing, _human_readable: bool) -> Result<()> {
        Self::output(&JsonOutput::success("list", ListingOutput::from(listing)))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("unknown", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
