//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use indicatif::MultiProgress;
use std::process::ExitCode;
use zipsalvage_core::BatchDriver;
use zipsalvage_core::CancellationToken;

/// Runs a batch and reports it.
///
/// Returns `ExitCode::FAILURE` when an archive was aborted or the batch was
/// cancelled; members that could not be recovered do not affect the exit
/// status.
pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    display: &MultiProgress,
    cancel: CancellationToken,
) -> Result<ExitCode> {
    let config = args.to_config();
    let driver = BatchDriver::new(config).with_cancellation(cancel);

    let report = {
        let mut progress = CliProgress::new(display);
        add_archive_context(driver.run(&mut progress), &args.source)?
    };

    if report.archives.is_empty() && report.failures.is_empty() && !report.cancelled {
        formatter.format_warning(&format!(
            "No archives matching '{}' found in {}",
            args.pattern,
            args.source.display()
        ));
    }

    formatter.format_batch_report(&report)?;

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
