//! Survey command implementation

use crate::cli::SurveyArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use zipsalvage_core::ArchiveFinder;
use zipsalvage_core::survey;

pub fn execute(args: &SurveyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let finder = ArchiveFinder::new(&args.source)
        .with_pattern(args.pattern.clone())
        .with_max_depth(args.max_depth.map(|d| d as usize));

    let report = add_archive_context(survey(&finder), &args.source)?;

    if report.archives.is_empty() && report.failures.is_empty() {
        formatter.format_warning(&format!(
            "No archives matching '{}' found in {}",
            args.pattern,
            args.source.display()
        ));
    }
    formatter.format_survey(&report)
}
