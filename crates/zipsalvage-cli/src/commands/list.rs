//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use zipsalvage_core::describe_archive;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let listing = add_archive_context(describe_archive(&args.archive), &args.archive)?;

    if args.long {
        formatter.format_listing_long(&listing, args.human_readable)?;
    } else {
        formatter.format_listing_short(&listing)?;
    }

    Ok(())
}
