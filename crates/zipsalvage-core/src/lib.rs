//! Batch ZIP extraction with recovery of members whose stored path cannot be
//! extracted safely.
//!
//! `zipsalvage-core` walks a source tree for archives, extracts every member
//! at its normalized relative path, and re-reads the members that fail
//! (absolute names, `..` traversal, names the host cannot store) into a flat
//! recovery directory under their sanitized final path segment.
//!
//! # Examples
//!
//! ```no_run
//! use zipsalvage_core::BatchConfig;
//! use zipsalvage_core::BatchDriver;
//! use zipsalvage_core::NoopObserver;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BatchConfig::new("/mnt/takeout", "/srv/extracted")
//!     .with_pattern("*takeout*.zip");
//! let report = BatchDriver::new(config).run(&mut NoopObserver)?;
//!
//! println!(
//!     "Extracted {} of {} files ({} recovered)",
//!     report.stats.total_extracted(),
//!     report.stats.files_found,
//!     report.stats.files_recovered
//! );
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod batch;
pub mod config;
pub mod control;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod inspection;
pub mod report;
pub mod sanitize;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

// Re-export main API types
pub use archive::ArchiveHandle;
pub use batch::ArchiveFinder;
pub use batch::BatchDriver;
pub use batch::discover_archives;
pub use config::BatchConfig;
pub use config::CollisionPolicy;
pub use config::Pacing;
pub use config::PathPolicy;
pub use config::RecoveryLayout;
pub use control::CancellationToken;
pub use control::Pacer;
pub use error::ExtractionError;
pub use error::PathRejection;
pub use error::Result;
pub use extraction::ExtractionEngine;
pub use extraction::NameRegistry;
pub use extraction::RecoveryEngine;
pub use inspection::ArchiveListing;
pub use inspection::SurveyReport;
pub use inspection::describe_archive;
pub use inspection::survey;
pub use report::AggregateStats;
pub use report::ArchiveFailure;
pub use report::ArchiveState;
pub use report::ArchiveSummary;
pub use report::BatchObserver;
pub use report::BatchReport;
pub use report::ExtractionResult;
pub use report::MemberOutcome;
pub use report::NoopObserver;
pub use report::RecoveryResult;
pub use sanitize::sanitize;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::MemberEntry;
pub use types::SafePath;
