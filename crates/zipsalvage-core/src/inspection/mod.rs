//! Archive inspection without extraction.
//!
//! # Examples
//!
//! ```no_run
//! use zipsalvage_core::ArchiveFinder;
//! use zipsalvage_core::describe_archive;
//! use zipsalvage_core::survey;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let listing = describe_archive("takeout-001.zip")?;
//! println!("Archive contains {} members", listing.members.len());
//!
//! let report = survey(&ArchiveFinder::new("/mnt/takeout"))?;
//! println!(
//!     "Found {} files total with {} unique names.",
//!     report.stats.files_found,
//!     report.stats.unique_count()
//! );
//! # Ok(())
//! # }
//! ```

pub mod list;
pub mod survey;

pub use list::ArchiveListing;
pub use list::describe_archive;
pub use survey::SurveyReport;
pub use survey::survey;
