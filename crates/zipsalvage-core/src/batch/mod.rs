//! Batch processing: archive discovery and the per-archive driver loop.

pub mod discover;
pub mod driver;

pub use discover::ArchiveFinder;
pub use discover::discover_archives;
pub use driver::BatchDriver;
