//! Types shared by the reader, the engines and the batch driver.
//!
//! Path types are validated upon construction and cannot be created from
//! raw strings without going through normalization.

pub mod dest_dir;
pub mod member;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use member::HostSystem;
pub use member::MemberEntry;
pub use member::MemberTimestamp;
pub use safe_path::SafePath;
