//! Direct extraction and recovery engines.

pub mod atomic;
pub mod classify;
pub mod engine;
pub mod recovery;

pub use engine::ExtractionEngine;
pub use recovery::NameRegistry;
pub use recovery::RecoveryEngine;
