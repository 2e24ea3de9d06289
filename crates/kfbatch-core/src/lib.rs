//! Core record types for kfbatch.
//!
//! Every scheduler backend normalizes its output into these records.

pub mod scheduler;
pub mod types;

pub use scheduler::{Scheduler, detect_scheduler, program_basename};
pub use types::{DEFAULT_MEMORY, JobRecord, NodeRecord};
