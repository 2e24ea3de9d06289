//! UGE (Univa/Son of Grid Engine) integration for kfbatch.
//!
//! Parse queue instances and jobs from `qstat -F` output.

pub mod jobs;
pub mod qstat;
pub mod types;

pub use jobs::parse_qstat_jobs;
pub use qstat::{MEMORY_AVAILABLE_KEY, MEMORY_TOTAL_KEY, parse_qstat_nodes};
pub use types::UgeJobState;
