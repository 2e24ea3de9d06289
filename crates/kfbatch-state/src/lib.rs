//! Snapshot reconciliation and availability summaries.
//!
//! Works on the normalized tables produced by kfbatch-uge and
//! kfbatch-slurm; rendering lives in kfbatch-report.

pub mod jobs;
pub mod reconcile;
pub mod summary;

pub use jobs::{JobClass, JobSummary, ToJobClass, classify_job, summarize_jobs};
pub use reconcile::reconcile_snapshots;
pub use summary::{
    LOGIN_QUEUE_PREFIX, QueueRanking, QueueSummary, RankedNode, Resource, TopOptions,
    cluster_summary, top_availability,
};
