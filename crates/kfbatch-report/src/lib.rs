//! Console report and table output for kfbatch.

pub mod render;
pub mod tsv;

pub use render::{
    NodeDataIssue, write_availability_skipped, write_cluster_summary, write_job_summary,
    write_node_data_issue, write_top_availability,
};
pub use tsv::{
    SLURM_JOB_COLUMNS, SLURM_NODE_COLUMNS, TableWriteError, UGE_NODE_COLUMNS, write_job_table,
    write_node_table,
};
