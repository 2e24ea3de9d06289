//! SLURM integration for kfbatch.
//!
//! Parse node resources via scontrol and active jobs via squeue.

pub mod scontrol;
pub mod squeue;
pub mod types;

pub use scontrol::{
    PartitionStateMap, SLURM_QTYPE, parse_scontrol_nodes, parse_scontrol_partitions,
    partition_state_map,
};
pub use squeue::{SQUEUE_FORMAT, estimate_slurm_task_count, parse_squeue_jobs, prepare_squeue_command};
pub use types::{NodeState, NodeStateToken, PartitionState, SlurmJobState, partition_state_is_up};
