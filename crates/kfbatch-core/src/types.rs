//! Normalized node and job records.

use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};

/// Memory value used when a node does not report a quantity.
pub const DEFAULT_MEMORY: &str = "0G";

/// Resource state of one node as seen from one queue/partition.
///
/// Unique key: `(queue_name, node_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Queue (UGE) or partition (SLURM) name
    pub queue_name: String,

    /// Host name
    pub node_name: String,

    /// Backend that reported this node
    pub scheduler: Scheduler,

    /// Queue type as reported (e.g. "BP"), "SLURM" for SLURM nodes
    pub qtype: String,

    /// Cores held but not yet running work
    pub cores_reserved: u32,

    /// Cores running work
    pub cores_used: u32,

    /// Cores configured on the node
    pub cores_total: u32,

    /// `max(total - used - reserved, 0)`
    pub cores_available: u32,

    /// Load average as reported
    pub load_avg: String,

    /// Architecture string
    pub arch: String,

    /// Empty for a normal node, otherwise a human-readable reason
    /// (possibly several joined with `|`)
    pub status: String,

    /// Available memory, raw quantity with unit
    pub memory_available: String,

    /// Total memory, raw quantity with unit
    pub memory_total: String,

    /// Raw SLURM node state string (SLURM only)
    pub slurm_state: Option<String>,
}

impl NodeRecord {
    /// Available cores, clipped at zero.
    pub fn available_cores(total: u32, used: u32, reserved: u32) -> u32 {
        total.saturating_sub(used).saturating_sub(reserved)
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.queue_name, &self.node_name)
    }

    /// True if the node's status disqualifies it from available capacity.
    pub fn is_abnormal(&self) -> bool {
        !self.status.is_empty()
    }
}

/// One entry of a scheduler's job listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job ID, including any array suffix
    pub job_id: String,

    /// Partition (SLURM); empty for UGE listings
    pub queue: String,

    /// Job name
    pub name: String,

    /// Owner
    pub user: String,

    /// State code as reported ("qw", "Eqw", "PD", "RUNNING", ...)
    pub state: String,

    /// Elapsed time (SLURM) or submit/start date and time (UGE)
    pub time: String,

    /// Slots per task
    pub slots: u32,

    /// Array-task expression, empty for plain jobs
    pub task_spec: String,

    /// `slots` multiplied by the estimated task count
    pub total_slots: u64,

    /// True if the task count could not be determined exactly
    pub task_count_estimated: bool,

    /// Scheduling priority (UGE only)
    pub priority: Option<String>,

    /// Number of nodes (SLURM only)
    pub num_nodes: Option<u32>,

    /// Node list or pending reason (SLURM only)
    pub node_or_reason: Option<String>,
}
