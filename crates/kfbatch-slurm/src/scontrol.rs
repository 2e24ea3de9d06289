//! Parse `scontrol show node -o` and `scontrol show partition -o` output.

use crate::types::{NodeState, PartitionState, partition_state_is_up};
use kfbatch_core::{NodeRecord, Scheduler};
use kfbatch_parsers::{parse_int_or, parse_key_values};
use std::collections::HashMap;

/// Queue type reported for every SLURM node row.
pub const SLURM_QTYPE: &str = "SLURM";

/// Partition name to raw partition state.
pub type PartitionStateMap = HashMap<String, String>;

/// Group lines into node records. A record runs until a blank line or the
/// next line mentioning `NodeName=`.
fn split_node_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in lines.iter().map(|l| l.as_ref().trim()) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.contains("NodeName=") && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Partition names of a node, without the default-partition `*` marker
/// and without `(null)`/`N/A` placeholders.
fn node_partitions(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.trim_end_matches('*'))
        .filter(|p| *p != "(null)" && *p != "N/A")
        .collect()
}

/// Compose the node status with the partition's state annotation.
fn compose_status(node_status: &str, partition_state: Option<&str>) -> String {
    let partition_status = match partition_state {
        Some(state) if !partition_state_is_up(state) => format!("partition_state={}", state),
        _ => String::new(),
    };
    match (node_status.is_empty(), partition_status.is_empty()) {
        (_, true) => node_status.to_string(),
        (true, false) => partition_status,
        (false, false) => format!("{}|{}", node_status, partition_status),
    }
}

/// Parse one node record into one row per partition.
fn parse_node_block(block: &str, partition_states: Option<&PartitionStateMap>) -> Vec<NodeRecord> {
    let params = parse_key_values(block);
    let node_name = match params.get("NodeName") {
        Some(name) if !name.is_empty() => *name,
        _ => return Vec::new(),
    };
    let partitions = node_partitions(params.get("Partitions").copied().unwrap_or_default());
    if partitions.is_empty() {
        tracing::debug!("Skipping node {} without partitions", node_name);
        return Vec::new();
    }

    let field = |key: &str| params.get(key).copied();
    let mut cores_total = parse_int_or(field("CPUEfctv"), 0);
    if cores_total <= 0 {
        cores_total = parse_int_or(field("CPUTot"), 0);
    }
    let cores_total = u32::try_from(cores_total.max(0)).unwrap_or(u32::MAX);
    let cores_used = u32::try_from(parse_int_or(field("CPUAlloc"), 0).max(0)).unwrap_or(u32::MAX);
    let cores_reserved = 0;
    let cores_available = NodeRecord::available_cores(cores_total, cores_used, cores_reserved);

    let mem_total_mb = parse_int_or(field("RealMemory"), 0).max(0);
    let free_mem_mb = parse_int_or(field("FreeMem"), -1);
    let mem_available_mb = if free_mem_mb >= 0 {
        free_mem_mb
    } else {
        let alloc_mem_mb = parse_int_or(field("AllocMem"), -1);
        if alloc_mem_mb >= 0 {
            (mem_total_mb - alloc_mem_mb).max(0)
        } else {
            0
        }
    };

    let raw_state = field("State").unwrap_or_default();
    let node_status = NodeState::parse(raw_state).status();
    let load_avg = field("CPULoad").unwrap_or_default();
    let arch = field("Arch").unwrap_or_default();

    partitions
        .into_iter()
        .map(|partition| {
            let partition_state = partition_states
                .map(|states| states.get(partition).map(String::as_str).unwrap_or_default());
            NodeRecord {
                queue_name: partition.to_string(),
                node_name: node_name.to_string(),
                scheduler: Scheduler::Slurm,
                qtype: SLURM_QTYPE.to_string(),
                cores_reserved,
                cores_used,
                cores_total,
                cores_available,
                load_avg: load_avg.to_string(),
                arch: arch.to_string(),
                status: compose_status(&node_status, partition_state),
                memory_available: format!("{}M", mem_available_mb),
                memory_total: format!("{}M", mem_total_mb),
                slurm_state: Some(raw_state.to_string()),
            }
        })
        .collect()
}

/// Parse `scontrol show node -o` output into node rows, one per
/// (node, partition) pair, sorted by partition and node.
///
/// When `partition_states` is given, rows in partitions that are not plain
/// "UP" get a `partition_state=<state>` status annotation.
pub fn parse_scontrol_nodes<S: AsRef<str>>(
    lines: &[S],
    partition_states: Option<&PartitionStateMap>,
) -> Vec<NodeRecord> {
    let mut records: Vec<NodeRecord> = split_node_blocks(lines)
        .iter()
        .filter(|block| block.contains("NodeName="))
        .flat_map(|block| parse_node_block(block, partition_states))
        .collect();

    records.sort_by(|a, b| a.key().cmp(&b.key()));
    records
}

/// Parse `scontrol show partition -o` output.
pub fn parse_scontrol_partitions<S: AsRef<str>>(lines: &[S]) -> Vec<PartitionState> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|line| line.contains("PartitionName="))
        .filter_map(|line| {
            let params = parse_key_values(line);
            let name = params.get("PartitionName").copied().unwrap_or_default();
            if name.is_empty() {
                return None;
            }
            Some(PartitionState {
                partition_name: name.to_string(),
                state: params.get("State").copied().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Build a partition name to state lookup.
pub fn partition_state_map(partitions: &[PartitionState]) -> PartitionStateMap {
    partitions
        .iter()
        .map(|p| (p.partition_name.clone(), p.state.clone()))
        .collect()
}
