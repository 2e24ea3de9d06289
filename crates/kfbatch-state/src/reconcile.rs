//! Merge repeated node-table samples into a minimum-availability view.

use kfbatch_core::NodeRecord;
use kfbatch_parsers::{format_gib, parse_memory_gib};
use std::collections::HashMap;

/// Reconcile the running merged table with a new sample.
///
/// An empty side yields the other side unchanged. Otherwise only nodes
/// present in both tables are kept; for each, `cores_available` and
/// `memory_available` take the smaller of the two values, memory being
/// re-rendered on the gigabyte scale (e.g. "1.000G"). Other fields come
/// from the merged table. The result is sorted by `(queue_name, node_name)`.
pub fn reconcile_snapshots(merged: Vec<NodeRecord>, sample: Vec<NodeRecord>) -> Vec<NodeRecord> {
    if merged.is_empty() {
        return sample;
    }
    if sample.is_empty() {
        return merged;
    }

    let sample_by_key: HashMap<(&str, &str), &NodeRecord> =
        sample.iter().rev().map(|node| (node.key(), node)).collect();

    let merged_len = merged.len();
    let mut reconciled: Vec<NodeRecord> = merged
        .into_iter()
        .filter_map(|mut node| {
            let other = *sample_by_key
                .get(&(node.queue_name.as_str(), node.node_name.as_str()))?;
            let cores_available = other.cores_available;
            let memory_available = parse_memory_gib(&other.memory_available);

            node.cores_available = node.cores_available.min(cores_available);
            let memory = parse_memory_gib(&node.memory_available).min(memory_available);
            node.memory_available = format_gib(memory);
            Some(node)
        })
        .collect();

    if reconciled.len() < merged_len {
        tracing::debug!(
            "Dropped {} node(s) missing from the latest sample",
            merged_len - reconciled.len()
        );
    }

    reconciled.sort_by(|a, b| a.key().cmp(&b.key()));
    reconciled
}
