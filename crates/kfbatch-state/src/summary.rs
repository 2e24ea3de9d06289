//! Per-queue availability summaries over a node table.

use kfbatch_core::NodeRecord;
use kfbatch_parsers::parse_memory_gib;
use std::cmp::Ordering;

/// Queue name prefix excluded from top-N rankings.
pub const LOGIN_QUEUE_PREFIX: &str = "login";

/// Node, core and memory totals of one queue.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSummary {
    pub queue_name: String,
    pub working_nodes: usize,
    pub abnormal_nodes: usize,
    pub total_nodes: usize,
    /// Available cores on working nodes
    pub cores_available: u64,
    /// Used cores on working nodes
    pub cores_used: u64,
    /// Reserved cores on working nodes
    pub cores_reserved: u64,
    /// Total cores on abnormal nodes
    pub cores_abnormal: u64,
    pub cores_total: u64,
    /// Available memory on working nodes, gigabytes
    pub memory_available_gib: f64,
    /// Total memory on all nodes, gigabytes
    pub memory_total_gib: f64,
}

/// Queue names in order of first appearance.
fn queue_names(nodes: &[NodeRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for node in nodes {
        if !names.contains(&node.queue_name.as_str()) {
            names.push(&node.queue_name);
        }
    }
    names
}

fn summarize_queue(queue_name: &str, nodes: &[&NodeRecord]) -> QueueSummary {
    let mut summary = QueueSummary {
        queue_name: queue_name.to_string(),
        working_nodes: 0,
        abnormal_nodes: 0,
        total_nodes: nodes.len(),
        cores_available: 0,
        cores_used: 0,
        cores_reserved: 0,
        cores_abnormal: 0,
        cores_total: 0,
        memory_available_gib: 0.0,
        memory_total_gib: 0.0,
    };

    for node in nodes {
        summary.cores_total += u64::from(node.cores_total);
        summary.memory_total_gib += parse_memory_gib(&node.memory_total);
        if node.is_abnormal() {
            summary.abnormal_nodes += 1;
            summary.cores_abnormal += u64::from(node.cores_total);
        } else {
            summary.working_nodes += 1;
            summary.cores_available += u64::from(node.cores_available);
            summary.cores_used += u64::from(node.cores_used);
            summary.cores_reserved += u64::from(node.cores_reserved);
            summary.memory_available_gib += parse_memory_gib(&node.memory_available);
        }
    }

    summary
}

/// Summarize every queue of the table, in order of first appearance.
pub fn cluster_summary(nodes: &[NodeRecord]) -> Vec<QueueSummary> {
    queue_names(nodes)
        .into_iter()
        .map(|queue_name| {
            let queue: Vec<&NodeRecord> = nodes
                .iter()
                .filter(|node| node.queue_name == queue_name)
                .collect();
            summarize_queue(queue_name, &queue)
        })
        .collect()
}

/// Resource a top-N ranking is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Memory,
    Cores,
}

impl Resource {
    /// Report order: memory first, then cores.
    pub const ALL: [Resource; 2] = [Resource::Memory, Resource::Cores];

    pub fn label(self) -> &'static str {
        match self {
            Self::Memory => "RAM",
            Self::Cores => "core",
        }
    }
}

/// Options controlling top-N selection.
#[derive(Debug, Clone, Copy)]
pub struct TopOptions {
    /// Rows per queue (at least 1)
    pub ntop: usize,
    /// Include every row tied with or above the Nth value
    pub all_tiers: bool,
    /// Leave abnormal nodes out of the ranking
    pub exclude_abnormal: bool,
}

impl Default for TopOptions {
    fn default() -> Self {
        Self {
            ntop: 3,
            all_tiers: false,
            exclude_abnormal: false,
        }
    }
}

/// A node with its available memory on the gigabyte scale.
#[derive(Debug, Clone, Copy)]
pub struct RankedNode<'a> {
    pub node: &'a NodeRecord,
    pub memory_available_gib: f64,
}

impl RankedNode<'_> {
    fn cmp_memory(&self, other: &Self) -> Ordering {
        self.memory_available_gib
            .total_cmp(&other.memory_available_gib)
    }

    fn cmp_cores(&self, other: &Self) -> Ordering {
        self.node.cores_available.cmp(&other.node.cores_available)
    }

    /// Compare by `resource` only.
    fn cmp_by(&self, other: &Self, resource: Resource) -> Ordering {
        match resource {
            Resource::Memory => self.cmp_memory(other),
            Resource::Cores => self.cmp_cores(other),
        }
    }

    /// Compare by `resource`, then by the other resource.
    fn cmp_ranked(&self, other: &Self, resource: Resource) -> Ordering {
        match resource {
            Resource::Memory => self.cmp_memory(other).then(self.cmp_cores(other)),
            Resource::Cores => self.cmp_cores(other).then(self.cmp_memory(other)),
        }
    }
}

/// Top nodes of one queue for one resource.
#[derive(Debug, Clone)]
pub struct QueueRanking<'a> {
    pub queue_name: &'a str,
    pub nodes: Vec<RankedNode<'a>>,
}

/// Rank each queue's nodes by `resource`, descending, ties broken by the
/// other resource. Queues prefixed with `login` and queues left empty by
/// the abnormal-node filter are omitted.
pub fn top_availability<'a>(
    nodes: &'a [NodeRecord],
    resource: Resource,
    options: &TopOptions,
) -> Vec<QueueRanking<'a>> {
    let ntop = options.ntop.max(1);

    queue_names(nodes)
        .into_iter()
        .filter(|queue_name| !queue_name.starts_with(LOGIN_QUEUE_PREFIX))
        .filter_map(|queue_name| {
            let mut ranked: Vec<RankedNode<'a>> = nodes
                .iter()
                .filter(|node| node.queue_name == queue_name)
                .filter(|node| !(options.exclude_abnormal && node.is_abnormal()))
                .map(|node| RankedNode {
                    node,
                    memory_available_gib: parse_memory_gib(&node.memory_available),
                })
                .collect();
            if ranked.is_empty() {
                return None;
            }

            ranked.sort_by(|a, b| b.cmp_ranked(a, resource));
            if options.all_tiers {
                let threshold = ranked[(ntop - 1).min(ranked.len() - 1)];
                let keep = ranked
                    .iter()
                    .take_while(|row| row.cmp_by(&threshold, resource).is_ge())
                    .count();
                ranked.truncate(keep);
            } else {
                ranked.truncate(ntop);
            }

            Some(QueueRanking {
                queue_name,
                nodes: ranked,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kfbatch_core::Scheduler;

    fn node(queue: &str, name: &str, available: u32, memory: &str, status: &str) -> NodeRecord {
        NodeRecord {
            queue_name: queue.to_string(),
            node_name: name.to_string(),
            scheduler: Scheduler::Uge,
            qtype: "BP".to_string(),
            cores_reserved: 1,
            cores_used: 10 - available - 1,
            cores_total: 10,
            cores_available: available,
            load_avg: "0.00".to_string(),
            arch: "lx-amd64".to_string(),
            status: status.to_string(),
            memory_available: memory.to_string(),
            memory_total: "100G".to_string(),
            slurm_state: None,
        }
    }

    fn names<'a>(ranking: &QueueRanking<'a>) -> Vec<&'a str> {
        ranking.nodes.iter().map(|r| r.node.node_name.as_str()).collect()
    }

    #[test]
    fn test_cluster_summary_excludes_abnormal_from_available() {
        let nodes = vec![
            node("epyc.q", "n1", 4, "10G", ""),
            node("epyc.q", "n2", 2, "20G", "d"),
            node("short.q", "n3", 9, "500M", ""),
        ];
        let summary = cluster_summary(&nodes);
        assert_eq!(summary.len(), 2);

        let epyc = &summary[0];
        assert_eq!(epyc.queue_name, "epyc.q");
        assert_eq!((epyc.working_nodes, epyc.abnormal_nodes, epyc.total_nodes), (1, 1, 2));
        assert_eq!(epyc.cores_available, 4);
        assert_eq!(epyc.cores_used, 5);
        assert_eq!(epyc.cores_reserved, 1);
        assert_eq!(epyc.cores_abnormal, 10);
        assert_eq!(epyc.cores_total, 20);
        assert_eq!(epyc.memory_available_gib, 10.0);
        assert_eq!(epyc.memory_total_gib, 200.0);

        assert_eq!(summary[1].queue_name, "short.q");
        assert_eq!(summary[1].memory_available_gib, 0.5);
    }

    #[test]
    fn test_top_n_by_memory_breaks_ties_by_cores() {
        let nodes = vec![
            node("epyc.q", "n1", 1, "10G", ""),
            node("epyc.q", "n2", 5, "10G", ""),
            node("epyc.q", "n3", 9, "2G", ""),
            node("epyc.q", "n4", 0, "50G", ""),
        ];
        let options = TopOptions {
            ntop: 2,
            ..TopOptions::default()
        };
        let ranking = top_availability(&nodes, Resource::Memory, &options);
        assert_eq!(ranking.len(), 1);
        assert_eq!(names(&ranking[0]), vec!["n4", "n2"]);

        let ranking = top_availability(&nodes, Resource::Cores, &options);
        assert_eq!(names(&ranking[0]), vec!["n3", "n2"]);
    }

    #[test]
    fn test_all_tiers_keeps_boundary_ties() {
        let nodes = vec![
            node("epyc.q", "n1", 8, "1G", ""),
            node("epyc.q", "n2", 4, "1G", ""),
            node("epyc.q", "n3", 4, "1G", ""),
            node("epyc.q", "n4", 4, "1G", ""),
            node("epyc.q", "n5", 2, "1G", ""),
        ];
        let options = TopOptions {
            ntop: 2,
            all_tiers: true,
            exclude_abnormal: false,
        };
        let ranking = top_availability(&nodes, Resource::Cores, &options);
        assert_eq!(names(&ranking[0]), vec!["n1", "n2", "n3", "n4"]);
    }

    #[test]
    fn test_all_tiers_with_short_queue() {
        let nodes = vec![node("epyc.q", "n1", 8, "1G", ""), node("epyc.q", "n2", 3, "1G", "")];
        let options = TopOptions {
            ntop: 5,
            all_tiers: true,
            exclude_abnormal: false,
        };
        let ranking = top_availability(&nodes, Resource::Cores, &options);
        assert_eq!(names(&ranking[0]), vec!["n1", "n2"]);
    }

    #[test]
    fn test_skips_login_queues_and_filtered_queues() {
        let nodes = vec![
            node("login.q", "l1", 8, "1G", ""),
            node("bad.q", "b1", 8, "1G", "au"),
            node("epyc.q", "n1", 8, "1G", "d"),
            node("epyc.q", "n2", 1, "1G", ""),
        ];
        let ranking = top_availability(&nodes, Resource::Cores, &TopOptions::default());
        let queues: Vec<_> = ranking.iter().map(|r| r.queue_name).collect();
        assert_eq!(queues, vec!["bad.q", "epyc.q"]);

        let options = TopOptions {
            exclude_abnormal: true,
            ..TopOptions::default()
        };
        let ranking = top_availability(&nodes, Resource::Cores, &options);
        assert_eq!(ranking.len(), 1);
        assert_eq!(names(&ranking[0]), vec!["n2"]);
    }
}
