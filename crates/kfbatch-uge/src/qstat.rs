//! Parse `qstat -F` queue instance listings into node records.
//!
//! Layout:
//! ```text
//! queuename                      qtype resv/used/tot. load_avg arch          states
//! ---------------------------------------------------------------------------------
//! epyc.q@node01                  BP    0/12/64        10.52    lx-amd64
//!         hl:mem_total=503.577G
//!         hc:mem_req=240.000G
//! ```
//! Continuation lines are tab-indented `key=value` attributes of the
//! preceding queue instance. Job lines (indented with spaces) are handled by
//! [`crate::jobs`].

use kfbatch_core::{DEFAULT_MEMORY, NodeRecord, Scheduler};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Attribute holding the memory still requestable on the node.
pub const MEMORY_AVAILABLE_KEY: &str = "hc:mem_req";
/// Attribute holding the node's total memory.
pub const MEMORY_TOTAL_KEY: &str = "hl:mem_total";

static CORE_TRIPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)/([0-9]+)/([0-9]+)$").unwrap());

/// Queue instance header fields collected before the attributes arrive.
#[derive(Debug)]
struct PendingNode {
    queue_name: String,
    node_name: String,
    qtype: String,
    cores_reserved: u32,
    cores_used: u32,
    cores_total: u32,
    load_avg: String,
    arch: String,
    status: String,
    attributes: HashMap<String, String>,
}

impl PendingNode {
    fn into_record(self) -> NodeRecord {
        let memory = |key: &str| {
            self.attributes
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_MEMORY)
                .to_string()
        };
        let memory_available = memory(MEMORY_AVAILABLE_KEY);
        let memory_total = memory(MEMORY_TOTAL_KEY);

        NodeRecord {
            cores_available: NodeRecord::available_cores(
                self.cores_total,
                self.cores_used,
                self.cores_reserved,
            ),
            queue_name: self.queue_name,
            node_name: self.node_name,
            scheduler: Scheduler::Uge,
            qtype: self.qtype,
            cores_reserved: self.cores_reserved,
            cores_used: self.cores_used,
            cores_total: self.cores_total,
            load_avg: self.load_avg,
            arch: self.arch,
            status: self.status,
            memory_available,
            memory_total,
            slurm_state: None,
        }
    }
}

/// Lines that never carry node data.
fn is_noise(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with("queuename")
        || line.starts_with("---")
        || line.starts_with("###")
        || line.starts_with(' ')
}

/// Strip the continuation marker: a real tab, or a literal `\t` left over
/// from captured output.
fn continuation_body(line: &str) -> Option<&str> {
    line.strip_prefix('\t')
        .or_else(|| line.strip_prefix("\\t"))
}

/// Parse a queue instance header:
/// `<queue>@<node> <qtype> <resv>/<used>/<total> <load> <arch> [states]`.
fn parse_header(line: &str) -> Option<PendingNode> {
    let items: Vec<&str> = line.split(' ').filter(|s| !s.is_empty()).collect();
    if items.len() < 5 {
        return None;
    }

    let (queue_name, node_name) = items[0].split_once('@')?;
    let node_name = node_name.rsplit('@').next().unwrap_or(node_name);
    let caps = CORE_TRIPLE.captures(items[2])?;
    let cores_reserved = caps[1].parse().ok()?;
    let cores_used = caps[2].parse().ok()?;
    let cores_total = caps[3].parse().ok()?;

    Some(PendingNode {
        queue_name: queue_name.to_string(),
        node_name: node_name.to_string(),
        qtype: items[1].to_string(),
        cores_reserved,
        cores_used,
        cores_total,
        load_avg: items[3].to_string(),
        arch: items[4].to_string(),
        status: items.get(5).map(|s| s.to_string()).unwrap_or_default(),
        attributes: HashMap::new(),
    })
}

/// Parse `qstat -F` output into node records sorted by queue and node.
///
/// Malformed headers are skipped along with their attribute lines; an
/// unparsable input yields an empty table.
pub fn parse_qstat_nodes<S: AsRef<str>>(lines: &[S]) -> Vec<NodeRecord> {
    let mut records = Vec::new();
    let mut current: Option<PendingNode> = None;

    for line in lines.iter().map(|l| l.as_ref().trim_end_matches(['\n', '\r'])) {
        if is_noise(line) {
            continue;
        }

        if let Some(body) = continuation_body(line) {
            let Some(node) = current.as_mut() else {
                tracing::trace!("Ignoring attribute line without node: {}", line);
                continue;
            };
            let body = body.replace('\t', "");
            if let (Some((key, _)), Some((_, value))) = (body.split_once('='), body.rsplit_once('='))
            {
                node.attributes.insert(key.to_string(), value.to_string());
            }
            continue;
        }

        if let Some(node) = current.take() {
            records.push(node.into_record());
        }
        current = parse_header(line);
        if current.is_none() {
            tracing::debug!("Skipping malformed qstat line: {}", line);
        }
    }

    if let Some(node) = current.take() {
        records.push(node.into_record());
    }

    records.sort_by(|a, b| a.key().cmp(&b.key()));
    records
}
