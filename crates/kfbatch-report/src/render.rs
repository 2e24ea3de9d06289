//! Console report text.
//!
//! Every function writes complete lines, including the trailing blank line
//! that separates report sections.

use format_num::format_num;
use kfbatch_core::{NodeRecord, Scheduler};
use kfbatch_parsers::NORMALIZED_UNIT;
use kfbatch_state::{
    JobSummary, QueueSummary, RankedNode, Resource, TopOptions, cluster_summary, top_availability,
};
use std::io::{self, Write};

/// Memory with thousands separators and no decimals, e.g. "1,024".
fn format_memory(gib: f64) -> String {
    format_num!(",.0f", gib)
}

fn format_count(count: u32) -> String {
    format_num!(",.0f", f64::from(count))
}

fn write_queue_summary<W: Write>(out: &mut W, queue: &QueueSummary) -> io::Result<()> {
    writeln!(
        out,
        "{}: {}/{}/{} nodes, {}/{}/{}/{}/{} CPUs, and {}/{}G RAM",
        queue.queue_name,
        queue.working_nodes,
        queue.abnormal_nodes,
        queue.total_nodes,
        queue.cores_available,
        queue.cores_used,
        queue.cores_reserved,
        queue.cores_abnormal,
        queue.cores_total,
        format_memory(queue.memory_available_gib),
        format_memory(queue.memory_total_gib),
    )
}

/// Per-queue node, core and memory totals.
pub fn write_cluster_summary<W: Write>(out: &mut W, nodes: &[NodeRecord]) -> io::Result<()> {
    writeln!(
        out,
        "Reporting working/abnormal/total nodes, available/used/reserved/abnormal/total CPUs, and available/total RAM:"
    )?;
    for queue in cluster_summary(nodes) {
        write_queue_summary(out, &queue)?;
    }
    writeln!(out)
}

fn write_ranked_node<W: Write>(out: &mut W, queue_name: &str, ranked: &RankedNode) -> io::Result<()> {
    write!(
        out,
        "{}: {} cores and {}{} RAM in {}",
        queue_name,
        format_count(ranked.node.cores_available),
        format_memory(ranked.memory_available_gib),
        NORMALIZED_UNIT,
        ranked.node.node_name,
    )?;
    if ranked.node.is_abnormal() {
        write!(out, " with the status {}", ranked.node.status)?;
    }
    writeln!(out)
}

/// Top nodes per queue, memory first, then cores.
pub fn write_top_availability<W: Write>(
    out: &mut W,
    nodes: &[NodeRecord],
    options: &TopOptions,
) -> io::Result<()> {
    for resource in Resource::ALL {
        writeln!(out, "Reporting top {} availability:", resource.label())?;
        for ranking in top_availability(nodes, resource, options) {
            for ranked in &ranking.nodes {
                write_ranked_node(out, ranking.queue_name, ranked)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Slot totals of the job listing, worded for `scheduler`.
pub fn write_job_summary<W: Write>(
    out: &mut W,
    summary: &JobSummary,
    scheduler: Scheduler,
) -> io::Result<()> {
    match scheduler {
        Scheduler::Uge => {
            writeln!(out, "# of CPUs in use for running jobs: {}", summary.running)?;
            writeln!(out, "# of requested CPUs for queued jobs: {}", summary.queued)?;
            writeln!(
                out,
                "# of CPUs for queued/running jobs in error: {}",
                summary.error
            )?;
        }
        Scheduler::Slurm => {
            if summary.total_jobs == 0 {
                writeln!(out, "No jobs found in squeue output.")?;
                return writeln!(out);
            }
            writeln!(
                out,
                "# of running job tasks (estimated from squeue): {}",
                summary.running
            )?;
            writeln!(
                out,
                "# of queued job tasks (estimated from squeue): {}",
                summary.queued
            )?;
            writeln!(
                out,
                "# of failed/cancelled job tasks (estimated from squeue): {}",
                summary.error
            )?;
            if summary.estimated_rows > 0 {
                writeln!(
                    out,
                    "Note: {} row(s) had truncated/irregular SLURM array IDs; task counts are estimated.",
                    summary.estimated_rows
                )?;
            }
        }
    }
    writeln!(out)
}

/// Why the SLURM node table is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeDataIssue {
    /// The node query itself failed
    QueryFailed,
    /// The node query ran but yielded no rows
    Unparsed,
}

/// Notice printed right after the node query when its data is unusable.
pub fn write_node_data_issue<W: Write>(out: &mut W, issue: NodeDataIssue) -> io::Result<()> {
    match issue {
        NodeDataIssue::QueryFailed => {
            writeln!(
                out,
                "Skipping node resource summary because --slurm_node_command failed."
            )?;
        }
        NodeDataIssue::Unparsed => {
            writeln!(
                out,
                "Skipping node resource summary because SLURM node output could not be parsed."
            )?;
            writeln!(
                out,
                "Use --slurm_node_command \"scontrol show node -o\" or provide --slurm_node_example_file."
            )?;
        }
    }
    writeln!(out)
}

/// Closing notice when the availability sections are skipped.
pub fn write_availability_skipped<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Skipping cluster/node resource availability.")?;
    writeln!(out, "Reason: no parsed SLURM node data was available.")?;
    writeln!(
        out,
        "Provide --slurm_node_command or --slurm_node_example_file from \"scontrol show node -o\"."
    )
}
