//! The `stat` report: query the scheduler, build the node and job tables,
//! print the summaries and optionally write the table.

use kfbatch_cli::Args;
use kfbatch_core::{JobRecord, NodeRecord, Scheduler, detect_scheduler};
use kfbatch_parsers::{CommandError, LineSource, Query};
use kfbatch_report::{
    NodeDataIssue, TableWriteError, write_availability_skipped, write_cluster_summary,
    write_job_summary, write_job_table, write_node_data_issue, write_node_table,
    write_top_availability,
};
use kfbatch_slurm::{
    parse_scontrol_nodes, parse_scontrol_partitions, parse_squeue_jobs, partition_state_map,
    prepare_squeue_command,
};
use kfbatch_state::{reconcile_snapshots, summarize_jobs};
use kfbatch_uge::{parse_qstat_jobs, parse_qstat_nodes};
use std::io::{self, Write};
use thiserror::Error;

const STAT_COMMAND: &str = "--stat_command";
const SLURM_PARTITION_COMMAND: &str = "--slurm_partition_command";
const SLURM_NODE_COMMAND: &str = "--slurm_node_command";

/// Fatal errors of a report run.
#[derive(Error, Debug)]
pub enum StatError {
    #[error("Exiting. --stat_command does not support: {0}")]
    UnsupportedScheduler(String),
    #[error("Exiting. --niter must be >= 1 when using qstat mode.")]
    InvalidIterations,
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Table(#[from] TableWriteError),
    #[error("Failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// Run the report for the scheduler behind `--stat_command`.
pub async fn run_stat<S, W>(args: &Args, source: &mut S, out: &mut W) -> Result<(), StatError>
where
    S: LineSource,
    W: Write,
{
    let scheduler = detect_scheduler(&args.stat_command)
        .ok_or_else(|| StatError::UnsupportedScheduler(args.stat_command.clone()))?;
    tracing::debug!("Detected scheduler: {}", scheduler);

    match scheduler {
        Scheduler::Uge => {
            let nodes = collect_uge(args, source, out).await?;
            report_nodes(args, &nodes, Scheduler::Uge, out)
        }
        Scheduler::Slurm => {
            let (jobs, nodes) = collect_slurm(args, source, out).await?;
            match nodes {
                Some(nodes) => report_nodes(args, &nodes, Scheduler::Slurm, out),
                None => {
                    write_availability_skipped(out)?;
                    if let Some(path) = &args.out {
                        write_job_table(path, &jobs)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

/// Take `--niter` qstat samples and reconcile them. The job summary is
/// printed from the first sample.
async fn collect_uge<S, W>(
    args: &Args,
    source: &mut S,
    out: &mut W,
) -> Result<Vec<NodeRecord>, StatError>
where
    S: LineSource,
    W: Write,
{
    if args.niter < 1 {
        return Err(StatError::InvalidIterations);
    }

    let query = Query::new(STAT_COMMAND, &args.stat_command).with_fixture(args.example_file.clone());
    let mut merged = Vec::new();

    for i in 0..args.niter {
        let lines = source.fetch(&query).await?;
        let sample = parse_qstat_nodes(&lines);
        tracing::debug!("qstat sample {}/{}: {} node row(s)", i + 1, args.niter, sample.len());

        if i == 0 {
            let jobs = parse_qstat_jobs(&lines);
            write_job_summary(out, &summarize_jobs(&jobs, Scheduler::Uge), Scheduler::Uge)?;
            merged = sample;
        } else {
            merged = reconcile_snapshots(merged, sample);
        }
    }

    Ok(merged)
}

/// Query squeue and the auxiliary scontrol commands. The node table is
/// `None` when the node query failed or yielded no rows.
async fn collect_slurm<S, W>(
    args: &Args,
    source: &mut S,
    out: &mut W,
) -> Result<(Vec<JobRecord>, Option<Vec<NodeRecord>>), StatError>
where
    S: LineSource,
    W: Write,
{
    let query = Query::new(STAT_COMMAND, prepare_squeue_command(&args.stat_command))
        .with_fixture(args.example_file.clone());
    let lines = source.fetch(&query).await?;
    let jobs = parse_squeue_jobs(&lines);
    write_job_summary(out, &summarize_jobs(&jobs, Scheduler::Slurm), Scheduler::Slurm)?;

    let partition_query = Query::new(SLURM_PARTITION_COMMAND, &args.slurm_partition_command)
        .with_fixture(args.slurm_partition_example_file.clone());
    let partition_states = fetch_optional(source, &partition_query, true)
        .await
        .map(|lines| parse_scontrol_partitions(&lines))
        .filter(|partitions| !partitions.is_empty())
        .map(|partitions| partition_state_map(&partitions));

    let node_query = Query::new(SLURM_NODE_COMMAND, &args.slurm_node_command)
        .with_fixture(args.slurm_node_example_file.clone());
    let Some(node_lines) = fetch_optional(source, &node_query, false).await else {
        write_node_data_issue(out, NodeDataIssue::QueryFailed)?;
        return Ok((jobs, None));
    };

    let nodes = parse_scontrol_nodes(&node_lines, partition_states.as_ref());
    if nodes.is_empty() {
        write_node_data_issue(out, NodeDataIssue::Unparsed)?;
        return Ok((jobs, None));
    }

    Ok((jobs, Some(nodes)))
}

/// Run an auxiliary query, downgrading failure to `None`.
async fn fetch_optional<S: LineSource>(
    source: &mut S,
    query: &Query,
    quiet: bool,
) -> Option<Vec<String>> {
    match source.fetch(query).await {
        Ok(lines) => Some(lines),
        Err(e) if quiet => {
            tracing::debug!("{}", e);
            None
        }
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

fn report_nodes<W: Write>(
    args: &Args,
    nodes: &[NodeRecord],
    scheduler: Scheduler,
    out: &mut W,
) -> Result<(), StatError> {
    write_cluster_summary(out, nodes)?;
    write_top_availability(out, nodes, &args.top_options())?;
    if let Some(path) = &args.out {
        write_node_table(path, nodes, scheduler)?;
    }
    Ok(())
}
