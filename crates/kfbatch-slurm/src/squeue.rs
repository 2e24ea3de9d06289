//! Parse active SLURM jobs from squeue.

use kfbatch_core::{JobRecord, program_basename};
use kfbatch_parsers::{TaskCount, count_task_expression, split_whitespace_n};

/// squeue output format:
/// %i - Job ID (with array suffix)
/// %P - Partition
/// %j - Job name
/// %u - User
/// %t - State (compact)
/// %M - Elapsed time
/// %D - Number of nodes
/// %R - Nodelist or pending reason
pub const SQUEUE_FORMAT: &str = "%i\t%P\t%j\t%u\t%t\t%M\t%D\t%R";

const SQUEUE_FIELDS: usize = 8;

/// Estimate the number of array tasks behind a squeue job ID.
///
/// Returns the task count and whether it is an estimate:
/// - `123` or `123_7` → 1 task, exact
/// - `123_[1-10%2]` → 10 tasks, exact
/// - `123_[1-10%` (truncated by squeue's column width) → 10 tasks, estimated
/// - any other suffix → 1 task, estimated
pub fn estimate_slurm_task_count(job_id: &str) -> TaskCount {
    let Some((_, suffix)) = job_id.split_once('_') else {
        return TaskCount::SINGLE;
    };
    if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
        return TaskCount::SINGLE;
    }
    let Some(expression) = suffix.strip_prefix('[') else {
        return TaskCount {
            tasks: 1,
            estimated: true,
        };
    };

    let (expression, closed) = match expression.split_once(']') {
        Some((inner, _)) => (inner, true),
        None => (expression, false),
    };
    let expression = expression.split('%').next().unwrap_or_default();

    let count = count_task_expression(expression);
    TaskCount {
        tasks: count.tasks,
        estimated: count.estimated || !closed,
    }
}

/// Split a squeue line into its eight fields: tab-delimited, literal
/// `\t`-delimited (captured output), or whitespace-delimited.
fn split_squeue_line(line: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = if line.contains('\t') {
        line.splitn(SQUEUE_FIELDS, '\t').map(str::trim).collect()
    } else if line.contains("\\t") {
        line.splitn(SQUEUE_FIELDS, "\\t").map(str::trim).collect()
    } else {
        split_whitespace_n(line, SQUEUE_FIELDS)
    };

    (fields.len() == SQUEUE_FIELDS).then_some(fields)
}

/// Parse a single line of squeue output.
fn parse_squeue_line(line: &str) -> Option<JobRecord> {
    let fields = split_squeue_line(line)?;
    let num_nodes = fields[6].parse::<u32>().unwrap_or(1);
    let count = estimate_slurm_task_count(fields[0]);
    let task_spec = fields[0]
        .split_once('_')
        .map(|(_, suffix)| suffix.to_string())
        .unwrap_or_default();

    Some(JobRecord {
        job_id: fields[0].to_string(),
        queue: fields[1].to_string(),
        name: fields[2].to_string(),
        user: fields[3].to_string(),
        state: fields[4].to_string(),
        time: fields[5].to_string(),
        slots: 1,
        task_spec,
        total_slots: count.tasks,
        task_count_estimated: count.estimated,
        priority: None,
        num_nodes: Some(num_nodes),
        node_or_reason: Some(fields[7].to_string()),
    })
}

/// Parse squeue output into job records. Header, blank and short lines are
/// skipped.
pub fn parse_squeue_jobs<S: AsRef<str>>(lines: &[S]) -> Vec<JobRecord> {
    let mut jobs = Vec::new();

    for line in lines.iter().map(|l| l.as_ref().trim_end_matches(['\n', '\r'])) {
        if line.trim().is_empty() || line.trim_start().starts_with("JOBID ") {
            continue;
        }
        match parse_squeue_line(line) {
            Some(job) => jobs.push(job),
            None => tracing::debug!("Skipping malformed squeue line: {}", line),
        }
    }

    jobs
}

fn has_format_option(args: &[String]) -> bool {
    args.iter().any(|token| {
        matches!(token.as_str(), "-o" | "-O" | "--format" | "--Format")
            || token.starts_with("--format=")
            || token.starts_with("--Format=")
            || (token.starts_with("-o") && token != "-o")
            || (token.starts_with("-O") && token != "-O")
    })
}

fn has_noheader_option(args: &[String]) -> bool {
    args.iter()
        .any(|token| token == "-h" || token == "--noheader" || token.starts_with("--noheader="))
}

/// Make a squeue command produce parseable output: append `-h` unless the
/// header is already suppressed, and `-o SQUEUE_FORMAT` unless a format was
/// given. Other commands, and commands that cannot be split, are returned
/// unchanged.
pub fn prepare_squeue_command(command: &str) -> String {
    let Some(mut argv) = shlex::split(command) else {
        return command.to_string();
    };
    let is_squeue = argv
        .first()
        .and_then(|program| program_basename(program))
        == Some("squeue");
    if !is_squeue {
        return command.to_string();
    }

    let add_noheader = !has_noheader_option(&argv[1..]);
    let add_format = !has_format_option(&argv[1..]);
    if add_noheader {
        argv.push("-h".to_string());
    }
    if add_format {
        argv.push("-o".to_string());
        argv.push(SQUEUE_FORMAT.to_string());
    }

    shlex::try_join(argv.iter().map(String::as_str)).unwrap_or_else(|_| command.to_string())
}
