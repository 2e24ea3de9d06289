//! Parse job lines from `qstat` listings.
//!
//! Job lines are indented with spaces and carry, in order:
//! job-ID, prior, name, user, state, submit/start date, time, slots and,
//! for array jobs, the ja-task-ID expression.

use kfbatch_core::JobRecord;
use kfbatch_parsers::count_task_expression;
use once_cell::sync::Lazy;
use regex::Regex;

static JOB_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ +[0-9]+ ").unwrap());

/// Parse a single job line. Returns None if the line has fewer than the
/// eight fixed columns, a non-numeric slot count, or a slot total that does
/// not fit in a `u64`.
fn parse_job_line(line: &str) -> Option<JobRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return None;
    }

    let slots: u32 = fields[7].parse().ok()?;
    let task_spec = fields.get(8).copied().unwrap_or_default();
    let tasks = count_task_expression(task_spec).tasks;
    let total_slots = u64::from(slots).checked_mul(tasks)?;

    Some(JobRecord {
        job_id: fields[0].to_string(),
        queue: String::new(),
        name: fields[2].to_string(),
        user: fields[3].to_string(),
        state: fields[4].to_string(),
        time: format!("{} {}", fields[5], fields[6]),
        slots,
        task_spec: task_spec.to_string(),
        total_slots,
        task_count_estimated: false,
        priority: Some(fields[1].to_string()),
        num_nodes: None,
        node_or_reason: None,
    })
}

/// Parse the job lines of a `qstat` listing. Other lines are ignored.
pub fn parse_qstat_jobs<S: AsRef<str>>(lines: &[S]) -> Vec<JobRecord> {
    let mut jobs = Vec::new();

    for line in lines.iter().map(|l| l.as_ref().trim_end_matches(['\n', '\r'])) {
        if !JOB_LINE.is_match(line) {
            continue;
        }
        match parse_job_line(line) {
            Some(job) => jobs.push(job),
            None => tracing::debug!("Skipping malformed qstat job line: {}", line),
        }
    }

    jobs
}
