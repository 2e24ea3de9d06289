//! Coarse job-state classification and queued-job totals.

use kfbatch_core::{JobRecord, Scheduler};
use kfbatch_slurm::SlurmJobState;
use kfbatch_uge::UgeJobState;

/// Coarse classes a job state falls into. A UGE state such as "Eqw" can be
/// in more than one class at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobClass {
    pub running: bool,
    pub queued: bool,
    pub error: bool,
}

/// Trait for mapping scheduler-specific states onto [`JobClass`].
pub trait ToJobClass {
    fn to_job_class(&self) -> JobClass;
}

impl ToJobClass for UgeJobState<'_> {
    fn to_job_class(&self) -> JobClass {
        JobClass {
            running: self.is_running(),
            queued: self.is_queued(),
            error: self.is_error(),
        }
    }
}

impl ToJobClass for SlurmJobState {
    fn to_job_class(&self) -> JobClass {
        JobClass {
            running: self.is_running(),
            queued: self.is_pending(),
            error: self.is_error(),
        }
    }
}

/// Slot totals per job class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub total_jobs: usize,
    pub running: u64,
    pub queued: u64,
    pub error: u64,
    /// Rows whose task count is an estimate
    pub estimated_rows: usize,
}

/// Classify a job's state with the vocabulary of `scheduler`.
pub fn classify_job(job: &JobRecord, scheduler: Scheduler) -> JobClass {
    match scheduler {
        Scheduler::Uge => UgeJobState(&job.state).to_job_class(),
        Scheduler::Slurm => SlurmJobState::parse(&job.state).to_job_class(),
    }
}

/// Sum `total_slots` per job class.
pub fn summarize_jobs(jobs: &[JobRecord], scheduler: Scheduler) -> JobSummary {
    let mut summary = JobSummary {
        total_jobs: jobs.len(),
        ..JobSummary::default()
    };

    for job in jobs {
        let class = classify_job(job, scheduler);
        if class.running {
            summary.running = summary.running.saturating_add(job.total_slots);
        }
        if class.queued {
            summary.queued = summary.queued.saturating_add(job.total_slots);
        }
        if class.error {
            summary.error = summary.error.saturating_add(job.total_slots);
        }
        if job.task_count_estimated {
            summary.estimated_rows += 1;
        }
    }

    summary
}
