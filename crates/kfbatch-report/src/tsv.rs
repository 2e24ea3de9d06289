//! Tab-separated table output.

use camino::{Utf8Path, Utf8PathBuf};
use kfbatch_core::{JobRecord, NodeRecord, Scheduler};
use kfbatch_parsers::normalize_memory;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for table output.
#[derive(Error, Debug)]
pub enum TableWriteError {
    #[error("Failed to write table to {path}: {source}")]
    Csv {
        path: Utf8PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to write table to {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub const UGE_NODE_COLUMNS: [&str; 14] = [
    "queue_name",
    "node_name",
    "qtype",
    "ncore_resv",
    "ncore_used",
    "ncore_total",
    "np_load",
    "arch",
    "status",
    "hc:mem_req",
    "hl:mem_total",
    "ncore_available",
    "hc:mem_req_unit",
    "hl:mem_total_unit",
];

pub const SLURM_NODE_COLUMNS: [&str; 15] = [
    "queue_name",
    "node_name",
    "qtype",
    "ncore_resv",
    "ncore_used",
    "ncore_total",
    "ncore_available",
    "np_load",
    "arch",
    "status",
    "hl:mem_total",
    "hc:mem_req",
    "slurm_state",
    "hl:mem_total_unit",
    "hc:mem_req_unit",
];

pub const SLURM_JOB_COLUMNS: [&str; 10] = [
    "job_id",
    "partition",
    "name",
    "user",
    "state",
    "elapsed_time",
    "num_nodes",
    "node_or_reason",
    "total_slots",
    "task_count_estimated",
];

/// qstat node row, columns in [`UGE_NODE_COLUMNS`] order.
#[derive(Debug, Serialize)]
struct UgeNodeRow<'a> {
    queue_name: &'a str,
    node_name: &'a str,
    qtype: &'a str,
    ncore_resv: u32,
    ncore_used: u32,
    ncore_total: u32,
    np_load: &'a str,
    arch: &'a str,
    status: &'a str,
    #[serde(rename = "hc:mem_req")]
    mem_req: f64,
    #[serde(rename = "hl:mem_total")]
    mem_total: f64,
    ncore_available: u32,
    #[serde(rename = "hc:mem_req_unit")]
    mem_req_unit: &'static str,
    #[serde(rename = "hl:mem_total_unit")]
    mem_total_unit: &'static str,
}

impl<'a> From<&'a NodeRecord> for UgeNodeRow<'a> {
    fn from(node: &'a NodeRecord) -> Self {
        let (mem_req, mem_req_unit) = normalize_memory(&node.memory_available);
        let (mem_total, mem_total_unit) = normalize_memory(&node.memory_total);
        Self {
            queue_name: &node.queue_name,
            node_name: &node.node_name,
            qtype: &node.qtype,
            ncore_resv: node.cores_reserved,
            ncore_used: node.cores_used,
            ncore_total: node.cores_total,
            np_load: &node.load_avg,
            arch: &node.arch,
            status: &node.status,
            mem_req,
            mem_total,
            ncore_available: node.cores_available,
            mem_req_unit,
            mem_total_unit,
        }
    }
}

/// scontrol node row, columns in [`SLURM_NODE_COLUMNS`] order.
#[derive(Debug, Serialize)]
struct SlurmNodeRow<'a> {
    queue_name: &'a str,
    node_name: &'a str,
    qtype: &'a str,
    ncore_resv: u32,
    ncore_used: u32,
    ncore_total: u32,
    ncore_available: u32,
    np_load: &'a str,
    arch: &'a str,
    status: &'a str,
    #[serde(rename = "hl:mem_total")]
    mem_total: f64,
    #[serde(rename = "hc:mem_req")]
    mem_req: f64,
    slurm_state: &'a str,
    #[serde(rename = "hl:mem_total_unit")]
    mem_total_unit: &'static str,
    #[serde(rename = "hc:mem_req_unit")]
    mem_req_unit: &'static str,
}

impl<'a> From<&'a NodeRecord> for SlurmNodeRow<'a> {
    fn from(node: &'a NodeRecord) -> Self {
        let (mem_req, mem_req_unit) = normalize_memory(&node.memory_available);
        let (mem_total, mem_total_unit) = normalize_memory(&node.memory_total);
        Self {
            queue_name: &node.queue_name,
            node_name: &node.node_name,
            qtype: &node.qtype,
            ncore_resv: node.cores_reserved,
            ncore_used: node.cores_used,
            ncore_total: node.cores_total,
            ncore_available: node.cores_available,
            np_load: &node.load_avg,
            arch: &node.arch,
            status: &node.status,
            mem_total,
            mem_req,
            slurm_state: node.slurm_state.as_deref().unwrap_or_default(),
            mem_total_unit,
            mem_req_unit,
        }
    }
}

/// Boolean column spelled `True`/`False`, as pandas writes it.
#[derive(Debug, Clone, Copy)]
struct TitleCaseBool(bool);

impl Serialize for TitleCaseBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if self.0 { "True" } else { "False" })
    }
}

/// squeue job row, columns in [`SLURM_JOB_COLUMNS`] order.
#[derive(Debug, Serialize)]
struct SlurmJobRow<'a> {
    job_id: &'a str,
    partition: &'a str,
    name: &'a str,
    user: &'a str,
    state: &'a str,
    elapsed_time: &'a str,
    num_nodes: u32,
    node_or_reason: &'a str,
    total_slots: u64,
    task_count_estimated: TitleCaseBool,
}

impl<'a> From<&'a JobRecord> for SlurmJobRow<'a> {
    fn from(job: &'a JobRecord) -> Self {
        Self {
            job_id: &job.job_id,
            partition: &job.queue,
            name: &job.name,
            user: &job.user,
            state: &job.state,
            elapsed_time: &job.time,
            num_nodes: job.num_nodes.unwrap_or(1),
            node_or_reason: job.node_or_reason.as_deref().unwrap_or_default(),
            total_slots: job.total_slots,
            task_count_estimated: TitleCaseBool(job.task_count_estimated),
        }
    }
}

/// Write a header row followed by `rows`. The header is written even when
/// there are no rows.
fn write_rows<R, I>(path: &Utf8Path, columns: &[&str], rows: I) -> Result<(), TableWriteError>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let csv_err = |source: csv::Error| TableWriteError::Csv {
        path: path.to_owned(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(columns).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| TableWriteError::Io {
        path: path.to_owned(),
        source,
    })?;

    tracing::debug!("Wrote table to {}", path);
    Ok(())
}

/// Write the node table with the column set of `scheduler`.
pub fn write_node_table(
    path: &Utf8Path,
    nodes: &[NodeRecord],
    scheduler: Scheduler,
) -> Result<(), TableWriteError> {
    match scheduler {
        Scheduler::Uge => write_rows(path, &UGE_NODE_COLUMNS, nodes.iter().map(UgeNodeRow::from)),
        Scheduler::Slurm => write_rows(
            path,
            &SLURM_NODE_COLUMNS,
            nodes.iter().map(SlurmNodeRow::from),
        ),
    }
}

/// Write the squeue job table.
pub fn write_job_table(path: &Utf8Path, jobs: &[JobRecord]) -> Result<(), TableWriteError> {
    write_rows(path, &SLURM_JOB_COLUMNS, jobs.iter().map(SlurmJobRow::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn uge_node() -> NodeRecord {
        NodeRecord {
            queue_name: "epyc.q".to_string(),
            node_name: "node01".to_string(),
            scheduler: Scheduler::Uge,
            qtype: "BP".to_string(),
            cores_reserved: 0,
            cores_used: 1,
            cores_total: 2,
            cores_available: 1,
            load_avg: "0.10".to_string(),
            arch: "lx-amd64".to_string(),
            status: String::new(),
            memory_available: "4.000G".to_string(),
            memory_total: "2T".to_string(),
            slurm_state: None,
        }
    }

    fn temp_path(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join("out.tsv")).unwrap()
    }

    #[test]
    fn test_uge_node_table() {
        let dir = tempdir().unwrap();
        let path = temp_path(&dir);
        write_node_table(&path, &[uge_node()], Scheduler::Uge).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], UGE_NODE_COLUMNS.join("\t"));
        assert_eq!(
            lines[1],
            "epyc.q\tnode01\tBP\t0\t1\t2\t0.10\tlx-amd64\t\t4.0\t2000.0\t1\tG\tG"
        );
    }

    #[test]
    fn test_slurm_node_table_columns() {
        let dir = tempdir().unwrap();
        let path = temp_path(&dir);
        let mut node = uge_node();
        node.scheduler = Scheduler::Slurm;
        node.qtype = "SLURM".to_string();
        node.memory_available = "32000M".to_string();
        node.memory_total = "64000M".to_string();
        node.slurm_state = Some("MIXED".to_string());
        write_node_table(&path, &[node], Scheduler::Slurm).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], SLURM_NODE_COLUMNS.join("\t"));
        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields.len(), SLURM_NODE_COLUMNS.len());
        assert_eq!(fields[6], "1");
        assert_eq!(fields[10], "64.0");
        assert_eq!(fields[11], "32.0");
        assert_eq!(fields[12], "MIXED");
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let dir = tempdir().unwrap();
        let path = temp_path(&dir);
        write_job_table(&path, &[]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), SLURM_JOB_COLUMNS.join("\t"));
    }

    #[test]
    fn test_job_table_row() {
        let dir = tempdir().unwrap();
        let path = temp_path(&dir);
        let job = JobRecord {
            job_id: "4242".to_string(),
            queue: "epyc".to_string(),
            name: "align".to_string(),
            user: "alice".to_string(),
            state: "R".to_string(),
            time: "1:02:03".to_string(),
            slots: 1,
            task_spec: String::new(),
            total_slots: 1,
            task_count_estimated: false,
            priority: None,
            num_nodes: Some(2),
            node_or_reason: Some("node[01-02]".to_string()),
        };
        write_job_table(&path, &[job]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some("4242\tepyc\talign\talice\tR\t1:02:03\t2\tnode[01-02]\t1\tFalse")
        );
    }

    #[test]
    fn test_estimated_flag_is_title_case() {
        let dir = tempdir().unwrap();
        let path = temp_path(&dir);
        let job = JobRecord {
            job_id: "14817340_[106-239%".to_string(),
            queue: "epyc".to_string(),
            name: "pep".to_string(),
            user: "alice".to_string(),
            state: "PD".to_string(),
            time: "0:00".to_string(),
            slots: 1,
            task_spec: "[106-239%".to_string(),
            total_slots: 134,
            task_count_estimated: true,
            priority: None,
            num_nodes: Some(1),
            node_or_reason: Some("(Priority)".to_string()),
        };
        write_job_table(&path, &[job]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.ends_with("\t134\tTrue"));
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing").join("out.tsv")).unwrap();
        let err = write_job_table(&path, &[]).unwrap_err();
        assert!(matches!(err, TableWriteError::Csv { .. }));
    }
}
