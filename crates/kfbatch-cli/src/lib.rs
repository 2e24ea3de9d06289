//! CLI argument parsing for kfbatch.

use camino::Utf8PathBuf;
use clap::Parser;
use kfbatch_state::TopOptions;

pub const DEFAULT_STAT_COMMAND: &str = "qstat -F";
pub const DEFAULT_SLURM_PARTITION_COMMAND: &str = "scontrol show partition -o";
pub const DEFAULT_SLURM_NODE_COMMAND: &str = "scontrol show node -o";

#[derive(Parser, Debug)]
#[command(name = "kfbatch")]
#[command(about = "Report CPU and memory availability on UGE and SLURM clusters")]
pub struct Args {
    /// Scheduler command to query (qstat or squeue)
    #[arg(long = "stat_command", default_value = DEFAULT_STAT_COMMAND)]
    pub stat_command: String,

    /// Read --stat_command output from this file instead of running it
    #[arg(long = "example_file")]
    pub example_file: Option<Utf8PathBuf>,

    /// Number of qstat samples to reconcile
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub niter: i64,

    /// Write the node table (or the job table when no node data) as TSV
    #[arg(long)]
    pub out: Option<Utf8PathBuf>,

    /// Nodes to report per queue
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    pub ntop: u32,

    /// Report every node tied with the Nth best instead of exactly N
    #[arg(long = "all_tiers")]
    pub all_tiers: bool,

    /// Leave abnormal nodes out of the top-N report
    #[arg(long = "exclude_abnormal_node")]
    pub exclude_abnormal_node: bool,

    /// SLURM partition query, used to flag nodes in partitions that are not UP
    #[arg(long = "slurm_partition_command", default_value = DEFAULT_SLURM_PARTITION_COMMAND)]
    pub slurm_partition_command: String,

    /// Read --slurm_partition_command output from this file
    #[arg(long = "slurm_partition_example_file")]
    pub slurm_partition_example_file: Option<Utf8PathBuf>,

    /// SLURM node query
    #[arg(long = "slurm_node_command", default_value = DEFAULT_SLURM_NODE_COMMAND)]
    pub slurm_node_command: String,

    /// Read --slurm_node_command output from this file
    #[arg(long = "slurm_node_example_file")]
    pub slurm_node_example_file: Option<Utf8PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn top_options(&self) -> TopOptions {
        TopOptions {
            ntop: self.ntop as usize,
            all_tiers: self.all_tiers,
            exclude_abnormal: self.exclude_abnormal_node,
        }
    }
}

/// Rewrite legacy invocations: `kfbatch stat ...` drops the subcommand word
/// and `kfbatch help` becomes `kfbatch --help`.
pub fn normalize_legacy_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args: Vec<String> = args.into_iter().collect();
    match args.get(1).map(String::as_str) {
        Some("stat") => {
            args.remove(1);
        }
        Some("help") => {
            args[1] = "--help".to_string();
        }
        _ => {}
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["kfbatch"]).unwrap();
        assert_eq!(args.stat_command, "qstat -F");
        assert_eq!(args.niter, 1);
        assert_eq!(args.ntop, 3);
        assert!(args.out.is_none());
        assert_eq!(args.slurm_node_command, "scontrol show node -o");
        assert_eq!(args.slurm_partition_command, "scontrol show partition -o");
        assert!(!args.all_tiers && !args.exclude_abnormal_node);
    }

    #[test]
    fn test_underscore_options() {
        let args = Args::try_parse_from([
            "kfbatch",
            "--stat_command",
            "squeue",
            "--example_file",
            "squeue.txt",
            "--slurm_node_example_file",
            "nodes.txt",
            "--ntop",
            "5",
            "--all_tiers",
            "--exclude_abnormal_node",
            "--out",
            "out.tsv",
        ])
        .unwrap();
        assert_eq!(args.stat_command, "squeue");
        assert_eq!(args.example_file.as_deref(), Some(Utf8Path::new("squeue.txt")));
        assert_eq!(args.out.as_deref(), Some(Utf8Path::new("out.tsv")));

        let top = args.top_options();
        assert_eq!(top.ntop, 5);
        assert!(top.all_tiers);
        assert!(top.exclude_abnormal);
    }

    #[test]
    fn test_ntop_must_be_positive() {
        assert!(Args::try_parse_from(["kfbatch", "--ntop", "0"]).is_err());
    }

    #[test]
    fn test_negative_niter_parses() {
        let args = Args::try_parse_from(["kfbatch", "--niter", "-1"]).unwrap();
        assert_eq!(args.niter, -1);
    }

    #[test]
    fn test_legacy_stat_subcommand() {
        let args = normalize_legacy_args(argv(&["kfbatch", "stat", "--niter", "2"]));
        assert_eq!(args, argv(&["kfbatch", "--niter", "2"]));

        let args = normalize_legacy_args(argv(&["kfbatch", "help"]));
        assert_eq!(args, argv(&["kfbatch", "--help"]));

        let args = normalize_legacy_args(argv(&["kfbatch", "--ntop", "1"]));
        assert_eq!(args, argv(&["kfbatch", "--ntop", "1"]));
    }
}
