//! Scheduler detection from the configured status command.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// Supported scheduler backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheduler {
    /// Univa/Son of Grid Engine, queried with `qstat`
    Uge,
    /// SLURM, queried with `squeue` and `scontrol`
    Slurm,
}

impl Scheduler {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uge => "uge",
            Self::Slurm => "slurm",
        }
    }
}

impl std::fmt::Display for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Executable name of a program path: `/usr/bin/squeue` and `squeue/`
/// both give `squeue`.
pub fn program_basename(program: &str) -> Option<&str> {
    Utf8Path::new(program).file_name()
}

/// Classify a shell-style command line by its executable basename.
///
/// Returns None for empty commands, malformed quoting, and executables
/// other than `qstat` or `squeue`.
pub fn detect_scheduler(command: &str) -> Option<Scheduler> {
    let argv = shlex::split(command)?;
    match program_basename(argv.first()?)? {
        "qstat" => Some(Scheduler::Uge),
        "squeue" => Some(Scheduler::Slurm),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_scheduler() {
        assert_eq!(detect_scheduler("qstat -F"), Some(Scheduler::Uge));
        assert_eq!(detect_scheduler("squeue"), Some(Scheduler::Slurm));
        assert_eq!(detect_scheduler("sinfo -N"), None);
    }

    #[test]
    fn test_detect_scheduler_accepts_full_path() {
        assert_eq!(detect_scheduler("/usr/bin/squeue"), Some(Scheduler::Slurm));
        assert_eq!(detect_scheduler("/opt/sge/bin/qstat -F"), Some(Scheduler::Uge));
    }

    #[test]
    fn test_program_basename() {
        assert_eq!(program_basename("/usr/bin/squeue"), Some("squeue"));
        assert_eq!(program_basename("squeue/"), Some("squeue"));
        assert_eq!(program_basename("qstat"), Some("qstat"));
        assert_eq!(program_basename("/"), None);
        assert_eq!(detect_scheduler("squeue/ -u alice"), Some(Scheduler::Slurm));
    }

    #[test]
    fn test_detect_scheduler_rejects_bad_input() {
        assert_eq!(detect_scheduler(""), None);
        assert_eq!(detect_scheduler("   "), None);
        assert_eq!(detect_scheduler("'qstat"), None);
    }

    #[test]
    fn test_detect_scheduler_respects_quoting() {
        assert_eq!(
            detect_scheduler("\"/opt/my tools/qstat\" -F"),
            Some(Scheduler::Uge)
        );
    }
}
