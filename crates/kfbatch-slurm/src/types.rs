//! SLURM state vocabularies.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+").unwrap());
static LEADING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z_]+").unwrap());
static WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z_]+").unwrap());

/// SLURM job state, accepted in long ("PENDING") or compact ("PD") form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlurmJobState {
    Running,
    Completing,
    Pending,
    Configuring,
    BootFail,
    Cancelled,
    Deadline,
    Failed,
    NodeFail,
    OutOfMemory,
    Preempted,
    Revoked,
    SpecialExit,
    Stopped,
    Timeout,
    Unknown(String),
}

impl SlurmJobState {
    /// Parse a state as printed by squeue (`%t` or `%T`), ignoring
    /// trailing details such as "CANCELLED by 1234".
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        let word = LEADING_WORD
            .find(&upper)
            .map(|m| m.as_str())
            .unwrap_or(upper.as_str());

        match word {
            "RUNNING" | "R" => Self::Running,
            "COMPLETING" | "CG" => Self::Completing,
            "PENDING" | "PD" => Self::Pending,
            "CONFIGURING" | "CF" => Self::Configuring,
            "BOOT_FAIL" | "BF" => Self::BootFail,
            "CANCELLED" | "CA" => Self::Cancelled,
            "DEADLINE" | "DL" => Self::Deadline,
            "FAILED" | "F" => Self::Failed,
            "NODE_FAIL" | "NF" => Self::NodeFail,
            "OUT_OF_MEMORY" | "OOM" => Self::OutOfMemory,
            "PREEMPTED" | "PR" => Self::Preempted,
            "REVOKED" | "RV" => Self::Revoked,
            "SPECIAL_EXIT" | "SE" => Self::SpecialExit,
            "STOPPED" | "ST" => Self::Stopped,
            "TIMEOUT" | "TO" => Self::Timeout,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Compact state code.
    pub fn code(&self) -> &str {
        match self {
            Self::Running => "R",
            Self::Completing => "CG",
            Self::Pending => "PD",
            Self::Configuring => "CF",
            Self::BootFail => "BF",
            Self::Cancelled => "CA",
            Self::Deadline => "DL",
            Self::Failed => "F",
            Self::NodeFail => "NF",
            Self::OutOfMemory => "OOM",
            Self::Preempted => "PR",
            Self::Revoked => "RV",
            Self::SpecialExit => "SE",
            Self::Stopped => "ST",
            Self::Timeout => "TO",
            Self::Unknown(code) => code,
        }
    }

    /// R, CG
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running | Self::Completing)
    }

    /// PD, CF
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending | Self::Configuring)
    }

    /// Failed, cancelled or otherwise terminated abnormally.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::BootFail
                | Self::Cancelled
                | Self::Deadline
                | Self::Failed
                | Self::NodeFail
                | Self::OutOfMemory
                | Self::Preempted
                | Self::Revoked
                | Self::SpecialExit
                | Self::Stopped
                | Self::Timeout
        )
    }
}

/// One token of a SLURM node state such as "MIXED+DRAIN".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStateToken {
    Idle,
    Mixed,
    Allocated,
    Completing,
    Drain,
    Draining,
    Down,
    Fail,
    NotResponding,
    Maint,
    PowerDown,
    PoweringDown,
    PoweredDown,
    RebootRequested,
    RebootIssued,
    Planned,
    Reserved,
    Other(String),
}

impl NodeStateToken {
    pub fn from_token(token: &str) -> Self {
        match token {
            "IDLE" => Self::Idle,
            "MIXED" => Self::Mixed,
            "ALLOCATED" => Self::Allocated,
            "COMPLETING" => Self::Completing,
            "DRAIN" => Self::Drain,
            "DRAINING" => Self::Draining,
            "DOWN" => Self::Down,
            "FAIL" => Self::Fail,
            "NOT_RESPONDING" => Self::NotResponding,
            "MAINT" => Self::Maint,
            "POWER_DOWN" => Self::PowerDown,
            "POWERING_DOWN" => Self::PoweringDown,
            "POWERED_DOWN" => Self::PoweredDown,
            "REBOOT_REQUESTED" => Self::RebootRequested,
            "REBOOT_ISSUED" => Self::RebootIssued,
            "PLANNED" => Self::Planned,
            "RESERVED" => Self::Reserved,
            other => Self::Other(other.to_string()),
        }
    }

    /// Base states that count as working capacity.
    pub fn is_normal_base(&self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Mixed | Self::Allocated | Self::Completing
        )
    }

    /// Flags that take a node out of available capacity.
    pub fn is_unavailable_flag(&self) -> bool {
        matches!(
            self,
            Self::Drain
                | Self::Draining
                | Self::Down
                | Self::Fail
                | Self::NotResponding
                | Self::Maint
                | Self::PowerDown
                | Self::PoweringDown
                | Self::PoweredDown
                | Self::RebootRequested
                | Self::RebootIssued
                | Self::Planned
                | Self::Reserved
        )
    }
}

/// Parsed SLURM node state. The raw string is kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub raw: String,
    pub base: NodeStateToken,
    pub flags: Vec<NodeStateToken>,
}

impl NodeState {
    pub fn parse(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        let base = LEADING_ALPHA
            .find(&upper)
            .map(|m| m.as_str())
            .unwrap_or(upper.as_str());
        let flags = upper
            .split('+')
            .filter_map(|token| LEADING_WORD.find(token))
            .map(|m| NodeStateToken::from_token(m.as_str()))
            .collect();

        Self {
            raw: raw.to_string(),
            base: NodeStateToken::from_token(base),
            flags,
        }
    }

    /// True if the base state is normal and no unavailable flag is set.
    pub fn is_normal(&self) -> bool {
        self.base.is_normal_base() && !self.flags.iter().any(|f| f.is_unavailable_flag())
    }

    /// Node status: empty when normal, otherwise the raw state.
    pub fn status(&self) -> String {
        if self.is_normal() {
            String::new()
        } else {
            self.raw.clone()
        }
    }
}

/// State of one partition from `scontrol show partition -o`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionState {
    pub partition_name: String,
    pub state: String,
}

impl PartitionState {
    pub fn is_up(&self) -> bool {
        partition_state_is_up(&self.state)
    }
}

/// A partition is up when its state is plain "UP" (any case, optional
/// trailing `*`). Unknown/empty states count as up; "UP+DRAIN" does not.
pub fn partition_state_is_up(state: &str) -> bool {
    let upper = state.trim().to_uppercase();
    let tokens: Vec<&str> = WORDS.find_iter(&upper).map(|m| m.as_str()).collect();
    match tokens.as_slice() {
        [] => true,
        [only] => *only == "UP",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_codes() {
        assert_eq!(SlurmJobState::parse("RUNNING").code(), "R");
        assert_eq!(SlurmJobState::parse("PD").code(), "PD");
        assert_eq!(SlurmJobState::parse("CANCELLED by 1234").code(), "CA");
        assert_eq!(SlurmJobState::parse("out_of_memory").code(), "OOM");
        assert_eq!(SlurmJobState::parse("CD").code(), "CD");
    }

    #[test]
    fn test_job_state_classes() {
        assert!(SlurmJobState::parse("COMPLETING").is_running());
        assert!(SlurmJobState::parse("CF").is_pending());
        assert!(SlurmJobState::parse("TIMEOUT").is_error());
        let completed = SlurmJobState::parse("COMPLETED");
        assert!(!completed.is_running() && !completed.is_pending() && !completed.is_error());
    }

    #[test]
    fn test_node_state_normal() {
        assert!(NodeState::parse("IDLE").is_normal());
        assert!(NodeState::parse("MIXED").is_normal());
        assert!(!NodeState::parse("ALLOCATED+PLANNED").is_normal());
        assert!(!NodeState::parse("MIXED+RESERVED").is_normal());
        assert!(!NodeState::parse("IDLE+DRAIN").is_normal());
        assert!(!NodeState::parse("DOWN+NOT_RESPONDING").is_normal());
        assert!(NodeState::parse("IDLE+CLOUD").is_normal());
    }

    #[test]
    fn test_node_state_tokens() {
        let state = NodeState::parse("mixed+drain");
        assert_eq!(state.base, NodeStateToken::Mixed);
        assert_eq!(
            state.flags,
            vec![NodeStateToken::Mixed, NodeStateToken::Drain]
        );
        assert_eq!(state.status(), "mixed+drain");
    }

    #[test]
    fn test_empty_node_state_has_empty_status() {
        assert_eq!(NodeState::parse("").status(), "");
    }

    #[test]
    fn test_partition_state_is_up() {
        assert!(partition_state_is_up("UP"));
        assert!(partition_state_is_up("up"));
        assert!(partition_state_is_up("UP*"));
        assert!(partition_state_is_up(""));
        assert!(!partition_state_is_up("INACTIVE"));
        assert!(!partition_state_is_up("UP+DRAIN"));
        assert!(!partition_state_is_up("DOWN"));
    }
}
