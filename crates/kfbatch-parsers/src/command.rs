//! Command execution utilities for scheduler queries.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Error type for command execution.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to read example file for {name}: {path}: {error}")]
    Fixture {
        name: String,
        path: Utf8PathBuf,
        error: String,
    },
    #[error("Failed to parse {name}: {command}")]
    Quoting { name: String, command: String },
    #[error("Failed to run {name}: command is empty")]
    Empty { name: String },
    #[error("Failed to run {name}: {command}: {error}")]
    Execution {
        name: String,
        command: String,
        error: String,
    },
    #[error("Failed to run {name}: {command}\n{stderr}")]
    Failed {
        name: String,
        command: String,
        stderr: String,
    },
}

/// One scheduler query: a shell-style command, optionally replaced by a
/// captured output file.
#[derive(Debug, Clone)]
pub struct Query {
    /// Name used in diagnostics (usually the CLI option that configured it)
    pub name: String,
    /// Shell-style command line
    pub command: String,
    /// Captured output to read instead of running the command
    pub fixture: Option<Utf8PathBuf>,
}

impl Query {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            fixture: None,
        }
    }

    pub fn with_fixture(mut self, fixture: Option<Utf8PathBuf>) -> Self {
        self.fixture = fixture;
        self
    }
}

/// Anything that can produce the raw output lines of a query.
#[allow(async_fn_in_trait)]
pub trait LineSource {
    async fn fetch(&mut self, query: &Query) -> Result<Vec<String>, CommandError>;
}

/// Runs queries against the real scheduler (or its captured output).
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

impl LineSource for CommandRunner {
    async fn fetch(&mut self, query: &Query) -> Result<Vec<String>, CommandError> {
        match &query.fixture {
            Some(path) => read_fixture_lines(path, &query.name).await,
            None => run_command_lines(&query.command, &query.name).await,
        }
    }
}

/// Read a captured scheduler output file line by line.
pub async fn read_fixture_lines(path: &Utf8Path, name: &str) -> Result<Vec<String>, CommandError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CommandError::Fixture {
            name: name.to_string(),
            path: path.to_owned(),
            error: e.to_string(),
        })?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Split a shell-style command line and run it, returning stdout lines.
pub async fn run_command_lines(command: &str, name: &str) -> Result<Vec<String>, CommandError> {
    let argv = shlex::split(command).ok_or_else(|| CommandError::Quoting {
        name: name.to_string(),
        command: command.to_string(),
    })?;
    let (program, args) = argv.split_first().ok_or_else(|| CommandError::Empty {
        name: name.to_string(),
    })?;

    tracing::debug!("Running {}: {}", name, command);
    let mut cmd = Command::new(program);
    cmd.args(args);
    let stdout = run_command(&mut cmd, name, command).await?;
    Ok(stdout.lines().map(str::to_string).collect())
}

/// Execute a command and return stdout as a string.
///
/// This is a convenience wrapper that handles common error cases
/// and UTF-8 conversion for scheduler command output.
pub async fn run_command(
    cmd: &mut Command,
    name: &str,
    command: &str,
) -> Result<String, CommandError> {
    let output = cmd.output().await.map_err(|e| CommandError::Execution {
        name: name.to_string(),
        command: command.to_string(),
        error: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommandError::Failed {
            name: name.to_string(),
            command: command.to_string(),
            stderr: stderr.to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_command_lines_success() {
        let lines = run_command_lines("echo 'hello world'", "echo").await.unwrap();
        assert_eq!(lines, vec!["hello world".to_string()]);
    }

    #[tokio::test]
    async fn test_run_command_lines_not_found() {
        let result = run_command_lines("nonexistent_command_12345", "nonexistent").await;
        assert!(matches!(result, Err(CommandError::Execution { .. })));
    }

    #[tokio::test]
    async fn test_run_command_lines_nonzero_exit() {
        let result = run_command_lines("false", "false").await;
        assert!(matches!(result, Err(CommandError::Failed { .. })));
    }

    #[tokio::test]
    async fn test_run_command_lines_empty_command() {
        let result = run_command_lines("", "--stat_command").await;
        assert!(matches!(result, Err(CommandError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_run_command_lines_malformed_quoting() {
        let result = run_command_lines("'", "--stat_command").await;
        assert!(matches!(result, Err(CommandError::Quoting { .. })));
    }

    #[tokio::test]
    async fn test_missing_fixture_is_an_error() {
        let query = Query::new("--stat_command", "echo hi").with_fixture(Some(
            Utf8PathBuf::from("/tmp/this_file_should_not_exist_for_kfbatch_tests"),
        ));
        let result = CommandRunner.fetch(&query).await;
        assert!(matches!(result, Err(CommandError::Fixture { .. })));
    }

    #[tokio::test]
    async fn test_fixture_takes_precedence_over_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("qstat.txt")).unwrap();
        tokio::fs::write(&path, "line one\nline two\n").await.unwrap();

        let query = Query::new("--stat_command", "nonexistent_command_12345")
            .with_fixture(Some(path.clone()));
        let lines = CommandRunner.fetch(&query).await.unwrap();
        assert_eq!(lines, vec!["line one".to_string(), "line two".to_string()]);
    }
}
