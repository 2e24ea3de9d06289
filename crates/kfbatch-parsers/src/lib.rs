//! Shared pieces for reading scheduler output: the command runner, memory
//! and array-task normalization, and small field helpers used by
//! kfbatch-uge and kfbatch-slurm.

pub mod command;
pub mod memory;
pub mod tasks;

pub use command::{
    CommandError, CommandRunner, LineSource, Query, read_fixture_lines, run_command,
    run_command_lines,
};
pub use memory::{
    MemoryQuantity, MemoryUnit, NORMALIZED_UNIT, format_gib, normalize_memory, parse_memory_gib,
};
pub use tasks::{TaskCount, count_task_expression};

use std::collections::HashMap;

/// Split a record of space-separated `key=value` items.
///
/// Items without `=` are ignored; the value is everything after the first
/// `=`. Later duplicates overwrite earlier ones.
pub fn parse_key_values(line: &str) -> HashMap<&str, &str> {
    line.split(' ')
        .filter(|item| !item.is_empty())
        .filter_map(|item| item.split_once('='))
        .collect()
}

/// Parse an optional integer field, falling back to `default` when the
/// field is missing or not an integer.
pub fn parse_int_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

/// Split on runs of whitespace into at most `n` fields; the last field
/// keeps any embedded whitespace.
pub fn split_whitespace_n(line: &str, n: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line.trim();
    while !rest.is_empty() {
        if fields.len() + 1 == n {
            fields.push(rest);
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
            }
            None => {
                fields.push(rest);
                break;
            }
        }
    }
    fields
}
