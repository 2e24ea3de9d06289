//! Array-task expression counting.
//!
//! Both schedulers describe task arrays with comma-separated tokens, each a
//! bare index (`7`), an inclusive range (`1-10`) or a stepped range
//! (`1-10:3`).

use once_cell::sync::Lazy;
use regex::Regex;

static RANGE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)-([0-9]+)(?::([0-9]+))?$").unwrap());

/// Result of counting an array-task expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCount {
    /// Number of tasks, at least 1
    pub tasks: u64,
    /// True if any part of the expression could not be interpreted
    pub estimated: bool,
}

impl TaskCount {
    pub const SINGLE: Self = Self {
        tasks: 1,
        estimated: false,
    };
}

/// Count the tasks described by an array-task expression.
///
/// Empty or malformed tokens, ranges with `end < start` and steps of zero
/// are skipped and mark the count as estimated, as are ranges whose count
/// does not fit in a `u64`. A total of zero falls back
/// to a single (estimated) task.
pub fn count_task_expression(expression: &str) -> TaskCount {
    let mut tasks: u64 = 0;
    let mut estimated = false;

    for token in expression.split(',').map(str::trim) {
        if token.is_empty() {
            estimated = true;
            continue;
        }

        if let Some(caps) = RANGE_TOKEN.captures(token) {
            let start = caps[1].parse::<u64>().ok();
            let end = caps[2].parse::<u64>().ok();
            let step = match caps.get(3) {
                Some(m) => m.as_str().parse::<u64>().ok(),
                None => Some(1),
            };
            let total = match (start, end, step) {
                (Some(start), Some(end), Some(step)) if step > 0 && end >= start => {
                    ((end - start) / step)
                        .checked_add(1)
                        .and_then(|count| tasks.checked_add(count))
                }
                _ => None,
            };
            match total {
                Some(total) => tasks = total,
                None => estimated = true,
            }
            continue;
        }

        if token.bytes().all(|b| b.is_ascii_digit()) {
            match tasks.checked_add(1) {
                Some(total) => tasks = total,
                None => estimated = true,
            }
            continue;
        }

        estimated = true;
    }

    if tasks == 0 {
        return TaskCount {
            tasks: 1,
            estimated: true,
        };
    }

    TaskCount { tasks, estimated }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_tokens() {
        let count = count_task_expression("1,2,4-8:2");
        assert_eq!(count.tasks, 5);
        assert!(!count.estimated);
    }

    #[test]
    fn test_range_without_step() {
        assert_eq!(count_task_expression("10-12").tasks, 3);
        assert_eq!(count_task_expression("106-239").tasks, 134);
    }

    #[test]
    fn test_empty_expression_is_one_task() {
        let count = count_task_expression("");
        assert_eq!(count.tasks, 1);
        assert!(count.estimated);
    }

    #[test]
    fn test_invalid_ranges_are_skipped() {
        let count = count_task_expression("5-1,3-9:0,2");
        assert_eq!(count.tasks, 1);
        assert!(count.estimated);
    }

    #[test]
    fn test_garbage_tokens_are_flagged() {
        let count = count_task_expression("1-4,abc, ,7");
        assert_eq!(count.tasks, 5);
        assert!(count.estimated);
    }

    #[test]
    fn test_step_floor() {
        // 1, 4, 7, 10
        assert_eq!(count_task_expression("1-10:3").tasks, 4);
        // 1, 4, 7
        assert_eq!(count_task_expression("1-9:3").tasks, 3);
    }

    #[test]
    fn test_huge_range_does_not_overflow() {
        let count = count_task_expression("0-18446744073709551615");
        assert_eq!(count.tasks, 1);
        assert!(count.estimated);

        let count = count_task_expression("0-18446744073709551614,0-5");
        assert_eq!(count.tasks, u64::MAX);
        assert!(count.estimated);

        let count = count_task_expression("18446744073709551615,1-3");
        assert_eq!(count.tasks, 4);
        assert!(!count.estimated);
    }
}
