//! Task field extraction
//!
//! Task bodies use bold labels, optionally as list items:
//!
//! ```text
//! - **Files:** `app/models/user.py`, `app/schemas/user.py`
//! - **Preconditions:** Task 1
//! - **Steps:**
//!   1. Add the model
//!   2. Export it
//! - **Done when:** `pytest tests/models` passes
//! - **Complexity:** small
//! - **Parallel:** can run alongside Task 3
//! ```
//!
//! The first occurrence of each label wins. `**Verify:**` is accepted as an
//! alias for `**Done when:**`.
//!
//! A label with nothing after it takes its value from the indented lines
//! that follow: nested bullets for files and preconditions, the first line
//! for the verification command.

use crate::types::{Preconditions, Sizing, Task, TaskId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*+]\s+)?\*\*(files|preconditions|steps|done when|verify|complexity|parallel):\*\*\s*(.*?)\s*$",
    )
    .expect("field pattern is valid")
});

static STEP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s+(.+?)\s*$").expect("step pattern is valid"));

/// `Task 1`, `Tasks 1, 2 and 4`, `Tasks 1-3`
static TASK_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\btasks?\s+#?(\d+(?:(?:\s*,\s*(?:(?:and|or)\s+)?|\s+(?:and|or)\s+|\s*[&/]\s*|\s*(?:-|–|\bto\b)\s*)#?\d+)*)",
    )
    .expect("task list pattern is valid")
});

static TASK_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)(?:\s*(?:-|–|\bto\b)\s*#?(\d+))?").expect("task range pattern is valid")
});

/// Indented continuation line, bullet marker stripped
static CONTINUATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(?:[-*+]\s+)?(.+?)\s*$").expect("continuation pattern is valid")
});

/// Widest `Tasks a-b` range expanded into individual ids
const MAX_RANGE_SPAN: u32 = 256;

/// Recognized field labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Files,
    Preconditions,
    Steps,
    DoneWhen,
    Complexity,
    Parallel,
}

impl Field {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "files" => Some(Field::Files),
            "preconditions" => Some(Field::Preconditions),
            "steps" => Some(Field::Steps),
            "done when" | "verify" => Some(Field::DoneWhen),
            "complexity" => Some(Field::Complexity),
            "parallel" => Some(Field::Parallel),
            _ => None,
        }
    }
}

/// Build a [`Task`] from its heading data and body text
#[must_use]
pub fn parse_task_body(id: TaskId, title: &str, line: usize, body: &str) -> Task {
    let mut task = Task::new(id, title.trim());
    task.line = line;

    let mut seen: Vec<Field> = Vec::new();
    let mut lines = body.lines().peekable();

    while let Some(text) = lines.next() {
        let Some(caps) = FIELD_RE.captures(text) else {
            continue;
        };
        let Some(field) = Field::from_label(&caps[1]) else {
            continue;
        };
        if seen.contains(&field) {
            continue;
        }
        seen.push(field);
        let value = caps[2].trim();

        match field {
            Field::Files if value.is_empty() => {
                task.files = continuation(&mut lines)
                    .iter()
                    .flat_map(|item| split_files(item))
                    .collect();
            }
            Field::Files => task.files = split_files(value),
            Field::Preconditions if value.is_empty() => {
                task.preconditions = parse_preconditions(&continuation(&mut lines).join(", "));
            }
            Field::Preconditions => task.preconditions = parse_preconditions(value),
            Field::DoneWhen if value.is_empty() => {
                task.done_when = continuation(&mut lines).into_iter().next();
            }
            Field::DoneWhen => task.done_when = non_empty(value),
            Field::Complexity => task.sizing = Sizing::from_raw(&leading_word(value)),
            Field::Parallel => task.parallel = non_empty(value),
            Field::Steps => {
                while let Some(next) = lines.peek() {
                    if next.trim().is_empty() {
                        lines.next();
                        continue;
                    }
                    let step = STEP_RE.captures(next).map(|c| c[1].to_string());
                    match step {
                        Some(step) => {
                            task.steps.push(step);
                            lines.next();
                        }
                        None => break,
                    }
                }
            }
        }
    }

    task
}

/// Consume the indented lines under an empty label
///
/// Stops at the first unindented line or the next field label. Blank lines
/// and code fence markers are skipped.
fn continuation<'a, I>(lines: &mut Peekable<I>) -> Vec<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut items = Vec::new();
    while let Some(next) = lines.peek() {
        if next.trim().is_empty() || next.trim_start().starts_with("```") {
            lines.next();
            continue;
        }
        if FIELD_RE.is_match(next) {
            break;
        }
        let Some(item) = CONTINUATION_RE.captures(next).map(|c| c[1].to_string()) else {
            break;
        };
        items.push(item);
        lines.next();
    }
    items
}

/// Split a comma-separated file list, stripping backticks
#[must_use]
pub fn split_files(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|f| f.trim().trim_matches('`').trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret a preconditions value
#[must_use]
pub fn parse_preconditions(value: &str) -> Preconditions {
    let value = value.trim();
    if value.is_empty() {
        return Preconditions::Undeclared;
    }

    let normalized = value
        .trim_matches(|c: char| c == '(' || c == ')' || c == '.' || c == '`' || c == '*')
        .trim()
        .to_ascii_lowercase();
    if normalized == "none" {
        return Preconditions::None;
    }

    let mut ids: Vec<TaskId> = Vec::new();
    let mut push = |n: u32| {
        if !ids.contains(&TaskId(n)) {
            ids.push(TaskId(n));
        }
    };
    for list in TASK_LIST_RE.captures_iter(value) {
        for caps in TASK_RANGE_RE.captures_iter(&list[1]) {
            let Ok(start) = caps[1].parse::<u32>() else {
                continue;
            };
            match caps.get(2).and_then(|end| end.as_str().parse::<u32>().ok()) {
                Some(end) if start <= end && end - start <= MAX_RANGE_SPAN => {
                    (start..=end).for_each(&mut push);
                }
                Some(end) => {
                    push(start);
                    push(end);
                }
                None => push(start),
            }
        }
    }

    if ids.is_empty() {
        Preconditions::Unresolved(value.to_string())
    } else {
        Preconditions::Tasks(ids)
    }
}

fn leading_word(value: &str) -> String {
    value
        .trim_start_matches(|c: char| c == '`' || c == '*')
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Complexity;

    const BODY: &str = "
- **Files:** `app/models/user.py`, `app/schemas/user.py`
- **Preconditions:** Task 1, Task 2
- **Steps:**
  1. Add the model
  2. Export it from the package

- **Done when:** `pytest tests/models` passes
- **Complexity:** Small (under an hour)
- **Parallel:** must be sequential
";

    #[test]
    fn parses_all_fields() {
        let task = parse_task_body(TaskId(3), " Add user model ", 10, BODY);
        assert_eq!(task.id, TaskId(3));
        assert_eq!(task.title, "Add user model");
        assert_eq!(task.line, 10);
        assert_eq!(task.files, vec!["app/models/user.py", "app/schemas/user.py"]);
        assert_eq!(task.preconditions.ids(), &[TaskId(1), TaskId(2)]);
        assert_eq!(task.steps, vec!["Add the model", "Export it from the package"]);
        assert_eq!(task.done_when.as_deref(), Some("`pytest tests/models` passes"));
        assert_eq!(task.sizing, Sizing::Sized(Complexity::Small));
        assert_eq!(task.parallel.as_deref(), Some("must be sequential"));
    }

    #[test]
    fn missing_fields_stay_empty() {
        let task = parse_task_body(TaskId(1), "Bare", 1, "Just prose, no fields.\n");
        assert!(task.files.is_empty());
        assert_eq!(task.preconditions, Preconditions::Undeclared);
        assert!(task.steps.is_empty());
        assert!(task.done_when.is_none());
        assert_eq!(task.sizing, Sizing::Missing);
    }

    #[test]
    fn verify_is_an_alias_for_done_when() {
        let task = parse_task_body(TaskId(1), "t", 1, "- **Verify:** npm test passes\n");
        assert_eq!(task.done_when.as_deref(), Some("npm test passes"));
    }

    #[test]
    fn first_occurrence_wins() {
        let body = "**Complexity:** medium\n**Complexity:** large\n";
        let task = parse_task_body(TaskId(1), "t", 1, body);
        assert_eq!(task.sizing, Sizing::Sized(Complexity::Medium));
    }

    #[test]
    fn preconditions_forms() {
        assert_eq!(parse_preconditions("none"), Preconditions::None);
        assert_eq!(parse_preconditions("None."), Preconditions::None);
        assert_eq!(parse_preconditions("(none)"), Preconditions::None);
        assert_eq!(parse_preconditions(""), Preconditions::Undeclared);
        assert_eq!(
            parse_preconditions("Task 4 (schema) and task 2"),
            Preconditions::Tasks(vec![TaskId(4), TaskId(2)])
        );
        assert_eq!(
            parse_preconditions("after the schema lands"),
            Preconditions::Unresolved("after the schema lands".to_string())
        );
    }

    #[test]
    fn preconditions_id_lists() {
        let tasks = |ids: &[u32]| Preconditions::Tasks(ids.iter().copied().map(TaskId).collect());
        assert_eq!(parse_preconditions("Task 1, 2"), tasks(&[1, 2]));
        assert_eq!(parse_preconditions("Tasks 1 and 2"), tasks(&[1, 2]));
        assert_eq!(parse_preconditions("Tasks 1, 3, and 5"), tasks(&[1, 3, 5]));
        assert_eq!(parse_preconditions("Tasks 1-3"), tasks(&[1, 2, 3]));
        assert_eq!(parse_preconditions("tasks 2 to 4 & 7"), tasks(&[2, 3, 4, 7]));
        assert_eq!(parse_preconditions("Tasks 5-2"), tasks(&[5, 2]));
    }

    #[test]
    fn preconditions_ignore_numbers_outside_id_lists() {
        assert_eq!(
            parse_preconditions("Task 1 (touches 3 files)"),
            Preconditions::Tasks(vec![TaskId(1)])
        );
        assert_eq!(
            parse_preconditions("Task 2 - schema must exist"),
            Preconditions::Tasks(vec![TaskId(2)])
        );
    }

    #[test]
    fn huge_range_keeps_endpoints() {
        assert_eq!(
            parse_preconditions("Tasks 1-4000000000"),
            Preconditions::Tasks(vec![TaskId(1), TaskId(4_000_000_000)])
        );
    }

    #[test]
    fn nested_file_list() {
        let body = "\
- **Files:**
  - `app/models/user.py`
  - `app/schemas/user.py`
  - `app/repositories/user.py`, `app/services/user.py`
  - app/routers/users.py
- **Preconditions:** none
";
        let task = parse_task_body(TaskId(1), "t", 1, body);
        assert_eq!(
            task.files,
            vec![
                "app/models/user.py",
                "app/schemas/user.py",
                "app/repositories/user.py",
                "app/services/user.py",
                "app/routers/users.py",
            ]
        );
        assert_eq!(task.preconditions, Preconditions::None);
    }

    #[test]
    fn done_when_on_next_line() {
        let body = "- **Done when:**\n  `pytest tests/models` passes\n- **Complexity:** small\n";
        let task = parse_task_body(TaskId(1), "t", 1, body);
        assert_eq!(task.done_when.as_deref(), Some("`pytest tests/models` passes"));
        assert_eq!(task.sizing, Sizing::Sized(Complexity::Small));
    }

    #[test]
    fn done_when_in_code_block() {
        let body = "- **Done when:**\n  ```\n  npm test\n  ```\n";
        let task = parse_task_body(TaskId(1), "t", 1, body);
        assert_eq!(task.done_when.as_deref(), Some("npm test"));
    }

    #[test]
    fn nested_preconditions() {
        let body = "- **Preconditions:**\n  - Task 1\n  - Task 3\n- **Steps:**\n  1. go\n";
        let task = parse_task_body(TaskId(4), "t", 1, body);
        assert_eq!(task.preconditions.ids(), &[TaskId(1), TaskId(3)]);
        assert_eq!(task.steps, vec!["go"]);
    }

    #[test]
    fn empty_label_without_continuation_stays_missing() {
        let body = "- **Done when:**\n- **Complexity:** small\n";
        let task = parse_task_body(TaskId(1), "t", 1, body);
        assert!(task.done_when.is_none());
        assert_eq!(task.sizing, Sizing::Sized(Complexity::Small));
    }

    #[test]
    fn file_list_drops_empties() {
        assert_eq!(split_files("`a.py`, , b.py,"), vec!["a.py", "b.py"]);
        assert!(split_files("").is_empty());
    }

    #[test]
    fn unrecognized_complexity_is_kept() {
        let task = parse_task_body(TaskId(1), "t", 1, "- **Complexity:** XL\n");
        assert_eq!(task.sizing, Sizing::Unrecognized("xl".to_string()));
    }

    #[test]
    fn steps_stop_at_next_field() {
        let body = "- **Steps:**\n  1. one\n  2. two\n- **Done when:** ok\n";
        let task = parse_task_body(TaskId(1), "t", 1, body);
        assert_eq!(task.steps, vec!["one", "two"]);
        assert_eq!(task.done_when.as_deref(), Some("ok"));
    }
}
