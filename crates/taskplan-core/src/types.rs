//! Core types for task plans
//!
//! A [`TaskPlan`] is an ordered collection of [`Task`] records parsed from a
//! Markdown document (or built by a generator). Field values keep enough of
//! their raw form for the validator to explain what is wrong with them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task identifier: the ordinal in `### Task <n>: <title>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl TaskId {
    /// Raw ordinal
    #[inline]
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {}", self.0)
    }
}

impl From<u32> for TaskId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Task sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Config tweak, rename, one-liner
    Trivial,
    /// Single function or component
    Small,
    /// Several functions across a layer
    Medium,
    /// Cross-cutting; usually a split candidate
    Large,
}

impl Complexity {
    /// All values in ascending size
    pub const ALL: [Complexity; 4] = [
        Complexity::Trivial,
        Complexity::Small,
        Complexity::Medium,
        Complexity::Large,
    ];

    /// Lowercase name as written in plans
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Complexity::Trivial => "trivial",
            Complexity::Small => "small",
            Complexity::Medium => "medium",
            Complexity::Large => "large",
        }
    }

    /// Capitalized name used in implementation plan metadata
    #[must_use]
    pub fn title_case(self) -> &'static str {
        match self {
            Complexity::Trivial => "Trivial",
            Complexity::Small => "Small",
            Complexity::Medium => "Medium",
            Complexity::Large => "Large",
        }
    }

    /// Comma-separated list of accepted values
    #[must_use]
    pub fn accepted_values() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized complexity names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized complexity '{0}'")]
pub struct UnknownComplexity(pub String);

impl FromStr for Complexity {
    type Err = UnknownComplexity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trivial" => Ok(Complexity::Trivial),
            "small" => Ok(Complexity::Small),
            "medium" => Ok(Complexity::Medium),
            "large" => Ok(Complexity::Large),
            _ => Err(UnknownComplexity(s.trim().to_string())),
        }
    }
}

/// Complexity field as found in the document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Sizing {
    /// No `**Complexity:**` line
    #[default]
    Missing,
    /// Recognized value
    Sized(Complexity),
    /// Present but not one of the accepted values
    Unrecognized(String),
}

impl Sizing {
    /// Classify a raw field value
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Sizing::Missing;
        }
        match raw.parse() {
            Ok(c) => Sizing::Sized(c),
            Err(_) => Sizing::Unrecognized(raw.to_ascii_lowercase()),
        }
    }

    /// Recognized complexity, if any
    #[must_use]
    pub fn complexity(&self) -> Option<Complexity> {
        match self {
            Sizing::Sized(c) => Some(*c),
            _ => None,
        }
    }
}

/// Preconditions field as found in the document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preconditions {
    /// No `**Preconditions:**` line
    #[default]
    Undeclared,
    /// Explicitly "none"
    None,
    /// References to other tasks, in document order, deduplicated
    Tasks(Vec<TaskId>),
    /// Declared, but no `Task <n>` reference could be found in the text
    Unresolved(String),
}

impl Preconditions {
    /// Referenced task ids (empty unless [`Preconditions::Tasks`])
    #[must_use]
    pub fn ids(&self) -> &[TaskId] {
        match self {
            Preconditions::Tasks(ids) => ids,
            _ => &[],
        }
    }

    /// Whether the field was written at all
    #[must_use]
    pub fn is_declared(&self) -> bool {
        !matches!(self, Preconditions::Undeclared)
    }
}

impl fmt::Display for Preconditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preconditions::Undeclared | Preconditions::None => f.write_str("none"),
            Preconditions::Tasks(ids) => {
                let refs: Vec<String> = ids.iter().map(ToString::to_string).collect();
                f.write_str(&refs.join(", "))
            }
            Preconditions::Unresolved(text) => f.write_str(text),
        }
    }
}

/// A single atomic unit of implementation work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Ordinal id
    pub id: TaskId,
    /// Heading title after `Task <n>:`
    pub title: String,
    /// File paths touched
    pub files: Vec<String>,
    /// Dependencies on other tasks
    pub preconditions: Preconditions,
    /// Ordered actions
    pub steps: Vec<String>,
    /// Verification command and expected result
    pub done_when: Option<String>,
    /// Size estimate
    pub sizing: Sizing,
    /// Free-text parallelism note
    pub parallel: Option<String>,
    /// 1-based line of the task heading (0 when built in code)
    pub line: usize,
}

impl Task {
    /// Create a task with only id and title set
    #[must_use]
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            files: Vec::new(),
            preconditions: Preconditions::Undeclared,
            steps: Vec::new(),
            done_when: None,
            sizing: Sizing::Missing,
            parallel: None,
            line: 0,
        }
    }

    /// With touched file
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Depends on another task
    #[must_use]
    pub fn depends_on(mut self, id: impl Into<TaskId>) -> Self {
        let id = id.into();
        match &mut self.preconditions {
            Preconditions::Tasks(ids) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            other => *other = Preconditions::Tasks(vec![id]),
        }
        self
    }

    /// Explicitly has no preconditions
    #[must_use]
    pub fn without_preconditions(mut self) -> Self {
        self.preconditions = Preconditions::None;
        self
    }

    /// With step
    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    /// With verification command
    #[must_use]
    pub fn done_when(mut self, check: impl Into<String>) -> Self {
        self.done_when = Some(check.into());
        self
    }

    /// With complexity
    #[must_use]
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.sizing = Sizing::Sized(complexity);
        self
    }

    /// With parallelism note
    #[must_use]
    pub fn with_parallel(mut self, note: impl Into<String>) -> Self {
        self.parallel = Some(note.into());
        self
    }
}

/// Ordered collection of tasks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPlan {
    /// Name from the `# Task Plan: <name>` heading, if present
    pub title: Option<String>,
    /// Tasks in document order
    pub tasks: Vec<Task>,
}

impl TaskPlan {
    /// Create a plan from tasks in order
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { title: None, tasks }
    }

    /// With plan title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of tasks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the plan has no tasks
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task by id
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Whether a task with this id exists
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Task ids in document order
    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().map(|t| t.id)
    }
}
