//! Error types for taskplan
//!
//! Provides error handling for:
//! - Parsing task plan documents (fail fast)
//! - Loading validator configuration
//! - Reading decomposition objectives
//! - Writing reports and generated documents
//!
//! Rule violations are not errors: they are collected into a
//! [`ValidationReport`](crate::report::ValidationReport).

use crate::types::TaskId;
use std::path::PathBuf;

/// Errors while parsing a task plan document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Document contains no `### Task <n>: <title>` headings
    #[error("no tasks found in the plan")]
    NoTasks,

    /// Two tasks share an id
    #[error("duplicate {id} at line {line} (first defined at line {first_line})")]
    DuplicateTask {
        id: TaskId,
        line: usize,
        first_line: usize,
    },

    /// Heading looks like a task but is missing the `:` title separator
    #[error("malformed task heading at line {line}: '{heading}' (expected 'Task <n>: <title>')")]
    MalformedHeading { line: usize, heading: String },

    /// Task number does not fit the id type
    #[error("invalid task number '{value}' at line {line}")]
    InvalidTaskId { line: usize, value: String },
}

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`ValidationConfig`](crate::config::ValidationConfig)
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Config values are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors while reading a decomposition objective
#[derive(Debug, thiserror::Error)]
pub enum ObjectiveError {
    /// IO error reading the objective file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Objective file is not valid JSON
    #[error("invalid objective {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while writing output files
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error writing a file or creating the output directory
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding failed
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl OutputError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Combined taskplan error
#[derive(Debug, thiserror::Error)]
pub enum TaskPlanError {
    /// Plan document is malformed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Validator configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Objective could not be read
    #[error("objective error: {0}")]
    Objective(#[from] ObjectiveError),

    /// Generated files could not be written
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// IO error reading the plan document
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for taskplan operations
pub type Result<T> = std::result::Result<T, TaskPlanError>;
