//! Task plan parsers
//!
//! Converts a Markdown task plan into a [`TaskPlan`]:
//! - Heading structure via pulldown-cmark ([`MarkdownPlanParser`])
//! - Bold-labelled task fields via regex ([`fields`])
//!
//! Structural problems (no tasks, duplicate ids, malformed task headings)
//! fail fast with a [`ParseError`]. Everything else is left for the
//! validator to report.

use crate::error::{ParseError, TaskPlanError};
use crate::types::TaskPlan;
use std::path::Path;

pub mod fields;
mod markdown;

pub use markdown::MarkdownPlanParser;

/// Parse task plan content with the default Markdown parser
pub fn parse_plan(content: &str) -> Result<TaskPlan, ParseError> {
    MarkdownPlanParser::new().parse(content)
}

/// Read and parse a task plan file
pub fn parse_plan_file(path: &Path) -> crate::error::Result<TaskPlan> {
    let content = std::fs::read_to_string(path).map_err(|source| TaskPlanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(parse_plan(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plan_file_reports_missing_file() {
        let err = parse_plan_file(Path::new("/nonexistent/task_plan.md")).unwrap_err();
        assert!(matches!(err, TaskPlanError::Io { .. }));
    }
}
