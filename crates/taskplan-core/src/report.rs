//! Validation reports
//!
//! A [`ValidationReport`] is the only output of validation. It renders to
//! plain text (terminal), Markdown and JSON. Rendering is deterministic: no
//! timestamps, findings in validator order, so validating an unchanged plan
//! twice yields byte-identical output.

use crate::types::TaskId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Does not fail the plan
    Warning,
    /// Fails the plan
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// Rule a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Heading has a title
    Title,
    /// Task touches few enough files
    AtomicScope,
    /// Task lists its files
    Files,
    /// Task declares preconditions (or "none")
    Preconditions,
    /// Preconditions refer to tasks in the plan
    UnknownReference,
    /// Task has numbered steps
    Steps,
    /// Task has a verification command
    Verifiable,
    /// Task has a recognized complexity
    Complexity,
    /// Precondition graph has no cycles
    Acyclic,
}

impl Rule {
    /// Stable snake_case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Title => "title",
            Rule::AtomicScope => "atomic_scope",
            Rule::Files => "files",
            Rule::Preconditions => "preconditions",
            Rule::UnknownReference => "unknown_reference",
            Rule::Steps => "steps",
            Rule::Verifiable => "verifiable",
            Rule::Complexity => "complexity",
            Rule::Acyclic => "acyclic",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single rule violation or warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule that produced the finding
    pub rule: Rule,
    /// Error or warning
    pub severity: Severity,
    /// Offending task ids
    pub tasks: Vec<TaskId>,
    /// Human-readable reason
    pub message: String,
}

impl Finding {
    /// Create finding for one task
    pub fn for_task(rule: Rule, severity: Severity, task: TaskId, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity,
            tasks: vec![task],
            message: message.into(),
        }
    }

    /// Whether the finding names a task
    #[must_use]
    pub fn involves(&self, task: TaskId) -> bool {
        self.tasks.contains(&task)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// Output format for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Terminal summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Markdown document
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}

/// Result of validating a task plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Path or label of the validated document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Plan title, if the document has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_title: Option<String>,
    /// Number of tasks checked
    pub total_tasks: usize,
    /// True when there are no errors
    pub passed: bool,
    /// Rule violations
    pub errors: Vec<Finding>,
    /// Non-fatal findings
    pub warnings: Vec<Finding>,
    /// Parallel execution waves (only when dependencies resolve and are acyclic)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_waves: Option<Vec<Vec<TaskId>>>,
}

impl ValidationReport {
    /// Build a report from findings, splitting them by severity
    #[must_use]
    pub fn from_findings(total_tasks: usize, findings: Vec<Finding>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = findings
            .into_iter()
            .partition(|f| f.severity == Severity::Error);
        Self {
            source: None,
            plan_title: None,
            total_tasks,
            passed: errors.is_empty(),
            errors,
            warnings,
            execution_waves: None,
        }
    }

    /// With source label
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// "PASS" or "FAIL"
    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }

    /// All findings for a rule
    pub fn findings_for(&self, rule: Rule) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |f| f.rule == rule)
    }

    /// Render in the requested format
    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Markdown => Ok(self.render_markdown()),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Terminal summary
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Validation {}\n",
            if self.passed { "PASSED" } else { "FAILED" }
        ));
        if let Some(source) = &self.source {
            out.push_str(&format!("  File: {source}\n"));
        }
        if let Some(title) = &self.plan_title {
            out.push_str(&format!("  Plan: {title}\n"));
        }
        out.push_str(&format!("  Tasks: {}\n", self.total_tasks));
        out.push_str(&format!("  Errors: {}\n", self.errors.len()));
        out.push_str(&format!("  Warnings: {}\n", self.warnings.len()));

        if !self.errors.is_empty() {
            out.push_str("\nErrors:\n");
            for finding in &self.errors {
                out.push_str(&format!("  - {finding}\n"));
            }
        }
        if !self.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for finding in &self.warnings {
                out.push_str(&format!("  - {finding}\n"));
            }
        }
        if let Some(waves) = &self.execution_waves {
            out.push_str("\nExecution waves:\n");
            for (i, wave) in waves.iter().enumerate() {
                out.push_str(&format!("  {}: {}\n", i + 1, join_ids(wave)));
            }
        }

        out
    }

    /// Markdown report document
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut lines: Vec<String> = vec!["# Task Plan Validation Report".to_string(), String::new()];

        if let Some(source) = &self.source {
            lines.push(format!("**File:** {source}"));
        }
        if let Some(title) = &self.plan_title {
            lines.push(format!("**Plan:** {title}"));
        }
        lines.push(format!("**Status:** {}", self.status()));
        lines.push(format!("**Tasks:** {}", self.total_tasks));
        lines.push(format!("**Errors:** {}", self.errors.len()));
        lines.push(format!("**Warnings:** {}", self.warnings.len()));
        lines.push(String::new());

        for (heading, findings) in [("Errors", &self.errors), ("Warnings", &self.warnings)] {
            if findings.is_empty() {
                continue;
            }
            lines.push(format!("## {heading}"));
            lines.push(String::new());
            for finding in findings {
                lines.push(format!("- **[{}]** {}", finding.rule, finding.message));
            }
            lines.push(String::new());
        }

        if let Some(waves) = &self.execution_waves {
            lines.push("## Execution Waves".to_string());
            lines.push(String::new());
            for (i, wave) in waves.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, join_ids(wave)));
            }
            lines.push(String::new());
        }

        if self.passed && self.warnings.is_empty() {
            lines.push("All tasks pass validation rules.".to_string());
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
