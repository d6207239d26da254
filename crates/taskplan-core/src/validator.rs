//! Task plan validator
//!
//! Checks a parsed [`TaskPlan`] against the decomposition rules and collects
//! every finding instead of stopping at the first one. The plan is never
//! modified.
//!
//! Per-task rules run in document order, then the graph-wide cycle check:
//! 1. Title present
//! 2. Atomic scope (file count)
//! 3. Files listed
//! 4. Preconditions declared (every task after the first)
//! 5. Preconditions resolve to existing tasks
//! 6. Steps present
//! 7. Verification command present and not a placeholder
//! 8. Complexity recognized
//! 9. Precondition graph acyclic

use crate::config::ValidationConfig;
use crate::graph::PreconditionGraph;
use crate::report::{Finding, Rule, Severity, ValidationReport};
use crate::types::{Complexity, Preconditions, Sizing, Task, TaskPlan};

/// Rule-based task plan validator
#[derive(Debug, Clone, Default)]
pub struct PlanValidator {
    config: ValidationConfig,
}

impl PlanValidator {
    /// Create validator with default rules
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create validator with custom configuration
    #[inline]
    #[must_use]
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a plan
    #[must_use]
    pub fn validate(&self, plan: &TaskPlan) -> ValidationReport {
        let graph = PreconditionGraph::build(plan);
        let mut findings = Vec::new();

        for (index, task) in plan.tasks.iter().enumerate() {
            Self::check_title(task, &mut findings);
            self.check_scope(task, &mut findings);
            Self::check_preconditions(task, index == 0, &mut findings);
            for unknown in graph
                .unknown_references()
                .iter()
                .filter(|u| u.task == task.id)
            {
                findings.push(Finding::for_task(
                    Rule::UnknownReference,
                    Severity::Error,
                    task.id,
                    format!(
                        "{}: References {} which does not exist.",
                        task.id, unknown.missing
                    ),
                ));
            }
            self.check_steps(task, &mut findings);
            self.check_verification(task, &mut findings);
            Self::check_complexity(task, &mut findings);
        }

        let cycles = graph.cycles();
        for cycle in &cycles {
            let path: Vec<String> = cycle.path.iter().map(ToString::to_string).collect();
            findings.push(Finding {
                rule: Rule::Acyclic,
                severity: Severity::Error,
                tasks: cycle.members.clone(),
                message: format!("Circular dependency detected: {}", path.join(" -> ")),
            });
        }

        let mut report = ValidationReport::from_findings(plan.len(), findings);
        report.plan_title = plan.title.clone();
        if cycles.is_empty() && graph.unknown_references().is_empty() {
            report.execution_waves = graph.execution_waves();
        }

        tracing::info!(
            "Validated {} tasks: {} errors, {} warnings",
            report.total_tasks,
            report.errors.len(),
            report.warnings.len()
        );
        report
    }

    fn check_title(task: &Task, findings: &mut Vec<Finding>) {
        if task.title.trim().is_empty() {
            findings.push(Finding::for_task(
                Rule::Title,
                Severity::Error,
                task.id,
                format!("{}: Missing title.", task.id),
            ));
        }
    }

    fn check_scope(&self, task: &Task, findings: &mut Vec<Finding>) {
        let count = task.files.len();
        if count > self.config.max_files_per_task {
            findings.push(Finding::for_task(
                Rule::AtomicScope,
                self.config.file_limit_severity,
                task.id,
                format!(
                    "{}: Touches {} files (max {}). Split this task.",
                    task.id, count, self.config.max_files_per_task
                ),
            ));
        }
        if count == 0 && self.config.require_files {
            findings.push(Finding::for_task(
                Rule::Files,
                Severity::Warning,
                task.id,
                format!("{}: No files listed.", task.id),
            ));
        }
    }

    fn check_preconditions(task: &Task, is_first: bool, findings: &mut Vec<Finding>) {
        match &task.preconditions {
            Preconditions::Undeclared if !is_first => {
                findings.push(Finding::for_task(
                    Rule::Preconditions,
                    Severity::Error,
                    task.id,
                    format!(
                        "{}: No preconditions declared. List prerequisite tasks or state 'none'.",
                        task.id
                    ),
                ));
            }
            Preconditions::Unresolved(text) => {
                findings.push(Finding::for_task(
                    Rule::Preconditions,
                    Severity::Error,
                    task.id,
                    format!(
                        "{}: Preconditions '{}' do not reference any task. Use 'Task <n>' or 'none'.",
                        task.id, text
                    ),
                ));
            }
            _ => {}
        }
    }

    fn check_steps(&self, task: &Task, findings: &mut Vec<Finding>) {
        if task.steps.is_empty() && self.config.require_steps {
            findings.push(Finding::for_task(
                Rule::Steps,
                Severity::Warning,
                task.id,
                format!("{}: No steps found. Add concrete action steps.", task.id),
            ));
        }
    }

    fn check_verification(&self, task: &Task, findings: &mut Vec<Finding>) {
        match task.done_when.as_deref().map(str::trim) {
            None | Some("") => findings.push(Finding::for_task(
                Rule::Verifiable,
                Severity::Error,
                task.id,
                format!("{}: Missing 'Done when' verification command.", task.id),
            )),
            Some(value) if self.config.is_placeholder(value) => findings.push(Finding::for_task(
                Rule::Verifiable,
                Severity::Warning,
                task.id,
                format!(
                    "{}: 'Done when' is placeholder ({}). Needs a concrete command.",
                    task.id, value
                ),
            )),
            Some(_) => {}
        }
    }

    fn check_complexity(task: &Task, findings: &mut Vec<Finding>) {
        let message = match &task.sizing {
            Sizing::Sized(_) => return,
            Sizing::Missing => format!("{}: Missing complexity sizing.", task.id),
            Sizing::Unrecognized(raw) => format!(
                "{}: Complexity '{}' not standard. Use: {}",
                task.id,
                raw,
                Complexity::accepted_values()
            ),
        };
        findings.push(Finding::for_task(
            Rule::Complexity,
            Severity::Error,
            task.id,
            message,
        ));
    }
}

/// Validate with default rules
#[must_use]
pub fn validate_plan(plan: &TaskPlan) -> ValidationReport {
    PlanValidator::new().validate(plan)
}
