//! End-to-end validation tests
//!
//! Markdown in, report out.

use pretty_assertions::assert_eq;
use taskplan_core::prelude::*;
use taskplan_core::{ParseError, ReportFormat};
use taskplan_test_utils::{
    chain_plan, render_plan_markdown, sample_plan_markdown, CYCLIC_PLAN, MINIMAL_SIZING_PLAN,
    MISSING_COMPLEXITY_PLAN, UNKNOWN_REFERENCE_PLAN,
};

fn validate_markdown(content: &str) -> ValidationReport {
    let plan = parse_plan(content).unwrap();
    validate_plan(&plan)
}

#[test]
fn test_well_formed_plan_passes() {
    let report = validate_markdown(&sample_plan_markdown());

    assert!(report.passed, "{:#?}", report.errors);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
    assert_eq!(report.total_tasks, 3);
    assert_eq!(report.plan_title.as_deref(), Some("Sample"));
}

#[test]
fn test_missing_complexity_is_the_only_violation() {
    let report = validate_markdown(MISSING_COMPLEXITY_PLAN);

    assert!(!report.passed);
    assert_eq!(report.errors.len(), 1);
    assert!(report.warnings.is_empty());

    let finding = &report.errors[0];
    assert_eq!(finding.rule, Rule::Complexity);
    assert_eq!(finding.tasks, vec![TaskId(3)]);
    assert_eq!(finding.message, "Task 3: Missing complexity sizing.");
}

#[test]
fn test_minimal_plan_reports_only_missing_complexity() {
    let report = validate_markdown(MINIMAL_SIZING_PLAN);

    assert!(!report.passed);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].rule, Rule::Complexity);
    assert_eq!(report.errors[0].tasks, vec![TaskId(3)]);
    assert!(report
        .warnings
        .iter()
        .all(|w| matches!(w.rule, Rule::Files | Rule::Steps)));
}

#[test]
fn test_nested_file_list_counts_toward_scope() {
    let plan = "\
# Task Plan: Wide

### Task 1: Add user feature
- **Files:**
  - `app/models/user.py`
  - `app/schemas/user.py`
  - `app/repositories/user.py`
  - `app/services/user.py`
  - `app/routers/users.py`
- **Preconditions:** none
- **Steps:**
  1. Add everything
- **Done when:** `pytest` passes
- **Complexity:** large
";
    let report = validate_markdown(plan);

    assert!(report.passed);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].rule, Rule::AtomicScope);
    assert_eq!(
        report.warnings[0].message,
        "Task 1: Touches 5 files (max 3). Split this task."
    );
}

#[test]
fn test_done_when_on_following_line_passes() {
    let plan = "\
# Task Plan: Verify

### Task 1: Add model
- **Files:** `app/models/user.py`
- **Preconditions:** none
- **Steps:**
  1. Add the model
- **Done when:**
  `pytest tests/models` passes
- **Complexity:** small
";
    let report = validate_markdown(plan);

    assert!(report.passed, "{:#?}", report.errors);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_shared_task_keyword_keeps_every_dependency() {
    let plan = CYCLIC_PLAN.replace(
        "- **Preconditions:** Task 1, Task 3",
        "- **Preconditions:** Tasks 1 and 3",
    );
    let report = validate_markdown(&plan);
    assert_eq!(report.findings_for(Rule::Acyclic).count(), 1);

    let plan = UNKNOWN_REFERENCE_PLAN.replace(
        "- **Preconditions:** Task 7",
        "- **Preconditions:** Task 1, 7",
    );
    let report = validate_markdown(&plan);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].rule, Rule::UnknownReference);
    assert!(report.errors[0].message.contains("Task 7"));
}

#[test]
fn test_cycle_fails_and_names_members() {
    let report = validate_markdown(CYCLIC_PLAN);

    assert!(!report.passed);
    let cycles: Vec<&Finding> = report.findings_for(Rule::Acyclic).collect();
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].involves(TaskId(2)));
    assert!(cycles[0].involves(TaskId(3)));
    assert!(!cycles[0].involves(TaskId(1)));
    assert!(report.execution_waves.is_none());
}

#[test]
fn test_unknown_reference_is_reported_by_id() {
    let report = validate_markdown(UNKNOWN_REFERENCE_PLAN);

    assert!(!report.passed);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].rule, Rule::UnknownReference);
    assert!(report.errors[0].message.contains("Task 7"));
}

#[test]
fn test_unrecognized_complexity_names_task() {
    let plan = MISSING_COMPLEXITY_PLAN.replace(
        "- **Complexity:** trivial",
        "- **Complexity:** enormous",
    );
    let report = validate_markdown(&plan);

    let sizing: Vec<&Finding> = report.findings_for(Rule::Complexity).collect();
    assert_eq!(sizing.len(), 2);
    assert_eq!(sizing[0].tasks, vec![TaskId(2)]);
    assert!(sizing[0].message.contains("'enormous'"));
    assert_eq!(sizing[1].tasks, vec![TaskId(3)]);
}

#[test]
fn test_validation_is_idempotent() {
    let plan = parse_plan(CYCLIC_PLAN).unwrap();
    let validator = PlanValidator::new();

    for format in [ReportFormat::Text, ReportFormat::Json, ReportFormat::Markdown] {
        let first = validator.validate(&plan).render(format).unwrap();
        let second = validator.validate(&plan).render(format).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_validation_does_not_modify_plan() {
    let plan = parse_plan(UNKNOWN_REFERENCE_PLAN).unwrap();
    let before = plan.clone();
    let _ = validate_plan(&plan);
    assert_eq!(plan, before);
}

#[test]
fn test_parse_errors_fail_fast() {
    assert!(matches!(
        parse_plan("# Empty plan\n\nNothing here.\n"),
        Err(ParseError::NoTasks)
    ));

    let duplicated = format!(
        "{}\n### Task 2: Again\n- **Complexity:** small\n",
        sample_plan_markdown()
    );
    assert!(matches!(
        parse_plan(&duplicated),
        Err(ParseError::DuplicateTask { id: TaskId(2), .. })
    ));
}

#[test]
fn test_execution_waves_for_diamond() {
    let tasks = vec![
        taskplan_test_utils::complete_task(1).without_preconditions(),
        taskplan_test_utils::complete_task(2).depends_on(1),
        taskplan_test_utils::complete_task(3).depends_on(1),
        taskplan_test_utils::complete_task(4).depends_on(2).depends_on(3),
    ];
    let report = validate_markdown(&render_plan_markdown("Diamond", &tasks));

    assert!(report.passed);
    assert_eq!(
        report.execution_waves,
        Some(vec![
            vec![TaskId(1)],
            vec![TaskId(2), TaskId(3)],
            vec![TaskId(4)],
        ])
    );
    assert!(report
        .render_text()
        .contains("Execution waves:\n  1: Task 1\n  2: Task 2, Task 3\n  3: Task 4\n"));
}

#[test]
fn test_strict_file_limit_from_config() {
    let task = taskplan_test_utils::complete_task(1)
        .with_file("src/a.rs")
        .with_file("src/b.rs");
    let plan = parse_plan(&render_plan_markdown("Wide", &[task])).unwrap();

    let lenient = PlanValidator::with_config(ValidationConfig::new().with_max_files(2));
    assert!(lenient.validate(&plan).passed);

    let strict = PlanValidator::with_config(
        ValidationConfig::new()
            .with_max_files(2)
            .with_strict_file_limit(true),
    );
    let report = strict.validate(&plan);
    assert!(!report.passed);
    assert_eq!(report.errors[0].rule, Rule::AtomicScope);
}

#[test]
fn test_rendered_plan_round_trips_through_parser() {
    let original = chain_plan(4);
    let parsed = parse_plan(&render_plan_markdown("Chain", &original.tasks)).unwrap();

    assert_eq!(parsed.len(), 4);
    for (a, b) in original.tasks.iter().zip(&parsed.tasks) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.title, b.title);
        assert_eq!(a.files, b.files);
        assert_eq!(a.preconditions, b.preconditions);
        assert_eq!(a.steps, b.steps);
        assert_eq!(a.sizing, b.sizing);
    }
}
