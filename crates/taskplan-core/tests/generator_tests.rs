//! Generated documents must be accepted by the parser and validator

use chrono::NaiveDate;
use taskplan_core::prelude::*;
use taskplan_core::{
    render_progress, render_task_plan, Objective, OutputWriter, PlanFormat, PlanRequest, Strategy,
    TaskDecomposer,
};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn generate_and_validate(objective: &Objective) -> ValidationReport {
    let plan = TaskDecomposer::new().decompose(objective);
    let markdown = render_task_plan(&plan, objective, date());
    let parsed = parse_plan(&markdown).unwrap();
    assert_eq!(parsed.len(), plan.len());
    assert_eq!(parsed.title.as_deref(), Some(objective.feature_name.as_str()));
    validate_plan(&parsed)
}

#[test]
fn test_layer_based_plan_validates() {
    let objective = Objective::new("User Search", "Add search to the user list")
        .with_layer("router")
        .with_layer("model")
        .with_layer("component")
        .with_constraint("No new dependencies");
    let report = generate_and_validate(&objective);

    assert!(report.passed, "{:#?}", report.errors);
    assert!(report.warnings.is_empty());
    assert_eq!(report.execution_waves.map(|w| w.len()), Some(3));
}

#[test]
fn test_feature_first_plan_validates() {
    let objective = Objective::new("Billing", "Add invoices").with_strategy(Strategy::FeatureFirst);
    assert!(generate_and_validate(&objective).passed);
}

#[test]
fn test_migration_plan_validates() {
    let objective = Objective::new("Auth", "Move to OAuth").with_strategy(Strategy::Migration);
    let report = generate_and_validate(&objective);
    assert!(report.passed);
    assert_eq!(report.total_tasks, 3);
}

#[test]
fn test_fallback_plan_warns_about_placeholder() {
    let report = generate_and_validate(&Objective::new("Search", "Add search"));

    assert!(report.passed);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].rule, Rule::Verifiable);
}

#[test]
fn test_implementation_plan_tasks_validate() {
    let request = PlanRequest::new("User Search", "Add search")
        .with_backend_file("app/repositories/user.py")
        .with_task("Add repository search")
        .with_task("Expose search endpoint")
        .with_task("Add search box")
        .with_risk("Slow LIKE queries")
        .with_migration(true);
    let plan = parse_plan(&request.render_markdown(date())).unwrap();

    assert_eq!(plan.title.as_deref(), Some("Implementation Plan: User Search"));
    assert_eq!(plan.len(), 3);
    let report = validate_plan(&plan);
    assert!(report.passed, "{:#?}", report.errors);

    // Template verification text still needs filling in
    assert_eq!(report.warnings.len(), 3);
    assert!(report.warnings.iter().all(|w| w.rule == Rule::Verifiable));
}

#[test]
fn test_progress_tracks_first_task() {
    let objective = Objective::new("Search", "x").with_strategy(Strategy::Migration);
    let plan = TaskDecomposer::new().decompose(&objective);
    let progress = render_progress(&plan, date());

    assert!(progress.contains("Task 1: Implement new path alongside old path"));
    assert!(progress.contains("- [ ] Task 3: Switch to new path and remove old path"));
}

#[test]
fn test_written_task_plan_validates() {
    let dir = tempfile::tempdir().unwrap();
    let objective = Objective::new("Search", "x")
        .with_layer("service")
        .with_layer("repository");
    let plan = TaskDecomposer::new().decompose(&objective);

    let written = OutputWriter::new(dir.path())
        .write_decomposition(&objective, &plan, date())
        .unwrap();
    assert_eq!(written.files.len(), 2);

    let parsed = taskplan_core::parse_plan_file(&dir.path().join("task_plan.md")).unwrap();
    assert_eq!(parsed.tasks[0].title, "Implement repository layer");
    assert!(validate_plan(&parsed).passed);
}

#[test]
fn test_plan_outputs_both_formats() {
    let dir = tempfile::tempdir().unwrap();
    let request = PlanRequest::new("Dark Mode", "Add a theme toggle").with_task("Add toggle");

    let written = OutputWriter::new(dir.path())
        .write_implementation_plan(&request, PlanFormat::Both, date())
        .unwrap();

    assert_eq!(written.files.len(), 2);
    assert!(dir.path().join("plan-dark-mode.md").exists());
    assert!(dir.path().join("plan-dark-mode.json").exists());
    assert!(dir.path().join("manifest.json").exists());
}
