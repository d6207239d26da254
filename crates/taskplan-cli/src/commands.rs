//! Subcommand handlers

use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskplan_core::{
    parse_plan_file, Complexity, Objective, OutputWriter, PlanFormat, PlanRequest, PlanValidator,
    ReportFormat, Strategy, TaskDecomposer, ValidationConfig, CONFIG_FILE_NAME,
};

/// Exit code when the plan has rule violations
const EXIT_VIOLATIONS: u8 = 1;

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn string_list(args: &ArgMatches, name: &str) -> Vec<String> {
    args.get_many::<String>(name)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn required<'a, T: Clone + Send + Sync + 'static>(args: &'a ArgMatches, name: &str) -> Result<&'a T> {
    args.get_one::<T>(name)
        .with_context(|| format!("missing value for --{name}"))
}

/// Explicit `--config`, else `taskplan.toml` beside the plan, else defaults
fn load_config(explicit: Option<&PathBuf>, plan: &Path) -> Result<ValidationConfig> {
    let path = match explicit {
        Some(path) => Some(path.clone()),
        None => plan
            .parent()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|candidate| candidate.is_file()),
    };

    match path {
        Some(path) => ValidationConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ValidationConfig::default()),
    }
}

/// `taskplan validate`
pub(crate) fn validate(args: &ArgMatches) -> Result<ExitCode> {
    let plan_path = required::<PathBuf>(args, "plan")?;
    let format: ReportFormat = required::<String>(args, "format")?
        .parse()
        .map_err(anyhow::Error::msg)?;

    let mut config = load_config(args.get_one::<PathBuf>("config"), plan_path)?;
    if let Some(&max) = args.get_one::<usize>("max-files") {
        config = config.with_max_files(max);
    }
    if args.get_flag("strict-files") {
        config = config.with_strict_file_limit(true);
    }
    config.check().context("invalid validator settings")?;

    let plan = parse_plan_file(plan_path)
        .with_context(|| format!("failed to parse {}", plan_path.display()))?;
    let report = PlanValidator::with_config(config)
        .validate(&plan)
        .with_source(plan_path.display().to_string());

    print!("{}", report.render(format).context("failed to render report")?);
    if format == ReportFormat::Json {
        println!();
    }

    if let Some(dir) = args.get_one::<PathBuf>("output-dir") {
        let written = OutputWriter::new(dir)
            .write_validation(&report)
            .context("failed to write reports")?;
        eprintln!("Reports: {}", written.manifest.display());
    }

    Ok(if report.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_VIOLATIONS)
    })
}

/// `taskplan decompose`
pub(crate) fn decompose(args: &ArgMatches) -> Result<ExitCode> {
    let objective = match args.get_one::<PathBuf>("input") {
        Some(path) => Objective::load(path)
            .with_context(|| format!("failed to read objective {}", path.display()))?,
        None => {
            let strategy: Strategy = required::<String>(args, "strategy")?
                .parse()
                .map_err(anyhow::Error::msg)?;
            let mut objective = Objective::new(
                required::<String>(args, "feature-name")?.clone(),
                required::<String>(args, "objective")?.clone(),
            )
            .with_strategy(strategy);
            objective.layers = string_list(args, "layers");
            objective
        }
    };

    let plan = TaskDecomposer::new().decompose(&objective);
    let dir = required::<PathBuf>(args, "output-dir")?;
    let written = OutputWriter::new(dir)
        .write_decomposition(&objective, &plan, today())
        .context("failed to write task plan")?;

    println!("Task plan generated successfully in {}", dir.display());
    for path in written.files.iter().chain(std::iter::once(&written.manifest)) {
        println!("  - {}", path.display());
    }
    println!("  Total tasks: {}", plan.len());
    Ok(ExitCode::SUCCESS)
}

/// `taskplan plan`
pub(crate) fn plan(args: &ArgMatches) -> Result<ExitCode> {
    let complexity: Complexity = required::<String>(args, "complexity")?.parse()?;
    let format: PlanFormat = required::<String>(args, "format")?
        .parse()
        .map_err(anyhow::Error::msg)?;

    let mut request = PlanRequest::new(
        required::<String>(args, "feature")?.clone(),
        required::<String>(args, "objective")?.clone(),
    )
    .with_complexity(complexity)
    .with_author(required::<String>(args, "author")?.clone())
    .with_migration(args.get_flag("has-migration"))
    .with_rsc(args.get_flag("has-rsc"));
    request.backend_files = string_list(args, "backend-files");
    request.frontend_files = string_list(args, "frontend-files");
    request.tasks = string_list(args, "tasks");
    request.risks = string_list(args, "risks");

    let dir = required::<PathBuf>(args, "output-dir")?;
    let written = OutputWriter::new(dir)
        .write_implementation_plan(&request, format, today())
        .context("failed to write implementation plan")?;

    for path in &written.files {
        println!("Plan written to: {}", path.display());
    }
    println!("Manifest written to: {}", written.manifest.display());
    Ok(ExitCode::SUCCESS)
}
