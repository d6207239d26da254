//! `taskplan` - validate and generate Markdown task plans
//!
//! Exit codes: 0 plan passes (or files generated), 1 rule violations,
//! 2 parse, config or I/O failure.

mod commands;

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use taskplan_core::output::{DEFAULT_PLAN_OUTPUT_DIR, DEFAULT_TASK_OUTPUT_DIR};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for parse, config and I/O failures
const EXIT_FAILURE: u8 = 2;

fn build_cli() -> Command {
    Command::new("taskplan")
        .version(taskplan_core::VERSION)
        .about("Validate and generate Markdown implementation task plans")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a task plan against the decomposition rules")
                .arg(
                    Arg::new("plan")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to the task_plan.md file"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("text")
                        .value_parser(["text", "json", "markdown"])
                        .help("Report format printed to stdout"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Also write JSON and Markdown reports plus a manifest here"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Validator config (default: taskplan.toml next to the plan)"),
                )
                .arg(
                    Arg::new("strict-files")
                        .long("strict-files")
                        .action(ArgAction::SetTrue)
                        .help("Treat tasks over the file limit as errors"),
                )
                .arg(
                    Arg::new("max-files")
                        .long("max-files")
                        .value_parser(value_parser!(usize))
                        .help("Maximum files per task"),
                ),
        )
        .subcommand(
            Command::new("decompose")
                .about("Break an objective into a sequential task plan")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with the objective"),
                )
                .arg(
                    Arg::new("objective")
                        .short('o')
                        .long("objective")
                        .help("Brief objective description (alternative to --input)"),
                )
                .group(
                    ArgGroup::new("source")
                        .args(["input", "objective"])
                        .required(true),
                )
                .arg(
                    Arg::new("feature-name")
                        .short('n')
                        .long("feature-name")
                        .default_value("Unnamed Feature")
                        .help("Name of the feature being decomposed"),
                )
                .arg(
                    Arg::new("strategy")
                        .short('s')
                        .long("strategy")
                        .default_value("layer-based")
                        .value_parser(["layer-based", "feature-first", "migration"])
                        .help("Decomposition strategy"),
                )
                .arg(
                    Arg::new("layers")
                        .long("layers")
                        .num_args(1..)
                        .help("Layers touched, for the layer-based strategy"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .default_value(DEFAULT_TASK_OUTPUT_DIR)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory for generated files"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Generate an implementation plan document")
                .arg(
                    Arg::new("feature")
                        .required(true)
                        .help("Name of the feature to plan"),
                )
                .arg(
                    Arg::new("objective")
                        .long("objective")
                        .required(true)
                        .help("One-sentence objective statement"),
                )
                .arg(
                    Arg::new("complexity")
                        .long("complexity")
                        .default_value("medium")
                        .value_parser(["trivial", "small", "medium", "large"])
                        .help("Overall complexity estimate"),
                )
                .arg(
                    Arg::new("author")
                        .long("author")
                        .default_value("auto-generated")
                        .help("Plan author name"),
                )
                .arg(list_arg("backend-files", "Backend file paths affected"))
                .arg(list_arg("frontend-files", "Frontend file paths affected"))
                .arg(list_arg("tasks", "Task titles in execution order"))
                .arg(list_arg("risks", "Risk descriptions"))
                .arg(
                    Arg::new("has-migration")
                        .long("has-migration")
                        .action(ArgAction::SetTrue)
                        .help("Feature involves a database migration"),
                )
                .arg(
                    Arg::new("has-rsc")
                        .long("has-rsc")
                        .action(ArgAction::SetTrue)
                        .help("Feature involves React Server Components"),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .default_value(DEFAULT_PLAN_OUTPUT_DIR)
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory for generated files"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("both")
                        .value_parser(["markdown", "json", "both"])
                        .help("Which plan files to write"),
                ),
        )
}

fn list_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).num_args(0..).help(help)
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("taskplan=debug,taskplan_core=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("validate", args)) => commands::validate(args),
        Some(("decompose", args)) => commands::decompose(args),
        Some(("plan", args)) => commands::plan(args),
        _ => unreachable!("subcommand is required"),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
