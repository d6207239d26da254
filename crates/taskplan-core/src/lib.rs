//! taskplan core - Markdown task plan validation
//!
//! Reads implementation task plans written in Markdown and checks them
//! against the decomposition rules:
//! - Parses `### Task <n>: <title>` sections and their bold-labelled fields
//! - Validates scope, preconditions, verification, sizing and acyclicity
//! - Groups tasks into parallel execution waves
//! - Generates task plans and implementation plans from objectives
//!
//! # Example
//!
//! ```rust
//! use taskplan_core::{parse_plan, PlanValidator};
//!
//! let plan = parse_plan(
//!     "### Task 1: Add model\n\
//!      - **Files:** `app/models/user.py`\n\
//!      - **Preconditions:** none\n\
//!      - **Steps:**\n  1. Add the model\n\
//!      - **Done when:** `pytest tests/models` passes\n\
//!      - **Complexity:** small\n",
//! )?;
//!
//! let report = PlanValidator::new().validate(&plan);
//! assert!(report.passed);
//! # Ok::<(), taskplan_core::ParseError>(())
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod decompose;
pub mod error;
pub mod graph;
pub mod implementation_plan;
pub mod output;
pub mod parser;
pub mod report;
pub mod types;
pub mod validator;

// Re-exports for convenience
pub use config::{ValidationConfig, CONFIG_FILE_NAME};
pub use decompose::{render_progress, render_task_plan, Objective, Strategy, TaskDecomposer};
pub use error::{
    ConfigError, ObjectiveError, OutputError, ParseError, Result, TaskPlanError,
};
pub use graph::{Cycle, PreconditionGraph, UnknownReference};
pub use implementation_plan::{PlanDocument, PlanFormat, PlanRequest};
pub use output::{Manifest, OutputWriter, WrittenOutputs};
pub use parser::{parse_plan, parse_plan_file, MarkdownPlanParser};
pub use report::{Finding, ReportFormat, Rule, Severity, ValidationReport};
pub use types::{Complexity, Preconditions, Sizing, Task, TaskId, TaskPlan};
pub use validator::{validate_plan, PlanValidator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with task plans
    pub use crate::{
        parse_plan, validate_plan, Complexity, Finding, PlanValidator, Rule, Severity, Task,
        TaskId, TaskPlan, ValidationConfig, ValidationReport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
