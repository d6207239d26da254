//! Task decomposition
//!
//! Decomposes a high-level [`Objective`] into a [`TaskPlan`] using one of
//! three strategies, and renders the plan and its progress tracker as
//! Markdown in the same format the parser reads.

use crate::error::ObjectiveError;
use crate::types::{Complexity, Preconditions, Sizing, Task, TaskId, TaskPlan};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Canonical layer order for layer-based decomposition
pub const LAYER_ORDER: [&str; 15] = [
    "infrastructure",
    "model",
    "migration",
    "schema",
    "repository",
    "service",
    "router",
    "types",
    "api-service",
    "hook",
    "component",
    "page",
    "unit-test",
    "integration-test",
    "e2e-test",
];

/// Layers implemented on the backend side
const BACKEND_LAYERS: [&str; 7] = [
    "infrastructure",
    "model",
    "migration",
    "schema",
    "repository",
    "service",
    "router",
];

/// Number of upcoming tasks listed in the progress tracker
const NEXT_UP_LIMIT: usize = 4;

const SEQUENTIAL: &str = "must be sequential";

/// Decomposition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One task per architectural layer, bottom-up
    #[default]
    LayerBased,
    /// Backend slice, then frontend slice
    FeatureFirst,
    /// Strangler fig: new path alongside old, dual-write, switch over
    Migration,
}

impl Strategy {
    /// Kebab-case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::LayerBased => "layer-based",
            Strategy::FeatureFirst => "feature-first",
            Strategy::Migration => "migration",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layer-based" => Ok(Strategy::LayerBased),
            "feature-first" => Ok(Strategy::FeatureFirst),
            "migration" => Ok(Strategy::Migration),
            other => Err(format!(
                "unknown strategy '{other}' (expected layer-based, feature-first or migration)"
            )),
        }
    }
}

fn default_feature_name() -> String {
    "Unnamed Feature".to_string()
}

/// What to decompose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Feature name, used as the plan title
    #[serde(default = "default_feature_name")]
    pub feature_name: String,
    /// One-sentence objective
    #[serde(default)]
    pub objective: String,
    /// Decomposition strategy
    #[serde(default)]
    pub strategy: Strategy,
    /// Layers touched (layer-based strategy)
    #[serde(default)]
    pub layers: Vec<String>,
    /// Constraints appended to the plan
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl Objective {
    /// Create objective with default strategy and no layers
    #[must_use]
    pub fn new(feature_name: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            feature_name: feature_name.into(),
            objective: objective.into(),
            strategy: Strategy::default(),
            layers: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// With strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// With layer
    #[must_use]
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layers.push(layer.into());
        self
    }

    /// With constraint
    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraints.push(constraint.into());
        self
    }

    /// Load an objective from a JSON file
    pub fn load(path: &Path) -> Result<Self, ObjectiveError> {
        let content = std::fs::read_to_string(path).map_err(|source| ObjectiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ObjectiveError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Task decomposer for breaking down objectives
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskDecomposer;

impl TaskDecomposer {
    /// Create new task decomposer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decompose an objective into a sequential task plan
    #[must_use]
    pub fn decompose(&self, objective: &Objective) -> TaskPlan {
        let mut tasks = match objective.strategy {
            Strategy::LayerBased => Self::decompose_layers(&objective.layers),
            Strategy::FeatureFirst => Self::decompose_feature(&objective.feature_name),
            Strategy::Migration => Self::decompose_migration(),
        };

        if tasks.is_empty() {
            tasks.push(Self::fallback_task(objective));
        }

        // Every task waits for the one before it.
        let mut previous: Option<TaskId> = None;
        for task in &mut tasks {
            task.preconditions = match previous {
                None => Preconditions::None,
                Some(id) => Preconditions::Tasks(vec![id]),
            };
            previous = Some(task.id);
        }

        tracing::info!(
            "Decomposed '{}' into {} tasks ({})",
            objective.feature_name,
            tasks.len(),
            objective.strategy
        );
        TaskPlan::new(tasks).with_title(objective.feature_name.clone())
    }

    fn decompose_layers(layers: &[String]) -> Vec<Task> {
        let mut ordered: Vec<&String> = layers.iter().collect();
        ordered.sort_by_key(|layer| {
            LAYER_ORDER
                .iter()
                .position(|known| known == layer)
                .unwrap_or(usize::MAX)
        });

        ordered
            .into_iter()
            .zip(1u32..)
            .map(|(layer, id)| {
                Task::new(id, format!("Implement {layer} layer"))
                    .with_file(layer_path(layer))
                    .with_step(format!("Create/update {layer} implementation"))
                    .with_step("Follow project conventions")
                    .done_when(format!("Tests for {layer} pass"))
                    .with_complexity(Complexity::Small)
                    .with_parallel(SEQUENTIAL)
            })
            .collect()
    }

    fn decompose_feature(feature_name: &str) -> Vec<Task> {
        vec![
            Task::new(1, format!("Implement {feature_name} - backend slice"))
                .with_file("Backend files for feature")
                .with_step("Implement backend feature slice")
                .with_step("Add unit tests")
                .done_when("Backend tests pass")
                .with_complexity(Complexity::Medium)
                .with_parallel("Can run alongside frontend design"),
            Task::new(2, format!("Implement {feature_name} - frontend slice"))
                .with_file("Frontend files for feature")
                .with_step("Implement frontend feature slice")
                .with_step("Add component tests")
                .done_when("Frontend tests pass")
                .with_complexity(Complexity::Medium)
                .with_parallel(SEQUENTIAL),
        ]
    }

    fn decompose_migration() -> Vec<Task> {
        vec![
            Task::new(1, "Implement new path alongside old path")
                .with_file("New implementation files")
                .with_step("Create new implementation")
                .with_step("Keep old path untouched")
                .done_when("New path tests pass AND old path still works")
                .with_complexity(Complexity::Medium)
                .with_parallel(SEQUENTIAL),
            Task::new(2, "Dual-write to both old and new paths")
                .with_file("Integration points")
                .with_step("Add dual-write logic")
                .with_step("Verify both paths produce identical results")
                .done_when("Integration tests confirm both paths match")
                .with_complexity(Complexity::Medium)
                .with_parallel(SEQUENTIAL),
            Task::new(3, "Switch to new path and remove old path")
                .with_file("Old implementation files")
                .with_file("integration points")
                .with_step("Remove old path references")
                .with_step("Clean up dual-write code")
                .done_when("All tests pass with only new path")
                .with_complexity(Complexity::Medium)
                .with_parallel(SEQUENTIAL),
        ]
    }

    fn fallback_task(objective: &Objective) -> Task {
        let step = if objective.objective.trim().is_empty() {
            format!("Implement {}", objective.feature_name)
        } else {
            objective.objective.trim().to_string()
        };
        Task::new(1, format!("Implement {}", objective.feature_name))
            .with_file("TBD")
            .with_step(step)
            .done_when("TBD")
            .with_complexity(Complexity::Medium)
            .with_parallel(SEQUENTIAL)
    }
}

/// Conventional directory for a layer
fn layer_path(layer: &str) -> String {
    if BACKEND_LAYERS.contains(&layer) {
        format!("app/{layer}s/")
    } else if layer.ends_with("-test") {
        format!("tests/{}/", layer.trim_end_matches("-test"))
    } else {
        format!("src/{layer}s/")
    }
}

/// Render a plan in task-plan Markdown
#[must_use]
pub fn render_task_plan(plan: &TaskPlan, objective: &Objective, date: NaiveDate) -> String {
    let title = plan.title.as_deref().unwrap_or(&objective.feature_name);
    let tasks: Vec<String> = plan.tasks.iter().map(render_task).collect();

    let mut out = format!(
        "# Task Plan: {title}\n\n\
         Generated: {date}\n\
         Strategy: {strategy}\n\
         Status: IN_PROGRESS\n\
         Total tasks: {total}\n\
         Completed: 0\n\n\
         ---\n\n\
         {tasks}",
        date = date.format("%Y-%m-%d"),
        strategy = objective.strategy,
        total = plan.len(),
        tasks = tasks.join("\n"),
    );

    if !objective.constraints.is_empty() {
        out.push_str("\n## Constraints\n");
        for constraint in &objective.constraints {
            out.push_str(&format!("- {constraint}\n"));
        }
    }

    out
}

/// Render one task in the task template
#[must_use]
pub fn render_task(task: &Task) -> String {
    let files: Vec<String> = task.files.iter().map(|f| render_file(f)).collect();
    let steps: Vec<String> = task
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("  {}. {}", i + 1, step))
        .collect();
    let complexity = match &task.sizing {
        Sizing::Sized(c) => c.as_str().to_string(),
        Sizing::Unrecognized(raw) => raw.clone(),
        Sizing::Missing => String::new(),
    };

    let mut out = format!("### {}: {}\n", task.id, task.title);
    out.push_str(&format!("- **Files:** {}\n", files.join(", ")));
    out.push_str(&format!("- **Preconditions:** {}\n", task.preconditions));
    out.push_str("- **Steps:**\n");
    for step in steps {
        out.push_str(&step);
        out.push('\n');
    }
    out.push_str(&format!(
        "- **Done when:** {}\n",
        task.done_when.as_deref().unwrap_or_default()
    ));
    out.push_str(&format!("- **Complexity:** {complexity}\n"));
    out.push_str(&format!(
        "- **Parallel:** {}\n",
        task.parallel.as_deref().unwrap_or(SEQUENTIAL)
    ));
    out
}

fn render_file(file: &str) -> String {
    if file.contains('/') || file.contains('.') {
        format!("`{file}`")
    } else {
        file.to_string()
    }
}

/// Render the initial progress tracker for a plan
#[must_use]
pub fn render_progress(plan: &TaskPlan, date: NaiveDate) -> String {
    let current = plan
        .tasks
        .first()
        .map_or_else(|| "(none)".to_string(), |t| format!("{}: {}", t.id, t.title));

    let next_up: Vec<String> = plan
        .tasks
        .iter()
        .skip(1)
        .take(NEXT_UP_LIMIT)
        .map(|t| format!("- [ ] {}: {}", t.id, t.title))
        .collect();
    let next_up = if next_up.is_empty() {
        "(none)".to_string()
    } else {
        next_up.join("\n")
    };

    format!(
        "# Progress\n\n\
         Generated: {date}\n\n\
         ## Current Task\n\
         {current}\n\
         Status: not started\n\n\
         ## Completed\n\
         (none)\n\n\
         ## Next Up\n\
         {next_up}\n\n\
         ## Blockers\n\
         (none)\n",
        date = date.format("%Y-%m-%d"),
    )
}
