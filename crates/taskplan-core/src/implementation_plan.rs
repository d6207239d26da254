//! Implementation plan documents
//!
//! Turns a [`PlanRequest`] into a reviewable implementation plan: metadata,
//! affected modules, a sequential task list, dependency graph, risk table and
//! acceptance criteria. Rendered as Markdown or as a JSON [`PlanDocument`].

use crate::types::{Complexity, TaskId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend path fragments and the layer they indicate, first match wins
const BACKEND_LAYERS: [(&str, &str); 8] = [
    ("models", "Model"),
    ("schemas", "Schema"),
    ("repositories", "Repository"),
    ("services", "Service"),
    ("routers", "Router"),
    ("dependencies", "Dependency"),
    ("config", "Config"),
    ("alembic", "Migration"),
];

/// Frontend path fragments and the layer they indicate, first match wins
const FRONTEND_LAYERS: [(&str, &str); 5] = [
    ("pages", "Page"),
    ("components", "Component"),
    ("hooks", "Hook"),
    ("services", "Service"),
    ("types", "Type"),
];

const OTHER_LAYER: &str = "Other";

/// Infer the backend layer of a file path
#[must_use]
pub fn infer_backend_layer(path: &str) -> &'static str {
    infer_layer(path, &BACKEND_LAYERS)
}

/// Infer the frontend layer of a file path
#[must_use]
pub fn infer_frontend_layer(path: &str) -> &'static str {
    infer_layer(path, &FRONTEND_LAYERS)
}

fn infer_layer(path: &str, table: &[(&str, &'static str)]) -> &'static str {
    table
        .iter()
        .find(|(fragment, _)| path.contains(fragment))
        .map_or(OTHER_LAYER, |&(_, layer)| layer)
}

/// Which plan files to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFormat {
    /// `plan-<slug>.md` only
    Markdown,
    /// `plan-<slug>.json` only
    Json,
    /// Both files
    #[default]
    Both,
}

impl PlanFormat {
    /// Whether the Markdown file is produced
    #[must_use]
    pub fn includes_markdown(self) -> bool {
        matches!(self, PlanFormat::Markdown | PlanFormat::Both)
    }

    /// Whether the JSON file is produced
    #[must_use]
    pub fn includes_json(self) -> bool {
        matches!(self, PlanFormat::Json | PlanFormat::Both)
    }
}

impl FromStr for PlanFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" | "md" => Ok(PlanFormat::Markdown),
            "json" => Ok(PlanFormat::Json),
            "both" => Ok(PlanFormat::Both),
            other => Err(format!(
                "unknown plan format '{other}' (expected markdown, json or both)"
            )),
        }
    }
}

impl fmt::Display for PlanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanFormat::Markdown => "markdown",
            PlanFormat::Json => "json",
            PlanFormat::Both => "both",
        })
    }
}

/// Input for an implementation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    /// Feature name, used as the plan title
    pub feature_name: String,
    /// One-sentence objective
    pub objective: String,
    /// Overall complexity estimate
    pub complexity: Complexity,
    /// Plan author
    pub author: String,
    /// Backend files affected
    pub backend_files: Vec<String>,
    /// Frontend files affected
    pub frontend_files: Vec<String>,
    /// Task titles in execution order
    pub tasks: Vec<String>,
    /// Known risks
    pub risks: Vec<String>,
    /// Involves a database migration
    pub has_migration: bool,
    /// Involves React Server Components
    pub has_rsc: bool,
}

impl PlanRequest {
    /// Create request with medium complexity and no files, tasks or risks
    #[must_use]
    pub fn new(feature_name: impl Into<String>, objective: impl Into<String>) -> Self {
        Self {
            feature_name: feature_name.into(),
            objective: objective.into(),
            complexity: Complexity::Medium,
            author: "auto-generated".to_string(),
            backend_files: Vec::new(),
            frontend_files: Vec::new(),
            tasks: Vec::new(),
            risks: Vec::new(),
            has_migration: false,
            has_rsc: false,
        }
    }

    /// With complexity
    #[must_use]
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// With author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// With backend file
    #[must_use]
    pub fn with_backend_file(mut self, path: impl Into<String>) -> Self {
        self.backend_files.push(path.into());
        self
    }

    /// With frontend file
    #[must_use]
    pub fn with_frontend_file(mut self, path: impl Into<String>) -> Self {
        self.frontend_files.push(path.into());
        self
    }

    /// With task title
    #[must_use]
    pub fn with_task(mut self, title: impl Into<String>) -> Self {
        self.tasks.push(title.into());
        self
    }

    /// With risk
    #[must_use]
    pub fn with_risk(mut self, risk: impl Into<String>) -> Self {
        self.risks.push(risk.into());
        self
    }

    /// Flag a database migration
    #[must_use]
    pub fn with_migration(mut self, has_migration: bool) -> Self {
        self.has_migration = has_migration;
        self
    }

    /// Flag React Server Components
    #[must_use]
    pub fn with_rsc(mut self, has_rsc: bool) -> Self {
        self.has_rsc = has_rsc;
        self
    }

    /// File-name slug of the feature name
    #[must_use]
    pub fn slug(&self) -> String {
        self.feature_name.to_lowercase().replace(' ', "-")
    }

    /// Render the plan as Markdown
    #[must_use]
    pub fn render_markdown(&self, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d").to_string();
        let complexity = self.complexity.title_case();
        let mut lines: Vec<String> = vec![
            format!("# Implementation Plan: {}", self.feature_name),
            String::new(),
            "## Metadata".to_string(),
            String::new(),
            format!("- **Date:** {date}"),
            format!("- **Author:** {}", self.author),
            "- **Status:** Draft".to_string(),
            format!("- **Complexity:** {complexity}"),
            String::new(),
            "## Objective".to_string(),
            String::new(),
            self.objective.clone(),
            String::new(),
            "## Affected Modules".to_string(),
            String::new(),
        ];

        push_module_table(
            &mut lines,
            "Backend (Python/FastAPI)",
            &self.backend_files,
            infer_backend_layer,
        );
        push_module_table(
            &mut lines,
            "Frontend (React/TypeScript)",
            &self.frontend_files,
            infer_frontend_layer,
        );

        if self.has_rsc {
            push_all(
                &mut lines,
                &[
                    "### Server Component Decision",
                    "",
                    "This feature involves React Server Components. For each component:",
                    "- Determine if it needs interactivity (client) or is read-only (server)",
                    "- Server Components: data fetching, static content, zero client JS",
                    "- Client Components: hooks, event handlers, browser APIs",
                    "",
                ],
            );
        }

        push_all(&mut lines, &["## Task List", ""]);
        if self.tasks.is_empty() {
            push_all(
                &mut lines,
                &[
                    "### Task 1: [Title]",
                    "",
                    "- **Files:** [list]",
                    "- **Preconditions:** None",
                    "- **Steps:**",
                    "  1. [step]",
                    "- **Verify:** [command], expect [result]",
                    "",
                ],
            );
        } else {
            for (id, title) in (1u32..).zip(&self.tasks) {
                let precondition = if id > 1 {
                    TaskId(id - 1).to_string()
                } else {
                    "None".to_string()
                };
                lines.push(format!("### {}: {title}", TaskId(id)));
                lines.push(String::new());
                lines.push("- **Files:** [identify from affected modules]".to_string());
                lines.push(format!("- **Preconditions:** {precondition}"));
                lines.push("- **Steps:**".to_string());
                lines.push("  1. [define steps]".to_string());
                lines.push("- **Verify:** [define verification]".to_string());
                lines.push(format!("- **Complexity:** {complexity}"));
                lines.push(String::new());
            }
        }

        push_all(&mut lines, &["## Dependency Graph", "", "```"]);
        if self.tasks.is_empty() {
            lines.push("Task 1 → Task 2 → Task 3".to_string());
        } else {
            for (i, title) in self.tasks.iter().enumerate() {
                let connector = if i > 0 { "└── " } else { "" };
                lines.push(format!(
                    "{}{connector}Task {} ({title})",
                    "  ".repeat(i),
                    i + 1
                ));
            }
        }
        push_all(
            &mut lines,
            &[
                "```",
                "",
                "## Risk Assessment",
                "",
                "| Risk | Likelihood | Impact | Mitigation |",
                "|------|-----------|--------|------------|",
            ],
        );
        if self.risks.is_empty() {
            lines.push("| [identify risks] | Low/Med/High | Low/Med/High | [action] |".to_string());
        } else {
            for risk in &self.risks {
                lines.push(format!("| {risk} | Medium | Medium | [define mitigation] |"));
            }
        }
        if self.has_migration {
            lines.push(
                "| Database migration on production | Medium | High | Test on staging, write downgrade(), backup before run |"
                    .to_string(),
            );
        }

        push_all(
            &mut lines,
            &[
                "",
                "See `references/risk-assessment-checklist.md` for full risk category checklist.",
                "",
                "## Acceptance Criteria",
                "",
                "- [ ] All tasks completed and verified",
                "- [ ] All new code has unit tests with >80% coverage",
                "- [ ] Integration tests pass",
                "- [ ] No security vulnerabilities introduced",
                "- [ ] Pre-merge checklist passes",
                "",
            ],
        );
        if self.has_migration {
            push_all(
                &mut lines,
                &[
                    "- [ ] Database migration tested on staging with production-like data",
                    "- [ ] Rollback migration tested",
                    "",
                ],
            );
        }
        if self.has_rsc {
            push_all(
                &mut lines,
                &[
                    "- [ ] Server Components render correctly on server",
                    "- [ ] Client Components hydrate without errors",
                    "- [ ] No unnecessary client JS shipped for server-only components",
                    "",
                ],
            );
        }

        lines.push("## Notes".to_string());
        lines.push(String::new());
        lines.push(format!("Generated by taskplan on {date}."));
        lines.push("Review and refine before implementation.".to_string());
        lines.push(String::new());

        lines.join("\n")
    }

    /// Structured form of the plan
    #[must_use]
    pub fn to_document(&self, date: NaiveDate) -> PlanDocument {
        PlanDocument {
            feature_name: self.feature_name.clone(),
            date: date.format("%Y-%m-%d").to_string(),
            author: self.author.clone(),
            status: "Draft".to_string(),
            complexity: self.complexity,
            objective: self.objective.clone(),
            backend_files: self.backend_files.clone(),
            frontend_files: self.frontend_files.clone(),
            tasks: (1u32..)
                .zip(&self.tasks)
                .map(|(id, title)| PlanTask {
                    id: TaskId(id),
                    title: title.clone(),
                    preconditions: if id > 1 { vec![TaskId(id - 1)] } else { Vec::new() },
                })
                .collect(),
            risks: self.risks.clone(),
            has_migration: self.has_migration,
            has_rsc: self.has_rsc,
        }
    }
}

fn push_all(lines: &mut Vec<String>, items: &[&str]) {
    lines.extend(items.iter().map(|s| (*s).to_string()));
}

fn push_module_table(
    lines: &mut Vec<String>,
    heading: &str,
    files: &[String],
    infer: fn(&str) -> &'static str,
) {
    if files.is_empty() {
        return;
    }
    lines.push(format!("### {heading}"));
    lines.push(String::new());
    lines.push("| Layer | File Path | Action | Notes |".to_string());
    lines.push("|-------|----------|--------|-------|".to_string());
    for file in files {
        lines.push(format!("| {} | `{file}` | Create/Modify | - |", infer(file)));
    }
    lines.push(String::new());
}

/// Task entry of a [`PlanDocument`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTask {
    /// Ordinal id
    pub id: TaskId,
    /// Title
    pub title: String,
    /// Preceding task, if any
    pub preconditions: Vec<TaskId>,
}

/// JSON form of an implementation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDocument {
    /// Feature name
    pub feature_name: String,
    /// Generation date, `YYYY-MM-DD`
    pub date: String,
    /// Plan author
    pub author: String,
    /// Always "Draft" when generated
    pub status: String,
    /// Overall complexity
    pub complexity: Complexity,
    /// Objective statement
    pub objective: String,
    /// Backend files affected
    pub backend_files: Vec<String>,
    /// Frontend files affected
    pub frontend_files: Vec<String>,
    /// Sequential tasks
    pub tasks: Vec<PlanTask>,
    /// Known risks
    pub risks: Vec<String>,
    /// Involves a database migration
    pub has_migration: bool,
    /// Involves React Server Components
    pub has_rsc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn layer_inference() {
        assert_eq!(infer_backend_layer("app/models/user.py"), "Model");
        assert_eq!(infer_backend_layer("alembic/versions/001.py"), "Migration");
        assert_eq!(infer_backend_layer("app/main.py"), "Other");
        assert_eq!(infer_frontend_layer("src/hooks/useUser.ts"), "Hook");
        assert_eq!(infer_frontend_layer("src/components/User.tsx"), "Component");
    }

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(PlanRequest::new("User Search Box", "x").slug(), "user-search-box");
    }

    #[test]
    fn markdown_lists_sequential_tasks() {
        let md = PlanRequest::new("Search", "Add search")
            .with_task("Add model")
            .with_task("Add router")
            .with_complexity(Complexity::Small)
            .render_markdown(date());

        assert!(md.starts_with("# Implementation Plan: Search\n"));
        assert!(md.contains("- **Date:** 2024-05-01\n"));
        assert!(md.contains("- **Complexity:** Small\n"));
        assert!(md.contains("### Task 2: Add router\n\n- **Files:** [identify from affected modules]\n- **Preconditions:** Task 1\n"));
        assert!(md.contains("Task 1 (Add model)\n  └── Task 2 (Add router)\n"));
    }

    #[test]
    fn migration_adds_risk_and_criteria() {
        let md = PlanRequest::new("Search", "x")
            .with_migration(true)
            .render_markdown(date());
        assert!(md.contains("| Database migration on production |"));
        assert!(md.contains("- [ ] Rollback migration tested"));
        assert!(!md.contains("Server Component Decision"));
    }

    #[test]
    fn affected_modules_table() {
        let md = PlanRequest::new("Search", "x")
            .with_backend_file("app/routers/search.py")
            .render_markdown(date());
        assert!(md.contains("### Backend (Python/FastAPI)"));
        assert!(md.contains("| Router | `app/routers/search.py` | Create/Modify | - |"));
        assert!(!md.contains("### Frontend"));
    }

    #[test]
    fn document_chains_preconditions() {
        let doc = PlanRequest::new("Search", "x")
            .with_task("a")
            .with_task("b")
            .to_document(date());
        assert!(doc.tasks[0].preconditions.is_empty());
        assert_eq!(doc.tasks[1].preconditions, vec![TaskId(1)]);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["complexity"], "medium");
        assert_eq!(json["tasks"][1]["preconditions"][0], 1);
    }

    #[test]
    fn plan_format_selection() {
        assert!(PlanFormat::Both.includes_markdown() && PlanFormat::Both.includes_json());
        assert!(!"json".parse::<PlanFormat>().unwrap().includes_markdown());
        assert!("yaml".parse::<PlanFormat>().is_err());
    }
}
