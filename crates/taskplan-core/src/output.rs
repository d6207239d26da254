//! Output directory writers
//!
//! Every command that writes files drops a `manifest.json` next to them
//! listing what was produced. The manifest is the only output carrying a
//! timestamp.

use crate::decompose::{render_progress, render_task_plan, Objective};
use crate::error::OutputError;
use crate::implementation_plan::{PlanFormat, PlanRequest};
use crate::report::ValidationReport;
use crate::types::TaskPlan;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default output directory for validation and decomposition
pub const DEFAULT_TASK_OUTPUT_DIR: &str = "/tmp/task-decomposition-output";

/// Default output directory for implementation plans
pub const DEFAULT_PLAN_OUTPUT_DIR: &str = "/tmp/project-planner-output";

/// Manifest file name
pub const MANIFEST_FILE: &str = "manifest.json";

/// Summary of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Command that produced the files
    pub generator: String,
    /// When the files were written
    pub generated_at: DateTime<Utc>,
    /// Validated document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_file: Option<String>,
    /// PASS or FAIL for validation runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Feature name for generation runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    /// Decomposition strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Number of tasks produced or checked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tasks: Option<usize>,
    /// Written files
    pub outputs: Vec<String>,
}

impl Manifest {
    /// Create manifest stamped with the current time
    #[must_use]
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            generated_at: Utc::now(),
            validated_file: None,
            status: None,
            feature: None,
            strategy: None,
            total_tasks: None,
            outputs: Vec::new(),
        }
    }
}

/// Files written by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutputs {
    /// Generated documents, in write order
    pub files: Vec<PathBuf>,
    /// Path of `manifest.json`
    pub manifest: PathBuf,
}

/// Output directory writer
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Create writer for a directory; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `validation-report.json`, `validation-report.md` and the manifest
    pub fn write_validation(&self, report: &ValidationReport) -> Result<WrittenOutputs, OutputError> {
        self.ensure_dir()?;
        let files = vec![
            self.write("validation-report.json", &report.to_json()?)?,
            self.write("validation-report.md", &report.render_markdown())?,
        ];

        let mut manifest = Manifest::new("taskplan validate");
        manifest.validated_file = report.source.clone();
        manifest.status = Some(report.status().to_string());
        manifest.total_tasks = Some(report.total_tasks);
        self.finish(manifest, files)
    }

    /// Write `task_plan.md`, `progress.md` and the manifest
    pub fn write_decomposition(
        &self,
        objective: &Objective,
        plan: &TaskPlan,
        date: NaiveDate,
    ) -> Result<WrittenOutputs, OutputError> {
        self.ensure_dir()?;
        let files = vec![
            self.write("task_plan.md", &render_task_plan(plan, objective, date))?,
            self.write("progress.md", &render_progress(plan, date))?,
        ];

        let mut manifest = Manifest::new("taskplan decompose");
        manifest.feature = Some(objective.feature_name.clone());
        manifest.strategy = Some(objective.strategy.to_string());
        manifest.total_tasks = Some(plan.len());
        self.finish(manifest, files)
    }

    /// Write `plan-<slug>.md` and/or `plan-<slug>.json` and the manifest
    pub fn write_implementation_plan(
        &self,
        request: &PlanRequest,
        format: PlanFormat,
        date: NaiveDate,
    ) -> Result<WrittenOutputs, OutputError> {
        self.ensure_dir()?;
        let slug = request.slug();
        let mut files = Vec::new();
        if format.includes_markdown() {
            files.push(self.write(&format!("plan-{slug}.md"), &request.render_markdown(date))?);
        }
        if format.includes_json() {
            let json = serde_json::to_string_pretty(&request.to_document(date))?;
            files.push(self.write(&format!("plan-{slug}.json"), &json)?);
        }

        let mut manifest = Manifest::new("taskplan plan");
        manifest.feature = Some(request.feature_name.clone());
        manifest.total_tasks = Some(request.tasks.len());
        self.finish(manifest, files)
    }

    fn ensure_dir(&self) -> Result<(), OutputError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| OutputError::io_error(&self.dir, e))
    }

    fn write(&self, name: &str, content: &str) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(name);
        std::fs::write(&path, content).map_err(|e| OutputError::io_error(&path, e))?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }

    fn finish(&self, mut manifest: Manifest, files: Vec<PathBuf>) -> Result<WrittenOutputs, OutputError> {
        manifest.outputs = files.iter().map(|p| p.display().to_string()).collect();
        let manifest = self.write(MANIFEST_FILE, &serde_json::to_string_pretty(&manifest)?)?;
        tracing::info!(
            "Wrote {} files to {}",
            files.len() + 1,
            self.dir.display()
        );
        Ok(WrittenOutputs { files, manifest })
    }
}
