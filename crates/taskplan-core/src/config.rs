//! Validator configuration
//!
//! Defaults follow the decomposition rules: at most three files per task,
//! oversized tasks are split candidates (warning), placeholder verification
//! commands are warnings. A TOML file can override any field:
//!
//! ```toml
//! max_files_per_task = 2
//! file_limit_severity = "error"
//! placeholder_done_when = ["tbd", "todo", "n/a", "wip"]
//! bracketed_placeholders = true
//! ```

use crate::error::ConfigError;
use crate::report::Severity;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name looked up next to the plan
pub const CONFIG_FILE_NAME: &str = "taskplan.toml";

/// Validation rule configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum files a task may touch before it is flagged
    pub max_files_per_task: usize,
    /// Severity of the file-count check
    pub file_limit_severity: Severity,
    /// `Done when` values treated as placeholders (case-insensitive)
    pub placeholder_done_when: Vec<String>,
    /// Treat `[bracketed template text]` as a placeholder
    pub bracketed_placeholders: bool,
    /// Warn on tasks without numbered steps
    pub require_steps: bool,
    /// Warn on tasks without listed files
    pub require_files: bool,
}

impl ValidationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With file limit
    #[inline]
    #[must_use]
    pub fn with_max_files(mut self, max: usize) -> Self {
        self.max_files_per_task = max;
        self
    }

    /// Treat oversized tasks as errors
    #[inline]
    #[must_use]
    pub fn with_strict_file_limit(mut self, strict: bool) -> Self {
        self.file_limit_severity = if strict {
            Severity::Error
        } else {
            Severity::Warning
        };
        self
    }

    /// Load configuration from a TOML file; missing keys take defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.check()?;
        tracing::debug!("Loaded validation config from {}", path.display());
        Ok(config)
    }

    /// Reject values no plan could satisfy
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_files_per_task == 0 {
            return Err(ConfigError::Invalid(
                "max_files_per_task must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a `Done when` value is a placeholder
    #[must_use]
    pub fn is_placeholder(&self, done_when: &str) -> bool {
        let value = done_when.trim();
        if self.bracketed_placeholders && value.starts_with('[') && value.ends_with(']') {
            return true;
        }
        self.placeholder_done_when
            .iter()
            .any(|p| p.eq_ignore_ascii_case(value))
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_files_per_task: 3,
            file_limit_severity: Severity::Warning,
            placeholder_done_when: vec!["tbd".to_string(), "todo".to_string(), "n/a".to_string()],
            bracketed_placeholders: true,
            require_steps: true,
            require_files: true,
        }
    }
}
