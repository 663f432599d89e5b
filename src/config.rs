//! Where the three source tables come from and where processed output goes.

use anyhow::{Context, Result};
use serde::Deserialize;

pub const GRADES_ENV: &str = "GRADES_SOURCE";
pub const EVAL_PARAMS_ENV: &str = "EVAL_PARAMS_SOURCE";
pub const EVAL_MEDIANS_ENV: &str = "EVAL_MEDIANS_SOURCE";
pub const OUTPUT_DIR_ENV: &str = "OUTPUT_DIR";

/// Source locations (local paths or HTTP(S) URLs) and the output directory.
///
/// Stored on disk as a JSON object; any omitted key keeps its default:
/// ```json
/// {
///   "grades": "static/data/grades.csv",
///   "eval_params": "https://example.edu/exports/eval-params.csv",
///   "output_dir": "static/data/processed"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub grades: String,
    pub eval_params: String,
    pub eval_medians: String,
    pub output_dir: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            grades: "static/data/grades.csv".to_string(),
            eval_params: "static/data/eval-params.csv".to_string(),
            eval_medians: "static/data/eval-medians.csv".to_string(),
            output_dir: "static/data/processed".to_string(),
        }
    }
}

/// Per-field replacements, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct SourceOverrides {
    pub grades: Option<String>,
    pub eval_params: Option<String>,
    pub eval_medians: Option<String>,
    pub output_dir: Option<String>,
}

impl SourceConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("invalid config file {path}"))
    }

    /// Defaults, then the optional file, then the environment, then `overrides`.
    pub fn resolve(path: Option<&str>, overrides: SourceOverrides) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config
            .with_overrides(Self::env_overrides(|name| std::env::var(name).ok()))
            .with_overrides(overrides))
    }

    /// Reads overrides through `lookup`, usually the process environment.
    pub fn env_overrides(lookup: impl Fn(&str) -> Option<String>) -> SourceOverrides {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        SourceOverrides {
            grades: read(GRADES_ENV),
            eval_params: read(EVAL_PARAMS_ENV),
            eval_medians: read(EVAL_MEDIANS_ENV),
            output_dir: read(OUTPUT_DIR_ENV),
        }
    }

    pub fn with_overrides(mut self, overrides: SourceOverrides) -> Self {
        if let Some(v) = overrides.grades {
            self.grades = v;
        }
        if let Some(v) = overrides.eval_params {
            self.eval_params = v;
        }
        if let Some(v) = overrides.eval_medians {
            self.eval_medians = v;
        }
        if let Some(v) = overrides.output_dir {
            self.output_dir = v;
        }
        self
    }
}
