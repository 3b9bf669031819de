//! Application and pipeline configuration for SlidePipe.
//!
//! User config lives at `~/.slidepipe/slidepipe.toml`.
//! Per-run pipeline files override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlidePipeError};
use crate::run::PipelineType;
use crate::types::Language;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "slidepipe.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".slidepipe";

/// Narrowest width that still leaves room for the ellipsis marker.
const MIN_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// Config structs (matching slidepipe.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Slide planning and keyword analysis.
    #[serde(default)]
    pub planning: PlanningConfig,

    /// Where run artifacts go.
    #[serde(default)]
    pub output: OutputConfig,

    /// Fallback content policy.
    #[serde(default)]
    pub fallback: FallbackConfig,
}

/// `[planning]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Maximum number of slides per deck.
    #[serde(default = "default_slide_budget")]
    pub slide_budget: usize,

    /// Label language ("ja" or "en"; anything else renders English).
    #[serde(default)]
    pub language: Language,

    /// Shortest cleaned token counted as a keyword.
    #[serde(default = "default_keyword_min_length")]
    pub keyword_min_length: usize,

    /// Number of keywords retained.
    #[serde(default = "default_keyword_top_n")]
    pub keyword_top_n: usize,

    /// Width of per-item body excerpts, ellipsis included.
    #[serde(default = "default_excerpt_width")]
    pub excerpt_width: usize,

    /// Width beyond which a content line is truncated, ellipsis included.
    #[serde(default = "default_line_truncate_width")]
    pub line_truncate_width: usize,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            slide_budget: default_slide_budget(),
            language: Language::default(),
            keyword_min_length: default_keyword_min_length(),
            keyword_top_n: default_keyword_top_n(),
            excerpt_width: default_excerpt_width(),
            line_truncate_width: default_line_truncate_width(),
        }
    }
}

impl PlanningConfig {
    /// Reject settings the planner cannot honor.
    ///
    /// A zero slide budget is an error rather than an empty deck.
    pub fn validate(&self) -> Result<()> {
        if self.slide_budget == 0 {
            return Err(SlidePipeError::validation("slide_budget must be at least 1"));
        }
        if self.keyword_top_n == 0 {
            return Err(SlidePipeError::validation("keyword_top_n must be at least 1"));
        }
        if self.excerpt_width < MIN_WIDTH {
            return Err(SlidePipeError::validation(format!(
                "excerpt_width must be at least {MIN_WIDTH}"
            )));
        }
        if self.line_truncate_width < MIN_WIDTH {
            return Err(SlidePipeError::validation(format!(
                "line_truncate_width must be at least {MIN_WIDTH}"
            )));
        }
        Ok(())
    }

    /// Apply per-run overrides on top of these settings.
    pub fn merged(&self, overrides: &PlanningOverrides) -> Self {
        Self {
            slide_budget: overrides.slide_budget.unwrap_or(self.slide_budget),
            language: overrides.language.unwrap_or(self.language),
            keyword_min_length: overrides
                .keyword_min_length
                .unwrap_or(self.keyword_min_length),
            keyword_top_n: overrides.keyword_top_n.unwrap_or(self.keyword_top_n),
            excerpt_width: overrides.excerpt_width.unwrap_or(self.excerpt_width),
            line_truncate_width: overrides
                .line_truncate_width
                .unwrap_or(self.line_truncate_width),
        }
    }
}

fn default_slide_budget() -> usize {
    10
}
fn default_keyword_min_length() -> usize {
    4
}
fn default_keyword_top_n() -> usize {
    20
}
fn default_excerpt_width() -> usize {
    180
}
fn default_line_truncate_width() -> usize {
    200
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for decks and run reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Whether runs write their deck and report to disk.
    #[serde(default = "default_true")]
    pub persist: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            persist: true,
        }
    }
}

fn default_output_dir() -> String {
    "outputs".into()
}
fn default_true() -> bool {
    true
}

/// `[fallback]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Supply sample content when no source produced any.
    #[serde(default)]
    pub sample_content: bool,
}

// ---------------------------------------------------------------------------
// Pipeline config (per run)
// ---------------------------------------------------------------------------

/// Partial `[planning]` values carried by a pipeline file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_budget: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword_top_n: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt_width: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_truncate_width: Option<usize>,
}

/// One declared stage of a `custom` pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Stage type (`scraping`, `pdf_ocr`, `aggregation`, `keyword_analysis`,
    /// `slide_generation`). Unknown types are recorded as skipped.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Acquisition targets for `scraping`.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Acquisition targets for `pdf_ocr`.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Declarative description of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, rename = "type", alias = "pipeline_type")]
    pub pipeline_type: PipelineType,

    #[serde(default, alias = "urls")]
    pub scraping_targets: Vec<String>,

    #[serde(default)]
    pub pdf_files: Vec<String>,

    /// Stage list for `custom` pipelines, executed in order.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,

    #[serde(default)]
    pub planning: PlanningOverrides,

    /// Overrides `[fallback] sample_content` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_fallback: Option<bool>,
}

/// Load a pipeline description; `.json` files are JSON, anything else TOML.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SlidePipeError::io(path, e))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| {
            SlidePipeError::parse(format!("failed to parse {}: {e}", path.display()))
        })
    } else {
        toml::from_str(&content).map_err(|e| {
            SlidePipeError::parse(format!("failed to parse {}: {e}", path.display()))
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.slidepipe/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SlidePipeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.slidepipe/slidepipe.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SlidePipeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SlidePipeError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.planning.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SlidePipeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SlidePipeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SlidePipeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
