//! Pipeline run report types.
//!
//! A [`PipelineRun`] is the only entity persisted after a run. Its task list
//! is append-only.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PipelineType / StageKind
// ---------------------------------------------------------------------------

/// Declared pipeline shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineType {
    #[default]
    Full,
    ScrapingToSlides,
    PdfToSlides,
    /// Caller-declared task list. Unknown type strings also land here.
    #[serde(other)]
    Custom,
}

impl PipelineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::ScrapingToSlides => "scraping_to_slides",
            Self::PdfToSlides => "pdf_to_slides",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for PipelineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pipeline stage operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Scraping,
    PdfOcr,
    Aggregation,
    KeywordAnalysis,
    SlideGeneration,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scraping => "scraping",
            Self::PdfOcr => "pdf_ocr",
            Self::Aggregation => "aggregation",
            Self::KeywordAnalysis => "keyword_analysis",
            Self::SlideGeneration => "slide_generation",
        }
    }

    /// Parse a declared task type. Returns `None` for unknown types.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scraping" => Some(Self::Scraping),
            "pdf_ocr" => Some(Self::PdfOcr),
            "aggregation" => Some(Self::Aggregation),
            "keyword_analysis" => Some(Self::KeywordAnalysis),
            "slide_generation" => Some(Self::SlideGeneration),
            _ => None,
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
    Skipped,
}

/// Outcome of one attempted stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Stage type as declared (may be an unknown custom type).
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    /// Wall time in seconds.
    pub duration: f64,
    /// Stage-specific output references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why a stage was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TaskResult {
    pub fn completed(stage: StageKind, elapsed: Duration, output: serde_json::Value) -> Self {
        Self {
            task_type: stage.as_str().to_string(),
            status: TaskStatus::Completed,
            duration: round_secs(elapsed),
            output: Some(output),
            error: None,
            reason: None,
        }
    }

    pub fn failed(stage: StageKind, elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            task_type: stage.as_str().to_string(),
            status: TaskStatus::Failed,
            duration: round_secs(elapsed),
            output: None,
            error: Some(error.into()),
            reason: None,
        }
    }

    pub fn skipped(task_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            status: TaskStatus::Skipped,
            duration: 0.0,
            output: None,
            error: None,
            reason: Some(reason.into()),
        }
    }
}

fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1000.0).round() / 1000.0
}

// ---------------------------------------------------------------------------
// PipelineRun
// ---------------------------------------------------------------------------

/// `running -> {completed, failed}`; both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Run report for one pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pipeline_id: String,
    pipeline_type: PipelineType,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    status: RunStatus,
    tasks: Vec<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl PipelineRun {
    /// Start a new run with a timestamp-derived id.
    pub fn start(pipeline_type: PipelineType) -> Self {
        let now = Utc::now();
        Self {
            pipeline_id: format!("pipeline_{}", now.format("%Y%m%d_%H%M%S_%3f")),
            pipeline_type,
            started_at: now,
            completed_at: None,
            status: RunStatus::Running,
            tasks: Vec::new(),
            error: None,
        }
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn pipeline_type(&self) -> PipelineType {
        self.pipeline_type
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn tasks(&self) -> &[TaskResult] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Append a task result. Ignored once the run is terminal.
    pub fn push_task(&mut self, task: TaskResult) {
        if self.status == RunStatus::Running {
            self.tasks.push(task);
        }
    }

    /// Transition to `completed`. No effect on a terminal run.
    pub fn complete(&mut self) {
        if self.status == RunStatus::Running {
            self.status = RunStatus::Completed;
            self.completed_at = Some(Utc::now());
        }
    }

    /// Transition to `failed`. No effect on a terminal run.
    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status == RunStatus::Running {
            self.status = RunStatus::Failed;
            self.error = Some(error.into());
            self.completed_at = Some(Utc::now());
        }
    }

    /// Task result for the last attempt of `stage`, if any.
    pub fn task(&self, stage: StageKind) -> Option<&TaskResult> {
        self.tasks.iter().rev().find(|t| t.task_type == stage.as_str())
    }
}
