//! Shared types, error model, and configuration for SlidePipe.
//!
//! This crate is the foundation depended on by all other SlidePipe crates.
//! It provides:
//! - [`SlidePipeError`] — the unified error type
//! - Domain types ([`ExtractionRecord`], [`Corpus`], [`KeywordProfile`], [`SlideSpec`])
//! - Run report types ([`PipelineRun`], [`TaskResult`])
//! - Configuration ([`AppConfig`], [`PlanningConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod run;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FallbackConfig, OutputConfig, PipelineConfig, PlanningConfig, PlanningOverrides,
    TaskSpec, config_dir, config_file_path, init_config, load_config, load_config_from,
    load_pipeline_config,
};
pub use error::{Result, SlidePipeError};
pub use run::{PipelineRun, PipelineType, RunStatus, StageKind, TaskResult, TaskStatus};
pub use types::{
    ContentItem, Corpus, DocumentItem, DocumentMetadata, DocumentStats, ExcludedRecord,
    ExtractionRecord, Keyword, KeywordProfile, Language, PdfDocument, SUCCESS_STATUSES,
    SampleItem, SlideSpec, SourceKind, WebContent, WebPage, WebPageItem,
};
