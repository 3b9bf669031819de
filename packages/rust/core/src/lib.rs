//! Core pipeline orchestration and domain logic for SlidePipe.
//!
//! This crate ties together source decoding, content aggregation, keyword
//! analysis, and slide planning into end-to-end runs (see
//! [`PipelineOrchestrator::run`]).

pub mod aggregator;
pub mod decode;
pub mod keywords;
pub mod labels;
pub mod pipeline;
pub mod planner;
pub mod report;
pub mod sources;

pub use aggregator::aggregate;
pub use decode::{DecodedSource, RawSource, decode_source};
pub use keywords::{KeywordOptions, analyze};
pub use labels::Labels;
pub use pipeline::{PipelineOrchestrator, PipelineOutcome, ProgressReporter, SilentProgress};
pub use planner::{PlanOptions, SlidePlanner};
pub use report::{ArtifactMeta, read_report, write_deck, write_report};
pub use sources::{Acquirer, JsonFileAcquirer, load_source};
