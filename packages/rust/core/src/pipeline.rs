//! Pipeline orchestration: acquisition → aggregation → keywords → slides.
//!
//! Every stage runs inside an isolation boundary: a stage error becomes a
//! `failed` [`TaskResult`] and later stages still run. Only an error outside
//! the stages (e.g. invalid planning settings) marks the run `failed`.

use std::path::PathBuf;
use std::time::Instant;

use serde_json::{Value, json};
use tracing::{error, info, instrument, warn};

use slidepipe_shared::{
    AppConfig, Corpus, KeywordProfile, PipelineConfig, PipelineRun, PipelineType,
    PlanningConfig, Result, SlidePipeError, SlideSpec, SourceKind, StageKind, TaskResult,
};

use crate::aggregator::aggregate;
use crate::decode::RawSource;
use crate::keywords::{self, KeywordOptions};
use crate::planner::{PlanOptions, SlidePlanner};
use crate::report;
use crate::sources::{Acquirer, JsonFileAcquirer};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Asked before a stage begins. Returning `false` skips it.
    fn should_start(&self, _stage: StageKind) -> bool {
        true
    }
    /// Called when a stage begins.
    fn stage_started(&self, stage: StageKind);
    /// Called with every recorded task result.
    fn stage_finished(&self, result: &TaskResult);
    /// Called once the run is terminal.
    fn done(&self, run: &PipelineRun);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage_started(&self, _stage: StageKind) {}
    fn stage_finished(&self, _result: &TaskResult) {}
    fn done(&self, _run: &PipelineRun) {}
}

/// A finished run and the deck it produced, if any.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub run: PipelineRun,
    pub deck: Option<Vec<SlideSpec>>,
}

/// One step of a resolved stage plan.
#[derive(Debug, Clone, PartialEq)]
enum PlannedStage {
    Run {
        stage: StageKind,
        targets: Vec<String>,
    },
    Unknown(String),
}

impl PlannedStage {
    fn run(stage: StageKind) -> Self {
        Self::Run {
            stage,
            targets: Vec::new(),
        }
    }
}

/// Output chained from earlier stages to later ones. Owned by one run.
#[derive(Debug, Default)]
struct StageContext {
    sources: Vec<RawSource>,
    corpus: Option<Corpus>,
    profile: Option<KeywordProfile>,
    deck: Option<Vec<SlideSpec>>,
}

impl StageContext {
    fn add_sources(&mut self, sources: Vec<RawSource>) {
        self.sources.extend(sources);
        // Derived data no longer covers every source.
        self.corpus = None;
        self.profile = None;
    }

    /// Corpus and profile, derived from the current sources when a
    /// preceding stage did not build them.
    fn synthesis_inputs(&mut self, opts: &KeywordOptions) -> (&Corpus, &KeywordProfile) {
        let corpus = self.corpus.get_or_insert_with(|| aggregate(&self.sources));
        let profile = self
            .profile
            .get_or_insert_with(|| keywords::analyze(&corpus.text, opts));
        (&*corpus, &*profile)
    }
}

/// Sequences pipeline stages and assembles the run report.
pub struct PipelineOrchestrator {
    planning: PlanningConfig,
    sample_fallback: bool,
    output_dir: Option<PathBuf>,
    scraper: Box<dyn Acquirer>,
    extractor: Box<dyn Acquirer>,
}

impl PipelineOrchestrator {
    /// Orchestrator reading pre-extracted JSON, persisting per `config.output`.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            planning: config.planning.clone(),
            sample_fallback: config.fallback.sample_content,
            output_dir: config
                .output
                .persist
                .then(|| PathBuf::from(&config.output.output_dir)),
            scraper: Box::new(JsonFileAcquirer),
            extractor: Box::new(JsonFileAcquirer),
        }
    }

    /// Replace the web scraping collaborator.
    pub fn with_scraper(mut self, scraper: Box<dyn Acquirer>) -> Self {
        self.scraper = scraper;
        self
    }

    /// Replace the document extraction collaborator.
    pub fn with_extractor(mut self, extractor: Box<dyn Acquirer>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Set (or clear) the artifact output root.
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Run a pipeline to completion. Always returns a terminal run report.
    #[instrument(skip_all, fields(pipeline_type = %config.pipeline_type))]
    pub fn run(&self, config: &PipelineConfig, progress: &dyn ProgressReporter) -> PipelineOutcome {
        let mut run = PipelineRun::start(config.pipeline_type);
        let mut ctx = StageContext::default();

        info!(pipeline_id = run.pipeline_id(), "starting pipeline");

        match self.execute(config, &mut run, &mut ctx, progress) {
            Ok(()) => run.complete(),
            Err(e) => {
                error!(error = %e, "pipeline failed");
                run.fail(e.to_string());
            }
        }

        if let Some(dir) = &self.output_dir {
            if let Err(e) = report::write_report(dir, &run) {
                warn!(error = %e, "could not persist run report");
            }
        }

        progress.done(&run);

        info!(
            pipeline_id = run.pipeline_id(),
            status = ?run.status(),
            tasks = run.tasks().len(),
            "pipeline finished"
        );

        PipelineOutcome {
            run,
            deck: ctx.deck,
        }
    }

    fn execute(
        &self,
        config: &PipelineConfig,
        run: &mut PipelineRun,
        ctx: &mut StageContext,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        let planning = self.planning.merged(&config.planning);
        planning.validate()?;
        let sample_fallback = config.sample_fallback.unwrap_or(self.sample_fallback);

        for planned in stage_plan(config) {
            match planned {
                PlannedStage::Run { stage, targets } => {
                    self.run_stage(stage, &targets, &planning, sample_fallback, run, ctx, progress);
                }
                PlannedStage::Unknown(task_type) => {
                    warn!(%task_type, "skipping unknown task type");
                    let task = TaskResult::skipped(task_type, "unknown task type");
                    progress.stage_finished(&task);
                    run.push_task(task);
                }
            }
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn run_stage(
        &self,
        stage: StageKind,
        targets: &[String],
        planning: &PlanningConfig,
        sample_fallback: bool,
        run: &mut PipelineRun,
        ctx: &mut StageContext,
        progress: &dyn ProgressReporter,
    ) {
        if !progress.should_start(stage) {
            info!(%stage, "stage declined by caller");
            let task = TaskResult::skipped(stage.as_str(), "declined");
            progress.stage_finished(&task);
            run.push_task(task);
            return;
        }

        progress.stage_started(stage);
        let start = Instant::now();

        let outcome = match stage {
            StageKind::Scraping => {
                self.acquire(stage, self.scraper.as_ref(), SourceKind::Web, targets, ctx)
            }
            StageKind::PdfOcr => self.acquire(
                stage,
                self.extractor.as_ref(),
                SourceKind::Documents,
                targets,
                ctx,
            ),
            StageKind::Aggregation => Ok(aggregation_stage(ctx)),
            StageKind::KeywordAnalysis => Ok(keyword_stage(ctx, &planning.into())),
            StageKind::SlideGeneration => {
                self.slide_stage(run.pipeline_id(), planning, sample_fallback, ctx)
            }
        };

        let task = match outcome {
            Ok(output) => TaskResult::completed(stage, start.elapsed(), output),
            Err(e) => {
                warn!(%stage, error = %e, "stage failed");
                TaskResult::failed(stage, start.elapsed(), e.to_string())
            }
        };

        progress.stage_finished(&task);
        run.push_task(task);
    }

    fn acquire(
        &self,
        stage: StageKind,
        acquirer: &dyn Acquirer,
        kind: SourceKind,
        targets: &[String],
        ctx: &mut StageContext,
    ) -> Result<Value> {
        let sources = acquirer
            .acquire(kind, targets)
            .map_err(|e| SlidePipeError::stage(stage.as_str(), e.to_string()))?;

        let unavailable = sources.iter().filter(|s| !s.is_available()).count();
        let output = json!({
            "targets": targets.len(),
            "sources": sources.len(),
            "unavailable": unavailable,
        });

        info!(%stage, sources = sources.len(), unavailable, "acquisition complete");
        ctx.add_sources(sources);
        Ok(output)
    }

    fn slide_stage(
        &self,
        pipeline_id: &str,
        planning: &PlanningConfig,
        sample_fallback: bool,
        ctx: &mut StageContext,
    ) -> Result<Value> {
        let planner = SlidePlanner::new(PlanOptions::from_config(planning, pipeline_id));
        let keyword_opts = KeywordOptions::from(planning);

        let planned = {
            let (corpus, profile) = ctx.synthesis_inputs(&keyword_opts);
            planner.plan(corpus, profile)
        };

        let (deck, used_fallback) = match planned {
            Ok(deck) => (deck, false),
            Err(SlidePipeError::NoContentAvailable) if sample_fallback => {
                info!("no content acquired, planning from sample content");
                let sample = Corpus::sample();
                let profile = keywords::analyze(&sample.text, &keyword_opts);
                (planner.plan(&sample, &profile)?, true)
            }
            Err(SlidePipeError::NoContentAvailable) => {
                warn!("no content and no fallback, substituting placeholder deck");
                let placeholder = planner.placeholder_deck();
                if let Err(e) = self.persist_deck(pipeline_id, &placeholder) {
                    warn!(error = %e, "could not persist placeholder deck");
                }
                ctx.deck = Some(placeholder);
                return Err(SlidePipeError::NoContentAvailable);
            }
            Err(e) => return Err(e),
        };

        let (deck_path, sha256) = match self.persist_deck(pipeline_id, &deck)? {
            Some(meta) => (Some(meta.path.display().to_string()), meta.sha256),
            None => (None, report::deck_fingerprint(&deck)?),
        };

        let output = json!({
            "slides_created": deck.len(),
            "sample_fallback": used_fallback,
            "deck": deck_path,
            "sha256": sha256,
        });
        ctx.deck = Some(deck);
        Ok(output)
    }

    fn persist_deck(
        &self,
        pipeline_id: &str,
        deck: &[SlideSpec],
    ) -> Result<Option<report::ArtifactMeta>> {
        match &self.output_dir {
            Some(dir) => report::write_deck(dir, pipeline_id, deck).map(Some),
            None => Ok(None),
        }
    }
}

fn aggregation_stage(ctx: &mut StageContext) -> Value {
    let corpus = aggregate(&ctx.sources);
    let output = json!({
        "items": corpus.items.len(),
        "documents": corpus.documents().count(),
        "web_pages": corpus.web_pages().count(),
        "excluded": corpus.excluded.len(),
        "unavailable": corpus.unavailable.len(),
        "text_length": corpus.char_len(),
    });
    ctx.corpus = Some(corpus);
    ctx.profile = None;
    output
}

fn keyword_stage(ctx: &mut StageContext, opts: &KeywordOptions) -> Value {
    // A fresh profile always reflects the current corpus.
    ctx.profile = None;
    let (_, profile) = ctx.synthesis_inputs(opts);
    json!({
        "keywords": profile.len(),
        "top": profile.tokens().into_iter().take(5).collect::<Vec<_>>(),
    })
}

/// Resolve the declared pipeline type into an ordered stage list.
fn stage_plan(config: &PipelineConfig) -> Vec<PlannedStage> {
    let synthesis = [
        PlannedStage::run(StageKind::Aggregation),
        PlannedStage::run(StageKind::KeywordAnalysis),
        PlannedStage::run(StageKind::SlideGeneration),
    ];

    let acquisition = |stage: StageKind, targets: &[String]| PlannedStage::Run {
        stage,
        targets: targets.to_vec(),
    };

    match config.pipeline_type {
        PipelineType::Full => {
            let mut stages = Vec::new();
            if !config.scraping_targets.is_empty() {
                stages.push(acquisition(StageKind::Scraping, &config.scraping_targets));
            }
            if !config.pdf_files.is_empty() {
                stages.push(acquisition(StageKind::PdfOcr, &config.pdf_files));
            }
            stages.extend(synthesis);
            stages
        }
        PipelineType::ScrapingToSlides => {
            let mut stages = vec![acquisition(StageKind::Scraping, &config.scraping_targets)];
            stages.extend(synthesis);
            stages
        }
        PipelineType::PdfToSlides => {
            let mut stages = vec![acquisition(StageKind::PdfOcr, &config.pdf_files)];
            stages.extend(synthesis);
            stages
        }
        PipelineType::Custom => config
            .tasks
            .iter()
            .map(|task| match StageKind::parse(&task.task_type) {
                Some(stage @ StageKind::Scraping) => acquisition(stage, &task.targets),
                Some(stage @ StageKind::PdfOcr) => acquisition(stage, &task.files),
                Some(stage) => PlannedStage::run(stage),
                None => PlannedStage::Unknown(task.task_type.clone()),
            })
            .collect(),
    }
}
