//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use slidepipe_core::keywords::{self, KeywordOptions};
use slidepipe_core::pipeline::{PipelineOrchestrator, ProgressReporter};
use slidepipe_core::planner::{PlanOptions, SlidePlanner};
use slidepipe_core::{aggregate, load_source};
use slidepipe_shared::{
    AppConfig, Corpus, Language, PipelineRun, PlanningOverrides, RunStatus, SlidePipeError,
    SlideSpec, SourceKind, StageKind, TaskResult, TaskStatus, init_config, load_config,
    load_pipeline_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SlidePipe — turn extracted content into slide decks.
#[derive(Parser)]
#[command(
    name = "slidepipe",
    version,
    about = "Aggregate scraped web pages and extracted PDFs into a bounded slide deck.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a pipeline described by a JSON or TOML file.
    Run {
        /// Pipeline description file.
        #[arg(short, long)]
        config: PathBuf,

        /// Artifact output root (defaults to `[output] output_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Do not write the deck or run report to disk.
        #[arg(long)]
        no_persist: bool,
    },

    /// Plan a deck from extraction output files and print it as JSON.
    Plan {
        /// Web scraping output file (repeatable).
        #[arg(long)]
        web: Vec<PathBuf>,

        /// PDF extraction output file (repeatable).
        #[arg(long)]
        documents: Vec<PathBuf>,

        /// Maximum number of slides.
        #[arg(short, long)]
        budget: Option<usize>,

        /// Label language: ja or en.
        #[arg(short, long)]
        language: Option<String>,

        /// Use sample content when no source yields any.
        #[arg(long)]
        sample_fallback: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "slidepipe=info",
        1 => "slidepipe=debug",
        _ => "slidepipe=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `plan` output stays pipeable.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            config,
            out,
            no_persist,
        } => cmd_run(&config, out, no_persist),
        Command::Plan {
            web,
            documents,
            budget,
            language,
            sample_fallback,
        } => cmd_plan(&web, &documents, budget, language.as_deref(), sample_fallback),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_run(config_path: &Path, out: Option<PathBuf>, no_persist: bool) -> Result<()> {
    let app_config: AppConfig = load_config()?;
    let pipeline = load_pipeline_config(config_path)?;

    let output_dir = if no_persist {
        None
    } else {
        Some(out.unwrap_or_else(|| PathBuf::from(&app_config.output.output_dir)))
    };

    info!(
        config = %config_path.display(),
        pipeline_type = %pipeline.pipeline_type,
        "running pipeline"
    );

    let orchestrator = PipelineOrchestrator::new(&app_config).with_output_dir(output_dir.clone());
    let reporter = CliProgress::new();
    let outcome = orchestrator.run(&pipeline, &reporter);
    let run = &outcome.run;

    println!();
    println!("  Pipeline: {}", run.pipeline_id());
    println!("  Type:     {}", run.pipeline_type());
    println!("  Status:   {}", status_label(run.status()));
    println!("  Started:  {}", run.started_at().to_rfc3339());
    for task in run.tasks() {
        println!("  {}", task_line(task));
    }
    if let Some(deck) = &outcome.deck {
        println!("  Slides:   {}", deck.len());
    }
    if let Some(dir) = &output_dir {
        println!(
            "  Report:   {}",
            dir.join("pipelines")
                .join(format!("{}.json", run.pipeline_id()))
                .display()
        );
    }
    println!();

    match run.status() {
        RunStatus::Failed => Err(eyre!(
            "pipeline failed: {}",
            run.error().unwrap_or("unknown error")
        )),
        _ => Ok(()),
    }
}

fn cmd_plan(
    web: &[PathBuf],
    documents: &[PathBuf],
    budget: Option<usize>,
    language: Option<&str>,
    sample_fallback: bool,
) -> Result<()> {
    let app_config: AppConfig = load_config()?;
    let planning = app_config.planning.merged(&PlanningOverrides {
        slide_budget: budget,
        language: language.map(Language::from_code),
        ..PlanningOverrides::default()
    });
    planning.validate()?;

    let sources: Vec<_> = web
        .iter()
        .map(|path| load_source(SourceKind::Web, path))
        .chain(documents.iter().map(|path| load_source(SourceKind::Documents, path)))
        .collect();

    let keyword_opts = KeywordOptions::from(&planning);
    let planner = SlidePlanner::new(PlanOptions::from_config(&planning, "preview"));

    let corpus = aggregate(&sources);
    let deck = plan_deck(
        &planner,
        &corpus,
        &keyword_opts,
        sample_fallback || app_config.fallback.sample_content,
    )?;

    println!("{}", serde_json::to_string_pretty(&deck)?);
    Ok(())
}

/// Plan `corpus`, falling back to sample content or the placeholder deck
/// when it holds nothing.
fn plan_deck(
    planner: &SlidePlanner,
    corpus: &Corpus,
    keyword_opts: &KeywordOptions,
    sample_fallback: bool,
) -> Result<Vec<SlideSpec>> {
    let profile = keywords::analyze(&corpus.text, keyword_opts);
    match planner.plan(corpus, &profile) {
        Err(SlidePipeError::NoContentAvailable) if sample_fallback => {
            info!("no content in the given sources, planning from sample content");
            let sample = Corpus::sample();
            let profile = keywords::analyze(&sample.text, keyword_opts);
            Ok(planner.plan(&sample, &profile)?)
        }
        Err(SlidePipeError::NoContentAvailable) => {
            warn!("no content and no fallback, substituting placeholder deck");
            Ok(planner.placeholder_deck())
        }
        other => Ok(other?),
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Running => "running",
        RunStatus::Completed => "completed",
        RunStatus::Failed => "failed",
    }
}

fn task_line(task: &TaskResult) -> String {
    match task.status {
        TaskStatus::Completed => format!("✓ {:<18} {:.3}s", task.task_type, task.duration),
        TaskStatus::Failed => format!(
            "✗ {:<18} {}",
            task.task_type,
            task.error.as_deref().unwrap_or("failed")
        ),
        TaskStatus::Skipped => format!(
            "- {:<18} skipped ({})",
            task.task_type,
            task.reason.as_deref().unwrap_or("no reason")
        ),
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage_started(&self, stage: StageKind) {
        self.spinner.set_message(format!("Running {stage}"));
    }

    fn stage_finished(&self, result: &TaskResult) {
        if result.status == TaskStatus::Failed {
            self.spinner.println(task_line(result));
        }
    }

    fn done(&self, _run: &PipelineRun) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidepipe_core::RawSource;
    use slidepipe_shared::PlanningConfig;
    use serde_json::json;

    fn planner() -> SlidePlanner {
        let planning = PlanningConfig {
            language: Language::En,
            ..PlanningConfig::default()
        };
        SlidePlanner::new(PlanOptions::from_config(&planning, "preview"))
    }

    #[test]
    fn empty_sources_plan_placeholder_deck() {
        let empty = RawSource::new(SourceKind::Documents, "empty.json", json!([]));
        let corpus = aggregate(&[empty]);
        let deck = plan_deck(&planner(), &corpus, &KeywordOptions::default(), false)
            .expect("placeholder deck");
        assert_eq!(deck.len(), 1);
        assert_eq!(deck[0].title(), "No Data");
    }

    #[test]
    fn empty_sources_use_sample_when_enabled() {
        let deck = plan_deck(&planner(), &Corpus::default(), &KeywordOptions::default(), true)
            .expect("sample deck");
        assert!(deck.len() >= 2);
        assert_eq!(deck[0].title(), "Data Analysis Results");
    }

    #[test]
    fn content_plans_normally() {
        let source = RawSource::new(
            SourceKind::Documents,
            "docs.json",
            json!([{"file": "a.pdf", "status": "completed", "text": "quarterly figures"}]),
        );
        let deck = plan_deck(&planner(), &aggregate(&[source]), &KeywordOptions::default(), false)
            .expect("deck");
        assert!(deck.iter().any(|s| s.title() == "a.pdf"));
    }
}
