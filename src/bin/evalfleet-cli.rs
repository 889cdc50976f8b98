//! # Evalfleet CLI
//!
//! Run an evaluation end to end, or inspect how a dataset would be batched and how
//! long its cold start is expected to take.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use evalfleet_core::batching::BatchSplitter;
use evalfleet_core::client::{estimated_minutes, BufferTimeEstimator, Evaluator};
use evalfleet_core::config::{ConfigManager, EvalConfig};
use evalfleet_core::logging::init_structured_logging;
use evalfleet_core::models::{parse_records, EvaluationRequest, Record, ResultVersion};
use evalfleet_core::orchestration::EnvBlock;
use evalfleet_core::EvalError;

#[derive(Parser)]
#[command(name = "evalfleet-cli")]
#[command(about = "Submit batch evaluation jobs and inspect their planning")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (TOML); EVALFLEET_* environment variables override it
    #[arg(short, long, global = true, env = "EVALFLEET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a dataset, wait for completion and print the scores
    Evaluate {
        /// Dataset as a JSON array of objects or JSON Lines
        #[arg(short, long)]
        file: PathBuf,

        /// Metric to compute (repeat or comma-separate)
        #[arg(short, long, value_delimiter = ',', required = true)]
        metrics: Vec<String>,

        #[arg(long)]
        max_batch_size: Option<usize>,

        /// Seconds between status checks
        #[arg(long)]
        refresh_rate: Option<u64>,

        /// Log every pending status check
        #[arg(long)]
        refresh_message: bool,

        /// Give up polling after this many seconds
        #[arg(long)]
        deadline: Option<u64>,

        /// Where the HTML report is written
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the cold-start buffer estimate
    Estimate {
        #[arg(short, long)]
        questions: usize,

        #[arg(short, long, value_delimiter = ',', required = true)]
        metrics: Vec<String>,

        #[arg(short, long, default_value_t = 1)]
        tasks: usize,
    },

    /// Show how a dataset would be split into batches and transport chunks
    Split {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        max_batch_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    init_structured_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => process::exit(0),
        Err(e) => {
            error!(error = %format!("{e:#}"), "Evaluation CLI failed");
            let code = match e.downcast_ref::<EvalError>() {
                Some(EvalError::Cancelled) => 130,
                _ => 1,
            };
            process::exit(code);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let manager = ConfigManager::load(cli.config.as_deref())?;
    let mut config = manager.config().clone();

    match cli.command {
        Commands::Evaluate {
            file,
            metrics,
            max_batch_size,
            refresh_rate,
            refresh_message,
            deadline,
            report,
        } => {
            if let Some(rate) = refresh_rate {
                config.polling.refresh_rate_seconds = rate;
            }
            config.polling.refresh_message |= refresh_message;
            if deadline.is_some() {
                config.polling.deadline_seconds = deadline;
            }
            if let Some(path) = report {
                config.report.output_path = path;
            }
            if let Some(size) = max_batch_size {
                config.batching.max_batch_size = size;
            }
            config.validate()?;
            evaluate(&config, &file, metrics).await
        }
        Commands::Estimate {
            questions,
            metrics,
            tasks,
        } => {
            let seconds =
                BufferTimeEstimator::new(config.buffer.clone()).estimate_seconds(questions, &metrics, tasks)?;
            println!(
                "Estimated cold start: {seconds}s (~{} minutes)",
                estimated_minutes(seconds)
            );
            Ok(())
        }
        Commands::Split {
            file,
            max_batch_size,
        } => {
            let rows = read_rows(&file).await?;
            let splitter =
                BatchSplitter::new(max_batch_size.unwrap_or(config.batching.max_batch_size))?;
            for batch in splitter.split(&rows)? {
                let block = EnvBlock::build(
                    &[],
                    ResultVersion::new(),
                    &batch.encoded_content,
                    config.dispatcher.max_transport_bytes,
                )?;
                println!(
                    "batch {:>4}: rows {:?}, {} encoded bytes, {} transport chunk(s)",
                    batch.index,
                    batch.row_range(),
                    batch.encoded_content.len(),
                    block.content_parts.len()
                );
            }
            Ok(())
        }
    }
}

async fn evaluate(config: &EvalConfig, file: &Path, metrics: Vec<String>) -> anyhow::Result<()> {
    let rows = read_rows(file).await?;
    let request =
        EvaluationRequest::new(rows, metrics).with_max_batch_size(config.batching.max_batch_size);
    let evaluator = Evaluator::from_config(config)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling evaluation");
            trigger.cancel();
        }
    });

    let result = evaluator.evaluate(&request, &cancel).await?;

    println!("{}", serde_json::to_string_pretty(&result.per_metric_averages)?);
    info!(
        questions = result.per_question_scores.len(),
        report = result.report_artifact.is_some(),
        "Evaluation finished"
    );
    Ok(())
}

async fn read_rows(file: &Path) -> anyhow::Result<Vec<Record>> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("reading dataset {}", file.display()))?;
    Ok(parse_records(&text)?)
}
