//! Gap Scorecard Evaluation Tool
//!
//! Measures how well the compliance analysis service finds the gaps a
//! hand-curated golden dataset says each document has, and reports
//! precision, recall and F1 per case and overall.
//!
//! # Prerequisites
//!
//! The analysis service must be running (by default on `localhost:3001`)
//! and the golden dataset must exist under `e2e/evals/golden-dataset/`.
//!
//! # Usage
//!
//! ```bash
//! # Run evaluation
//! cargo run -p scorecard-eval --release
//!
//! # Output JSON for analysis
//! cargo run -p scorecard-eval --release -- --json
//!
//! # Probe a stricter norm rule and optimal pairing
//! cargo run -p scorecard-eval --release -- --norm-match strict --strategy maximum
//!
//! # Exit non-zero when any case could not be evaluated
//! cargo run -p scorecard-eval --release -- --fail-on-error
//! ```

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use output::DatasetInfo;
use scorecard_core::client::HttpAnalysisClient;
use scorecard_core::config::REQUEST_TIMEOUT_SECS;
use scorecard_core::dataset::load_ground_truth;
use scorecard_core::evaluation::Evaluator;
use scorecard_core::matching::{MatchConfig, MatchStrategy, NormMatch};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit status used with `--fail-on-error` when some case FAILED.
const FAILED_CASES_EXIT_CODE: i32 = 2;

// =============================================================================
// CLI
// =============================================================================

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NormMatchArg {
    /// Code, evidence code, or citation inside the description
    Loose,
    /// Code or evidence code
    Evidence,
    /// Code only
    Strict,
}

impl From<NormMatchArg> for NormMatch {
    fn from(arg: NormMatchArg) -> Self {
        match arg {
            NormMatchArg::Loose => NormMatch::Loose,
            NormMatchArg::Evidence => NormMatch::Evidence,
            NormMatchArg::Strict => NormMatch::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// First matching candidate wins, in response order
    Greedy,
    /// Maximum number of pairs
    Maximum,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => MatchStrategy::Greedy,
            StrategyArg::Maximum => MatchStrategy::Maximum,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "scorecard-eval", version)]
#[command(about = "Score the compliance analysis service against the golden dataset")]
struct Args {
    /// Analysis endpoint URL [env: SCORECARD_ENDPOINT]
    #[arg(long)]
    endpoint: Option<String>,

    /// Golden dataset directory [env: SCORECARD_DATA_DIR]
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Rule deciding whether a found gap relates to an expected norm
    #[arg(long, value_enum, default_value = "loose")]
    norm_match: NormMatchArg,

    /// Pairing strategy between found and expected gaps
    #[arg(long, value_enum, default_value = "greedy")]
    strategy: StrategyArg,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Exit with status 2 if any case failed
    #[arg(long)]
    fail_on_error: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

// =============================================================================
// Main
// =============================================================================

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40}] {pos}/{len} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message("Cases");
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let endpoint = config::endpoint(args.endpoint.as_deref())?;
    let data_dir = config::data_dir(args.data_dir.as_ref());
    let matching = MatchConfig {
        norm_match: args.norm_match.into(),
        strategy: args.strategy.into(),
    };

    let ground_truth = load_ground_truth(&data_dir).with_context(|| {
        format!(
            "Cannot evaluate without ground truth in {}",
            data_dir.display()
        )
    })?;

    let client = HttpAnalysisClient::new(&endpoint, Duration::from_secs(args.timeout_secs))
        .context("Failed to create analysis client")?;
    info!("Evaluating against {} ({:?})", endpoint, matching);

    if !args.json {
        println!("{}", output::format_header());
    }

    let pb = progress_bar(ground_truth.num_cases());
    let summary = Evaluator::new(matching)
        .run(&ground_truth, &client, |report| {
            // JSON mode keeps stdout for the report itself
            let line = output::format_case_line(report);
            pb.suspend(|| {
                if args.json {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            });
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    if args.json {
        let dataset = DatasetInfo {
            data_dir: data_dir.display().to_string(),
            endpoint,
            num_cases: ground_truth.num_cases(),
            num_expected_gaps: ground_truth.num_expected_gaps(),
        };
        println!("{}", output::format_json(&summary, dataset, matching));
    } else {
        println!("{}", output::format_summary(&summary));
    }

    if args.fail_on_error && summary.num_failed() > 0 {
        std::process::exit(FAILED_CASES_EXIT_CODE);
    }

    Ok(())
}
