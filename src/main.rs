//! Command-line entry point for mailprobe.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mailprobe::io::{load_addresses, log_summary, write_report, ReportFormat};
use mailprobe::{AppError, BatchVerifier, ConfigBuilder, Result, Verifier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mailprobe",
    version,
    about = "Probe mail servers to check whether addresses are deliverable, without sending mail."
)]
struct Cli {
    /// Input file with candidate addresses (.txt, .csv, or .json)
    input: PathBuf,

    /// Where to write the report (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "MAILPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Sender address used in MAIL FROM
    #[arg(long)]
    sender: Option<String>,

    /// Per-session SMTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Addresses verified concurrently within a group
    #[arg(long)]
    concurrency: Option<usize>,

    /// Addresses per batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Retries for transient failures
    #[arg(long)]
    retry_attempts: Option<u32>,

    /// Disable the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut builder = ConfigBuilder::new();
    if let Some(ref path) = cli.config {
        builder = builder.config_file(path.display().to_string());
    }
    if let Some(ref sender) = cli.sender {
        builder = builder.smtp_sender(sender.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.smtp_timeout(Duration::from_secs(secs));
    }
    if let Some(concurrency) = cli.concurrency {
        builder = builder.max_concurrency(concurrency);
    }
    if let Some(size) = cli.batch_size {
        builder = builder.batch_size(size);
    }
    if let Some(attempts) = cli.retry_attempts {
        builder = builder.retry_attempts(attempts);
    }
    let config = Arc::new(builder.build()?);

    let addresses = load_addresses(&cli.input)?;
    if addresses.is_empty() {
        return Err(AppError::Config(format!(
            "No candidate addresses found in '{}'",
            cli.input.display()
        )));
    }

    let verifier = Arc::new(Verifier::new(config.clone())?);
    let pipeline = BatchVerifier::new(config, verifier);

    let bar = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(addresses.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .expect("Progress bar template failed to parse. This is a bug.")
            .progress_chars("#>-"),
        );
        bar
    };

    let outcomes = pipeline
        .run_with_progress(&addresses, |outcome| {
            bar.set_message(format!("{} -> {}", outcome.email, outcome.status));
            bar.inc(1);
        })
        .await;
    bar.finish_and_clear();

    write_report(&outcomes, cli.format, cli.output.as_deref())?;
    log_summary(&outcomes);
    Ok(())
}
