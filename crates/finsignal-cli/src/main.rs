//! Command-line interface for finsignal
//!
//! Reads financial text from a file, `--text`, or stdin, runs the signal
//! engine, and prints the analysis as JSON (default) or as a table.
//!
//! # Usage
//!
//! ```bash
//! finsignal --mode metrics report.txt
//! echo "Shares soared on record profits." | finsignal --mode sentiment --output table
//! finsignal --chart pie --match-policy last report.txt
//! ```

mod render;

use anyhow::Context;
use clap::Parser;
use finsignal_engine::{AnalysisMode, ChartKind, EngineConfig, MatchPolicy, SignalEngine};
use finsignal_utils::{LogConfig, LogFormat};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finsignal")]
#[command(about = "Extract investment signals from financial text", long_about = None)]
struct Args {
    /// Input file; reads stdin when omitted
    file: Option<PathBuf>,

    /// Analyze this text instead of a file or stdin
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// Pipeline: sentiment or metrics
    #[arg(short, long, default_value = "metrics")]
    mode: AnalysisMode,

    /// Chart to prepare (bar, pie, histogram, line); overrides --mode
    #[arg(short, long)]
    chart: Option<ChartKind>,

    /// Output format: json or table
    #[arg(short, long, default_value = "json")]
    output: OutputFormat,

    /// Which value wins for repeated metrics: first or last
    #[arg(long)]
    match_policy: Option<MatchPolicy>,

    /// Threshold for the narrated sentiment recommendation
    #[arg(long)]
    narrated_threshold: Option<f64>,

    /// Threshold for the chart annotation
    #[arg(long)]
    annotation_threshold: Option<f64>,

    /// Threshold for the trade signal
    #[arg(long)]
    trade_threshold: Option<f64>,

    /// Log line format: pretty or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            other => anyhow::bail!("unknown output format: {other}"),
        }
    }
}

impl Args {
    /// Defaults, then `FINSIGNAL_*` env, then flags
    fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = EngineConfig::default().with_env_overrides()?;

        if let Some(policy) = self.match_policy {
            config.match_policy = policy;
        }
        if let Some(threshold) = self.narrated_threshold {
            config.narrated_threshold = threshold;
        }
        if let Some(threshold) = self.annotation_threshold {
            config.annotation_threshold = threshold;
        }
        if let Some(threshold) = self.trade_threshold {
            config.trade_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }

    fn chart_kind(&self) -> ChartKind {
        self.chart.unwrap_or_else(|| self.mode.default_chart())
    }
}

async fn read_input(text: Option<&str>, file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }

    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "info,finsignal_engine=debug" } else { "warn" };
    finsignal_utils::init_tracing(
        &LogConfig::default()
            .with_level(level)
            .with_format(args.log_format),
    );

    let config = args.engine_config()?;
    let chart = args.chart_kind();
    let input = read_input(args.text.as_deref(), args.file.as_deref()).await?;

    info!("Running {} analysis for {} chart", chart.mode(), chart);

    let engine = SignalEngine::new(config)?;
    let analysis = engine.analyze_for_chart(&input, chart);

    match args.output {
        OutputFormat::Json => println!("{}", analysis.to_json()?),
        OutputFormat::Table => print!("{}", render::render_table(&analysis)),
    }

    Ok(())
}
