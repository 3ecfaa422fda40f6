//! scalebench CLI - runs speedup sweeps of an external parallel workload.
//!
//! Measures a sequential baseline, sweeps each parallel scheduler across
//! thread counts, and writes one speedup chart per scheduler.

mod commands;

use clap::Parser;
use scalebench_core::config::{ConfigOverrides, ReportOverrides, SweepOverrides};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// scalebench: speedup curves for parallel schedulers
#[derive(Parser, Debug)]
#[command(name = "scalebench", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (config lookup and relative paths)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand (defaults to `run`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the benchmark sweep and write one chart per scheduler
    Run(RunArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

#[derive(clap::Args, Debug, Default, Clone)]
struct RunArgs {
    /// Parallel scheduler to benchmark (repeatable; replaces the configured list)
    #[arg(short, long = "scheduler")]
    schedulers: Vec<String>,

    /// Thread counts to sweep, comma separated
    #[arg(short, long, value_delimiter = ',')]
    threads: Vec<usize>,

    /// Repetitions of the full sweep
    #[arg(short, long)]
    repetitions: Option<usize>,

    /// Datasets to measure, comma separated
    #[arg(short, long, value_delimiter = ',')]
    datasets: Vec<String>,

    /// Directory charts are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write a JSON summary next to each chart
    #[arg(long)]
    summary: bool,
}

impl RunArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            sweep: SweepOverrides {
                datasets: non_empty(&self.datasets)
                    .map(|d| d.iter().map(|s| s.as_str().into()).collect()),
                thread_counts: non_empty(&self.threads).map(<[usize]>::to_vec),
                repetitions: self.repetitions,
                schedulers: non_empty(&self.schedulers)
                    .map(|s| s.iter().map(|s| s.as_str().into()).collect()),
            },
            report: ReportOverrides {
                output_dir: self.output_dir.clone(),
                write_summary: self.summary.then_some(true),
            },
        }
    }
}

fn non_empty<T>(items: &[T]) -> Option<&[T]> {
    (!items.is_empty()).then_some(items)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "scalebench", "scalebench")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "scalebench.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));
    commands::handle_command(command, &workspace).await
}
