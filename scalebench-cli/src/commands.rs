//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use crate::RunArgs;
use anyhow::Context;
use scalebench_core::config::{config_exists, load_config, workspace_config_path};
use scalebench_core::{
    BenchConfig, BenchmarkSession, CommandLauncher, ProcessLauncher, SessionReport,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Handle a CLI subcommand.
pub async fn handle_command(command: Commands, workspace: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => handle_run(args, workspace).await,
        Commands::Config { action } => handle_config(action, workspace).await,
    }
}

async fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = BenchConfig::default().to_toml()?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            println!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn handle_run(args: RunArgs, workspace: &Path) -> anyhow::Result<()> {
    if !config_exists(Some(workspace)) {
        info!("No configuration file found, using built-in defaults");
    }
    let mut config = load_config(Some(workspace), Some(&args.overrides()))
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    config.resolve_paths(workspace);

    let launcher = CommandLauncher::from_config(&config.workload)?;
    info!(
        workload = %launcher.describe(),
        cwd = ?launcher.working_dir(),
        "Using workload"
    );

    let thread_counts = config.sweep.thread_counts.clone();
    let report = run_session(config, Arc::new(launcher)).await?;
    print!("{}", format_report(&report, &thread_counts));
    Ok(())
}

/// Run a full session against `launcher`. Separate from `handle_run` so a
/// scripted launcher can stand in for the real workload.
pub(crate) async fn run_session(
    config: BenchConfig,
    launcher: Arc<dyn ProcessLauncher>,
) -> anyhow::Result<SessionReport> {
    let session = BenchmarkSession::new(config, launcher).context("Invalid configuration")?;
    session.run().await.context("Benchmark run aborted")
}

/// Human-readable table of baselines and per-scheduler speedups.
pub(crate) fn format_report(report: &SessionReport, thread_counts: &[usize]) -> String {
    let name_width = report
        .baselines
        .datasets()
        .map(|d| d.as_str().len())
        .max()
        .unwrap_or(0)
        .max("dataset".len());

    let mut out = String::from("Sequential baseline (mean seconds):\n");
    for (dataset, secs) in report.baselines.iter() {
        out.push_str(&format!(
            "  {:<width$}  {:.4}\n",
            dataset.as_str(),
            secs,
            width = name_width
        ));
    }

    for scheduler in &report.schedulers {
        out.push_str(&format!(
            "\nSpeedup ({}) -> {}\n",
            scheduler.scheduler,
            scheduler.chart.display()
        ));
        out.push_str(&format!("  {:<width$}", "dataset", width = name_width));
        for n in thread_counts {
            out.push_str(&format!("  {:>7}", format!("n={}", n)));
        }
        out.push('\n');
        for (dataset, ratios) in scheduler.speedups.iter() {
            out.push_str(&format!("  {:<width$}", dataset.as_str(), width = name_width));
            for ratio in ratios {
                out.push_str(&format!("  {:>7.3}", ratio));
            }
            out.push('\n');
        }
        if let Some(summary) = &scheduler.summary {
            out.push_str(&format!("  summary: {}\n", summary.display()));
        }
    }
    out
}
