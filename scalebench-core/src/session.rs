//! Benchmark session - the strictly sequential driver.
//!
//! Measures the sequential baseline once, then sweeps each parallel
//! scheduler in turn: raw samples flow from the runner through aggregation
//! and speedup computation into one chart per scheduler. Any runner failure
//! aborts the session before the in-progress scheduler's chart is written;
//! charts from schedulers that already finished stay on disk.

use crate::aggregator;
use crate::config::BenchConfig;
use crate::error::Result;
use crate::launcher::ProcessLauncher;
use crate::report::{Reporter, RunSummary};
use crate::runner::Runner;
use crate::speedup;
use crate::types::{AveragedSeries, BaselineMap, RawTimingSeries, SchedulerId, SpeedupSeries};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Everything computed for one parallel scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerReport {
    pub scheduler: SchedulerId,
    pub raw: RawTimingSeries,
    pub averaged: AveragedSeries,
    pub speedups: SpeedupSeries,
    pub chart: PathBuf,
    pub summary: Option<PathBuf>,
}

/// Result of a full session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub baselines: BaselineMap,
    pub schedulers: Vec<SchedulerReport>,
}

pub struct BenchmarkSession {
    config: BenchConfig,
    runner: Runner,
    reporter: Reporter,
}

impl BenchmarkSession {
    /// Validate `config` and wire the runner and reporter around `launcher`.
    pub fn new(config: BenchConfig, launcher: Arc<dyn ProcessLauncher>) -> Result<Self> {
        config.validate()?;
        let runner = Runner::new(launcher, &config.sweep);
        let reporter = Reporter::from_config(&config.report);
        Ok(Self {
            config,
            runner,
            reporter,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Sweep the sequential scheduler with one thread and average per dataset.
    pub async fn measure_baseline(&self) -> Result<BaselineMap> {
        let sequential = self.runner.sequential_scheduler().clone();
        let repetitions = self.config.sweep.repetitions;
        info!(scheduler = %sequential, repetitions, "Running sequential baseline");

        let raw = self.runner.sweep(&sequential, repetitions).await?;
        let baselines = aggregator::baseline(&raw, repetitions)?;
        for (dataset, secs) in baselines.iter() {
            info!(dataset = %dataset, baseline_secs = *secs, "Sequential baseline");
        }
        Ok(baselines)
    }

    /// Sweep one parallel scheduler, compute its speedups, and write its chart.
    pub async fn run_scheduler(
        &self,
        scheduler: &SchedulerId,
        baselines: &BaselineMap,
    ) -> Result<SchedulerReport> {
        let sweep = &self.config.sweep;
        info!(scheduler = %scheduler, "Benchmarking scheduler");

        let raw = self.runner.sweep(scheduler, sweep.repetitions).await?;
        let averaged = aggregator::average(&raw, &sweep.thread_counts, sweep.repetitions)?;
        for (dataset, means) in averaged.iter() {
            info!(scheduler = %scheduler, dataset = %dataset, averaged_secs = ?means, "Averaged timings");
        }

        let speedups = speedup::speedup_series(&averaged, baselines)?;
        let chart = self
            .reporter
            .render(scheduler, &speedups, &sweep.thread_counts)?;

        let summary = if self.config.report.write_summary {
            Some(self.reporter.write_summary(&RunSummary {
                scheduler,
                generated_at: Utc::now(),
                thread_counts: &sweep.thread_counts,
                repetitions: sweep.repetitions,
                baselines,
                averaged_secs: &averaged,
                speedups: &speedups,
            })?)
        } else {
            None
        };

        Ok(SchedulerReport {
            scheduler: scheduler.clone(),
            raw,
            averaged,
            speedups,
            chart,
            summary,
        })
    }

    /// Baseline first, then every configured scheduler in order.
    pub async fn run(&self) -> Result<SessionReport> {
        let baselines = self.measure_baseline().await?;

        let mut schedulers = Vec::with_capacity(self.config.sweep.schedulers.len());
        for scheduler in &self.config.sweep.schedulers {
            let report = self.run_scheduler(scheduler, &baselines).await?;
            schedulers.push(report);
        }

        Ok(SessionReport {
            baselines,
            schedulers,
        })
    }
}
