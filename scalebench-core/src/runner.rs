//! Workload runner - invokes the external program and parses its timing.
//!
//! Every invocation is awaited to completion before the next one starts.
//! Overlapping runs would contend for the same cores and corrupt the
//! measurements, so the runner never spawns concurrently.

use crate::config::SweepConfig;
use crate::error::RunnerError;
use crate::launcher::ProcessLauncher;
use crate::types::{BenchmarkConfiguration, Dataset, RawTimingSeries, SchedulerId, TimingSample};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SEQUENTIAL_THREADS: [usize; 1] = [1];

/// Why a workload's first output line could not be read as a timing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct OutputParseError {
    pub line: String,
    pub reason: String,
}

impl OutputParseError {
    fn new(line: &str, reason: impl Into<String>) -> Self {
        Self {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse the elapsed seconds from the workload's stdout.
///
/// The first non-blank line must read `<label> <seconds>`; tokens after the
/// second are ignored, as are all following lines.
pub fn parse_elapsed(stdout: &str) -> Result<f64, OutputParseError> {
    let line = stdout.trim_start().lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(OutputParseError::new(line, "workload printed nothing to stdout"));
    }

    let mut tokens = line.split_whitespace();
    let _label = tokens.next();
    let value = tokens
        .next()
        .ok_or_else(|| OutputParseError::new(line, "expected '<label> <seconds>'"))?;

    let elapsed: f64 = value
        .parse()
        .map_err(|_| OutputParseError::new(line, format!("'{}' is not a number", value)))?;
    if !elapsed.is_finite() || elapsed < 0.0 {
        return Err(OutputParseError::new(
            line,
            format!("elapsed time {} is not a finite, non-negative number", value),
        ));
    }
    Ok(elapsed)
}

/// Measures workload configurations through a `ProcessLauncher`.
pub struct Runner {
    launcher: Arc<dyn ProcessLauncher>,
    datasets: Vec<Dataset>,
    thread_counts: Vec<usize>,
    sequential: SchedulerId,
}

impl Runner {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, sweep: &SweepConfig) -> Self {
        Self {
            launcher,
            datasets: sweep.datasets.clone(),
            thread_counts: sweep.thread_counts.clone(),
            sequential: sweep.sequential_scheduler.clone(),
        }
    }

    pub fn is_sequential(&self, scheduler: &SchedulerId) -> bool {
        *scheduler == self.sequential
    }

    pub fn sequential_scheduler(&self) -> &SchedulerId {
        &self.sequential
    }

    /// Thread counts swept for `scheduler`; always `[1]` for the sequential one.
    pub fn thread_counts_for(&self, scheduler: &SchedulerId) -> &[usize] {
        if self.is_sequential(scheduler) {
            &SEQUENTIAL_THREADS
        } else {
            &self.thread_counts
        }
    }

    /// Run the workload once and return its reported elapsed seconds.
    pub async fn measure(
        &self,
        dataset: &Dataset,
        scheduler: &SchedulerId,
        thread_count: usize,
    ) -> Result<f64, RunnerError> {
        let configuration =
            BenchmarkConfiguration::new(dataset.clone(), scheduler.clone(), thread_count, 0);
        self.measure_configuration(configuration)
            .await
            .map(|sample| sample.elapsed_secs)
    }

    /// Run the workload for one configuration and produce its sample.
    ///
    /// The sequential scheduler always runs with one thread, whatever
    /// thread count the configuration carries.
    pub async fn measure_configuration(
        &self,
        mut configuration: BenchmarkConfiguration,
    ) -> Result<TimingSample, RunnerError> {
        if self.is_sequential(&configuration.scheduler) {
            configuration.thread_count = SEQUENTIAL_THREADS[0];
        }
        let args = configuration.workload_args();
        let output = match self.launcher.launch(&args).await {
            Ok(output) => output,
            Err(e) => {
                return Err(RunnerError::Execution {
                    configuration,
                    exit_code: None,
                    message: format!("failed to launch '{}': {}", self.launcher.describe(), e),
                });
            }
        };

        if !output.is_success() {
            warn!(
                dataset = %configuration.dataset,
                scheduler = %configuration.scheduler,
                threads = configuration.thread_count,
                exit_code = output.exit_code,
                "Workload exited with non-zero status"
            );
            let stderr = output.stderr.trim();
            let message = if stderr.is_empty() {
                format!("exited with status {}", output.exit_code)
            } else {
                format!("exited with status {}: {}", output.exit_code, stderr)
            };
            return Err(RunnerError::Execution {
                configuration,
                exit_code: Some(output.exit_code),
                message,
            });
        }

        match parse_elapsed(&output.stdout) {
            Ok(elapsed_secs) => {
                debug!(%configuration, elapsed_secs, "Parsed workload timing");
                Ok(TimingSample {
                    configuration,
                    elapsed_secs,
                })
            }
            Err(e) => Err(RunnerError::Parse {
                configuration,
                line: e.line,
                reason: e.reason,
            }),
        }
    }

    /// Measure every configuration of `scheduler`, `repetitions` times over.
    ///
    /// Samples for each dataset are ordered by repetition, then by
    /// thread-count index. The first failure aborts the sweep.
    pub async fn sweep(
        &self,
        scheduler: &SchedulerId,
        repetitions: usize,
    ) -> Result<RawTimingSeries, RunnerError> {
        let thread_counts = self.thread_counts_for(scheduler);

        let mut series = RawTimingSeries::new();
        for dataset in &self.datasets {
            series.insert(
                dataset.clone(),
                Vec::with_capacity(repetitions * thread_counts.len()),
            );
        }

        for repetition in 0..repetitions {
            for dataset in &self.datasets {
                for &thread_count in thread_counts {
                    info!(
                        dataset = %dataset,
                        scheduler = %scheduler,
                        threads = thread_count,
                        repetition,
                        "Running workload"
                    );
                    let configuration = BenchmarkConfiguration::new(
                        dataset.clone(),
                        scheduler.clone(),
                        thread_count,
                        repetition,
                    );
                    let sample = self.measure_configuration(configuration).await?;
                    series.get_or_insert_default(dataset).push(sample);
                }
            }
        }

        Ok(series)
    }
}
