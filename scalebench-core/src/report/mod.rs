//! Speedup chart reporting.
//!
//! Converts a `SpeedupSeries` into a chart spec, renders it onto a fresh
//! `Figure`, and persists the SVG under a name derived from the scheduler.

pub mod chart;
pub mod svg;

pub use chart::{ChartDataset, ChartSpec};
pub use svg::{Figure, render_chart_svg};

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::types::{AveragedSeries, BaselineMap, SchedulerId, SpeedupSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Machine-readable record of one scheduler's results.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub scheduler: &'a SchedulerId,
    pub generated_at: DateTime<Utc>,
    pub thread_counts: &'a [usize],
    pub repetitions: usize,
    pub baselines: &'a BaselineMap,
    pub averaged_secs: &'a AveragedSeries,
    pub speedups: &'a SpeedupSeries,
}

/// Writes chart and summary artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct Reporter {
    output_dir: PathBuf,
    file_prefix: String,
}

impl Reporter {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.output_dir.clone(), config.file_prefix.clone())
    }

    fn artifact_stem(&self, scheduler: &SchedulerId) -> String {
        format!(
            "{}{}",
            self.file_prefix,
            sanitize_file_component(scheduler.as_str())
        )
    }

    /// Deterministic chart path for `scheduler`.
    pub fn artifact_path(&self, scheduler: &SchedulerId) -> PathBuf {
        self.output_dir
            .join(format!("{}.svg", self.artifact_stem(scheduler)))
    }

    pub fn summary_path(&self, scheduler: &SchedulerId) -> PathBuf {
        self.output_dir
            .join(format!("{}.json", self.artifact_stem(scheduler)))
    }

    /// Render one chart (one line per dataset) and save it, replacing any
    /// previous chart for the same scheduler.
    pub fn render(
        &self,
        scheduler: &SchedulerId,
        speedups: &SpeedupSeries,
        thread_counts: &[usize],
    ) -> Result<PathBuf, ReportError> {
        let spec = ChartSpec::speedup(scheduler, thread_counts, speedups);
        spec.validate()?;

        let document = render_chart_svg(&spec);
        let path = self.artifact_path(scheduler);
        write_atomically(&path, document.as_bytes())?;

        info!(scheduler = %scheduler, path = %path.display(), "Wrote speedup chart");
        Ok(path)
    }

    pub fn write_summary(&self, summary: &RunSummary<'_>) -> Result<PathBuf, ReportError> {
        let json = serde_json::to_string_pretty(summary)?;
        let path = self.summary_path(summary.scheduler);
        write_atomically(&path, json.as_bytes())?;

        info!(scheduler = %summary.scheduler, path = %path.display(), "Wrote run summary");
        Ok(path)
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` so a scheduler name can never
/// escape the output directory.
pub(crate) fn sanitize_file_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        cleaned.replace('.', "_") + "_"
    } else {
        cleaned
    }
}

/// Write to a hidden sibling and rename over `path`. A failed write never
/// leaves a truncated artifact behind.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let write_err = |source: std::io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&tmp, contents).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    Ok(())
}
