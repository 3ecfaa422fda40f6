//! Configuration system for scalebench.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/scalebench/config.toml` and/or
//! `.scalebench/config.toml` in the workspace directory.

use crate::error::ConfigError;
use crate::report::sanitize_file_component;
use crate::types::{Dataset, SchedulerId};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Directory (relative to the workspace) holding the workspace config file.
pub const WORKSPACE_CONFIG_DIR: &str = ".scalebench";

/// Top-level configuration for a benchmark run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub workload: WorkloadConfig,
    pub sweep: SweepConfig,
    pub report: ReportConfig,
}

/// How to launch the external workload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Argv prefix; dataset, scheduler and thread count are appended.
    pub command: Vec<String>,
    /// Directory the workload runs in. Relative paths resolve against the workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            command: vec!["go".into(), "run".into(), "editor.go".into()],
            working_dir: Some(PathBuf::from("../editor")),
        }
    }
}

/// Which configurations get measured, and how often.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub datasets: Vec<Dataset>,
    /// Thread counts for every non-sequential scheduler.
    pub thread_counts: Vec<usize>,
    /// Full re-runs of the sweep; samples are averaged across them.
    pub repetitions: usize,
    /// Scheduler measured once per dataset with one thread as the baseline.
    pub sequential_scheduler: SchedulerId,
    /// Parallel schedulers, each producing one chart.
    pub schedulers: Vec<SchedulerId>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            datasets: vec!["small".into(), "mixture".into(), "big".into()],
            thread_counts: vec![2, 4, 6, 8, 12],
            repetitions: 3,
            sequential_scheduler: "s".into(),
            schedulers: vec!["pipeline".into()],
        }
    }
}

/// Where and how artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    /// Artifact names are `<file_prefix><scheduler>.svg`.
    pub file_prefix: String,
    /// Also write `<file_prefix><scheduler>.json` with the computed series.
    pub write_summary: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: "speedup-test-".into(),
            write_summary: false,
        }
    }
}

impl BenchConfig {
    /// Check the invariants the pipeline depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workload.command.is_empty() || self.workload.command[0].trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "workload.command".into(),
            });
        }

        let sweep = &self.sweep;
        if sweep.datasets.is_empty() {
            return Err(invalid("sweep.datasets must name at least one dataset"));
        }
        let mut seen = HashSet::new();
        for dataset in &sweep.datasets {
            if dataset.as_str().trim().is_empty() {
                return Err(invalid("sweep.datasets contains an empty name"));
            }
            if !seen.insert(dataset) {
                return Err(invalid(format!(
                    "sweep.datasets lists '{}' more than once",
                    dataset
                )));
            }
        }

        if sweep.thread_counts.is_empty() {
            return Err(invalid("sweep.thread_counts must not be empty"));
        }
        if sweep.thread_counts.contains(&0) {
            return Err(invalid("sweep.thread_counts must all be at least 1"));
        }
        if sweep.repetitions == 0 {
            return Err(invalid("sweep.repetitions must be at least 1"));
        }
        if sweep.sequential_scheduler.as_str().trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "sweep.sequential_scheduler".into(),
            });
        }
        if sweep
            .schedulers
            .iter()
            .any(|s| s.as_str().trim().is_empty())
        {
            return Err(invalid("sweep.schedulers contains an empty name"));
        }
        let mut artifacts = HashMap::new();
        for scheduler in &sweep.schedulers {
            let stem = sanitize_file_component(scheduler.as_str());
            if let Some(previous) = artifacts.insert(stem, scheduler) {
                return Err(invalid(format!(
                    "sweep.schedulers '{}' and '{}' would write the same chart file",
                    previous, scheduler
                )));
            }
        }
        if sweep.schedulers.contains(&sweep.sequential_scheduler) {
            return Err(invalid(format!(
                "sequential scheduler '{}' cannot also be swept as a parallel scheduler",
                sweep.sequential_scheduler
            )));
        }

        if self.report.file_prefix.contains(['/', '\\']) {
            return Err(invalid("report.file_prefix must not contain path separators"));
        }
        Ok(())
    }

    /// Resolve relative directories against `workspace`.
    pub fn resolve_paths(&mut self, workspace: &Path) {
        if let Some(dir) = &self.workload.working_dir {
            if dir.is_relative() {
                self.workload.working_dir = Some(workspace.join(dir));
            }
        }
        if self.report.output_dir.is_relative() {
            self.report.output_dir = workspace.join(&self.report.output_dir);
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

/// Explicit overrides, typically from command-line flags.
///
/// Unset fields are skipped during serialization so they never mask values
/// from lower-priority sources.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    pub sweep: SweepOverrides,
    pub report: ReportOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasets: Option<Vec<Dataset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_counts: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedulers: Option<Vec<SchedulerId>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_summary: Option<bool>,
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "scalebench", "scalebench")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(WORKSPACE_CONFIG_DIR).join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `SCALEBENCH_`)
/// 3. Workspace-local config (`.scalebench/config.toml`)
/// 4. User config (`~/.config/scalebench/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&ConfigOverrides>,
) -> Result<BenchConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(BenchConfig::default()));

    // User-level config
    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (SCALEBENCH_SWEEP__REPETITIONS, etc.)
    figment = figment.merge(Env::prefixed("SCALEBENCH_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Check whether any scalebench configuration file exists (user-level or workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sweep.thread_counts, vec![2, 4, 6, 8, 12]);
        assert_eq!(config.sweep.repetitions, 3);
        assert_eq!(config.sweep.sequential_scheduler, SchedulerId::new("s"));
        assert_eq!(config.report.file_prefix, "speedup-test-");
    }

    #[test]
    fn test_validate_rejects_zero_thread_count() {
        let mut config = BenchConfig::default();
        config.sweep.thread_counts = vec![2, 0];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_repetitions() {
        let mut config = BenchConfig::default();
        config.sweep.repetitions = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_datasets() {
        let mut config = BenchConfig::default();
        config.sweep.datasets = vec!["small".into(), "small".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'small' more than once"));
    }

    #[test]
    fn test_validate_rejects_sequential_in_parallel_list() {
        let mut config = BenchConfig::default();
        config.sweep.schedulers = vec!["pipeline".into(), "s".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_schedulers_sharing_a_chart_file() {
        let mut config = BenchConfig::default();
        config.sweep.schedulers = vec!["a b".into(), "a_b".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'a b' and 'a_b'"));

        config.sweep.schedulers = vec!["pipeline".into(), "pipeline".into()];
        assert!(config.validate().is_err());

        config.sweep.schedulers = vec!["pipeline".into(), "bsp".into()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let mut config = BenchConfig::default();
        config.workload.command.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_resolve_paths_against_workspace() {
        let mut config = BenchConfig::default();
        config.resolve_paths(Path::new("/bench/harness"));
        assert_eq!(
            config.workload.working_dir,
            Some(PathBuf::from("/bench/harness/../editor"))
        );
        assert_eq!(config.report.output_dir, PathBuf::from("/bench/harness/."));
    }

    #[test]
    fn test_load_config_from_workspace_file() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(WORKSPACE_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[sweep]\nthread_counts = [1, 2]\nschedulers = [\"pipeline\", \"bsp\"]\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.sweep.thread_counts, vec![1, 2]);
        assert_eq!(
            config.sweep.schedulers,
            vec![SchedulerId::new("pipeline"), SchedulerId::new("bsp")]
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.report, ReportConfig::default());
    }

    #[test]
    fn test_load_config_overrides_take_priority() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(WORKSPACE_CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "[sweep]\nrepetitions = 7\n").unwrap();

        let overrides = ConfigOverrides {
            sweep: SweepOverrides {
                repetitions: Some(2),
                ..Default::default()
            },
            report: ReportOverrides {
                write_summary: Some(true),
                ..Default::default()
            },
        };
        let config = load_config(Some(dir.path()), Some(&overrides)).unwrap();
        assert_eq!(config.sweep.repetitions, 2);
        assert!(config.report.write_summary);
        assert_eq!(config.sweep.thread_counts, vec![2, 4, 6, 8, 12]);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let config = BenchConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: BenchConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: BenchConfig = toml::from_str("[report]\nwrite_summary = true\n").unwrap();
        assert!(parsed.report.write_summary);
        assert_eq!(parsed.sweep, SweepConfig::default());
    }

    #[test]
    fn test_config_exists_workspace() {
        let dir = TempDir::new().unwrap();
        let path = workspace_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "").unwrap();
        assert!(config_exists(Some(dir.path())));
    }
}
