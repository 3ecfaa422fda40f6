//! Error types for the scalebench core.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering workload execution, aggregation, speedup, reporting, and
//! configuration.

use crate::types::BenchmarkConfiguration;
use std::path::PathBuf;

/// Top-level error type for the scalebench core library.
#[derive(Debug, thiserror::Error)]
pub enum ScalebenchError {
    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("Speedup error: {0}")]
    Speedup(#[from] SpeedupError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from invoking the external workload. Both kinds abort the sweep.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The workload could not be launched (`exit_code` is `None`) or exited
    /// with a non-zero status.
    #[error("Workload execution failed for {configuration}: {message}")]
    Execution {
        configuration: BenchmarkConfiguration,
        exit_code: Option<i32>,
        message: String,
    },

    /// The first line of stdout was missing or not `<label> <seconds>`.
    #[error("Unparseable workload output for {configuration}: {reason} (first line: {line:?})")]
    Parse {
        configuration: BenchmarkConfiguration,
        line: String,
        reason: String,
    },
}

impl RunnerError {
    pub fn is_execution(&self) -> bool {
        matches!(self, RunnerError::Execution { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, RunnerError::Parse { .. })
    }

    /// The configuration that was being measured when the failure happened.
    pub fn configuration(&self) -> &BenchmarkConfiguration {
        match self {
            RunnerError::Execution { configuration, .. } => configuration,
            RunnerError::Parse { configuration, .. } => configuration,
        }
    }
}

/// Errors from reducing raw samples into averages.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("Repetition count must be at least 1")]
    ZeroRepetitions,

    #[error("Thread-count list is empty")]
    EmptyThreadCounts,

    #[error("Expected {expected} samples, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Sample {index} was measured with {actual} threads, expected {expected}")]
    OutOfOrder {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Dataset '{dataset}': {source}")]
    InDataset {
        dataset: String,
        source: Box<AggregateError>,
    },
}

impl AggregateError {
    pub(crate) fn in_dataset(dataset: impl Into<String>, source: AggregateError) -> Self {
        AggregateError::InDataset {
            dataset: dataset.into(),
            source: Box::new(source),
        }
    }
}

/// Errors from deriving speedup ratios.
#[derive(Debug, thiserror::Error)]
pub enum SpeedupError {
    #[error("No sequential baseline measured for dataset '{dataset}'")]
    MissingBaseline { dataset: String },
}

/// Errors from building or persisting chart artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid chart: {reason}")]
    InvalidChart { reason: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize summary: {0}")]
    Summary(#[from] serde_json::Error),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// A type alias for results using the top-level `ScalebenchError`.
pub type Result<T> = std::result::Result<T, ScalebenchError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dataset, SchedulerId};

    fn configuration() -> BenchmarkConfiguration {
        BenchmarkConfiguration::new(Dataset::new("small"), SchedulerId::new("pipeline"), 4, 1)
    }

    #[test]
    fn test_error_display_execution() {
        let err = ScalebenchError::Runner(RunnerError::Execution {
            configuration: configuration(),
            exit_code: Some(2),
            message: "exited with status 2".into(),
        });
        assert_eq!(
            err.to_string(),
            "Runner error: Workload execution failed for dataset=small scheduler=pipeline threads=4 repetition=1: exited with status 2"
        );
    }

    #[test]
    fn test_error_display_parse() {
        let err = RunnerError::Parse {
            configuration: configuration(),
            line: "Total".into(),
            reason: "missing elapsed time".into(),
        };
        assert!(err.is_parse());
        assert!(!err.is_execution());
        assert!(err.to_string().contains("(first line: \"Total\")"));
        assert_eq!(err.configuration().thread_count, 4);
    }

    #[test]
    fn test_error_display_aggregate_in_dataset() {
        let err = AggregateError::in_dataset(
            "big",
            AggregateError::LengthMismatch {
                expected: 6,
                actual: 5,
            },
        );
        assert_eq!(err.to_string(), "Dataset 'big': Expected 6 samples, found 5");
    }

    #[test]
    fn test_error_display_missing_baseline() {
        let err = ScalebenchError::Speedup(SpeedupError::MissingBaseline {
            dataset: "mixture".into(),
        });
        assert_eq!(
            err.to_string(),
            "Speedup error: No sequential baseline measured for dataset 'mixture'"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = ScalebenchError::Config(ConfigError::MissingField {
            field: "workload.command".into(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required field: workload.command"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ScalebenchError = io_err.into();
        assert!(matches!(err, ScalebenchError::Io(_)));
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: ScalebenchError = serde_err.into();
        assert!(matches!(err, ScalebenchError::Serialization(_)));
    }
}
