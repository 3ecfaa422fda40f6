//! # Scalebench Core
//!
//! Core library for scalebench.
//! Provides the workload runner, timing aggregation, speedup computation,
//! chart reporting, configuration, and the sequential benchmark session
//! that ties them together.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod launcher;
pub mod report;
pub mod runner;
pub mod session;
pub mod speedup;
pub mod types;

// Re-export commonly used types at the crate root.
pub use config::{BenchConfig, ConfigOverrides, config_exists, load_config};
pub use error::{Result, ScalebenchError};
pub use launcher::{CommandLauncher, LaunchOutput, MockLauncher, ProcessLauncher};
pub use report::Reporter;
pub use runner::Runner;
pub use session::{BenchmarkSession, SchedulerReport, SessionReport};
pub use types::{
    AveragedSeries, BaselineMap, BenchmarkConfiguration, Dataset, DatasetMap, RawTimingSeries,
    SchedulerId, SpeedupSeries, TimingSample,
};
