//! Process launcher abstraction for the external workload.
//!
//! Defines the `ProcessLauncher` trait so the runner never touches a concrete
//! process-spawning primitive, a `tokio::process` implementation, and a
//! scripted mock used to exercise the failure paths deterministically.

use crate::config::WorkloadConfig;
use crate::error::ConfigError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use tracing::debug;

/// Captured result of one finished workload process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
}

impl LaunchOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    /// Output in the shape the workload reports: `<label> <seconds>`.
    pub fn elapsed(secs: f64) -> Self {
        Self::success(format!("Total {}\n", secs))
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches the workload with extra positional arguments and waits for it.
///
/// Implementations must not return before the process has terminated; the
/// runner relies on that to keep measurements from overlapping.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run the workload with `args` appended and capture its output.
    ///
    /// An `Err` means the process could not be started at all; a process
    /// that ran and failed is reported through `LaunchOutput::exit_code`.
    async fn launch(&self, args: &[String]) -> std::io::Result<LaunchOutput>;

    /// Human-readable description of what gets launched, for logs.
    fn describe(&self) -> String;
}

/// Launches a real program through `tokio::process`.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
    base_args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandLauncher {
    /// Build from an argv prefix such as `["go", "run", "editor.go"]`.
    pub fn new(command: &[String], working_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        let (program, base_args) =
            command
                .split_first()
                .ok_or_else(|| ConfigError::MissingField {
                    field: "workload.command".into(),
                })?;
        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
            working_dir,
        })
    }

    pub fn from_config(config: &WorkloadConfig) -> Result<Self, ConfigError> {
        Self::new(&config.command, config.working_dir.clone())
    }

    pub fn working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }
}

#[async_trait]
impl ProcessLauncher for CommandLauncher {
    async fn launch(&self, args: &[String]) -> std::io::Result<LaunchOutput> {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(&self.base_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        debug!(program = %self.program, args = ?args, "Spawning workload");
        let output = command.output().await?;

        Ok(LaunchOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.base_args.iter().cloned());
        parts.join(" ")
    }
}

type Responder = Box<dyn Fn(&[String]) -> LaunchOutput + Send + Sync>;

enum Scripted {
    Output(LaunchOutput),
    LaunchFailure(String),
}

/// A scripted launcher for testing and dry runs.
///
/// Queued responses are returned first, in order; once the queue is empty
/// the responder (if any) computes the output from the arguments. Every
/// call is recorded.
pub struct MockLauncher {
    queue: Mutex<VecDeque<Scripted>>,
    responder: Option<Responder>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            responder: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A launcher that always reports the same elapsed time.
    pub fn with_elapsed(secs: f64) -> Self {
        Self::with_responder(move |_| LaunchOutput::elapsed(secs))
    }

    /// A launcher whose output is computed from `[dataset, scheduler, threads]`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&[String]) -> LaunchOutput + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::new()
        }
    }

    pub fn queue_output(&self, output: LaunchOutput) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted::Output(output));
    }

    pub fn queue_elapsed(&self, secs: f64) {
        self.queue_output(LaunchOutput::elapsed(secs));
    }

    pub fn queue_launch_failure(&self, message: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Scripted::LaunchFailure(message.to_string()));
    }

    /// Arguments of every launch so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessLauncher for MockLauncher {
    async fn launch(&self, args: &[String]) -> std::io::Result<LaunchOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        let scripted = self.queue.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::LaunchFailure(message)) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                message,
            )),
            None => match &self.responder {
                Some(responder) => Ok(responder(args)),
                None => Err(std::io::Error::other("mock launcher has no scripted output")),
            },
        }
    }

    fn describe(&self) -> String {
        "mock-workload".to_string()
    }
}
