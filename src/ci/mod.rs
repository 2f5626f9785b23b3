// src/ci/mod.rs

//! CI pipeline for the recipe book
//!
//! The pipeline has four tasks, always in this order:
//! - `setup` - install grcov, switch to the nightly toolchain, add LLVM tools
//! - `build` - `cargo build --verbose`
//! - `test` - `cargo test --verbose`, then produce and upload a coverage
//!   report when the credentials file exists
//! - `qa` - `cargo clippy` with warnings denied
//!
//! Each task is planned into a list of [`Step`]s, which are then executed one
//! at a time. The first failing step stops the pipeline and its exit code is
//! reported.

mod env;
mod runner;

pub use env::{CiEnvironment, Credentials};
pub use runner::{CommandRunner, DryRunRunner, StepStatus, SystemRunner};

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Pipeline tasks in declared order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    Setup,
    Build,
    Test,
    Qa,
}

impl Task {
    /// Get all tasks in order
    pub fn all() -> &'static [Task] {
        &[Self::Setup, Self::Build, Self::Test, Self::Qa]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Build => "build",
            Self::Test => "test",
            Self::Qa => "qa",
        }
    }

    /// Parse a single task name
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "setup" => Ok(Self::Setup),
            "build" => Ok(Self::Build),
            "test" => Ok(Self::Test),
            "qa" => Ok(Self::Qa),
            _ => Err(Error::UnknownTask(s.to_string())),
        }
    }

    /// Parse a list of task names, expanding `all` to every task in order
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>> {
        let mut tasks = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.eq_ignore_ascii_case("all") {
                tasks.extend_from_slice(Self::all());
            } else {
                tasks.push(Self::parse(name)?);
            }
        }
        Ok(tasks)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; None inherits the caller's
    pub cwd: Option<PathBuf>,
    /// Variables added to the inherited environment
    pub env: Vec<(String, String)>,
    pub description: String,
}

impl Step {
    pub fn new<I, S>(program: &str, args: I, description: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            env: Vec::new(),
            description: description.to_string(),
        }
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    /// Value of an environment variable set on this step
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Settings for the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Checkout the build, test and qa tasks run in
    pub project_dir: PathBuf,
    /// Toolchain channel selected by setup
    pub toolchain: String,
    /// rustup component providing llvm-profdata for grcov
    pub llvm_component: String,
    /// `RUSTFLAGS` for instrumented builds
    pub rustflags: String,
    /// `LLVM_PROFILE_FILE` naming pattern
    pub profile_pattern: String,
    /// Coverage credentials; upload only happens if this file exists
    pub credentials_path: PathBuf,
    /// lcov report written by grcov, relative to the project
    pub coverage_report: PathBuf,
    /// Location of the Codecov bash uploader
    pub uploader_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            toolchain: "nightly".to_string(),
            llvm_component: "llvm-tools-preview".to_string(),
            rustflags: "-Cinstrument-coverage".to_string(),
            profile_pattern: "recipe-book-%p-%m.profraw".to_string(),
            credentials_path: default_credentials_path(),
            coverage_report: PathBuf::from("lcov.info"),
            uploader_url: "https://codecov.io/bash".to_string(),
        }
    }
}

/// `~/.code-cov`, or a relative `.code-cov` when there is no home directory
pub fn default_credentials_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".code-cov"))
        .unwrap_or_else(|| PathBuf::from(".code-cov"))
}

/// Uploader script downloaded next to the coverage report
const UPLOADER_SCRIPT: &str = "codecov.sh";

/// Plans and runs pipeline tasks
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    ci_env: CiEnvironment,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, ci_env: CiEnvironment) -> Self {
        Self { config, ci_env }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The ordered steps of a task
    ///
    /// For `test`, the coverage steps are included only if the credentials
    /// file exists at the time of planning.
    pub fn plan(&self, task: Task) -> Result<Vec<Step>> {
        let cfg = &self.config;
        let project = cfg.project_dir.as_path();

        let steps = match task {
            Task::Setup => vec![
                Step::new("cargo", ["install", "grcov"], "install grcov"),
                Step::new(
                    "rustup",
                    ["default", cfg.toolchain.as_str()],
                    "select toolchain",
                ),
                Step::new(
                    "rustup",
                    ["component", "add", cfg.llvm_component.as_str()],
                    "add LLVM tools",
                ),
            ],
            Task::Build => vec![self.instrumented(Step::new(
                "cargo",
                ["build", "--verbose"],
                "build",
            ))],
            Task::Test => {
                let mut steps =
                    vec![self.instrumented(Step::new("cargo", ["test", "--verbose"], "test"))];
                match Credentials::load(&cfg.credentials_path) {
                    Some(credentials) => steps.extend(self.coverage_steps(credentials)),
                    None => info!(
                        "No credentials at {}, skipping coverage upload",
                        cfg.credentials_path.display()
                    ),
                }
                steps
            }
            Task::Qa => vec![self.instrumented(Step::new(
                "cargo",
                ["clippy", "--", "-D", "warnings"],
                "lint",
            ))],
        };

        Ok(match task {
            Task::Setup => steps,
            _ => steps.into_iter().map(|s| s.in_dir(project)).collect(),
        })
    }

    fn instrumented(&self, step: Step) -> Step {
        step.with_env("RUSTFLAGS", &self.config.rustflags)
            .with_env("LLVM_PROFILE_FILE", &self.config.profile_pattern)
    }

    fn coverage_steps(&self, credentials: Credentials) -> Vec<Step> {
        let report = self.config.coverage_report.to_string_lossy().into_owned();

        let grcov = Step::new(
            "grcov",
            [
                ".",
                "--binary-path",
                "./target/debug/",
                "-s",
                ".",
                "-t",
                "lcov",
                "--branch",
                "--ignore-not-existing",
                "--ignore",
                "/*",
                "-o",
                report.as_str(),
            ],
            "coverage report",
        );

        let fetch = Step::new(
            "curl",
            [
                "-sSfL",
                "-o",
                UPLOADER_SCRIPT,
                self.config.uploader_url.as_str(),
            ],
            "fetch uploader",
        );

        let upload = Step::new(
            "bash",
            [UPLOADER_SCRIPT, "-f", report.as_str()],
            "upload coverage",
        )
        .with_envs(credentials.vars)
        .with_envs(self.ci_env.uploader_vars());

        vec![grcov, fetch, upload]
    }

    /// Run tasks in the given order, stopping at the first failing step
    pub fn run(&self, tasks: &[Task], runner: &dyn CommandRunner) -> Result<()> {
        for &task in tasks {
            let started = Instant::now();
            info!("Running task '{}'", task);

            for step in self.plan(task)? {
                let status = runner.run(&step)?;
                if !status.success() {
                    warn!("Task '{}' failed at step '{}'", task, step.description);
                    return Err(Error::StepFailed {
                        task: task.name().to_string(),
                        command: step.to_string(),
                        code: status.code,
                    });
                }
            }

            info!(
                "Task '{}' finished in {:.1}s",
                task,
                started.elapsed().as_secs_f64()
            );
        }
        Ok(())
    }
}
