// src/ci/runner.rs

//! Execution of pipeline steps
//!
//! `SystemRunner` spawns real processes. `DryRunRunner` only prints what
//! would run. Tests plug in their own `CommandRunner` to observe ordering.

use crate::ci::Step;
use crate::error::{Error, Result};
use std::process::Command;
use tracing::{debug, info};

/// Outcome of a finished step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    /// Exit code, or None if the process was terminated by a signal
    pub code: Option<i32>,
}

impl StepStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can execute a step
pub trait CommandRunner {
    fn run(&self, step: &Step) -> Result<StepStatus>;
}

/// Runs steps as child processes, inheriting stdio and the parent environment
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, step: &Step) -> Result<StepStatus> {
        let program =
            which::which(&step.program).map_err(|_| Error::ToolNotFound(step.program.clone()))?;
        debug!("Resolved {} to {}", step.program, program.display());

        let mut cmd = Command::new(&program);
        cmd.args(&step.args);
        if let Some(ref cwd) = step.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(step.env.iter().map(|(k, v)| (k, v)));

        info!("$ {}", step);
        let status = cmd.status()?;
        Ok(StepStatus {
            code: status.code(),
        })
    }
}

/// Prints each step instead of running it
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, step: &Step) -> Result<StepStatus> {
        match step.cwd {
            Some(ref cwd) => println!("[{}] (in {}) {}", step.description, cwd.display(), step),
            None => println!("[{}] {}", step.description, step),
        }
        Ok(StepStatus::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let step = Step::new("definitely-not-a-real-tool-xyz", ["--version"], "check");
        let err = SystemRunner.run(&step).unwrap_err();
        assert!(matches!(
            err,
            Error::ToolNotFound(ref name) if name == "definitely-not-a-real-tool-xyz"
        ));
    }

    #[test]
    fn test_dry_run_does_not_spawn() {
        let temp_dir = tempfile::tempdir().unwrap();
        let marker = temp_dir.path().join("marker");
        let step = Step::new("definitely-not-a-real-tool-xyz", ["--version"], "check")
            .in_dir(temp_dir.path());
        assert_eq!(DryRunRunner.run(&step).unwrap(), StepStatus::SUCCESS);

        let touch = Step::new("touch", [marker.to_string_lossy().into_owned()], "check");
        assert_eq!(DryRunRunner.run(&touch).unwrap(), StepStatus::SUCCESS);
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_propagates() {
        let step = Step::new("sh", ["-c", "exit 3"], "check");
        assert_eq!(SystemRunner.run(&step).unwrap(), StepStatus { code: Some(3) });

        let ok = Step::new("sh", ["-c", "exit 0"], "check");
        assert!(SystemRunner.run(&ok).unwrap().success());
    }

    #[cfg(unix)]
    #[test]
    fn test_step_env_and_cwd() {
        let temp_dir = tempfile::tempdir().unwrap();
        let step = Step::new("sh", ["-c", "test \"$PROBE\" = yes && test -f marker"], "check")
            .in_dir(temp_dir.path())
            .with_env("PROBE", "yes");

        assert!(!SystemRunner.run(&step).unwrap().success());
        std::fs::write(temp_dir.path().join("marker"), "").unwrap();
        assert!(SystemRunner.run(&step).unwrap().success());
    }
}
