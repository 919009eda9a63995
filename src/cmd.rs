use anyhow::{Context, Result, anyhow};
use std::process::{Command, Output};
use tracing::debug;

/// Small builder around `std::process::Command`.
///
/// Child processes inherit the environment exported during startup, which is
/// how `GIT_DIR` and `GIT_WORK_TREE` reach git.
pub struct Cmd<'a> {
    program: &'a str,
    args: Vec<&'a str>,
}

impl<'a> Cmd<'a> {
    pub fn new(program: &'a str) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    pub fn args(mut self, args: &[&'a str]) -> Self {
        self.args.extend_from_slice(args);
        self
    }

    /// Run and fail if the command exits non-zero.
    pub fn run(&self) -> Result<Output> {
        let output = self.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "Command `{}` failed: {}",
                self.display(),
                stderr.trim()
            ));
        }
        Ok(output)
    }

    /// Run and return trimmed stdout.
    pub fn run_and_capture_stdout(&self) -> Result<String> {
        let output = self.run()?;
        let stdout = String::from_utf8(output.stdout)
            .with_context(|| format!("Command `{}` produced non-UTF-8 output", self.display()))?;
        Ok(stdout.trim().to_string())
    }

    /// Run and report whether the command succeeded. Only a failure to spawn
    /// is an error.
    pub fn run_as_check(&self) -> Result<bool> {
        Ok(self.output()?.status.success())
    }

    fn output(&self) -> Result<Output> {
        debug!(command = %self.display(), "cmd:run");
        Command::new(self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("Failed to run `{}`", self.program))
    }

    fn display(&self) -> String {
        std::iter::once(self.program)
            .chain(self.args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
