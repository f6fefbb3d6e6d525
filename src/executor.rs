// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Running external commands

use crate::error::{ProjectError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::process::Command;
use tracing::debug;

/// Environment variables layered over the inherited process environment
/// for a single invocation. The process environment itself is never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvOverlay {
    vars: BTreeMap<String, String>,
}

impl EnvOverlay {
    /// Overlay that changes nothing
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy of this overlay with `key` set to `value`
    #[must_use]
    pub fn with(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut vars = self.vars.clone();
        vars.insert(key.into(), value.into());
        Self { vars }
    }

    /// Value set for `key`, if any
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether no variables are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Exit status and captured output of one command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// Process exit code (`-1` when killed by a signal)
    pub code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Zero exit, no output
    #[must_use]
    pub fn ok() -> Self {
        Self::default()
    }

    /// Non-zero exit with the given standard error
    #[must_use]
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with zero
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Something that can run a command line and wait for it
pub trait Executor {
    /// Run `command` through the platform shell with `overlay` applied
    fn run(&mut self, command: &str, overlay: &EnvOverlay) -> Result<CommandOutput>;

    /// `true` when `<tool> --version` exits with zero
    fn tool_available(&mut self, tool: &str) -> Result<bool> {
        let check = format!("{tool} --version");
        let output = self.run(&check, &EnvOverlay::empty())?;
        debug!("Checking '{}' ... {}", check, if output.success() { "OK" } else { "Failed" });
        Ok(output.success())
    }
}

/// Runs commands on the host through `sh -c` (`cmd /C` on Windows)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&mut self, command: &str, overlay: &EnvOverlay) -> Result<CommandOutput> {
        debug!("Running: {}", command);
        let mut process = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        process.envs(overlay.iter());

        let output = process
            .output()
            .map_err(|e| ProjectError::io(command, e))?;

        Ok(CommandOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// One command seen by a [`RecordingExecutor`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedCall {
    /// The command line
    pub command: String,
    /// Overlay it was run with
    pub overlay: EnvOverlay,
}

/// Records commands instead of running them.
///
/// Answers are scripted per command prefix; the longest matching prefix
/// wins and unmatched commands succeed.
#[derive(Debug, Default, Clone)]
pub struct RecordingExecutor {
    responses: Vec<(String, CommandOutput)>,
    calls: Vec<RecordedCall>,
}

impl RecordingExecutor {
    /// Executor where every command succeeds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `output`
    pub fn respond(&mut self, prefix: impl Into<String>, output: CommandOutput) -> &mut Self {
        let prefix = prefix.into();
        self.responses.retain(|(p, _)| *p != prefix);
        self.responses.push((prefix, output));
        self
    }

    /// Make commands starting with `prefix` exit with `code`
    pub fn fail_on(&mut self, prefix: impl Into<String>, code: i32, stderr: impl Into<String>) -> &mut Self {
        self.respond(prefix, CommandOutput::failed(code, stderr))
    }

    /// Everything run so far, in order
    #[must_use]
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Command lines run so far, in order
    #[must_use]
    pub fn commands(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.command.as_str()).collect()
    }
}

impl Executor for RecordingExecutor {
    fn run(&mut self, command: &str, overlay: &EnvOverlay) -> Result<CommandOutput> {
        self.calls.push(RecordedCall {
            command: command.to_string(),
            overlay: overlay.clone(),
        });
        let answer = self
            .responses
            .iter()
            .filter(|(prefix, _)| command.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, output)| output.clone())
            .unwrap_or_default();
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_is_immutable_value() {
        let base = EnvOverlay::empty();
        let with_path = base.with("PATH", "/env/bin");

        assert!(base.is_empty());
        assert_eq!(with_path.get("PATH"), Some("/env/bin"));
    }

    #[test]
    fn test_recording_longest_prefix_wins() {
        let mut exec = RecordingExecutor::new();
        exec.fail_on("virtualenv", 1, "Venv");
        exec.respond("virtualenv --version", CommandOutput::ok());

        assert!(exec.run("virtualenv --version", &EnvOverlay::empty()).unwrap().success());
        let out = exec.run("virtualenv  --python=python3.9 /env", &EnvOverlay::empty()).unwrap();
        assert_eq!(out.code, 1);
        assert_eq!(out.stderr, "Venv");
        assert!(exec.run("git --version", &EnvOverlay::empty()).unwrap().success());
        assert_eq!(exec.commands().len(), 3);
    }

    #[test]
    fn test_tool_available() {
        let mut exec = RecordingExecutor::new();
        exec.fail_on("git --version", 127, "not found");

        assert!(!exec.tool_available("git").unwrap());
        assert!(exec.tool_available("conda").unwrap());
        assert_eq!(exec.commands(), vec!["git --version", "conda --version"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_exit_codes() {
        let mut exec = SystemExecutor;

        assert!(exec.run("exit 0", &EnvOverlay::empty()).unwrap().success());
        assert_eq!(exec.run("exit 3", &EnvOverlay::empty()).unwrap().code, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_executor_applies_overlay() {
        let mut exec = SystemExecutor;
        let overlay = EnvOverlay::empty().with("CHANGED_ENVVAR", "set by caller");

        let out = exec.run("echo $CHANGED_ENVVAR", &overlay).unwrap();

        assert!(out.success());
        assert_eq!(out.stdout.trim_end(), "set by caller");
        assert_eq!(out.stderr, "");
    }
}
