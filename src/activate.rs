// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Shell integration
//!
//! `activate` and `deactivate` print a single line of shell source that the
//! wrapper installed by `init` evaluates in the calling shell.

use crate::backend::Backend;
use crate::error::{ProjectError, Result};
use crate::executor::Executor;
use crate::project::ProjectRecord;
use std::path::Path;

/// Points AiiDA at the project's configuration folder
pub const PATH_VAR: &str = "AIIDA_PATH";

/// Name of the active project
pub const ACTIVE_VAR: &str = "AIIDA_PROJECT_ACTIVE";

/// Absolute path of this executable, exported by `init`
pub const EXE_VAR: &str = "AIIDA_PROJECT_EXE";

/// Shells `init`, `activate` and `deactivate` support
pub const SUPPORTED_SHELLS: &[&str] = &["bash"];

/// A shell we can emit source for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    /// GNU bash
    Bash,
}

impl Shell {
    /// Look up a shell by name
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "bash" => Ok(Self::Bash),
            other => Err(ProjectError::UnsupportedShell {
                shell: other.to_string(),
                supported: SUPPORTED_SHELLS.join(", "),
            }),
        }
    }

    fn set_var(self, name: &str, value: &str) -> String {
        match self {
            Self::Bash => format!("export {name}={}", quote(value)),
        }
    }

    fn unset_var(self, name: &str) -> String {
        match self {
            Self::Bash => format!("unset {name}"),
        }
    }

    fn separator(self) -> &'static str {
        match self {
            Self::Bash => ";",
        }
    }

    /// Script that makes `aiida-project activate/deactivate` change the
    /// calling shell once evaluated
    #[must_use]
    pub fn setup_script(self, executable: &Path) -> String {
        match self {
            Self::Bash => [
                self.set_var(EXE_VAR, &executable.display().to_string()),
                "function _aiida_project_activate() {".to_string(),
                "  local mode=$1".to_string(),
                "  shift".to_string(),
                format!("  cmd=\"$(\"${EXE_VAR}\" \"$mode\" bash \"$@\")\" || return $?"),
                "  eval \"$cmd\"".to_string(),
                "}".to_string(),
                "function aiida-project() {".to_string(),
                "  if [ \"$#\" -lt 1 ]; then".to_string(),
                format!("    \"${EXE_VAR}\""),
                "    return $?".to_string(),
                "  fi".to_string(),
                "  case \"$1\" in".to_string(),
                "    activate|deactivate)".to_string(),
                "      _aiida_project_activate \"$@\"".to_string(),
                "    ;;".to_string(),
                "  *)".to_string(),
                format!("      \"${EXE_VAR}\" \"$@\""),
                "    ;;".to_string(),
                "  esac".to_string(),
                "}".to_string(),
            ]
            .join("\n"),
        }
    }
}

/// Single-quote `value` for POSIX shells
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Activation-related variables of the calling shell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellState {
    /// Value of `AIIDA_PROJECT_ACTIVE`, empty treated as unset
    pub active_project: Option<String>,
    /// Value of `AIIDA_PATH`, empty treated as unset
    pub aiida_path: Option<String>,
}

impl ShellState {
    /// Read the state from this process's environment
    #[must_use]
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            active_project: read(ACTIVE_VAR),
            aiida_path: read(PATH_VAR),
        }
    }
}

/// Shell source activating `record`
pub fn activate(
    shell: Shell,
    record: &ProjectRecord,
    state: &ShellState,
    executor: &mut dyn Executor,
) -> Result<String> {
    if let Some(active) = &state.active_project {
        return Err(ProjectError::Activation(format!(
            "currently activated project '{active}' needs to be deactivated prior to activating a new project"
        )));
    }
    if state.aiida_path.is_some() {
        return Err(ProjectError::Activation(format!(
            "cannot activate project because {PATH_VAR} is already set"
        )));
    }

    let aiida_path = record.aiida_path();
    if !aiida_path.exists() {
        return Err(ProjectError::Activation(format!(
            "Aiida subfolder not found at location {}",
            aiida_path.display()
        )));
    }

    let manager_command = match record.backend_name {
        Backend::Index => {
            if !executor.tool_available(Backend::Index.env_tool())? {
                return Err(ProjectError::Activation(
                    "unable to activate environment because conda does not seem to be available."
                        .to_string(),
                ));
            }
            format!("conda activate {}", quote(&record.env_subpath.display().to_string()))
        }
        Backend::Vcs => {
            let script = record.env_subpath.join("bin").join("activate");
            if !script.exists() {
                return Err(ProjectError::Activation(format!(
                    "Unable to load project. No activation script found at location {}",
                    script.display()
                )));
            }
            format!(". {}", quote(&script.display().to_string()))
        }
    };

    let commands = [
        shell.set_var(PATH_VAR, &aiida_path.display().to_string()),
        shell.set_var(ACTIVE_VAR, &record.name),
        manager_command,
        "eval \"$(verdi completioncommand)\"".to_string(),
    ];
    Ok(commands.join(shell.separator()))
}

/// Shell source deactivating the active project `record`
pub fn deactivate(shell: Shell, record: &ProjectRecord, state: &ShellState) -> Result<String> {
    if state.active_project.is_none() {
        return Err(ProjectError::Activation("no project currently loaded".to_string()));
    }

    let manager_command = match record.backend_name {
        Backend::Index => "conda deactivate",
        Backend::Vcs => "deactivate",
    };

    let commands = [
        shell.unset_var(PATH_VAR),
        shell.unset_var(ACTIVE_VAR),
        manager_command.to_string(),
        "complete -r verdi".to_string(),
    ];
    Ok(commands.join(shell.separator()))
}
