// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Shell integration commands
//!
//! Everything printed to stdout here is evaluated by the calling shell, so
//! diagnostics must go through tracing (stderr) only.

use crate::activate::{self, Shell, ShellState};
use crate::config::Config;
use crate::error::ProjectError;
use crate::executor::SystemExecutor;
use crate::registry::Registry;
use anyhow::{Context, Result};

/// Print the setup script for `shell`
pub fn init(shell: &str) -> Result<()> {
    let shell = Shell::from_name(shell)?;
    let executable = std::env::current_exe().context("Failed to locate the aiida-project executable")?;
    println!("{}", shell.setup_script(&executable));
    Ok(())
}

/// Print shell source activating project `name`
pub fn activate(config: &Config, shell: &str, name: &str) -> Result<()> {
    let shell = Shell::from_name(shell)?;
    let record = Registry::from_config(config)
        .get(name)
        .context("Unable to complete activation")?;

    let line = activate::activate(shell, &record, &ShellState::from_env(), &mut SystemExecutor)?;
    println!("{line}");
    Ok(())
}

/// Print shell source deactivating the active project
pub fn deactivate(config: &Config, shell: &str) -> Result<()> {
    let shell = Shell::from_name(shell)?;
    let state = ShellState::from_env();
    let name = state
        .active_project
        .clone()
        .ok_or_else(|| ProjectError::Activation("no project currently loaded".to_string()))?;
    let record = Registry::from_config(config)
        .get(&name)
        .context("Unable to complete deactivation")?;

    let line = activate::deactivate(shell, &record, &state)?;
    println!("{line}");
    Ok(())
}
