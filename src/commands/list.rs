// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List command - shows registered projects

use crate::config::Config;
use crate::registry::Registry;
use anyhow::{Context, Result};

/// Run the list command
pub fn run(config: &Config, json: bool) -> Result<()> {
    let registry = Registry::from_config(config);
    let projects = registry
        .load()
        .with_context(|| format!("Failed to load registry from {}", registry.path().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects registered. Use 'aiida-project create' to add one.");
        return Ok(());
    }

    println!("Projects ({}):", projects.len());
    for (name, record) in &projects {
        println!(
            "  {} [{}] python {} core {}",
            name, record.backend_name, record.python_version, record.core_version
        );
        println!("    {}", record.project_path.display());
    }

    Ok(())
}
