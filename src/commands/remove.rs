// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Remove command - deletes a project folder and its registry entry

use crate::config::Config;
use crate::registry::Registry;
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing::info;

/// Run the remove command
pub fn run(config: &Config, name: &str, yes: bool) -> Result<()> {
    let registry = Registry::from_config(config);
    let record = registry
        .get(name)
        .with_context(|| format!("Unable to delete project '{name}'"))?;

    if !yes {
        println!();
        println!("WARNING: You are about to delete the AiiDA project '{name}'");
        println!();
        println!("THIS WILL DELETE THE PROJECT AND ALL OF ITS CONTENTS!");
        println!();
        if !confirm("Do you really want to proceed?")? || !confirm("This is your last chance, really?")? {
            println!("Project not deleted!");
            return Ok(());
        }
    }

    if record.project_path.exists() {
        std::fs::remove_dir_all(&record.project_path)
            .with_context(|| format!("Failed to delete {}", record.project_path.display()))?;
        info!("Deleted {}", record.project_path.display());
    }
    registry.remove(name)?;

    println!("Removed project: {name}");
    Ok(())
}

/// Ask a yes/no question on stdin, defaulting to no
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
