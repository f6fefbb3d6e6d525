// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Create command - builds a new project environment

use crate::backend::Backend;
use crate::config::Config;
use crate::creator::EnvCreator;
use crate::error::ProjectError;
use crate::executor::SystemExecutor;
use crate::orchestrator::Orchestrator;
use crate::project::ProjectSpec;
use crate::registry::Registry;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the create command
#[derive(Debug)]
pub struct CreateArgs {
    /// Project name
    pub name: String,
    /// Environment manager
    pub manager: Backend,
    /// Core package version or source locator
    pub version: Option<String>,
    /// Python version
    pub python: Option<String>,
    /// Additional packages
    pub packages: Vec<String>,
    /// Directory to create the project in
    pub path: Option<PathBuf>,
    /// Print the commands instead of running them
    pub dry_run: bool,
}

/// Run the create command
pub fn run(config: &Config, args: CreateArgs) -> Result<()> {
    let registry = Registry::from_config(config);
    if registry.exists(&args.name)? {
        return Err(ProjectError::ProjectExists(args.name).into());
    }

    let package_version = args
        .version
        .or_else(|| config.default_core_version.clone())
        .ok_or_else(|| anyhow!("No {} version given. Use --version", config.core_package))?;

    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let root_path = root
        .canonicalize()
        .with_context(|| format!("Installation path {} does not exist", root.display()))?;

    let spec = ProjectSpec {
        name: args.name,
        root_path,
        python_version: args.python.unwrap_or_else(|| config.default_python.clone()),
        package_version,
        backend: args.manager,
        packages: args.packages,
    };

    if args.dry_run {
        let creator = EnvCreator::new(&spec, config);
        let plan = creator
            .plan()
            .with_context(|| format!("Invalid project definition for '{}'", spec.name))?;
        println!("Dry-run: would create project '{}' in {}", spec.name, creator.layout().project_folder.display());
        println!();
        for (i, command) in plan.iter().enumerate() {
            println!("  {}. {}", i + 1, command);
        }
        return Ok(());
    }

    info!("Installing to {}", spec.root_path.display());
    let mut executor = SystemExecutor;
    let record = Orchestrator::new(&mut executor, &registry, config)
        .create(&spec)
        .with_context(|| format!("Failed to create project '{}'", spec.name))?;

    println!("Created project: {} ({})", record.name, record.backend_name);
    println!("  path: {}", record.project_path.display());
    println!("  env:  {}", record.env_subpath.display());
    println!();
    println!("Use 'aiida-project activate {}' to start working", record.name);

    Ok(())
}
