// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project creation pipeline
//!
//! [`EnvCreator::run`] drives one creation attempt through
//!
//! ```text
//! Pending -> FoldersCreated -> EnvBuilt -> IndexInstalled -> SourceInstalled
//! ```
//!
//! after which the orchestrator commits or rolls back. Validation happens
//! before the first folder is created, so validation failures leave nothing
//! behind.

use crate::backend::{self, Backend};
use crate::command::CommandSpec;
use crate::config::Config;
use crate::error::{ProjectError, Result};
use crate::executor::{EnvOverlay, Executor};
use crate::package::PackageDescriptor;
use crate::project::{ProjectLayout, ProjectRecord, ProjectSpec};
use serde::Serialize;
use std::fs;
use std::io;
use tracing::{debug, info, warn};

/// Progress of one creation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationState {
    /// Nothing on disk yet
    Pending,
    /// Project, `.aiida`, env and (if needed) src folders exist
    FoldersCreated,
    /// Environment manager finished
    EnvBuilt,
    /// Index packages installed
    IndexInstalled,
    /// Source packages cloned and installed
    SourceInstalled,
    /// Pipeline finished, record may be persisted
    Committed,
    /// Attempt failed and created folders were removed
    RolledBack,
}

/// Creates the environment for one [`ProjectSpec`]
#[derive(Debug)]
pub struct EnvCreator<'a> {
    spec: &'a ProjectSpec,
    config: &'a Config,
    layout: ProjectLayout,
    state: CreationState,
}

impl<'a> EnvCreator<'a> {
    /// Creator for `spec`; nothing happens until [`Self::run`]
    #[must_use]
    pub fn new(spec: &'a ProjectSpec, config: &'a Config) -> Self {
        Self {
            layout: spec.layout(),
            spec,
            config,
            state: CreationState::Pending,
        }
    }

    /// Current pipeline state
    #[must_use]
    pub fn state(&self) -> CreationState {
        self.state
    }

    /// Paths this attempt owns
    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn backend(&self) -> Backend {
        self.spec.backend
    }

    /// Core package entry followed by the requested packages, parsed
    pub fn package_descriptors(&self) -> Result<Vec<PackageDescriptor>> {
        let core = self
            .backend()
            .build_core_package_entry(&self.config.core_package, &self.spec.package_version)?;
        Ok(std::iter::once(core.as_str())
            .chain(self.spec.packages.iter().map(String::as_str))
            .map(PackageDescriptor::parse)
            .collect())
    }

    /// Run the whole pipeline and return the record to persist
    pub fn run(&mut self, executor: &mut dyn Executor) -> Result<ProjectRecord> {
        info!(
            "Creating project '{}' with {} in {}",
            self.spec.name,
            self.backend().env_tool(),
            self.layout.project_folder.display()
        );

        let packages = self.package_descriptors()?;
        let has_source = packages.iter().any(PackageDescriptor::is_source);

        self.validate_availability(executor, has_source)?;
        self.backend().validate_package_list(&packages)?;

        self.create_folder_layout(has_source)?;
        let overlay = self.build_environment(executor)?;
        self.install_from_index(executor, &packages, &overlay)?;
        self.install_from_source(executor, &packages, &overlay)?;

        Ok(ProjectRecord::from_spec(self.spec, &self.layout))
    }

    /// Commands [`Self::run`] would issue after validation, without running
    /// anything or touching the filesystem
    pub fn plan(&self) -> Result<Vec<CommandSpec>> {
        let packages = self.package_descriptors()?;
        self.backend().validate_package_list(&packages)?;

        let mut commands = vec![self.environment_command()];
        if let Some(install) = self.index_install(&packages) {
            commands.push(install);
        }
        for pkg in packages.iter().filter(|p| p.is_source()) {
            let (clone, install) = self.source_commands(pkg)?;
            commands.push(clone);
            commands.push(install);
        }
        Ok(commands)
    }

    /// Fail with [`ProjectError::ToolNotFound`] unless every required tool
    /// answers `--version`
    pub fn validate_availability(&self, executor: &mut dyn Executor, has_source: bool) -> Result<()> {
        for tool in self.backend().required_tools(has_source) {
            if !executor.tool_available(tool)? {
                return Err(ProjectError::ToolNotFound {
                    tool: tool.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Create project, `.aiida`, env and, for source packages, src folders
    pub fn create_folder_layout(&mut self, has_source: bool) -> Result<()> {
        let layout = &self.layout;
        if layout.project_folder.exists() {
            return Err(ProjectError::FolderExists {
                path: layout.project_folder.clone(),
            });
        }

        // no create_dir_all: ancestors created here would outlive a rollback
        fs::create_dir(&layout.project_folder)
            .map_err(|e| ProjectError::io(&layout.project_folder, e))?;
        // project folder is ours from here on, rollback may remove it
        self.state = CreationState::FoldersCreated;

        let mut folders = vec![&layout.aiida_folder, &layout.env_folder];
        if has_source {
            folders.push(&layout.src_folder);
        }
        for folder in folders {
            fs::create_dir(folder).map_err(|e| ProjectError::io(folder, e))?;
        }
        debug!("Created folder layout under {}", layout.project_folder.display());
        Ok(())
    }

    /// Environment creation command for this project
    #[must_use]
    pub fn environment_command(&self) -> CommandSpec {
        self.backend()
            .environment_command(&self.layout, &self.spec.python_version)
    }

    /// Build the environment and return the overlay later commands run with
    pub fn build_environment(&mut self, executor: &mut dyn Executor) -> Result<EnvOverlay> {
        let command = self.environment_command().render();
        info!("Creating {} environment ...", self.backend().env_tool());

        let output = executor.run(&command, &EnvOverlay::empty())?;
        if !output.success() {
            return Err(ProjectError::EnvironmentBuild {
                command,
                stderr: output.stderr,
            });
        }

        self.state = CreationState::EnvBuilt;
        let overlay = self.backend().environment_overlay(&self.layout);
        debug!("Environment overlay: {:?}", overlay);
        Ok(overlay)
    }

    fn index_install(&self, packages: &[PackageDescriptor]) -> Option<CommandSpec> {
        let entries: Vec<String> = packages
            .iter()
            .filter(|p| !p.is_source())
            .map(|p| p.raw.clone())
            .collect();
        if entries.is_empty() {
            return None;
        }
        Some(
            self.backend()
                .index_install_command(&self.layout, self.config, &entries),
        )
    }

    /// Install every non-source package with one command, in input order
    pub fn install_from_index(
        &mut self,
        executor: &mut dyn Executor,
        packages: &[PackageDescriptor],
        overlay: &EnvOverlay,
    ) -> Result<()> {
        if let Some(spec) = self.index_install(packages) {
            let command = spec.render();
            info!("Installing {} package(s) from the index ...", spec.arguments.len());
            let output = executor.run(&command, overlay)?;
            if !output.success() {
                return Err(ProjectError::Install {
                    command,
                    stderr: output.stderr,
                });
            }
        } else {
            debug!("No index packages to install");
        }
        self.advance(CreationState::IndexInstalled);
        Ok(())
    }

    fn source_commands(&self, pkg: &PackageDescriptor) -> Result<(CommandSpec, CommandSpec)> {
        let (owner, repo) = match (pkg.owner(), pkg.repo()) {
            (Some(owner), Some(repo)) => (owner, repo),
            _ => return Err(self.backend_rejects(pkg)),
        };
        let url = backend::build_source_url(&self.config.source_host, owner, repo);
        let location = self.layout.clone_path(repo);
        let clone = backend::clone_command(&url, pkg.branch(), &location);
        let target = format!("{}{}", location.display(), pkg.extras);
        let install = self.backend().source_install_command(&target)?;
        Ok((clone, install))
    }

    fn backend_rejects(&self, pkg: &PackageDescriptor) -> ProjectError {
        ProjectError::UnsupportedSourceInstall {
            backend: self.backend().env_tool().to_string(),
            package: pkg.raw.clone(),
        }
    }

    /// Clone and install every source package, in input order
    pub fn install_from_source(
        &mut self,
        executor: &mut dyn Executor,
        packages: &[PackageDescriptor],
        overlay: &EnvOverlay,
    ) -> Result<()> {
        for pkg in packages.iter().filter(|p| p.is_source()) {
            let (clone, install) = self.source_commands(pkg)?;

            let command = clone.render();
            info!("Cloning repository {} ...", clone.arguments.first().map_or("", String::as_str));
            let output = executor.run(&command, overlay)?;
            if !output.success() {
                return Err(ProjectError::Clone {
                    command,
                    stderr: output.stderr,
                });
            }

            let command = install.render();
            info!("Installing {} from source ...", pkg.raw);
            let output = executor.run(&command, overlay)?;
            if !output.success() {
                return Err(ProjectError::Install {
                    command,
                    stderr: output.stderr,
                });
            }
        }
        self.advance(CreationState::SourceInstalled);
        Ok(())
    }

    fn advance(&mut self, next: CreationState) {
        // steps may be called individually before any folder exists
        if self.state != CreationState::Pending {
            self.state = next;
        }
    }

    /// Mark the attempt as finished
    pub fn commit(&mut self) {
        self.state = CreationState::Committed;
    }

    /// Remove the project folder if this attempt created it.
    ///
    /// A pre-existing folder (`FolderExists`) is never touched. Failures are
    /// logged, not returned, so the error that caused the rollback survives.
    pub fn rollback(&mut self) {
        if self.state == CreationState::Pending || self.state == CreationState::RolledBack {
            return;
        }
        let folder = &self.layout.project_folder;
        match fs::remove_dir_all(folder) {
            Ok(()) => info!("Rolled back: removed {}", folder.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Rollback could not remove {}: {}", folder.display(), e),
        }
        self.state = CreationState::RolledBack;
    }
}
