// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Persisted project registry
//!
//! A single TOML document mapping project name to [`ProjectRecord`].
//! Every write replaces the whole file through a sibling temporary file,
//! so readers see either the old or the new registry.

use crate::config::Config;
use crate::error::{ProjectError, Result};
use crate::project::ProjectRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// All registered projects keyed by name
pub type ProjectMap = BTreeMap<String, ProjectRecord>;

/// Handle on the registry file
#[derive(Debug, Clone)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    /// Registry stored at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Registry inside the configured config directory
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.registry_path())
    }

    /// Registry file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records; a missing file is an empty registry
    pub fn load(&self) -> Result<ProjectMap> {
        if !self.path.exists() {
            return Ok(ProjectMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.corrupt(e))?;
        let mut projects: ProjectMap = toml::from_str(&content).map_err(|e| self.corrupt(e))?;

        for (name, record) in &mut projects {
            record.name.clone_from(name);
        }

        Ok(projects)
    }

    /// Whether `name` is registered
    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.load()?.contains_key(name))
    }

    /// Record for `name`
    pub fn get(&self, name: &str) -> Result<ProjectRecord> {
        self.load()?
            .remove(name)
            .ok_or_else(|| ProjectError::ProjectNotFound(name.to_string()))
    }

    /// Insert or overwrite the record keyed by its name
    pub fn save(&self, record: &ProjectRecord) -> Result<()> {
        let mut projects = self.load()?;
        projects.insert(record.name.clone(), record.clone());
        self.write_all(&projects)?;
        debug!("Saved project '{}' to {}", record.name, self.path.display());
        Ok(())
    }

    /// Drop the record for `name` and return it
    pub fn remove(&self, name: &str) -> Result<ProjectRecord> {
        let mut projects = self.load()?;
        let record = projects
            .remove(name)
            .ok_or_else(|| ProjectError::ProjectNotFound(name.to_string()))?;
        self.write_all(&projects)?;
        debug!("Removed project '{}' from {}", name, self.path.display());
        Ok(record)
    }

    fn write_all(&self, projects: &ProjectMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ProjectError::io(parent, e))?;
        }

        let content = toml::to_string_pretty(projects).map_err(|e| self.corrupt(e))?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content).map_err(|e| ProjectError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| ProjectError::io(&self.path, e))?;
        Ok(())
    }

    fn corrupt(&self, reason: impl std::fmt::Display) -> ProjectError {
        ProjectError::RegistryCorrupt {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}
