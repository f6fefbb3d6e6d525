// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Project request, on-disk layout and persisted record

use crate::backend::Backend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Folder holding the Python environment
pub const ENV_SUBFOLDER: &str = "env";

/// Folder holding cloned source packages
pub const SRC_SUBFOLDER: &str = "src";

/// Folder holding the AiiDA configuration
pub const AIIDA_SUBFOLDER: &str = ".aiida";

/// A request to create one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    /// Project name, also the project folder name
    pub name: String,
    /// Directory the project folder is created in
    pub root_path: PathBuf,
    /// Python version for the environment
    pub python_version: String,
    /// Core package version or source locator
    pub package_version: String,
    /// Environment manager to build with
    pub backend: Backend,
    /// Additional packages, in install order
    pub packages: Vec<String>,
}

impl ProjectSpec {
    /// Folder layout this request will create
    #[must_use]
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.root_path, &self.name)
    }
}

/// Paths owned by one creation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// `<root>/<name>`
    pub project_folder: PathBuf,
    /// `<project>/env`
    pub env_folder: PathBuf,
    /// `<project>/src`, only created for source packages
    pub src_folder: PathBuf,
    /// `<project>/.aiida`
    pub aiida_folder: PathBuf,
}

impl ProjectLayout {
    /// Layout for project `name` under `root`
    #[must_use]
    pub fn new(root: &Path, name: &str) -> Self {
        let project_folder = root.join(name);
        Self {
            env_folder: project_folder.join(ENV_SUBFOLDER),
            src_folder: project_folder.join(SRC_SUBFOLDER),
            aiida_folder: project_folder.join(AIIDA_SUBFOLDER),
            project_folder,
        }
    }

    /// Where a source package's repository is cloned to
    #[must_use]
    pub fn clone_path(&self, repo: &str) -> PathBuf {
        self.src_folder.join(repo)
    }
}

/// Registry entry for a successfully created project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Registry key, not stored inside the entry
    #[serde(skip)]
    pub name: String,
    /// Absolute project folder
    pub project_path: PathBuf,
    /// Core package version or source locator
    pub core_version: String,
    /// Python version of the environment
    pub python_version: String,
    /// Absolute environment folder
    pub env_subpath: PathBuf,
    /// Absolute source folder
    pub src_subpath: PathBuf,
    /// Backend the project was built with
    pub backend_name: Backend,
}

impl ProjectRecord {
    /// Record describing `spec` built into `layout`
    #[must_use]
    pub fn from_spec(spec: &ProjectSpec, layout: &ProjectLayout) -> Self {
        Self {
            name: spec.name.clone(),
            project_path: layout.project_folder.clone(),
            core_version: spec.package_version.clone(),
            python_version: spec.python_version.clone(),
            env_subpath: layout.env_folder.clone(),
            src_subpath: layout.src_folder.clone(),
            backend_name: spec.backend,
        }
    }

    /// The project's `.aiida` folder
    #[must_use]
    pub fn aiida_path(&self) -> PathBuf {
        self.project_path.join(AIIDA_SUBFOLDER)
    }
}
