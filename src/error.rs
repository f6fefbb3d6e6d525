// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for project creation, activation and the registry

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, ProjectError>;

/// Every failure the engine can surface to the front end
#[derive(Debug, Error)]
pub enum ProjectError {
    /// A required external executable is not callable
    #[error("Unable to find `{tool}` on the system")]
    ToolNotFound {
        /// Name of the missing tool
        tool: String,
    },

    /// Version string does not match `N.N.N[(a|b|rc)N]`
    #[error("Invalid version '{version}' (expected N.N.N with optional aN, bN or rcN suffix)")]
    InvalidVersion {
        /// The rejected version string
        version: String,
    },

    /// Source install requested from a backend that cannot do it
    #[error("Installation from source is not supported by the {backend} manager (package '{package}')")]
    UnsupportedSourceInstall {
        /// Backend name
        backend: String,
        /// Offending package string
        package: String,
    },

    /// Extras requested from a backend that has no extras syntax
    #[error("Installation of extras is not supported by the {backend} manager (package '{package}')")]
    UnsupportedExtras {
        /// Backend name
        backend: String,
        /// Offending package string
        package: String,
    },

    /// Source package that is not `owner/repo[:branch]` plus optional extras
    #[error("Invalid source package definition '{package}' (expected <owner>/<repo>[:<branch>][extras])")]
    InvalidSourceDefinition {
        /// Offending package string
        package: String,
    },

    /// Target project folder already exists
    #[error("Cannot create project folder '{}' because it already exists", path.display())]
    FolderExists {
        /// The pre-existing folder
        path: PathBuf,
    },

    /// `git clone` exited non-zero
    #[error("Cloning the repository failed. Used command {command}, STDERR={stderr}")]
    Clone {
        /// Rendered clone command
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// Package installer exited non-zero
    #[error("Package installation failed. Used command {command} (STDERR: {stderr})")]
    Install {
        /// Rendered install command
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// Environment manager exited non-zero
    #[error("Environment setup failed. Used command {command} (STDERR: {stderr})")]
    EnvironmentBuild {
        /// Rendered environment command
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// Registry file exists but cannot be read or parsed
    #[error("Project registry {} is corrupt: {reason}", path.display())]
    RegistryCorrupt {
        /// Registry file
        path: PathBuf,
        /// Underlying read or parse failure
        reason: String,
    },

    /// Project name not present in the registry
    #[error("Project '{0}' does not exist")]
    ProjectNotFound(String),

    /// Project name already present in the registry
    #[error("Project '{0}' already exists")]
    ProjectExists(String),

    /// Shell type has no activator
    #[error("Unsupported shell type `{shell}` (currently supported shell types: {supported})")]
    UnsupportedShell {
        /// Requested shell
        shell: String,
        /// Comma separated supported shells
        supported: String,
    },

    /// Activation or deactivation refused
    #[error("{0}")]
    Activation(String),

    /// Configuration could not be assembled
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or process spawn failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path or command involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl ProjectError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for ProjectError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
