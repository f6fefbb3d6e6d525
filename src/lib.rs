// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! aiida-project library - isolated AiiDA project environments
//!
//! This crate turns a project request (name, manager, Python version,
//! packages) into the external commands that build the environment, keeps
//! the project folder consistent when any of them fails, and records
//! successful projects for later shell activation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activate;
pub mod backend;
pub mod command;
pub mod commands;
pub mod config;
pub mod creator;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod package;
pub mod project;
pub mod registry;

/// Prelude for common imports
pub mod prelude {
    pub use crate::backend::Backend;
    pub use crate::command::CommandSpec;
    pub use crate::config::Config;
    pub use crate::creator::{CreationState, EnvCreator};
    pub use crate::error::{ProjectError, Result};
    pub use crate::executor::{CommandOutput, EnvOverlay, Executor, RecordingExecutor, SystemExecutor};
    pub use crate::orchestrator::Orchestrator;
    pub use crate::package::PackageDescriptor;
    pub use crate::project::{ProjectLayout, ProjectRecord, ProjectSpec};
    pub use crate::registry::Registry;
}
