// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Commit-or-rollback boundary around project creation

use crate::config::Config;
use crate::creator::EnvCreator;
use crate::error::Result;
use crate::executor::Executor;
use crate::project::{ProjectRecord, ProjectSpec};
use crate::registry::Registry;
use tracing::{error, info};

/// Runs creation attempts and persists the ones that succeed
pub struct Orchestrator<'a> {
    executor: &'a mut dyn Executor,
    registry: &'a Registry,
    config: &'a Config,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrator issuing commands through `executor`
    pub fn new(executor: &'a mut dyn Executor, registry: &'a Registry, config: &'a Config) -> Self {
        Self {
            executor,
            registry,
            config,
        }
    }

    /// Create the project described by `spec`.
    ///
    /// On any failure the project folder is removed (if this call created
    /// it) and the original error is returned; the registry is written only
    /// once everything else has succeeded.
    pub fn create(&mut self, spec: &ProjectSpec) -> Result<ProjectRecord> {
        let mut creator = EnvCreator::new(spec, self.config);

        let record = match creator.run(&mut *self.executor) {
            Ok(record) => record,
            Err(err) => {
                error!("Creating project '{}' failed: {}", spec.name, err);
                creator.rollback();
                return Err(err);
            }
        };

        creator.commit();
        if let Err(err) = self.registry.save(&record) {
            error!("Saving project '{}' failed: {}", spec.name, err);
            creator.rollback();
            return Err(err);
        }

        info!("Project '{}' created at {}", record.name, record.project_path.display());
        Ok(record)
    }
}
