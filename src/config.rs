// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Defaults, then `<config_dir>/config.toml`, then `AIIDA_PROJECT_*`
//! environment variables.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional settings file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Registry file inside the config directory
pub const REGISTRY_FILE: &str = "projects.toml";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "AIIDA_PROJECT";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the registry and `config.toml`
    pub config_dir: PathBuf,
    /// Name of the core package every project gets
    pub core_package: String,
    /// Python version used when `--python` is not given
    pub default_python: String,
    /// Core package version used when `--version` is not given
    pub default_core_version: Option<String>,
    /// Channels passed to conda installs
    pub conda_channels: Vec<String>,
    /// Base URL that source packages are cloned from
    pub source_host: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            core_package: "aiida-core".to_string(),
            default_python: "3.9".to_string(),
            default_core_version: None,
            conda_channels: vec![
                "conda-forge".to_string(),
                "bioconda".to_string(),
                "matsci".to_string(),
            ],
            source_host: "https://github.com".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Location of the project registry
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.config_dir.join(REGISTRY_FILE)
    }
}

/// Per-user configuration directory
#[must_use]
pub fn default_config_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "aiida", "aiida-project")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.aiida_project"))
}

/// Load configuration, optionally from a non-default config directory
pub fn load(config_dir: Option<&Path>) -> Result<Config> {
    let config_dir = config_dir.map_or_else(default_config_dir, Path::to_path_buf);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_dir.join(CONFIG_FILE)).required(false))
        // scalar keys only; lists such as conda_channels come from the file
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    let mut loaded: Config = settings.try_deserialize()?;
    loaded.config_dir = config_dir;
    Ok(loaded)
}
