// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Environment backends
//!
//! Two managers are supported:
//!
//! * [`Backend::Index`] builds with conda. Packages come from the conda
//!   channels only, so source packages and extras are rejected.
//! * [`Backend::Vcs`] builds with virtualenv and installs with pip, which
//!   can also install cloned repositories and understands extras.
//!
//! The shared creation pipeline lives in [`crate::creator`]; this module
//! only provides the per-backend hooks.

use crate::command::CommandSpec;
use crate::config::Config;
use crate::error::{ProjectError, Result};
use crate::executor::EnvOverlay;
use crate::package::{self, PackageDescriptor};
use crate::project::ProjectLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Version control tool used for source packages
pub const VCS_TOOL: &str = "git";

/// Environment manager a project is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// conda: index packages only
    #[value(alias = "conda")]
    Index,
    /// virtualenv + pip: index and source packages, extras
    #[value(alias = "virtualenv")]
    Vcs,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Backend {
    /// Name stored in the registry
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Vcs => "vcs",
        }
    }

    /// Executable that creates environments
    #[must_use]
    pub fn env_tool(self) -> &'static str {
        match self {
            Self::Index => "conda",
            Self::Vcs => "virtualenv",
        }
    }

    /// Executable that installs packages
    #[must_use]
    pub fn package_tool(self) -> &'static str {
        match self {
            Self::Index => "conda",
            Self::Vcs => "pip",
        }
    }

    /// Whether packages can be installed from cloned repositories
    #[must_use]
    pub fn supports_source(self) -> bool {
        matches!(self, Self::Vcs)
    }

    /// Whether `[extras]` suffixes are understood
    #[must_use]
    pub fn supports_extras(self) -> bool {
        matches!(self, Self::Vcs)
    }

    /// Tools that must answer `--version` before anything is created.
    ///
    /// pip is not checked for [`Backend::Vcs`]: it is provided by the
    /// environment virtualenv creates.
    #[must_use]
    pub fn required_tools(self, needs_source: bool) -> Vec<&'static str> {
        let mut tools = vec![self.env_tool()];
        if needs_source {
            tools.push(VCS_TOOL);
        }
        tools
    }

    /// Install entry for the core package
    pub fn build_core_package_entry(self, core_package: &str, version: &str) -> Result<String> {
        match self {
            Self::Index => {
                if package::is_source_package(version) {
                    return Err(self.unsupported_source(version));
                }
                if package::has_extras(version) {
                    return Err(self.unsupported_extras(version));
                }
                if !package::is_valid_version(version) {
                    return Err(ProjectError::InvalidVersion {
                        version: version.to_string(),
                    });
                }
                Ok(format!("{core_package}={version}"))
            }
            Self::Vcs => {
                if package::is_source_package(version) {
                    return Ok(version.to_string());
                }
                let (base, extras) = package::unpack_raw_package_input(version);
                if !package::is_valid_version(&base) {
                    return Err(ProjectError::InvalidVersion {
                        version: version.to_string(),
                    });
                }
                Ok(format!("{core_package}=={base}{extras}"))
            }
        }
    }

    /// Reject packages this backend cannot install
    pub fn validate_package_list(self, packages: &[PackageDescriptor]) -> Result<()> {
        for pkg in packages {
            if pkg.is_source() && !self.supports_source() {
                return Err(self.unsupported_source(&pkg.raw));
            }
            if pkg.is_source() && !package::is_valid_source_definition(pkg.base()) {
                return Err(ProjectError::InvalidSourceDefinition {
                    package: pkg.raw.clone(),
                });
            }
            if pkg.has_extras() && !self.supports_extras() {
                return Err(self.unsupported_extras(&pkg.raw));
            }
        }
        Ok(())
    }

    /// Command creating the environment in `layout.env_folder`
    #[must_use]
    pub fn environment_command(self, layout: &ProjectLayout, python_version: &str) -> CommandSpec {
        let env = layout.env_folder.display().to_string();
        match self {
            Self::Index => CommandSpec::new(self.env_tool())
                .subcommand("create")
                .flag("--yes")
                .flag(format!("--prefix {env}"))
                .arg(format!("python={python_version}")),
            Self::Vcs => CommandSpec::new(self.env_tool())
                .flag(format!("--python=python{python_version}"))
                .arg(env),
        }
    }

    /// One command installing all index `entries` in the given order
    #[must_use]
    pub fn index_install_command(self, layout: &ProjectLayout, config: &Config, entries: &[String]) -> CommandSpec {
        match self {
            Self::Index => CommandSpec::new(self.package_tool())
                .subcommand("install")
                .flag("--yes")
                .flags(config.conda_channels.iter().map(|c| format!("--channel {c}")))
                .flag(format!("--prefix {}", layout.env_folder.display()))
                .args(entries.iter().cloned()),
            Self::Vcs => CommandSpec::new(self.package_tool())
                .subcommand("install")
                .flag("--pre")
                .args(entries.iter().cloned()),
        }
    }

    /// Command installing an already cloned repository at `target`
    pub fn source_install_command(self, target: &str) -> Result<CommandSpec> {
        match self {
            Self::Index => Err(self.unsupported_source(target)),
            Self::Vcs => Ok(CommandSpec::new(self.package_tool())
                .subcommand("install")
                .flag("--editable")
                .arg(target)),
        }
    }

    /// Variables later commands need to act inside the new environment.
    ///
    /// conda addresses the environment with `--prefix`, so it needs none.
    /// For virtualenv this mirrors what `bin/activate` exports.
    #[must_use]
    pub fn environment_overlay(self, layout: &ProjectLayout) -> EnvOverlay {
        match self {
            Self::Index => EnvOverlay::empty(),
            Self::Vcs => {
                let bin = layout.env_folder.join(if cfg!(windows) { "Scripts" } else { "bin" });
                let separator = if cfg!(windows) { ';' } else { ':' };
                let path = match std::env::var("PATH") {
                    Ok(current) if !current.is_empty() => {
                        format!("{}{separator}{current}", bin.display())
                    }
                    _ => bin.display().to_string(),
                };
                EnvOverlay::empty()
                    .with("VIRTUAL_ENV", layout.env_folder.display().to_string())
                    .with("PATH", path)
            }
        }
    }

    fn unsupported_source(self, package: &str) -> ProjectError {
        ProjectError::UnsupportedSourceInstall {
            backend: self.env_tool().to_string(),
            package: package.to_string(),
        }
    }

    fn unsupported_extras(self, package: &str) -> ProjectError {
        ProjectError::UnsupportedExtras {
            backend: self.env_tool().to_string(),
            package: package.to_string(),
        }
    }
}

/// `https://github.com/<owner>/<repo>` style clone URL
#[must_use]
pub fn build_source_url(host: &str, owner: &str, repo: &str) -> String {
    format!("{}/{owner}/{repo}", host.trim_end_matches('/'))
}

/// Single-branch clone of `url` into `location`
#[must_use]
pub fn clone_command(url: &str, branch: Option<&str>, location: &Path) -> CommandSpec {
    let mut spec = CommandSpec::new(VCS_TOOL)
        .subcommand("clone")
        .flag("--single-branch");
    if let Some(branch) = branch {
        spec = spec.flag(format!("--branch {branch}"));
    }
    spec.arg(url).arg(location.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn layout() -> ProjectLayout {
        ProjectLayout::new(Path::new("/work"), "proj")
    }

    #[test]
    fn test_index_environment_command() {
        let cmd = Backend::Index.environment_command(&layout(), "123.456");

        assert_eq!(cmd.render(), "conda create --yes --prefix /work/proj/env python=123.456");
    }

    #[test]
    fn test_vcs_environment_command() {
        let cmd = Backend::Vcs.environment_command(&layout(), "123.456");

        assert!(cmd.flags.contains(&"--python=python123.456".to_string()));
        assert_eq!(cmd.render(), "virtualenv  --python=python123.456 /work/proj/env");
    }

    #[test]
    fn test_index_core_entry() {
        assert_eq!(
            Backend::Index.build_core_package_entry("aiida-core", "1.2.3b56").unwrap(),
            "aiida-core=1.2.3b56"
        );
        assert!(matches!(
            Backend::Index.build_core_package_entry("aiida-core", "1.2"),
            Err(ProjectError::InvalidVersion { .. })
        ));
        assert!(matches!(
            Backend::Index.build_core_package_entry("aiida-core", "aiidateam/aiida-core:develop"),
            Err(ProjectError::UnsupportedSourceInstall { .. })
        ));
        assert!(matches!(
            Backend::Index.build_core_package_entry("aiida-core", "1.2.3[docs]"),
            Err(ProjectError::UnsupportedExtras { .. })
        ));
    }

    #[test]
    fn test_vcs_core_entry() {
        let core = |v: &str| Backend::Vcs.build_core_package_entry("aiida-core", v);

        assert_eq!(core("1.2.3b56").unwrap(), "aiida-core==1.2.3b56");
        assert_eq!(core("1.2.3b56[extras]").unwrap(), "aiida-core==1.2.3b56[extras]");
        assert_eq!(core("aiidateam/aiida-core:develop").unwrap(), "aiidateam/aiida-core:develop");
        assert_eq!(
            core("aiidateam/aiida-core:develop[extra]").unwrap(),
            "aiidateam/aiida-core:develop[extra]"
        );
        assert!(matches!(core("latest"), Err(ProjectError::InvalidVersion { .. })));
    }

    #[test]
    fn test_index_rejects_source_and_extras() {
        let ok: Vec<_> = ["postgresql", "aiida-core.services"]
            .iter()
            .map(|p| PackageDescriptor::parse(p))
            .collect();
        assert!(Backend::Index.validate_package_list(&ok).is_ok());

        let source = vec![PackageDescriptor::parse("postgresql"), PackageDescriptor::parse("aiidateam/aiida-ase")];
        let err = Backend::Index.validate_package_list(&source).unwrap_err();
        assert!(err.to_string().contains("Installation from source"));

        let extras = vec![PackageDescriptor::parse("aiida-ase[some_extra]")];
        let err = Backend::Index.validate_package_list(&extras).unwrap_err();
        assert!(err.to_string().contains("Installation of extras"));

        assert!(Backend::Vcs.validate_package_list(&source).is_ok());
        assert!(Backend::Vcs.validate_package_list(&extras).is_ok());
    }

    #[test]
    fn test_malformed_source_definitions_are_rejected() {
        let ok: Vec<_> = ["user/repo", "user/repo:branch", "user/repo:branch[extra]"]
            .iter()
            .map(|p| PackageDescriptor::parse(p))
            .collect();
        assert!(Backend::Vcs.validate_package_list(&ok).is_ok());

        for raw in ["user/repo/sub", "user/repo:branch:extra", "user/repo:[extra]"] {
            let packages = vec![PackageDescriptor::parse(raw)];
            let err = Backend::Vcs.validate_package_list(&packages).unwrap_err();
            assert!(
                matches!(err, ProjectError::InvalidSourceDefinition { ref package } if package == raw),
                "{raw} was accepted"
            );
        }
    }

    #[test]
    fn test_required_tools() {
        assert_eq!(Backend::Index.required_tools(false), vec!["conda"]);
        assert_eq!(Backend::Vcs.required_tools(false), vec!["virtualenv"]);
        assert_eq!(Backend::Vcs.required_tools(true), vec!["virtualenv", "git"]);
    }

    #[test]
    fn test_install_commands() {
        let config = Config::default();
        let entries = vec!["aiida-core=0.0.0".to_string(), "pymatgen=2019.3.13".to_string()];

        assert_eq!(
            Backend::Index.index_install_command(&layout(), &config, &entries).render(),
            "conda install --yes --channel conda-forge --channel bioconda --channel matsci \
             --prefix /work/proj/env aiida-core=0.0.0 pymatgen=2019.3.13"
        );
        assert_eq!(
            Backend::Vcs.index_install_command(&layout(), &config, &entries).render(),
            "pip install --pre aiida-core=0.0.0 pymatgen=2019.3.13"
        );
        assert_eq!(
            Backend::Vcs.source_install_command("/work/proj/src/repo[x]").unwrap().render(),
            "pip install --editable /work/proj/src/repo[x]"
        );
        assert!(Backend::Index.source_install_command("/x").is_err());
    }

    #[test]
    fn test_clone_command() {
        let url = build_source_url("https://github.com/", "user1", "repo1");
        assert_eq!(url, "https://github.com/user1/repo1");

        let location = Path::new("/some/random/path/on/disk");
        assert_eq!(
            clone_command(&url, None, location).render(),
            "git clone --single-branch https://github.com/user1/repo1 /some/random/path/on/disk"
        );
        assert_eq!(
            clone_command(&url, Some("branch1"), location).render(),
            "git clone --single-branch --branch branch1 https://github.com/user1/repo1 /some/random/path/on/disk"
        );
    }

    #[test]
    fn test_vcs_overlay_points_at_env() {
        let overlay = Backend::Vcs.environment_overlay(&layout());

        assert_eq!(overlay.get("VIRTUAL_ENV"), Some("/work/proj/env"));
        assert!(overlay.get("PATH").unwrap().starts_with("/work/proj/env/bin"));
        assert!(Backend::Index.environment_overlay(&layout()).is_empty());
    }
}
