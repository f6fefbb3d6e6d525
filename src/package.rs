// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Package string parsing
//!
//! A raw package string is either an index specifier understood by the
//! package installer (`numpy`, `pymatgen==2019.3.13`, `aiida-vasp[extras]`)
//! or a source definition pointing at a hosted repository
//! (`owner/repo`, `owner/repo:branch`, each optionally followed by `[extras]`).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Characters allowed in owner, repository and branch names
const NAME_CHARSET: &str = r"A-Za-z0-9_.\\~-";

fn source_pattern() -> &'static Regex {
    static SOURCE: OnceLock<Regex> = OnceLock::new();
    SOURCE.get_or_init(|| {
        let c = NAME_CHARSET;
        // second branch is only anchored at the start so `[extras]` may follow
        Regex::new(&format!(r"^[{c}]+/[{c}]+:[{c}]+$|^[{c}]+/[{c}]+"))
            .expect("source package regex must be valid")
    })
}

fn strict_source_pattern() -> &'static Regex {
    static STRICT: OnceLock<Regex> = OnceLock::new();
    STRICT.get_or_init(|| {
        let c = NAME_CHARSET;
        Regex::new(&format!(r"^[{c}]+/[{c}]+:[{c}]+$|^[{c}]+/[{c}]+$"))
            .expect("strict source package regex must be valid")
    })
}

fn extras_pattern() -> &'static Regex {
    static EXTRAS: OnceLock<Regex> = OnceLock::new();
    EXTRAS.get_or_init(|| Regex::new(r"\[.*\]$").expect("extras regex must be valid"))
}

fn version_pattern() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| {
        Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+((a|b|rc)[0-9]+)?$")
            .expect("version regex must be valid")
    })
}

/// Where a package is installed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageSource {
    /// Resolved by the package installer from its index
    Index {
        /// Specifier without the extras suffix, version operators kept
        specifier: String,
    },
    /// Cloned from a hosted repository and installed from disk
    Source {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Branch to check out, default branch when absent
        branch: Option<String>,
    },
}

/// Structured form of a raw package string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    /// The string as given by the user
    pub raw: String,
    /// Index or source location
    pub source: PackageSource,
    /// `[...]` suffix or empty string
    pub extras: String,
}

impl PackageDescriptor {
    /// Parse a raw package string. Never fails: anything that is not a
    /// source definition is treated as an index specifier.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (base, extras) = unpack_raw_package_input(raw);
        let source = if is_source_package(raw) {
            let (owner, repo, branch) = unpack_package_def(&base);
            PackageSource::Source { owner, repo, branch }
        } else {
            PackageSource::Index { specifier: base }
        };
        Self {
            raw: raw.to_string(),
            source,
            extras,
        }
    }

    /// Whether the package comes from a repository
    #[must_use]
    pub fn is_source(&self) -> bool {
        matches!(self.source, PackageSource::Source { .. })
    }

    /// Whether an extras suffix was given
    #[must_use]
    pub fn has_extras(&self) -> bool {
        !self.extras.is_empty()
    }

    /// Repository owner for source packages
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        match &self.source {
            PackageSource::Source { owner, .. } => Some(owner),
            PackageSource::Index { .. } => None,
        }
    }

    /// Repository name for source packages
    #[must_use]
    pub fn repo(&self) -> Option<&str> {
        match &self.source {
            PackageSource::Source { repo, .. } => Some(repo),
            PackageSource::Index { .. } => None,
        }
    }

    /// Requested branch for source packages
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match &self.source {
            PackageSource::Source { branch, .. } => branch.as_deref(),
            PackageSource::Index { .. } => None,
        }
    }

    /// Raw string with the extras suffix removed
    #[must_use]
    pub fn base(&self) -> &str {
        self.raw.strip_suffix(self.extras.as_str()).unwrap_or(&self.raw)
    }

    /// Index specifier without extras
    #[must_use]
    pub fn index_specifier(&self) -> Option<&str> {
        match &self.source {
            PackageSource::Index { specifier } => Some(specifier),
            PackageSource::Source { .. } => None,
        }
    }
}

/// Permissive check used for classification during installation.
///
/// Matches `owner/repo:branch` exactly or anything starting with
/// `owner/repo`, which lets `owner/repo:branch[extras]` through.
#[must_use]
pub fn is_source_package(package: &str) -> bool {
    source_pattern().is_match(package)
}

/// Strict validation of a source definition without extras
#[must_use]
pub fn is_valid_source_definition(definition: &str) -> bool {
    strict_source_pattern().is_match(definition)
}

/// Whether the package string ends in an `[extras]` block
#[must_use]
pub fn has_extras(package: &str) -> bool {
    extras_pattern().is_match(package)
}

/// Whether `version` is `N.N.N` optionally followed by `aN`, `bN` or `rcN`
#[must_use]
pub fn is_valid_version(version: &str) -> bool {
    version_pattern().is_match(version)
}

/// Split a raw package string into `(base, extras)`.
///
/// `extras` is the trailing `[...]` block or an empty string, so
/// `base + extras` always reproduces the input.
#[must_use]
pub fn unpack_raw_package_input(package: &str) -> (String, String) {
    match extras_pattern().find(package) {
        Some(m) => (
            package[..m.start()].to_string(),
            m.as_str().to_string(),
        ),
        None => (package.to_string(), String::new()),
    }
}

/// Split `owner/repo[:branch]` into its parts
#[must_use]
pub fn unpack_package_def(definition: &str) -> (String, String, Option<String>) {
    let mut parts = definition.split(['/', ':']);
    let owner = parts.next().unwrap_or_default().to_string();
    let repo = parts.next().unwrap_or_default().to_string();
    let branch = parts.next().map(str::to_string);
    (owner, repo, branch)
}
