// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the aiida-project CLI commands
//!
//! Nothing here needs conda, virtualenv or git: creation is only exercised
//! through `--dry-run`, and registered projects are written directly.

use aiida_project::backend::Backend;
use aiida_project::project::{ProjectLayout, ProjectRecord, ProjectSpec};
use aiida_project::registry::Registry;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Run aiida-project with its config directory inside `config_dir`
fn aiida_project(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("aiida-project").unwrap();
    cmd.env("AIIDA_PROJECT_CONFIG_DIR", config_dir.path())
        .env_remove("AIIDA_PROJECT_ACTIVE")
        .env_remove("AIIDA_PATH")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Register a virtualenv project with its folders on disk
fn register_project(config_dir: &TempDir, root: &Path, name: &str) -> ProjectRecord {
    let spec = ProjectSpec {
        name: name.into(),
        root_path: root.to_path_buf(),
        python_version: "3.9".into(),
        package_version: "2.5.1".into(),
        backend: Backend::Vcs,
        packages: vec![],
    };
    let layout = ProjectLayout::new(root, name);
    fs::create_dir_all(&layout.aiida_folder).unwrap();
    fs::create_dir_all(layout.env_folder.join("bin")).unwrap();
    fs::write(layout.env_folder.join("bin").join("activate"), "").unwrap();

    let record = ProjectRecord::from_spec(&spec, &layout);
    Registry::new(config_dir.path().join("projects.toml"))
        .save(&record)
        .unwrap();
    record
}

#[test]
fn test_init_bash_prints_wrapper() {
    let config_dir = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["init", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("export AIIDA_PROJECT_EXE="))
        .stdout(predicate::str::contains("function aiida-project() {"));
}

#[test]
fn test_unsupported_shell() {
    let config_dir = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["init", "fish"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unsupported shell type `fish`"));
}

#[test]
fn test_no_color_accepts_common_values() {
    let config_dir = TempDir::new().unwrap();

    for value in ["1", "true", "0"] {
        aiida_project(&config_dir)
            .env("NO_COLOR", value)
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No projects registered"));
    }
}

#[test]
fn test_create_rejects_malformed_source_package() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["create", "demo", "--version", "2.5.1", "--pkg", "user/repo/sub", "--dry-run", "--path"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid source package definition 'user/repo/sub'"));
}

#[test]
fn test_list_empty_registry() {
    let config_dir = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects registered"));

    aiida_project(&config_dir)
        .args(["list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("{}\n"));
}

#[test]
fn test_list_registered_project() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    register_project(&config_dir, root.path(), "alpha");

    aiida_project(&config_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects (1):"))
        .stdout(predicate::str::contains("alpha [vcs] python 3.9 core 2.5.1"));

    let output = aiida_project(&config_dir)
        .args(["list", "--json"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["alpha"]["backend_name"], "vcs");
    assert_eq!(json["alpha"]["core_version"], "2.5.1");
}

#[test]
fn test_create_dry_run_prints_plan() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["create", "demo", "--manager", "conda", "--version", "2.5.1"])
        .args(["--python", "3.11", "--pkg", "numpy", "--dry-run", "--path"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry-run: would create project 'demo'"))
        .stdout(predicate::str::contains("conda create --yes --prefix"))
        .stdout(predicate::str::contains("python=3.11"))
        .stdout(predicate::str::contains("aiida-core=2.5.1 numpy"));

    assert!(!root.path().join("demo").exists());
    assert!(!config_dir.path().join("projects.toml").exists());
}

#[test]
fn test_create_dry_run_rejects_source_for_conda() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["create", "demo", "--manager", "index", "--version", "2.5.1"])
        .args(["--pkg", "aiidateam/aiida-ase", "--dry-run", "--path"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Installation from source is not supported by the conda manager"));
}

#[test]
fn test_create_requires_version() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["create", "demo", "--dry-run", "--path"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No aiida-core version given"));
}

#[test]
fn test_create_uses_configured_default_version() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    fs::write(
        config_dir.path().join("config.toml"),
        "default_core_version = \"2.4.0\"\ndefault_python = \"3.10\"\n",
    )
    .unwrap();

    aiida_project(&config_dir)
        .args(["create", "demo", "--dry-run", "--path"])
        .arg(root.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("--python=python3.10"))
        .stdout(predicate::str::contains("pip install --pre aiida-core==2.4.0"));
}

#[test]
fn test_create_refuses_registered_name() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    register_project(&config_dir, root.path(), "alpha");

    aiida_project(&config_dir)
        .args(["create", "alpha", "--version", "2.5.1", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project 'alpha' already exists"));
}

#[test]
fn test_activate_and_deactivate() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let record = register_project(&config_dir, root.path(), "alpha");

    aiida_project(&config_dir)
        .args(["activate", "bash", "alpha"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "export AIIDA_PATH='{}';export AIIDA_PROJECT_ACTIVE='alpha';",
            record.aiida_path().display()
        )));

    aiida_project(&config_dir)
        .args(["activate", "bash", "alpha"])
        .env("AIIDA_PROJECT_ACTIVE", "alpha")
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs to be deactivated"));

    aiida_project(&config_dir)
        .args(["deactivate", "bash"])
        .env("AIIDA_PROJECT_ACTIVE", "alpha")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "unset AIIDA_PATH;unset AIIDA_PROJECT_ACTIVE;deactivate;complete -r verdi\n",
        ));
}

#[test]
fn test_activate_unknown_project() {
    let config_dir = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["activate", "bash", "nope"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Project 'nope' does not exist"));
}

#[test]
fn test_deactivate_without_active_project() {
    let config_dir = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["deactivate", "bash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project currently loaded"));
}

#[test]
fn test_remove_deletes_folder_and_entry() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let record = register_project(&config_dir, root.path(), "alpha");
    register_project(&config_dir, root.path(), "beta");

    aiida_project(&config_dir)
        .args(["remove", "alpha", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed project: alpha"));

    assert!(!record.project_path.exists());
    assert!(root.path().join("beta").exists());

    let registry = Registry::new(config_dir.path().join("projects.toml"));
    assert!(!registry.exists("alpha").unwrap());
    assert!(registry.exists("beta").unwrap());

    aiida_project(&config_dir)
        .args(["remove", "alpha", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project 'alpha' does not exist"));
}

#[test]
fn test_remove_declined_keeps_project() {
    let config_dir = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let record = register_project(&config_dir, root.path(), "alpha");

    aiida_project(&config_dir)
        .args(["remove", "alpha"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Project not deleted!"));

    assert!(record.project_path.exists());
}

#[test]
fn test_corrupt_registry_is_reported() {
    let config_dir = TempDir::new().unwrap();
    fs::write(config_dir.path().join("projects.toml"), "not [valid toml").unwrap();

    aiida_project(&config_dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is corrupt"));

    assert_eq!(
        fs::read_to_string(config_dir.path().join("projects.toml")).unwrap(),
        "not [valid toml"
    );
}

#[test]
fn test_completions() {
    let config_dir = TempDir::new().unwrap();

    aiida_project(&config_dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aiida-project"));
}
