// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! aiida-project CLI - create and manage AiiDA project environments

use aiida_project::backend::Backend;
use aiida_project::commands;
use aiida_project::config;
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aiida-project")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory holding the project registry and config.toml
    #[arg(long, env = "AIIDA_PROJECT_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(
        long,
        env = "NO_COLOR",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new AiiDA project environment
    ///
    /// Initializes a folder NAME containing an `.aiida` folder at the
    /// location given by --path and creates a Python environment running
    /// the requested core version. The index manager (conda) only installs
    /// from its channels; use the vcs manager (virtualenv) for source
    /// packages (`<owner>/<repo>[:<branch>][extras]`) and extras.
    Create {
        /// Project name
        name: String,

        /// Package manager used to build the environment
        #[arg(long, value_enum, default_value_t = Backend::Vcs)]
        manager: Backend,

        /// Core package version, or a source definition for the vcs manager
        #[arg(long = "version", alias = "aiida", value_name = "VERSION")]
        core_version: Option<String>,

        /// Python version of the environment
        #[arg(long)]
        python: Option<String>,

        /// Additional package to install (repeatable)
        #[arg(long = "pkg", alias = "utility-pkg", value_name = "PACKAGE")]
        packages: Vec<String>,

        /// Directory to create the project in (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Print the commands that would run without creating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove a project folder and its registry entry
    ///
    /// This permanently deletes all data in the project folder including
    /// databases, repositories and configs.
    Remove {
        /// Project name
        name: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List registered projects
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the shell setup script (eval it in your shell rc file)
    Init {
        /// Shell type
        shell: String,
    },

    /// Print shell source activating a project
    #[command(hide = true)]
    Activate {
        /// Shell type
        shell: String,
        /// Project name
        name: String,
    },

    /// Print shell source deactivating the active project
    #[command(hide = true)]
    Deactivate {
        /// Shell type
        shell: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Commands whose stdout is evaluated by a shell
    fn prints_shell_source(&self) -> bool {
        matches!(self, Self::Init { .. } | Self::Activate { .. } | Self::Deactivate { .. })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let no_color = cli.no_color;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if no_color {
                eprintln!("error: {err:#}");
            } else {
                eprintln!("{} {err:#}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config_dir.as_deref())?;

    // Initialize logging; stdout is reserved for command output
    let log_level = match cli.verbose {
        0 if cli.quiet || cli.command.prints_shell_source() => "error",
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Create { name, manager, core_version, python, packages, path, dry_run } => {
            commands::create::run(
                &config,
                commands::create::CreateArgs {
                    name,
                    manager,
                    version: core_version,
                    python,
                    packages,
                    path,
                    dry_run,
                },
            )
        }
        Commands::Remove { name, yes } => commands::remove::run(&config, &name, yes),
        Commands::List { json } => commands::list::run(&config, json),
        Commands::Init { shell } => commands::shell::init(&shell),
        Commands::Activate { shell, name } => commands::shell::activate(&config, &shell, &name),
        Commands::Deactivate { shell } => commands::shell::deactivate(&config, &shell),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
