// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Structured external command lines
//!
//! Every command the engine issues is described as a [`CommandSpec`] and
//! rendered through a fixed four-slot template:
//! `{executable} {subcommands} {flags} {arguments}`. Slots are always
//! separated by one space, even when empty, so golden command strings stay
//! stable (`virtualenv  --python=python3.9 /env` has two spaces because the
//! subcommand slot is empty).

use serde::Serialize;
use std::fmt;

/// An external command split into its template slots
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CommandSpec {
    /// Program to run
    pub executable: String,
    /// Subcommands, in order (`install`, `create`)
    pub subcommands: Vec<String>,
    /// Flags, in order; a flag may carry its value (`--prefix /env`)
    pub flags: Vec<String>,
    /// Positional arguments, in order
    pub arguments: Vec<String>,
}

impl CommandSpec {
    /// Start a command for `executable`
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            ..Self::default()
        }
    }

    /// Append a subcommand
    #[must_use]
    pub fn subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.subcommands.push(subcommand.into());
        self
    }

    /// Append a flag
    #[must_use]
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Append several flags, keeping their order
    #[must_use]
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Append a positional argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Append several positional arguments, keeping their order
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Render to a single command line
    #[must_use]
    pub fn render(&self) -> String {
        render(self)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a command through the four-slot template
#[must_use]
pub fn render(spec: &CommandSpec) -> String {
    format!(
        "{} {} {} {}",
        spec.executable,
        spec.subcommands.join(" "),
        spec.flags.join(" "),
        spec.arguments.join(" ")
    )
}
