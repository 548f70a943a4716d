//! Chainable wrapper around the warren binary for e2e tests.

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use std::path::Path;

/// Builds and runs one invocation of the warren binary.
pub struct WarrenCommand {
    cmd: Command,
}

impl WarrenCommand {
    /// Creates a command with the vault directory preset.
    pub fn new(vault_dir: &Path) -> Self {
        let mut cmd = Command::cargo_bin("warren").expect("warren binary should build");
        cmd.arg("--dir").arg(vault_dir);
        Self { cmd }
    }

    /// Adds the `export` subcommand with a destination.
    pub fn export(mut self, output_dir: &Path) -> Self {
        self.cmd.arg("export").arg("--output").arg(output_dir);
        self
    }

    /// Adds the `status` subcommand with a destination.
    pub fn status(mut self, output_dir: &Path) -> Self {
        self.cmd.arg("status").arg("--output").arg(output_dir);
        self
    }

    /// Adds the `completions` subcommand.
    pub fn completions(mut self, shell: &str) -> Self {
        self.cmd.arg("completions").arg(shell);
        self
    }

    /// Forces a full export.
    pub fn with_full(mut self) -> Self {
        self.cmd.arg("--full");
        self
    }

    /// Flattens output paths.
    pub fn with_flatten(mut self) -> Self {
        self.cmd.arg("--flatten");
        self
    }

    /// Selects an output format.
    pub fn with_format(mut self, format: &str) -> Self {
        self.cmd.arg("--format").arg(format);
        self
    }

    /// Adds an arbitrary argument.
    pub fn arg(mut self, arg: &str) -> Self {
        self.cmd.arg(arg);
        self
    }

    /// Runs the command and returns the assertion handle.
    pub fn assert(mut self) -> Assert {
        self.cmd.assert()
    }
}
