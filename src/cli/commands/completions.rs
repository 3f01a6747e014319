//! Shell completions command implementation.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell as Target};
use std::io;

impl From<&Shell> for Target {
    fn from(shell: &Shell) -> Self {
        match shell {
            Shell::Bash => Self::Bash,
            Shell::Zsh => Self::Zsh,
            Shell::Fish => Self::Fish,
            Shell::PowerShell => Self::PowerShell,
            Shell::Elvish => Self::Elvish,
        }
    }
}

/// Write completions for `shell` to stdout.
///
/// # Errors
///
/// Infallible today; kept fallible to match the other commands.
pub fn execute(shell: &Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(Target::from(shell), &mut cmd, bin, &mut io::stdout());
    Ok(())
}
