//! CLI command implementations.

pub(crate) mod turn;
pub(crate) mod validate;

mod output;

use clap::{Args, ValueEnum};
use stackconquer::{ConfigError, HostConfig, ScriptError};
use std::error::Error;
use std::fmt;
use std::num::NonZeroU64;
use std::path::PathBuf;

/// Output format for the `turn` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Options shared by commands that create script hosts.
#[derive(Args, Debug)]
pub(crate) struct ConfigArgs {
    /// Host configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Player ID the script plays for
    #[arg(short, long)]
    player: Option<u8>,

    /// Limit on script operations per call, at least 1 (default: unlimited)
    #[arg(long)]
    max_operations: Option<NonZeroU64>,
}

impl ConfigArgs {
    /// Build the host configuration: file (or defaults), then flags.
    pub(crate) fn resolve(&self) -> Result<HostConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => HostConfig::from_file(path)?,
            None => HostConfig::default(),
        };
        if let Some(player) = self.player {
            config.player_id = player;
        }
        if self.max_operations.is_some() {
            config.max_operations = self.max_operations;
        }
        Ok(config)
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ScriptError> for CliError {
    fn from(e: ScriptError) -> Self {
        Self::new(format!("{} ({})", e, e.kind()))
    }
}
