// ABOUTME: Top-level error type for a launcher run
// Every failure ends the process with exit code 1

use crate::cli::CliError;
use crate::config::ConfigError;
use crate::docker::RuntimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("Failed to update {0}")]
    UpdateFailed(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl LauncherError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}
