// ABOUTME: Main entry point for the geodesic launcher

use anyhow::Result;
use std::io::{self, IsTerminal};

use geodesic_launcher::cli::{Cli, CliRequest};
use geodesic_launcher::config::{Environment, Settings, Vars};
use geodesic_launcher::docker::DockerCli;
use geodesic_launcher::platform::HostPlatform;
use geodesic_launcher::{launch, LauncherError};

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.downcast_ref::<LauncherError>()
                .map_or(1, LauncherError::exit_code)
        }
    };

    std::process::exit(code);
}

fn run() -> Result<i32> {
    let invocation = match Cli::request_from(std::env::args_os()).map_err(LauncherError::from)? {
        CliRequest::Launch(invocation) => invocation,
        CliRequest::PrintVersion(text) => {
            print!("{text}");
            return Ok(0);
        }
    };
    let env = environment_snapshot();

    setup_logging(Vars::new(&invocation, &env).verbose());

    let settings = match Settings::settings_path() {
        Some(path) => Settings::load_for(&invocation, &path).map_err(LauncherError::from)?,
        None => Settings::default(),
    };
    let program = std::env::args().next().unwrap_or_else(|| "geodesic".to_string());

    let code = launch(
        &invocation,
        &env,
        &settings,
        &HostPlatform::new(),
        &DockerCli::new(),
        &program,
        io::stdout().lock(),
    )?;

    Ok(code)
}

/// Read the environment once; variables that are not valid UTF-8 are skipped.
fn environment_snapshot() -> Environment {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_filter = if verbose {
        "geodesic_launcher=debug"
    } else {
        "geodesic_launcher=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
