// ABOUTME: Session controller dispatching launcher targets against the container runtime
// Implements the use, update, uninstall, stop and help operations

pub mod help;

use crate::cli::{Invocation, Target};
use crate::config::{resolve, Environment, RuntimeConfig, Settings};
use crate::docker::invoker::{kill_args, remove_container_args, remove_image_args};
use crate::docker::{exec_args, run_args, ContainerRuntime};
use crate::error::LauncherError;
use crate::platform::Platform;
use std::io::Write;
use tracing::{debug, info};

/// What the dispatch loop does after a target ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit(i32),
}

pub struct SessionController<'a, R: ContainerRuntime + ?Sized, W: Write> {
    runtime: &'a R,
    config: &'a RuntimeConfig,
    /// How the launcher was invoked, for messages
    program: String,
    out: W,
    runtime_ready: bool,
}

impl<'a, R: ContainerRuntime + ?Sized, W: Write> SessionController<'a, R, W> {
    pub fn new(runtime: &'a R, config: &'a RuntimeConfig, program: &str, out: W) -> Self {
        Self {
            runtime,
            config,
            program: program.to_string(),
            out,
            runtime_ready: false,
        }
    }

    /// Run targets in order until one of them ends the launcher.
    pub fn run(&mut self, targets: &[Target]) -> Result<i32, LauncherError> {
        for &target in targets {
            if let Flow::Exit(code) = self.dispatch(target)? {
                return Ok(code);
            }
        }
        Ok(0)
    }

    fn dispatch(&mut self, target: Target) -> Result<Flow, LauncherError> {
        debug!("Dispatching target {}", target);

        if target.needs_runtime() && !self.runtime_ready {
            self.runtime.ensure_ready()?;
            self.runtime_ready = true;
        }

        match target {
            Target::Use => self.use_session(),
            Target::Update => self.update(),
            Target::Uninstall => self.uninstall(),
            Target::Stop => self.stop(),
            Target::Help => self.help(),
        }
    }

    /// Attach to the running session or start a new one.
    fn use_session(&mut self) -> Result<Flow, LauncherError> {
        let config = self.config;

        if self.runtime.is_running(&config.name)? {
            writeln!(self.out, "# Attaching to existing {} session", config.name)?;
            self.out.flush()?;
            let code = self.runtime.invoke(&exec_args(config))?;
            return Ok(Flow::Exit(code));
        }

        if let Some(home) = &config.home_mount {
            writeln!(self.out, "# Mounting {home} into container")?;
        }
        writeln!(
            self.out,
            "# Starting new {} session from {}",
            config.name, config.image
        )?;
        writeln!(self.out, "# Exposing port {}", config.port)?;
        self.out.flush()?;

        info!("Starting session {} on port {}", config.name, config.port);
        let code = self.runtime.invoke(&run_args(config))?;
        Ok(Flow::Exit(code))
    }

    fn update(&mut self) -> Result<Flow, LauncherError> {
        let image = &self.config.image;
        writeln!(self.out, "# Installing the latest version of {image}")?;
        self.out.flush()?;

        let code = self.runtime.run_installer(image, &self.config.tag)?;
        if code != 0 {
            debug!("Installer exited with {}", code);
            return Err(LauncherError::UpdateFailed(image.clone()));
        }

        writeln!(self.out, "# {image} has been updated.")?;
        Ok(Flow::Exit(0))
    }

    fn uninstall(&mut self) -> Result<Flow, LauncherError> {
        writeln!(self.out, "# Uninstalling {}...", self.config.name)?;

        // Nothing to remove is still a successful uninstall
        for args in [
            remove_container_args(&self.config.name),
            remove_image_args(&self.config.image),
        ] {
            match self.runtime.invoke_quiet(&args) {
                Ok(code) => debug!("{} exited with {}", args.join(" "), code),
                Err(e) => debug!("{} failed: {}", args.join(" "), e),
            }
        }

        writeln!(self.out, "# Not deleting {}", self.program)?;
        Ok(Flow::Exit(0))
    }

    fn stop(&mut self) -> Result<Flow, LauncherError> {
        writeln!(self.out, "# Stopping {}...", self.config.name)?;
        self.out.flush()?;
        let code = self.runtime.invoke_quiet(&kill_args(&self.config.name))?;
        Ok(Flow::Exit(code))
    }

    fn help(&mut self) -> Result<Flow, LauncherError> {
        write!(self.out, "{}", help::usage(&self.program))?;
        Ok(Flow::Continue)
    }
}

/// Resolve the configuration once, then run every requested target (`use` when none).
pub fn launch<R, P, W>(
    invocation: &Invocation,
    env: &Environment,
    settings: &Settings,
    platform: &P,
    runtime: &R,
    program: &str,
    out: W,
) -> Result<i32, LauncherError>
where
    R: ContainerRuntime + ?Sized,
    P: Platform + ?Sized,
    W: Write,
{
    let config = resolve(invocation, env, settings, platform)?;
    let targets = if invocation.targets.is_empty() {
        &[Target::Use][..]
    } else {
        &invocation.targets[..]
    };
    SessionController::new(runtime, &config, program, out).run(targets)
}
