// ABOUTME: Container runtime abstraction and its docker CLI implementation
// All calls are blocking child processes; foreground calls forward stdio and exit status

use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Cannot find {0} installed on this system. Please install and try again.")]
    NotInstalled(String),

    #[error("Unable to communicate with docker daemon. Make sure your environment is properly configured and then try again.")]
    DaemonUnreachable,

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Container query failed: {0}")]
    QueryFailed(String),
}

/// Operations the launcher needs from a docker-compatible runtime.
#[cfg_attr(test, mockall::automock)]
pub trait ContainerRuntime {
    /// Fail unless the runtime binary is installed and its daemon answers.
    fn ensure_ready(&self) -> Result<(), RuntimeError>;

    /// Whether a running container has exactly this name.
    fn is_running(&self, name: &str) -> Result<bool, RuntimeError>;

    /// Run the runtime CLI in the foreground with inherited stdio; returns its exit code.
    fn invoke(&self, args: &[String]) -> Result<i32, RuntimeError>;

    /// Like [`ContainerRuntime::invoke`] with all output discarded.
    fn invoke_quiet(&self, args: &[String]) -> Result<i32, RuntimeError>;

    /// Pipe the installer printed by `image` into `bash -s <tag>`.
    fn run_installer(&self, image: &str, tag: &str) -> Result<i32, RuntimeError>;
}

/// Exit code of a finished child; signal deaths map to `128 + signal` like a shell.
pub fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(1)
}

/// Exact-name filter for `docker ps`. The runtime treats the value as a
/// regex, so the name is escaped; some daemons report names with a leading `/`.
pub fn name_filter(name: &str) -> String {
    format!("name=^/?{}$", regex::escape(name))
}

/// Talks to the daemon through the `docker` command line.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_program("docker")
    }

    /// Use another docker-compatible binary, e.g. `podman`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> RuntimeError {
        RuntimeError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

/// Check that a tool is on `PATH`.
pub fn require_installed(tool: &str) -> Result<(), RuntimeError> {
    let output = Command::new("which")
        .arg(tool)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|_| RuntimeError::NotInstalled(tool.to_string()))?;

    if !output.success() {
        return Err(RuntimeError::NotInstalled(tool.to_string()));
    }
    Ok(())
}

impl ContainerRuntime for DockerCli {
    fn ensure_ready(&self) -> Result<(), RuntimeError> {
        require_installed(&self.program)?;

        let status = self
            .invoke_quiet(&["ps".to_string()])
            .map_err(|_| RuntimeError::DaemonUnreachable)?;
        if status != 0 {
            return Err(RuntimeError::DaemonUnreachable);
        }

        debug!("{} daemon is reachable", self.program);
        Ok(())
    }

    fn is_running(&self, name: &str) -> Result<bool, RuntimeError> {
        let args = [
            "ps".to_string(),
            "--filter".to_string(),
            name_filter(name),
            "--format".to_string(),
            "{{.Names}}".to_string(),
        ];
        let output = self
            .command(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(RuntimeError::QueryFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let running = String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|line| line.trim().trim_start_matches('/') == name);
        debug!("Container {} running: {}", name, running);
        Ok(running)
    }

    fn invoke(&self, args: &[String]) -> Result<i32, RuntimeError> {
        debug!("Running {} {}", self.program, args.join(" "));
        let status = self.command(args).status().map_err(|e| self.spawn_error(e))?;
        Ok(exit_code(status))
    }

    fn invoke_quiet(&self, args: &[String]) -> Result<i32, RuntimeError> {
        debug!("Running quietly {} {}", self.program, args.join(" "));
        let status = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;
        Ok(exit_code(status))
    }

    fn run_installer(&self, image: &str, tag: &str) -> Result<i32, RuntimeError> {
        info!("Fetching installer from {}", image);
        let mut fetch = self
            .command(&["run".to_string(), "--rm".to_string(), image.to_string()])
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let installer = fetch
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::QueryFailed("installer output unavailable".to_string()))?;

        let install_status = Command::new("bash")
            .args(["-s", tag])
            .stdin(Stdio::from(installer))
            .status()
            .map_err(|source| RuntimeError::Spawn {
                program: "bash".to_string(),
                source,
            })?;

        let fetch_status = fetch.wait().map_err(|e| self.spawn_error(e))?;

        // Either side failing fails the update, as with `set -o pipefail`
        if !fetch_status.success() {
            return Ok(exit_code(fetch_status));
        }
        Ok(exit_code(install_status))
    }
}
