// ABOUTME: Builds docker command lines for a geodesic session from the runtime configuration
// Covers creating a new session container, attaching to a running one and teardown

use crate::config::resolver::HOME_MOUNT_TARGET;
use crate::config::RuntimeConfig;

/// Command used when attaching without an explicit command.
pub const LOGIN_SHELL: [&str; 2] = ["/bin/bash", "-l"];

/// Port is exposed to the container under this variable.
pub const PORT_ENV: &str = "KUBERNETES_API_PORT";

/// Host variables passed by name when a terminal is attached.
const TERMINAL_ENV: [&str; 4] = ["LS_COLORS", "TERM", "TERM_COLOR", "TERM_PROGRAM"];

/// Host variables passed by name when the SSH agent is forwarded.
const SSH_ENV: [&str; 5] = ["SSH_AUTH_SOCK", "SSH_CLIENT", "SSH_CONNECTION", "SSH_TTY", "USER"];

#[derive(Debug, Default)]
struct ArgList(Vec<String>);

impl ArgList {
    fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.0.push(arg.into());
        self
    }

    fn env(&mut self, var: impl Into<String>) -> &mut Self {
        self.arg("--env").arg(var)
    }

    fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Arguments for `docker run` creating the session container.
pub fn run_args(config: &RuntimeConfig) -> Vec<String> {
    let mut args = ArgList::default();
    args.arg("run");

    if config.interactive {
        args.arg("-it");
        for var in TERMINAL_ENV {
            args.env(var);
        }
    }

    if let Some(sock) = &config.ssh_auth_sock {
        args.arg("--volume").arg(format!("{sock}:{sock}"));
        for var in SSH_ENV {
            args.env(var);
        }
        args.env(format!("USER_ID={}", config.user_id))
            .env(format!("GROUP_ID={}", config.group_id));
    }

    if let Some(env_file) = &config.env_file {
        args.arg("--env-file").arg(env_file.as_str());
    }
    if let Some(env_file) = &config.default_env_file {
        args.arg("--env-file").arg(env_file.to_string_lossy());
    }

    if let Some(dns) = config.host.dns_override(&config.dns) {
        args.arg(format!("--dns={dns}"));
    }

    if let Some(home) = &config.home_mount {
        args.arg(format!("--volume={home}:{HOME_MOUNT_TARGET}"));
    }

    for (key, value) in &config.passthrough_env {
        args.env(format!("{key}={value}"));
    }

    let port = config.port;
    args.arg("--privileged")
        .arg("--publish")
        .arg(format!("{port}:{port}"))
        .arg("--name")
        .arg(config.name.as_str())
        .arg("--rm")
        .env(format!("{PORT_ENV}={port}"));

    // The image entry point is a shell; `-l` makes it a login shell
    args.arg(config.image.as_str()).arg("-l");
    for arg in &config.command {
        args.arg(arg.as_str());
    }

    args.into_vec()
}

/// Arguments for `docker exec` into the running session.
pub fn exec_args(config: &RuntimeConfig) -> Vec<String> {
    let mut args = ArgList::default();
    args.arg("exec");
    if config.interactive {
        args.arg("-it");
    }
    args.arg(config.name.as_str());

    if config.command.is_empty() {
        for arg in LOGIN_SHELL {
            args.arg(arg);
        }
    } else {
        for arg in &config.command {
            args.arg(arg.as_str());
        }
    }

    args.into_vec()
}

pub fn kill_args(name: &str) -> Vec<String> {
    vec!["kill".to_string(), name.to_string()]
}

pub fn remove_container_args(name: &str) -> Vec<String> {
    vec!["rm".to_string(), "-f".to_string(), name.to_string()]
}

pub fn remove_image_args(image: &str) -> Vec<String> {
    vec!["rmi".to_string(), "-f".to_string(), image.to_string()]
}
