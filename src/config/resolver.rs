// ABOUTME: Resolves the runtime configuration for one launcher invocation
// Applies defaults, settings, environment, bindings and options, then host-specific rules

use super::{ConfigError, Environment, Settings, Vars};
use crate::cli::{Invocation, OptionKey};
use crate::platform::{HostKind, Platform};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

const DEFAULT_IMAGE: &str = "cloudposse/dev.yttrium.cc";
const DEFAULT_TAG: &str = "dev";
const DEFAULT_DNS: &str = "8.8.8.8";

/// Mount point of the host home directory inside the container.
pub const HOME_MOUNT_TARGET: &str = "/localhost";

const PORT_BASE: u32 = 30000;

/// Everything the controller and invoker need, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub image: String,
    pub tag: String,
    pub name: String,
    pub port: u16,
    pub dns: String,
    pub host: HostKind,
    /// Host path mounted at `/localhost`, `None` when it would shadow the mount point
    pub home_mount: Option<String>,
    pub env_file: Option<String>,
    /// Per-user default env file, present only when it exists on disk
    pub default_env_file: Option<PathBuf>,
    /// Unrecognised `--flag` options forwarded into the container
    pub passthrough_env: BTreeMap<String, String>,
    pub ssh_auth_sock: Option<String>,
    pub user_id: u32,
    pub group_id: u32,
    pub interactive: bool,
    pub command: Vec<String>,
}

/// Port used when none is configured: spreads concurrent launchers over `30000..60000`.
pub fn derived_port(pid: u32) -> u16 {
    u16::try_from(PORT_BASE + pid % PORT_BASE).unwrap_or(u16::MAX)
}

/// Last path segment of an image or container name.
pub fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

pub fn resolve<P: Platform + ?Sized>(
    invocation: &Invocation,
    env: &Environment,
    settings: &Settings,
    platform: &P,
) -> Result<RuntimeConfig, ConfigError> {
    let vars = Vars::new(invocation, env);

    if vars.is_true("GEODESIC_SHELL") {
        return Err(ConfigError::NestedSession);
    }

    let repository = settings.image.as_deref().unwrap_or(DEFAULT_IMAGE);

    let mut name = vars
        .get_non_empty("DOCKER_NAME")
        .or(settings.name.as_deref())
        .unwrap_or_else(|| base_name(repository))
        .to_string();
    if let Some(requested) = vars.get_non_empty(OptionKey::Name.var_name()) {
        name = base_name(requested).to_string();
    }

    let tag = vars
        .get_non_empty(OptionKey::Tag.var_name())
        .or(settings.tag.as_deref())
        .unwrap_or(DEFAULT_TAG)
        .to_string();

    let image = match vars.get(OptionKey::Image.var_name()) {
        Some(image) => image.to_string(),
        None => format!("{repository}:{tag}"),
    };
    if image.trim().is_empty() {
        return Err(ConfigError::EmptyImage);
    }

    let port = resolve_port(&vars, platform.process_id())?;

    let dns = vars
        .get_non_empty(OptionKey::Dns.var_name())
        .or(settings.dns.as_deref())
        .unwrap_or(DEFAULT_DNS)
        .to_string();

    let host = HostKind::detect(platform);
    let home = vars
        .get_non_empty("HOME")
        .map(PathBuf::from)
        .or_else(|| platform.home_dir());
    let home_mount = resolve_home_mount(&vars, host, platform, home.as_ref())?;

    let env_file = vars
        .get_non_empty(OptionKey::EnvFile.var_name())
        .or(settings.env_file.as_deref())
        .map(str::to_string);

    let default_env_file = vars
        .get_non_empty("GEODESIC_DEFAULT_ENV_FILE")
        .map(PathBuf::from)
        .or_else(|| home.as_ref().map(|h| h.join(".geodesic").join("env")))
        .filter(|path| platform.is_file(path));

    let ssh_auth_sock = vars
        .get_non_empty("SSH_AUTH_SOCK")
        .filter(|_| host.forwards_ssh_agent())
        .map(str::to_string);

    let config = RuntimeConfig {
        image,
        tag,
        name,
        port,
        dns,
        host,
        home_mount,
        env_file,
        default_env_file,
        passthrough_env: invocation
            .options
            .passthrough()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        ssh_auth_sock,
        user_id: platform.user_id(),
        group_id: platform.group_id(),
        interactive: platform.stdout_is_terminal(),
        command: invocation.command.clone(),
    };

    debug!("Resolved runtime configuration: {:?}", config);
    Ok(config)
}

fn resolve_port(vars: &Vars<'_>, pid: u32) -> Result<u16, ConfigError> {
    let configured = vars
        .get_non_empty(OptionKey::Port.var_name())
        .or_else(|| vars.get_non_empty("GEODESIC_PORT"));

    match configured {
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(ConfigError::InvalidPort(raw.to_string())),
        },
        None => Ok(derived_port(pid)),
    }
}

fn resolve_home_mount<P: Platform + ?Sized>(
    vars: &Vars<'_>,
    host: HostKind,
    platform: &P,
    home: Option<&PathBuf>,
) -> Result<Option<String>, ConfigError> {
    let local_home = match vars.get_non_empty(OptionKey::LocalHome.var_name()) {
        Some(explicit) => explicit.to_string(),
        None => {
            let home = home.ok_or(ConfigError::UnresolvedHome)?;
            let home = home.to_string_lossy();
            let source = host
                .home_mount_source(platform, &home)
                .ok_or(ConfigError::UnresolvedHome)?;
            if host == HostKind::Wsl {
                info!(
                    "Detected Windows Subsystem for Linux, mounting {} instead of {}",
                    source, home
                );
            }
            source
        }
    };

    if local_home == HOME_MOUNT_TARGET {
        warn!(
            "not mounting {} because it conflicts with geodesic",
            local_home
        );
        return Ok(None);
    }

    Ok(Some(local_home))
}
