// ABOUTME: Typed option set built from `--name[=value]` flags
// Recognised launcher settings are kept apart from opaque container passthrough variables

use std::collections::BTreeMap;
use std::fmt;

/// Launcher settings that can be given as `--flag` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    /// `--image`: full image reference, used verbatim
    Image,
    /// `--name`: container name (base name is taken)
    Name,
    /// `--tag`: tag appended to the default image repository
    Tag,
    /// `--port`: published port
    Port,
    /// `--dns`: DNS server used on macOS hosts
    Dns,
    /// `--env-file`: extra environment file for the container
    EnvFile,
    /// `--local-home`: host directory mounted at `/localhost`
    LocalHome,
}

/// Variables the launcher reads for itself. As `--flags` they configure the
/// launcher and are never forwarded into the container environment.
pub const LAUNCHER_VARS: [&str; 7] = [
    "HOME",
    "DOCKER_NAME",
    "GEODESIC_PORT",
    "GEODESIC_SHELL",
    "GEODESIC_DEFAULT_ENV_FILE",
    "SSH_AUTH_SOCK",
    "VERBOSE",
];

impl OptionKey {
    const ALL: [OptionKey; 7] = [
        OptionKey::Image,
        OptionKey::Name,
        OptionKey::Tag,
        OptionKey::Port,
        OptionKey::Dns,
        OptionKey::EnvFile,
        OptionKey::LocalHome,
    ];

    /// Variable name this option is known by (`ENV_FILE` for `--env-file`).
    pub fn var_name(self) -> &'static str {
        match self {
            OptionKey::Image => "IMAGE",
            OptionKey::Name => "NAME",
            OptionKey::Tag => "TAG",
            OptionKey::Port => "PORT",
            OptionKey::Dns => "DNS",
            OptionKey::EnvFile => "ENV_FILE",
            OptionKey::LocalHome => "LOCAL_HOME",
        }
    }

    pub fn from_var_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.var_name() == name)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.var_name())
    }
}

/// Convert a flag name to its variable name: `foo-bar` becomes `FOO_BAR`.
pub fn normalize_flag_name(flag: &str) -> String {
    flag.trim_start_matches("--").replace('-', "_").to_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    recognized: BTreeMap<OptionKey, String>,
    passthrough: BTreeMap<String, String>,
}

impl OptionSet {
    /// Record one `--name[=value]` token. A bare flag stores `true`.
    pub fn insert_flag(&mut self, token: &str) {
        let (name, value) = match token.split_once('=') {
            Some((name, value)) => (name, value),
            None => (token, "true"),
        };
        self.insert(&normalize_flag_name(name), value);
    }

    /// Store a value under an already-normalised variable name.
    pub fn insert(&mut self, var_name: &str, value: &str) {
        match OptionKey::from_var_name(var_name) {
            Some(key) => {
                self.recognized.insert(key, value.to_string());
            }
            None => {
                self.passthrough
                    .insert(var_name.to_string(), value.to_string());
            }
        }
    }

    pub fn get(&self, key: OptionKey) -> Option<&str> {
        self.recognized.get(&key).map(String::as_str)
    }

    /// Look up any option by variable name, recognised or not.
    pub fn var(&self, var_name: &str) -> Option<&str> {
        match OptionKey::from_var_name(var_name) {
            Some(key) => self.get(key),
            None => self.passthrough.get(var_name).map(String::as_str),
        }
    }

    /// Options the launcher does not interpret; they go to the container environment.
    pub fn passthrough(&self) -> impl Iterator<Item = (&str, &str)> {
        self.passthrough
            .iter()
            .filter(|(key, _)| !LAUNCHER_VARS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
