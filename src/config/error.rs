// ABOUTME: Error types for runtime configuration resolution
// Covers nested sessions, missing images, bad ports, unresolved home paths and settings files

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot run while in a geodesic shell")]
    NestedSession,

    #[error("--image not specified (E.g. --image=cloudposse/foobar.example.com:1.0)")]
    EmptyImage,

    #[error("Invalid port '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("can't identify user home directory, you may specify path via LOCAL_HOME variable")]
    UnresolvedHome,

    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
