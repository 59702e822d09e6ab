// ABOUTME: Command-line parsing for the geodesic launcher
// Classifies raw tokens into targets, options, variable bindings and a trailing command

pub mod options;

pub use options::{OptionKey, OptionSet};

use clap::error::ErrorKind;
use clap::Parser;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Unknown target: {0}")]
    UnknownTarget(String),
    #[error("{0}")]
    Usage(String),
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        let rendered = err.to_string();
        let message = rendered.trim().trim_start_matches("error: ");
        CliError::Usage(message.to_string())
    }
}

/// Top-level argv surface of the `geodesic` binary.
///
/// clap validates the leading `-h`/`-v` flags and answers `--version`. The
/// tokens themselves are classified by [`parse_tokens`] from the raw argv,
/// because options are open-ended (`--any-name=value`), may be interleaved
/// with targets, and clap swallows a leading `--`.
#[derive(Debug, Parser)]
#[command(
    name = "geodesic",
    version,
    about = "Launch, attach to and tear down a geodesic shell container",
    disable_help_flag = true
)]
pub struct Cli {
    /// Print usage (same as the `help` target)
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Enable debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Targets, `--name[=value]` options, `KEY=value` bindings and `-- command...`
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// What the command line asks the binary to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliRequest {
    Launch(Invocation),
    /// `--version`: print the rendered text and exit successfully
    PrintVersion(String),
}

impl Cli {
    /// Parse a full argv, program name first.
    ///
    /// An invocation without targets runs `use`.
    pub fn request_from<I, T>(argv: I) -> Result<CliRequest, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();

        if let Err(err) = Self::try_parse_from(&argv) {
            return match err.kind() {
                ErrorKind::DisplayVersion => Ok(CliRequest::PrintVersion(err.to_string())),
                _ => Err(err.into()),
            };
        }

        let tokens: Vec<String> = argv
            .iter()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let mut invocation = parse_tokens(&tokens)?;
        if invocation.targets.is_empty() {
            invocation.targets.push(Target::Use);
        }
        Ok(CliRequest::Launch(invocation))
    }
}

/// The operations a launcher invocation can run, in the order requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Use,
    Update,
    Uninstall,
    Stop,
    Help,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Use => "use",
            Target::Update => "update",
            Target::Uninstall => "uninstall",
            Target::Stop => "stop",
            Target::Help => "help",
        }
    }

    /// Whether running this target talks to the container runtime.
    pub fn needs_runtime(self) -> bool {
        !matches!(self, Target::Help)
    }
}

impl FromStr for Target {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "use" => Ok(Target::Use),
            "update" => Ok(Target::Update),
            "uninstall" => Ok(Target::Uninstall),
            "stop" => Ok(Target::Stop),
            "help" => Ok(Target::Help),
            other => Err(CliError::UnknownTarget(other.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the command line asked for, before any resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub targets: Vec<Target>,
    pub options: OptionSet,
    pub bindings: BTreeMap<String, String>,
    /// Tokens after `--`, run inside the container by `use`.
    pub command: Vec<String>,
    pub verbose: bool,
}

impl Invocation {
    /// Whether any requested target talks to the container runtime (`use` when none).
    pub fn needs_runtime(&self) -> bool {
        self.targets.is_empty() || self.targets.iter().any(|t| t.needs_runtime())
    }
}

/// Classify raw tokens (program name excluded).
///
/// An empty target list is left empty here; callers decide on the default.
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Invocation, CliError> {
    let mut invocation = Invocation::default();
    let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    let mut iter = tokens.into_iter();

    while let Some(token) = iter.next() {
        match token {
            "-h" | "--help" => invocation.targets.push(Target::Help),
            "-v" | "--verbose" => invocation.verbose = true,
            "--" => {
                invocation.command = iter.map(str::to_string).collect();
                break;
            }
            t if t.starts_with("--") => invocation.options.insert_flag(t),
            t if t.starts_with('-') => return Err(CliError::UnknownOption(t.to_string())),
            t => match t.split_once('=') {
                Some((key, value)) if !key.is_empty() => {
                    invocation
                        .bindings
                        .insert(key.to_string(), value.to_string());
                }
                _ => invocation.targets.push(t.parse()?),
            },
        }
    }

    Ok(invocation)
}
