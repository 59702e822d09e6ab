// ABOUTME: Layered variable lookup over options, bindings and the environment snapshot
// Replaces exporting parsed flags into the process environment

use crate::cli::Invocation;
use std::collections::HashMap;

/// Snapshot of the process environment taken once at startup.
pub type Environment = HashMap<String, String>;

/// Read-only view answering "what is `NAME` set to", highest layer first:
/// `--name=` option, then `NAME=` binding, then the environment.
///
/// Empty environment values count as unset; an explicit empty option or
/// binding is kept so callers can reject it.
#[derive(Debug, Clone, Copy)]
pub struct Vars<'a> {
    invocation: &'a Invocation,
    env: &'a Environment,
}

impl<'a> Vars<'a> {
    pub fn new(invocation: &'a Invocation, env: &'a Environment) -> Self {
        Self { invocation, env }
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.invocation
            .options
            .var(name)
            .or_else(|| self.invocation.bindings.get(name).map(String::as_str))
            .or_else(|| {
                self.env
                    .get(name)
                    .map(String::as_str)
                    .filter(|v| !v.is_empty())
            })
    }

    /// Like [`Vars::get`] but treats an explicit empty value as unset.
    pub fn get_non_empty(&self, name: &str) -> Option<&'a str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    pub fn is_true(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }

    /// `-v` on the command line, or `VERBOSE=true` from any layer.
    pub fn verbose(&self) -> bool {
        self.invocation.verbose || self.is_true("VERBOSE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_tokens;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_option_beats_binding_beats_env() {
        let inv = parse_tokens(&["--tag=opt", "TAG=bind", "PORT=4000"]).unwrap();
        let env = env(&[("TAG", "env"), ("PORT", "5000"), ("DNS", "9.9.9.9")]);
        let vars = Vars::new(&inv, &env);

        assert_eq!(vars.get("TAG"), Some("opt"));
        assert_eq!(vars.get("PORT"), Some("4000"));
        assert_eq!(vars.get("DNS"), Some("9.9.9.9"));
        assert_eq!(vars.get("NAME"), None);
    }

    #[test]
    fn test_empty_env_is_unset_but_explicit_empty_is_kept() {
        let inv = parse_tokens(&["--image="]).unwrap();
        let env = env(&[("TAG", "")]);
        let vars = Vars::new(&inv, &env);

        assert_eq!(vars.get("TAG"), None);
        assert_eq!(vars.get("IMAGE"), Some(""));
        assert_eq!(vars.get_non_empty("IMAGE"), None);
    }

    #[test]
    fn test_launcher_flags_are_visible() {
        let inv = parse_tokens(&["--geodesic-shell"]).unwrap();
        let env = Environment::new();
        assert!(Vars::new(&inv, &env).is_true("GEODESIC_SHELL"));
    }

    #[test]
    fn test_verbose_from_flag_binding_or_env() {
        let quiet = Environment::new();
        assert!(!Vars::new(&parse_tokens(&["use"]).unwrap(), &quiet).verbose());
        assert!(Vars::new(&parse_tokens(&["-v"]).unwrap(), &quiet).verbose());
        assert!(Vars::new(&parse_tokens(&["VERBOSE=true"]).unwrap(), &quiet).verbose());

        let loud = env(&[("VERBOSE", "true")]);
        assert!(Vars::new(&parse_tokens(&["use"]).unwrap(), &loud).verbose());
    }
}
