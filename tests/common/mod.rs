// ABOUTME: Shared fakes for launcher integration tests
// A recording container runtime and a scripted platform

#![allow(dead_code)]

use geodesic_launcher::docker::{ContainerRuntime, RuntimeError};
use geodesic_launcher::platform::{OsKind, Platform};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Records every runtime call as a flat command line.
#[derive(Default)]
pub struct RecordingRuntime {
    pub running: Vec<String>,
    pub exit_code: i32,
    pub calls: RefCell<Vec<Vec<String>>>,
}

impl RecordingRuntime {
    pub fn with_running(name: &str) -> Self {
        Self {
            running: vec![name.to_string()],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Calls whose first argument is `verb` (`run`, `exec`, ...).
    pub fn calls_to(&self, verb: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|c| c.first().map(String::as_str) == Some(verb))
            .collect()
    }

    fn record(&self, call: Vec<String>) {
        self.calls.borrow_mut().push(call);
    }
}

impl ContainerRuntime for RecordingRuntime {
    fn ensure_ready(&self) -> Result<(), RuntimeError> {
        self.record(vec!["ps".to_string()]);
        Ok(())
    }

    fn is_running(&self, name: &str) -> Result<bool, RuntimeError> {
        self.record(vec!["ps".to_string(), "--filter".to_string(), name.to_string()]);
        Ok(self.running.iter().any(|r| r == name))
    }

    fn invoke(&self, args: &[String]) -> Result<i32, RuntimeError> {
        self.record(args.to_vec());
        Ok(self.exit_code)
    }

    fn invoke_quiet(&self, args: &[String]) -> Result<i32, RuntimeError> {
        self.record(args.to_vec());
        Ok(self.exit_code)
    }

    fn run_installer(&self, image: &str, tag: &str) -> Result<i32, RuntimeError> {
        self.record(vec![
            "installer".to_string(),
            image.to_string(),
            tag.to_string(),
        ]);
        Ok(self.exit_code)
    }
}

/// A Linux box with a terminal and no extra files.
pub struct FakePlatform {
    pub os: OsKind,
    pub kernel: String,
    pub pid: u32,
    pub tty: bool,
    pub files: HashSet<PathBuf>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            os: OsKind::Linux,
            kernel: "6.5.0-21-generic".to_string(),
            pid: 4242,
            tty: true,
            files: HashSet::new(),
        }
    }
}

impl Platform for FakePlatform {
    fn os(&self) -> OsKind {
        self.os
    }

    fn kernel_release(&self) -> String {
        self.kernel.clone()
    }

    fn is_dir(&self, _path: &Path) -> bool {
        false
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn list_dir(&self, _path: &Path) -> Vec<PathBuf> {
        Vec::new()
    }

    fn windows_env(&self, _name: &str) -> Option<String> {
        None
    }

    fn stdout_is_terminal(&self) -> bool {
        self.tty
    }

    fn user_id(&self) -> u32 {
        1000
    }

    fn group_id(&self) -> u32 {
        1000
    }

    fn process_id(&self) -> u32 {
        self.pid
    }

    fn home_dir(&self) -> Option<PathBuf> {
        Some(PathBuf::from("/home/jdoe"))
    }
}
