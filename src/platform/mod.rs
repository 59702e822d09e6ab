// ABOUTME: Host platform detection behind an injectable trait
// Wraps uname, filesystem probes, Windows interop queries and terminal detection

pub mod host_kind;

pub use host_kind::HostKind;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Path to the Windows shell as seen from inside WSL.
pub const WSL_CMD_EXE: &str = "/mnt/c/Windows/System32/cmd.exe";

/// Operating system family reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsKind {
    Linux,
    MacOs,
    Other,
}

impl OsKind {
    /// Map a `uname -s` sysname to an OS family.
    pub fn from_sysname(sysname: &str) -> Self {
        match sysname {
            "Linux" => OsKind::Linux,
            "Darwin" => OsKind::MacOs,
            _ => OsKind::Other,
        }
    }
}

/// Everything the launcher needs to know about the machine it runs on.
///
/// Resolution code only talks to this trait so each platform branch can be
/// exercised without the real OS.
#[cfg_attr(test, mockall::automock)]
pub trait Platform {
    fn os(&self) -> OsKind;

    /// Kernel release string (`uname -r`).
    fn kernel_release(&self) -> String;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// Entries of a directory, sorted. Unreadable directories yield nothing.
    fn list_dir(&self, path: &Path) -> Vec<PathBuf>;

    /// Expand a Windows environment variable through `cmd.exe` (WSL only).
    fn windows_env(&self, name: &str) -> Option<String>;

    fn stdout_is_terminal(&self) -> bool;

    fn user_id(&self) -> u32;

    fn group_id(&self) -> u32;

    fn process_id(&self) -> u32;

    fn home_dir(&self) -> Option<PathBuf>;
}

/// The real machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostPlatform;

impl HostPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for HostPlatform {
    fn os(&self) -> OsKind {
        match nix::sys::utsname::uname() {
            Ok(uts) => OsKind::from_sysname(&uts.sysname().to_string_lossy()),
            Err(e) => {
                debug!("uname failed: {}", e);
                OsKind::Other
            }
        }
    }

    fn kernel_release(&self) -> String {
        nix::sys::utsname::uname()
            .map(|uts| uts.release().to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, path: &Path) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(path) {
            Ok(read_dir) => read_dir.filter_map(|e| e.ok().map(|e| e.path())).collect(),
            Err(_) => return Vec::new(),
        };
        entries.sort();
        entries
    }

    fn windows_env(&self, name: &str) -> Option<String> {
        let output = Command::new(WSL_CMD_EXE)
            .args(["/c", &format!("echo %{name}%")])
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let value = String::from_utf8_lossy(&output.stdout)
            .replace('\r', "")
            .trim()
            .to_string();

        // cmd.exe echoes the literal `%NAME%` when the variable is unset
        if value.is_empty() || value == format!("%{name}%") {
            None
        } else {
            Some(value)
        }
    }

    fn stdout_is_terminal(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    fn user_id(&self) -> u32 {
        nix::unistd::getuid().as_raw()
    }

    fn group_id(&self) -> u32 {
        nix::unistd::getgid().as_raw()
    }

    fn process_id(&self) -> u32 {
        std::process::id()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sysname_mapping() {
        assert_eq!(OsKind::from_sysname("Linux"), OsKind::Linux);
        assert_eq!(OsKind::from_sysname("Darwin"), OsKind::MacOs);
        assert_eq!(OsKind::from_sysname("FreeBSD"), OsKind::Other);
    }

    #[test]
    fn test_host_list_dir_is_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();

        let entries = HostPlatform::new().list_dir(dir.path());
        assert_eq!(entries, vec![dir.path().join("a"), dir.path().join("b")]);
    }

    #[test]
    fn test_host_list_dir_missing_is_empty() {
        let entries = HostPlatform::new().list_dir(Path::new("/definitely/not/here"));
        assert!(entries.is_empty());
    }
}
