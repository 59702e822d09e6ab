// ABOUTME: Per-host strategy for home mounts, DNS override and SSH agent forwarding
// Chooses the Linux, WSL, macOS or generic behaviour from the detected platform

use super::{OsKind, Platform};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

lazy_static! {
    // Only WSL1 kernels ("...-Microsoft") need the Windows-side home path;
    // WSL2 ("...-microsoft-standard-WSL2") mounts $HOME like plain Linux
    static ref WSL_KERNEL: Regex = Regex::new(r"Microsoft$")
        .expect("valid WSL kernel pattern");
}

/// Ubuntu distribution package folders start with this prefix.
const UBUNTU_PACKAGE_PREFIX: &str = "CanonicalGroupLimited.Ubuntu";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    Linux,
    /// Linux under WSL1; the docker daemon lives on the Windows side
    Wsl,
    MacOs,
    Other,
}

impl HostKind {
    pub fn detect<P: Platform + ?Sized>(platform: &P) -> Self {
        match platform.os() {
            OsKind::Linux if WSL_KERNEL.is_match(&platform.kernel_release()) => HostKind::Wsl,
            OsKind::Linux => HostKind::Linux,
            OsKind::MacOs => HostKind::MacOs,
            OsKind::Other => HostKind::Other,
        }
    }

    /// SSH agent sockets can only be bind-mounted from Linux kernels.
    pub fn forwards_ssh_agent(self) -> bool {
        matches!(self, HostKind::Linux | HostKind::Wsl)
    }

    /// DNS server to force on the container, if this host needs one.
    ///
    /// Docker for Mac containers fail to resolve names without an explicit
    /// server (docker/docker#24344).
    pub fn dns_override(self, dns: &str) -> Option<String> {
        match self {
            HostKind::MacOs => Some(dns.to_string()),
            _ => None,
        }
    }

    /// Host-side path of `home` as the docker daemon sees it.
    ///
    /// Returns `None` only on WSL when neither the legacy `lxss` layout nor an
    /// Ubuntu store package can be found.
    pub fn home_mount_source<P: Platform + ?Sized>(self, platform: &P, home: &str) -> Option<String> {
        match self {
            HostKind::Wsl => wsl_home(platform, home),
            _ => Some(home.to_string()),
        }
    }
}

fn wsl_home<P: Platform + ?Sized>(platform: &P, home: &str) -> Option<String> {
    let user = platform.windows_env("USERNAME")?;
    let local_app_data = platform.windows_env("LOCALAPPDATA")?.replace('\\', "/");
    let user_local = PathBuf::from(format!("/mnt/c/Users/{user}/AppData/Local"));

    if platform.is_dir(&user_local.join("lxss")) {
        debug!("WSL legacy lxss layout found for {}", user);
        return Some(format!("{local_app_data}/lxss{home}"));
    }

    let package = platform
        .list_dir(&user_local.join("Packages"))
        .into_iter()
        .filter(|p| platform.is_dir(p))
        .find_map(|p| package_name(&p).filter(|n| n.starts_with(UBUNTU_PACKAGE_PREFIX)))?;

    debug!("WSL store package {} found for {}", package, user);
    Some(format!(
        "{local_app_data}/Packages/{package}/LocalState/rootfs{home}"
    ))
}

fn package_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    fn linux_with_kernel(release: &'static str) -> MockPlatform {
        let mut platform = MockPlatform::new();
        platform.expect_os().return_const(OsKind::Linux);
        platform
            .expect_kernel_release()
            .returning(move || release.to_string());
        platform
    }

    fn wsl_user(platform: &mut MockPlatform) {
        platform
            .expect_windows_env()
            .with(eq("USERNAME"))
            .returning(|_| Some("jdoe".to_string()));
        platform
            .expect_windows_env()
            .with(eq("LOCALAPPDATA"))
            .returning(|_| Some("C:\\Users\\jdoe\\AppData\\Local".to_string()));
    }

    #[test]
    fn test_detect_plain_linux() {
        let platform = linux_with_kernel("6.5.0-21-generic");
        assert_eq!(HostKind::detect(&platform), HostKind::Linux);
    }

    #[test]
    fn test_detect_wsl1_only() {
        let wsl1 = linux_with_kernel("4.4.0-19041-Microsoft");
        assert_eq!(HostKind::detect(&wsl1), HostKind::Wsl);

        let wsl2 = linux_with_kernel("5.15.133.1-microsoft-standard-WSL2");
        assert_eq!(HostKind::detect(&wsl2), HostKind::Linux);
    }

    #[test]
    fn test_detect_macos() {
        let mut platform = MockPlatform::new();
        platform.expect_os().return_const(OsKind::MacOs);
        assert_eq!(HostKind::detect(&platform), HostKind::MacOs);
    }

    #[test]
    fn test_dns_override_only_on_macos() {
        assert_eq!(HostKind::MacOs.dns_override("1.1.1.1"), Some("1.1.1.1".to_string()));
        assert_eq!(HostKind::Linux.dns_override("1.1.1.1"), None);
        assert_eq!(HostKind::Wsl.dns_override("1.1.1.1"), None);
    }

    #[test]
    fn test_ssh_forwarding_only_on_linux_kernels() {
        assert!(HostKind::Linux.forwards_ssh_agent());
        assert!(HostKind::Wsl.forwards_ssh_agent());
        assert!(!HostKind::MacOs.forwards_ssh_agent());
        assert!(!HostKind::Other.forwards_ssh_agent());
    }

    #[test]
    fn test_non_wsl_home_is_unchanged() {
        let platform = MockPlatform::new();
        assert_eq!(
            HostKind::Linux.home_mount_source(&platform, "/home/jdoe"),
            Some("/home/jdoe".to_string())
        );
    }

    #[test]
    fn test_wsl_legacy_lxss_layout() {
        let mut platform = MockPlatform::new();
        wsl_user(&mut platform);
        platform
            .expect_is_dir()
            .with(eq(PathBuf::from("/mnt/c/Users/jdoe/AppData/Local/lxss")))
            .return_const(true);

        assert_eq!(
            HostKind::Wsl.home_mount_source(&platform, "/home/jdoe"),
            Some("C:/Users/jdoe/AppData/Local/lxss/home/jdoe".to_string())
        );
    }

    #[test]
    fn test_wsl_store_package_layout() {
        let mut platform = MockPlatform::new();
        wsl_user(&mut platform);
        platform.expect_is_dir().returning(|p: &Path| {
            p != Path::new("/mnt/c/Users/jdoe/AppData/Local/lxss")
        });
        platform.expect_list_dir().returning(|_| {
            vec![
                PathBuf::from("/mnt/c/Users/jdoe/AppData/Local/Packages/Microsoft.Photos"),
                PathBuf::from(
                    "/mnt/c/Users/jdoe/AppData/Local/Packages/CanonicalGroupLimited.Ubuntu22.04LTS_79rhkp1fndgsc",
                ),
            ]
        });

        assert_eq!(
            HostKind::Wsl.home_mount_source(&platform, "/home/jdoe"),
            Some(
                "C:/Users/jdoe/AppData/Local/Packages/CanonicalGroupLimited.Ubuntu22.04LTS_79rhkp1fndgsc/LocalState/rootfs/home/jdoe"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_wsl_without_known_layout_is_unresolved() {
        let mut platform = MockPlatform::new();
        wsl_user(&mut platform);
        platform.expect_is_dir().return_const(false);
        platform.expect_list_dir().returning(|_| Vec::new());

        assert_eq!(HostKind::Wsl.home_mount_source(&platform, "/home/jdoe"), None);
    }

    #[test]
    fn test_wsl_without_windows_user_is_unresolved() {
        let mut platform = MockPlatform::new();
        platform.expect_windows_env().returning(|_| None);

        assert_eq!(HostKind::Wsl.home_mount_source(&platform, "/home/jdoe"), None);
    }
}
