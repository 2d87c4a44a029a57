//! Pre-flight sanity checks for the deployment environment
//!
//! This module verifies the host before anything is written:
//! - Running with root privileges (EUID 0)
//! - The RapidPro install root exists
//!
//! A missing bundled-assets directory is only a warning: the run continues
//! and deploys the generated logo alone.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::config::DeployPaths;
use crate::error::{BrandingError, Result};

/// Environment variable that skips the root check (development only)
pub const SKIP_ROOT_ENV: &str = "KONEXPRO_SKIP_ROOT_CHECK";

/// Result of environment verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub is_root: bool,
    pub install_root: PathBuf,
    pub install_root_exists: bool,
    pub assets_dir: PathBuf,
    pub assets_dir_exists: bool,
}

impl EnvironmentReport {
    /// Returns true if all hard requirements are met
    pub fn is_ok(&self) -> bool {
        self.is_root && self.install_root_exists
    }

    /// Turn the first failed requirement into its error
    pub fn ensure_ready(&self) -> Result<()> {
        if !self.is_root {
            return Err(BrandingError::NotRoot);
        }
        if !self.install_root_exists {
            return Err(BrandingError::InstallRootMissing(self.install_root.clone()));
        }
        Ok(())
    }
}

/// Check if running as root (EUID 0)
pub fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Skip root check (for development/testing)
/// Set KONEXPRO_SKIP_ROOT_CHECK=1 to skip
pub fn should_skip_root_check() -> bool {
    std::env::var(SKIP_ROOT_ENV)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// What switched the root check off, if anything
pub fn root_check_skip_source(flag: bool, env_set: bool) -> Option<String> {
    if flag {
        Some("--skip-root-check".to_string())
    } else if env_set {
        Some(format!("{}=1", SKIP_ROOT_ENV))
    } else {
        None
    }
}

/// Privilege observation for this process, honouring the skip switch
pub fn effective_privilege(skip_root: bool) -> bool {
    if let Some(source) = root_check_skip_source(skip_root, should_skip_root_check()) {
        warn!("Root check skipped ({})", source);
        return true;
    }
    is_running_as_root()
}

/// Inspect the layout in `paths`; `is_root` is the caller's privilege observation.
///
/// Never touches the filesystem beyond `exists()` probes.
pub fn verify_environment(paths: &DeployPaths, is_root: bool) -> EnvironmentReport {
    debug!("Verifying environment for {}", paths.install_root.display());

    let report = EnvironmentReport {
        is_root,
        install_root: paths.install_root.clone(),
        install_root_exists: paths.install_root.is_dir(),
        assets_dir: paths.assets_dir.clone(),
        assets_dir_exists: paths.assets_dir.is_dir(),
    };

    if !report.assets_dir_exists {
        warn!(
            "Assets directory not found at {}. Only the SVG logo will be deployed.",
            report.assets_dir.display()
        );
    }

    if report.is_ok() {
        info!("Pre-flight checks passed");
    }

    report
}

/// Print a pretty error message to stderr and exit
pub fn print_error_and_exit(report: &EnvironmentReport) -> ! {
    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════════════╗");
    eprintln!("║              KonexPro Branding - Pre-flight Check Failed         ║");
    eprintln!("╚══════════════════════════════════════════════════════════════════╝");
    eprintln!();

    if !report.is_root {
        eprintln!("❌ ERROR: Root privileges required");
        eprintln!("   Branding writes into the RapidPro tree and restarts its service.");
        eprintln!();
        eprintln!("   Solution: Run with sudo or as root user:");
        eprintln!("     sudo ./konexpro-branding");
        eprintln!();
    }

    if !report.install_root_exists {
        eprintln!("❌ ERROR: RapidPro installation not found");
        eprintln!("   Expected directory: {}", report.install_root.display());
        eprintln!();
    }

    eprintln!("╔══════════════════════════════════════════════════════════════════╗");
    eprintln!("║  Fix the above issues and try again.                             ║");
    eprintln!("╚══════════════════════════════════════════════════════════════════╝");
    eprintln!();

    std::process::exit(1);
}
