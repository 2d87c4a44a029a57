//! Static brand asset deployment into RapidPro's `sitestatic` tree.
//!
//! The SVG logo is compiled into the binary and written on every run. The
//! favicon and splash image are copied from the bundled assets directory
//! when present. Nothing in this step is fatal: failures are logged and
//! recorded in the returned [`AssetReport`].

use std::fs::{self, File, FileTimes, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::DeployPaths;

/// The KonexPro wordmark, served as `images/konexpro-logo.svg`
pub const SVG_LOGO: &str = include_str!("../assets/konexpro-logo.svg");

/// Mode applied to every deployed file so nginx can serve it
pub const ASSET_MODE: u32 = 0o644;

/// Outcome of one asset deployment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    /// Files written or copied
    pub deployed: Vec<PathBuf>,
    /// Bundled sources that were not found
    pub skipped: Vec<PathBuf>,
    /// Deployed files whose mode could not be set
    pub permission_failures: Vec<PathBuf>,
    /// Error that stopped the step early, if any
    pub error: Option<String>,
}

impl AssetReport {
    /// True when every asset was deployed with the right mode
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.skipped.is_empty() && self.permission_failures.is_empty()
    }
}

/// Write the logo and copy bundled images. Never returns an error.
pub fn deploy_assets(paths: &DeployPaths) -> AssetReport {
    info!("Deploying static assets...");

    let mut report = AssetReport::default();
    if let Err(e) = try_deploy(paths, &mut report) {
        error!("Asset deployment failed: {}", e);
        report.error = Some(e.to_string());
    }
    report
}

fn try_deploy(paths: &DeployPaths, report: &mut AssetReport) -> io::Result<()> {
    fs::create_dir_all(&paths.static_images)?;
    fs::create_dir_all(&paths.static_brands)?;

    let logo = paths.logo_path();
    fs::write(&logo, SVG_LOGO)?;
    finish_file(&logo, report);
    info!("✓ Created {}", file_label(&logo));

    if !paths.assets_dir.is_dir() {
        debug!("No bundled assets at {}", paths.assets_dir.display());
        return Ok(());
    }

    for (source, dest) in paths.asset_copies() {
        if source.is_file() {
            copy_preserving(&source, &dest)?;
            finish_file(&dest, report);
            info!("✓ Copied {}", file_label(&source));
        } else {
            warn!("Source file {} not found in assets.", file_label(&source));
            report.skipped.push(source);
        }
    }

    Ok(())
}

/// Copy contents, permission bits and access/modification times.
fn copy_preserving(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest)?;

    let meta = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(meta.accessed()?)
        .set_modified(meta.modified()?);
    File::open(dest)?.set_times(times)?;
    Ok(())
}

fn finish_file(path: &Path, report: &mut AssetReport) {
    if let Err(e) = set_perms(path) {
        warn!("Could not set perms on {}: {}", path.display(), e);
        report.permission_failures.push(path.to_path_buf());
    }
    report.deployed.push(path.to_path_buf());
}

fn set_perms(path: &Path) -> io::Result<()> {
    fs::set_permissions(path, Permissions::from_mode(ASSET_MODE))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout_in(dir: &TempDir) -> DeployPaths {
        DeployPaths::for_install_root(dir.path().join("rapidpro"), dir.path().join("branding_assets"))
    }

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_logo_is_svg() {
        assert!(SVG_LOGO.starts_with("<svg"));
        assert!(SVG_LOGO.trim_end().ends_with("</svg>"));
        assert!(SVG_LOGO.contains("xmlns=\"http://www.w3.org/2000/svg\""));
    }

    #[test]
    fn test_logo_only_without_assets_dir() {
        let dir = TempDir::new().unwrap();
        let paths = layout_in(&dir);

        let report = deploy_assets(&paths);

        assert!(report.error.is_none());
        assert_eq!(report.deployed, vec![paths.logo_path()]);
        assert_eq!(fs::read_to_string(paths.logo_path()).unwrap(), SVG_LOGO);
        assert_eq!(mode_of(&paths.logo_path()), 0o644);
        assert!(paths.static_brands.is_dir());
    }

    #[test]
    fn test_all_assets_copied() {
        let dir = TempDir::new().unwrap();
        let paths = layout_in(&dir);
        fs::create_dir_all(&paths.assets_dir).unwrap();
        fs::write(paths.assets_dir.join("favicon.png"), b"fav").unwrap();
        fs::write(paths.assets_dir.join("splash.png"), b"splash").unwrap();

        let report = deploy_assets(&paths);

        assert!(report.is_complete());
        assert_eq!(fs::read(paths.favicon_path()).unwrap(), b"fav");
        assert_eq!(fs::read(paths.splash_path()).unwrap(), b"splash");
        assert_eq!(mode_of(&paths.splash_path()), 0o644);
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let dir = TempDir::new().unwrap();
        let paths = layout_in(&dir);
        fs::create_dir_all(&paths.assets_dir).unwrap();
        let favicon = paths.assets_dir.join("favicon.png");
        fs::write(&favicon, b"fav").unwrap();
        let old = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_600_000_000);
        File::options()
            .write(true)
            .open(&favicon)
            .unwrap()
            .set_modified(old)
            .unwrap();

        deploy_assets(&paths);

        let copied = fs::metadata(paths.favicon_path()).unwrap().modified().unwrap();
        assert_eq!(copied, old);
    }

    #[test]
    fn test_rerun_overwrites_logo() {
        let dir = TempDir::new().unwrap();
        let paths = layout_in(&dir);
        fs::create_dir_all(&paths.static_images).unwrap();
        fs::write(paths.logo_path(), "stale").unwrap();

        deploy_assets(&paths);
        deploy_assets(&paths);

        assert_eq!(fs::read_to_string(paths.logo_path()).unwrap(), SVG_LOGO);
    }

    #[test]
    fn test_unwritable_static_tree_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let paths = layout_in(&dir);
        // A regular file where the sitestatic directory should be
        fs::create_dir_all(&paths.install_root).unwrap();
        fs::write(paths.install_root.join("sitestatic"), "not a dir").unwrap();

        let report = deploy_assets(&paths);

        assert!(report.error.is_some());
        assert!(report.deployed.is_empty());
    }
}
