//! Fixed deployment layout for the target RapidPro installation.
//!
//! Every location the deployer touches lives in [`DeployPaths`], which is
//! built once at the binary boundary and passed down explicitly. Tests build
//! the same layout under a temporary install root.

use std::path::{Path, PathBuf};

/// Production install root of RapidPro
pub const RAPIDPRO_DIR: &str = "/opt/iiab/rapidpro";

/// systemd unit that serves the RapidPro web application
pub const SERVICE_NAME: &str = "rapidpro-gunicorn";

/// Directory (next to the executable) holding bundled brand images
pub const ASSETS_DIR_NAME: &str = "branding_assets";

/// First line of the branding block in `settings.py`
pub const MARKER_START: &str = "# --- START KONEXPRO BRANDING ---";

/// Last line of the branding block in `settings.py`
pub const MARKER_END: &str = "# --- END KONEXPRO BRANDING ---";

/// Statement a freshly created `settings.py` starts with
pub const SETTINGS_BASELINE: &str = "from temba.settings_common import *";

/// Static asset names, relative to `STATIC_URL` (the `sitestatic` tree).
pub mod layout {
    /// Images directory under `sitestatic`
    pub const IMAGES_DIR: &str = "images";
    /// Brand directory under `sitestatic`
    pub const BRANDS_DIR: &str = "brands/rapidpro";

    pub const LOGO_FILE: &str = "konexpro-logo.svg";
    pub const FAVICON_FILE: &str = "konexpro-favicon.png";
    pub const SPLASH_FILE: &str = "konexpro-splash.png";

    /// Bundled source name for the favicon
    pub const FAVICON_SOURCE: &str = "favicon.png";
    /// Bundled source name for the splash image
    pub const SPLASH_SOURCE: &str = "splash.png";

    /// `STATIC_URL`-relative path of the logo
    pub fn logo_url() -> String {
        format!("{}/{}", IMAGES_DIR, LOGO_FILE)
    }

    /// `STATIC_URL`-relative path of the favicon
    pub fn favicon_url() -> String {
        format!("{}/{}", BRANDS_DIR, FAVICON_FILE)
    }

    /// `STATIC_URL`-relative path of the splash image
    pub fn splash_url() -> String {
        format!("{}/{}", BRANDS_DIR, SPLASH_FILE)
    }
}

/// All filesystem locations and the service name used by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPaths {
    /// RapidPro install root
    pub install_root: PathBuf,
    /// `temba/settings.py` (local overrides, not the vendor `settings_common.py`)
    pub settings_file: PathBuf,
    /// `templates/frame.html`
    pub template_file: PathBuf,
    /// `sitestatic/images`
    pub static_images: PathBuf,
    /// `sitestatic/brands/rapidpro`
    pub static_brands: PathBuf,
    /// Bundled brand images shipped with this tool
    pub assets_dir: PathBuf,
    /// Service restarted at the end of a run
    pub service_name: String,
}

impl DeployPaths {
    /// Derive the full layout from an install root and a bundled-assets directory
    pub fn for_install_root(install_root: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        let install_root = install_root.into();
        let static_root = install_root.join("sitestatic");
        Self {
            settings_file: install_root.join("temba").join("settings.py"),
            template_file: install_root.join("templates").join("frame.html"),
            static_images: static_root.join(layout::IMAGES_DIR),
            static_brands: static_root.join(layout::BRANDS_DIR),
            assets_dir: assets_dir.into(),
            service_name: SERVICE_NAME.to_string(),
            install_root,
        }
    }

    /// Fixed production layout: `/opt/iiab/rapidpro` with assets beside the binary
    pub fn production() -> Self {
        Self::for_install_root(RAPIDPRO_DIR, default_assets_dir())
    }

    pub fn logo_path(&self) -> PathBuf {
        self.static_images.join(layout::LOGO_FILE)
    }

    pub fn favicon_path(&self) -> PathBuf {
        self.static_brands.join(layout::FAVICON_FILE)
    }

    pub fn splash_path(&self) -> PathBuf {
        self.static_brands.join(layout::SPLASH_FILE)
    }

    /// Bundled source file → deployed destination, in copy order
    pub fn asset_copies(&self) -> Vec<(PathBuf, PathBuf)> {
        vec![
            (self.assets_dir.join(layout::FAVICON_SOURCE), self.favicon_path()),
            (self.assets_dir.join(layout::SPLASH_SOURCE), self.splash_path()),
        ]
    }
}

impl Default for DeployPaths {
    fn default() -> Self {
        Self::production()
    }
}

/// `branding_assets/` next to the running executable.
///
/// Falls back to a path relative to the working directory when the
/// executable location cannot be resolved.
fn default_assets_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(ASSETS_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(ASSETS_DIR_NAME))
}
