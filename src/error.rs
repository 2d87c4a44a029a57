//! Error handling module for the branding deployer
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Only the fatal paths of a run surface as `BrandingError`; recoverable
//! problems (missing assets, template issues) are logged where they happen.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the branding deployer
#[derive(Error, Debug)]
pub enum BrandingError {
    /// IO errors (settings file, static tree, template)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller is not running with an effective UID of 0
    #[error("This tool must be run as root")]
    NotRoot,

    /// The RapidPro installation root does not exist
    #[error("RapidPro directory not found at {}", .0.display())]
    InstallRootMissing(PathBuf),

    /// Settings override step failed
    #[error("Settings override failed: {0}")]
    Settings(String),

    /// Service manager reported a failed restart
    #[error("Failed to restart service {service}: {reason}")]
    ServiceRestart { service: String, reason: String },
}

/// Result type alias for branding operations
pub type Result<T> = std::result::Result<T, BrandingError>;

impl BrandingError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a settings error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Create a service restart error
    pub fn service_restart(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ServiceRestart {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Process exit status for this error.
    ///
    /// Every fatal path of a run exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
