//! KonexPro Branding Library
//!
//! This library provides the branding steps applied to a RapidPro
//! installation: environment verification, settings overrides, static
//! assets, template fixes and the service restart.

pub mod assets;
pub mod cli;
pub mod command_runner;
pub mod command_traits;
pub mod config;
pub mod config_file;
pub mod deployment;
pub mod error;
pub mod logging;
pub mod sanity;
pub mod service;
pub mod settings;
pub mod template;
pub mod types;
pub mod user_store;

// Re-export main types for convenience
pub use assets::{deploy_assets, AssetReport};
pub use command_runner::{run_command_safe, CommandOutput};
pub use command_traits::CommandArgs;
pub use config::DeployPaths;
pub use config_file::BrandConfig;
pub use deployment::{Deployment, RunSummary};
pub use error::BrandingError;
pub use sanity::{verify_environment, EnvironmentReport};
pub use service::{restart_service, ServiceManager, Systemctl};
pub use settings::{apply_overrides, render_block, replace_or_append_block, OrphanPolicy};
pub use template::{apply_fix_if_needed, patch_template, TemplateOutcome};
pub use types::Feature;
pub use user_store::{check_superuser, PsqlUserStore, UserStore};
