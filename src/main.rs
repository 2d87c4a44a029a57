//! KonexPro Branding - Main entry point
//!
//! Brands the local RapidPro installation in one privileged, sequential run.

use std::path::Path;

use tracing::{error, info};

use konexpro_branding::cli::{Cli, Commands};
use konexpro_branding::config::DeployPaths;
use konexpro_branding::config_file::BrandConfig;
use konexpro_branding::deployment::Deployment;
use konexpro_branding::logging::init_logger;
use konexpro_branding::sanity;
use konexpro_branding::service::Systemctl;
use konexpro_branding::settings::{render_block, OrphanPolicy};

/// Main application entry point
fn main() {
    init_logger("info");

    let cli = Cli::parse_args();
    let orphan_policy = if cli.truncate_orphaned_block {
        OrphanPolicy::Truncate
    } else {
        OrphanPolicy::PreserveTail
    };

    match cli.command {
        Some(Commands::Validate { config }) => validate_config(&config),
        Some(Commands::Render { config }) => render(config.as_deref()),
        Some(Commands::Apply { config }) => apply(config.as_deref(), cli.skip_root_check, orphan_policy),
        None => apply(None, cli.skip_root_check, orphan_policy),
    }
}

/// Load and validate a brand file, exiting 1 on failure
fn load_brand(path: Option<&Path>) -> BrandConfig {
    match BrandConfig::load_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid brand configuration: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn validate_config(path: &Path) {
    info!("Validating brand configuration: {:?}", path);
    let config = load_brand(Some(path));
    println!("✓ Brand configuration is valid: {}", config.name);
}

fn render(path: Option<&Path>) {
    let config = load_brand(path);
    println!("{}", render_block(&config));
}

fn apply(path: Option<&Path>, skip_root: bool, orphan_policy: OrphanPolicy) {
    let is_root = sanity::effective_privilege(skip_root);
    let deployment = Deployment::new(DeployPaths::production(), load_brand(path), is_root)
        .with_orphan_policy(orphan_policy);

    let report = deployment.verify();
    if !report.is_ok() {
        sanity::print_error_and_exit(&report);
    }

    match deployment.apply_steps(&Systemctl) {
        Ok(summary) => {
            if !summary.assets.is_complete() {
                info!("Some assets were not deployed; see warnings above");
            }
        }
        // The failing step already logged the error
        Err(e) => std::process::exit(e.exit_code()),
    }
}
