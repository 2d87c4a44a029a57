//! Deployment orchestration: the five branding steps in order.
//!
//! ```text
//! verify ──fail──▶ abort (nothing written)
//!   │
//! settings ──error──▶ abort (assets/template/restart skipped)
//!   │
//! assets ─▶ template ─▶ restart ──fail──▶ exit 1 (no rollback)
//! ```
//!
//! Assets and template never fail the run; their problems are logged and
//! surfaced in the [`RunSummary`].

use tracing::{error, info};

use crate::assets::{deploy_assets, AssetReport};
use crate::config::DeployPaths;
use crate::config_file::BrandConfig;
use crate::error::Result;
use crate::sanity::{verify_environment, EnvironmentReport};
use crate::service::{restart_service, ServiceManager};
use crate::settings::{apply_overrides, OrphanPolicy};
use crate::template::{patch_template, TemplateOutcome};

/// One branding run against one installation
#[derive(Debug, Clone)]
pub struct Deployment {
    pub paths: DeployPaths,
    pub config: BrandConfig,
    pub orphan_policy: OrphanPolicy,
    /// Privilege observation made by the caller
    pub is_root: bool,
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub assets: AssetReport,
    pub template: TemplateOutcome,
}

impl Deployment {
    pub fn new(paths: DeployPaths, config: BrandConfig, is_root: bool) -> Self {
        Self {
            paths,
            config,
            orphan_policy: OrphanPolicy::default(),
            is_root,
        }
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Pre-flight report for this deployment's layout and privilege
    pub fn verify(&self) -> EnvironmentReport {
        verify_environment(&self.paths, self.is_root)
    }

    /// Verify, then run every step. Returns the summary only when the
    /// service restarted.
    pub fn run(&self, services: &dyn ServiceManager) -> Result<RunSummary> {
        self.verify().ensure_ready()?;
        self.apply_steps(services)
    }

    /// Steps 2–5, for callers that already checked [`Deployment::verify`].
    pub fn apply_steps(&self, services: &dyn ServiceManager) -> Result<RunSummary> {
        info!("--- Starting {} Branding ---", self.config.name);

        if let Err(e) = apply_overrides(&self.paths.settings_file, &self.config, self.orphan_policy) {
            error!("Branding failed: {}", e);
            return Err(e);
        }

        let assets = deploy_assets(&self.paths);
        let template = patch_template(&self.paths.template_file, &self.config);

        restart_service(services, &self.paths.service_name)?;

        info!("--- Branding Complete ---");
        Ok(RunSummary { assets, template })
    }
}
