//! Service restart through the host service manager.

use tracing::{error, info};

use crate::command_runner::run_command_safe;
use crate::command_traits::CommandArgs;
use crate::error::{BrandingError, Result};

/// Type-safe arguments for `systemctl restart <service>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartServiceArgs {
    /// systemd unit name (e.g. "rapidpro-gunicorn").
    pub service: String,
}

impl CommandArgs for RestartServiceArgs {
    fn program(&self) -> &'static str {
        "systemctl"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["restart".to_string(), self.service.clone()]
    }
}

/// Something that can restart a named service synchronously
pub trait ServiceManager {
    fn restart(&self, service: &str) -> Result<()>;
}

/// systemd, driven through `systemctl`
#[derive(Debug, Clone, Copy, Default)]
pub struct Systemctl;

impl ServiceManager for Systemctl {
    fn restart(&self, service: &str) -> Result<()> {
        let args = RestartServiceArgs {
            service: service.to_string(),
        };
        let output = run_command_safe(&args)
            .map_err(|e| BrandingError::service_restart(service, format!("{:#}", e)))?;
        output
            .ensure_success("systemctl restart")
            .map_err(|e| BrandingError::service_restart(service, e.to_string()))
    }
}

/// Restart `service`, logging the outcome.
pub fn restart_service(manager: &dyn ServiceManager, service: &str) -> Result<()> {
    info!("Restarting {}...", service);
    match manager.restart(service) {
        Ok(()) => {
            info!("✓ Service restarted successfully.");
            Ok(())
        }
        Err(e) => {
            error!("Failed to restart service: {}", e);
            Err(e)
        }
    }
}
