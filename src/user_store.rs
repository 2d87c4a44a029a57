//! Admin-account lookup for the `check_superuser` helper.
//!
//! Provisioning runs the helper before creating the Django superuser; it only
//! needs to know whether a user with the configured email already exists.

use anyhow::Result;
use tracing::{debug, warn};

use crate::command_runner::run_command_safe;
use crate::command_traits::CommandArgs;

/// Email of the superuser provisioning wants to create
pub const SUPERUSER_EMAIL_ENV: &str = "DJANGO_SUPERUSER_EMAIL";

/// Database holding RapidPro's tables
pub const DB_NAME_ENV: &str = "RAPIDPRO_DB_NAME";

/// RapidPro's default database name
pub const DEFAULT_DB_NAME: &str = "temba";

/// Token printed when the account exists
pub const EXISTS_TOKEN: &str = "EXISTS";

/// Query run by psql; `:'email'` is expanded by psql as a quoted literal
const LOOKUP_SQL: &str = "SELECT 1 FROM auth_user WHERE email = :'email' LIMIT 1;\n";

/// Type-safe arguments for the `psql` user lookup.
///
/// The SQL goes in on stdin because psql only interpolates variables in
/// script input, never in `-c` commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLookupArgs {
    pub email: String,
    pub database: String,
}

impl CommandArgs for UserLookupArgs {
    fn program(&self) -> &'static str {
        "psql"
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-X".to_string(),
            "-q".to_string(),
            "-t".to_string(),
            "-A".to_string(),
            "-v".to_string(),
            "ON_ERROR_STOP=1".to_string(),
            "-v".to_string(),
            format!("email={}", self.email),
            "-d".to_string(),
            self.database.clone(),
        ]
    }

    fn stdin_input(&self) -> Option<String> {
        Some(LOOKUP_SQL.to_string())
    }
}

/// Read access to the application's users
pub trait UserStore {
    fn exists_with_email(&self, email: &str) -> Result<bool>;
}

/// RapidPro's PostgreSQL database, queried through `psql`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsqlUserStore {
    pub database: String,
}

impl PsqlUserStore {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
        }
    }

    /// Database from `RAPIDPRO_DB_NAME`, defaulting to `temba`
    pub fn from_env() -> Self {
        let database = std::env::var(DB_NAME_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        Self::new(database)
    }
}

impl UserStore for PsqlUserStore {
    fn exists_with_email(&self, email: &str) -> Result<bool> {
        let args = UserLookupArgs {
            email: email.to_string(),
            database: self.database.clone(),
        };
        let output = run_command_safe(&args)?;
        output.ensure_success("psql user lookup")?;
        Ok(output.stdout.lines().any(|line| line.trim() == "1"))
    }
}

/// Whether a user with `email` exists. An unset email or a failed lookup
/// counts as "no".
pub fn check_superuser(store: &dyn UserStore, email: Option<&str>) -> bool {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        debug!("{} is not set", SUPERUSER_EMAIL_ENV);
        return false;
    };

    match store.exists_with_email(email) {
        Ok(found) => found,
        Err(e) => {
            warn!("User lookup failed: {:#}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStore(&'static [&'static str]);

    impl UserStore for FixedStore {
        fn exists_with_email(&self, email: &str) -> Result<bool> {
            Ok(self.0.iter().any(|known| *known == email))
        }
    }

    struct BrokenStore;

    impl UserStore for BrokenStore {
        fn exists_with_email(&self, _email: &str) -> Result<bool> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_lookup_args_bind_email_as_variable() {
        let args = UserLookupArgs {
            email: "admin@lrn2.org'; DROP TABLE auth_user; --".to_string(),
            database: "temba".to_string(),
        };
        let cli = args.to_cli_args();
        assert_eq!(args.program(), "psql");
        assert!(cli.contains(&"email=admin@lrn2.org'; DROP TABLE auth_user; --".to_string()));
        assert!(cli.ends_with(&["-d".to_string(), "temba".to_string()]));

        let sql = args.stdin_input().unwrap();
        assert!(sql.contains(":'email'"));
        assert!(!sql.contains("admin@lrn2.org"));
    }

    #[test]
    fn test_check_superuser_found() {
        let store = FixedStore(&["admin@lrn2.org"]);
        assert!(check_superuser(&store, Some("admin@lrn2.org")));
        assert!(!check_superuser(&store, Some("other@lrn2.org")));
    }

    #[test]
    fn test_check_superuser_unset_email() {
        let store = FixedStore(&[""]);
        assert!(!check_superuser(&store, None));
        assert!(!check_superuser(&store, Some("   ")));
    }

    #[test]
    fn test_check_superuser_lookup_error_is_no() {
        assert!(!check_superuser(&BrokenStore, Some("admin@lrn2.org")));
    }

    #[test]
    fn test_store_database_name() {
        assert_eq!(PsqlUserStore::new("rapidpro").database, "rapidpro");
    }
}
