//! Type-safe external command contracts.
//!
//! Every process this tool starts (`systemctl`, `psql`) is described by a
//! struct implementing [`CommandArgs`]. The struct is the single source of
//! truth for the program name, its flags, its environment and its stdin, so
//! call sites never assemble raw argument vectors.

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: executable name resolved through `PATH` (e.g. "systemctl").
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `get_env_vars()`: extra environment variables, empty by default.
/// - `stdin_input()`: text fed on stdin; `None` means stdin is closed.
///
/// # Example
///
/// ```
/// use konexpro_branding::command_traits::CommandArgs;
/// use konexpro_branding::service::RestartServiceArgs;
///
/// let args = RestartServiceArgs {
///     service: "rapidpro-gunicorn".to_string(),
/// };
///
/// assert_eq!(args.program(), "systemctl");
/// assert_eq!(args.to_cli_args(), vec!["restart", "rapidpro-gunicorn"]);
/// ```
pub trait CommandArgs {
    /// Executable name.
    fn program(&self) -> &'static str;

    /// Convert struct fields to CLI arguments.
    fn to_cli_args(&self) -> Vec<String>;

    /// Environment variables the command requires.
    fn get_env_vars(&self) -> Vec<(String, String)> {
        vec![]
    }

    /// Input written to the command's stdin before waiting on it.
    fn stdin_input(&self) -> Option<String> {
        None
    }
}
