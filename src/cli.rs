use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// KonexPro Branding - brand a RapidPro installation
#[derive(Parser)]
#[command(name = "konexpro-branding")]
#[command(about = "Apply KonexPro branding to the local RapidPro installation")]
#[command(version)]
pub struct Cli {
    /// Skip the root check (development only; also KONEXPRO_SKIP_ROOT_CHECK=1).
    #[arg(long, global = true)]
    pub skip_root_check: bool,

    /// When settings.py has a start marker but no end marker, discard
    /// everything after the start marker instead of keeping it.
    #[arg(long, global = true)]
    pub truncate_orphaned_block: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply branding (the default when no command is given)
    Apply {
        /// JSON file overriding the built-in brand values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a brand configuration file
    Validate {
        /// Path to brand configuration file to validate
        config: PathBuf,
    },
    /// Print the settings.py branding block without writing anything
    Render {
        /// JSON file overriding the built-in brand values
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
