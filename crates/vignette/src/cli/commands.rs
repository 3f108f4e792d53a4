//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Vignette - quality-gated social carousel generation
#[derive(Parser, Debug)]
#[command(name = "vignette")]
#[command(about = "Quality-gated social carousel generation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one or more carousels for an account
    Generate(GenerateArgs),

    /// List available content formats
    Formats {
        /// Account config TOML, to include its cloned formats
        #[arg(long)]
        account: Option<PathBuf>,
    },
}

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the account config TOML file
    #[arg(long)]
    pub account: PathBuf,

    /// Topic to generate about
    #[arg(long, conflicts_with = "random")]
    pub topic: Option<String>,

    /// Pick a random topic from the account's content pillars
    #[arg(long)]
    pub random: bool,

    /// Format registry name (defaults to config, then topic keywords)
    #[arg(long)]
    pub format: Option<String>,

    /// Number of interior items (5-10)
    #[arg(long, default_value = "5")]
    pub items: usize,

    /// Number of carousels to generate
    #[arg(long, default_value = "1")]
    pub count: usize,

    /// Skip hook scoring and use the simple template strategy
    #[arg(long)]
    pub no_quality_check: bool,
}
