//! Vignette CLI binary.
//!
//! Command-line access to carousel generation:
//! - Generate one or more carousels for an account
//! - List registered content formats

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, list_formats, run_generate};

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over the -v flag when set.
    let default_directive = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Generate(args) => {
            let failures = run_generate(args).await?;
            if failures > 0 {
                std::process::exit(1);
            }
        }

        Commands::Formats { account } => {
            list_formats(account.as_deref())?;
        }
    }

    Ok(())
}
