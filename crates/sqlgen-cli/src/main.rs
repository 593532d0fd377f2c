//! sqlgen CLI - Generate and check SQL teaching exercises

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, generate, misconceptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqlgen")]
#[command(about = "Constraint-driven generation of SQL exercises", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known misconceptions, or show one profile
    Misconceptions(misconceptions::MisconceptionsArgs),

    /// Validate SQL files against misconception profiles or a constraint file
    Check(check::CheckArgs),

    /// Generate a dataset and one exercise per misconception pick
    Generate(generate::GenerateArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Misconceptions(args) => misconceptions::run(args),
        Commands::Check(args) => check::run(args),
        Commands::Generate(args) => generate::run(args),
    }
}
