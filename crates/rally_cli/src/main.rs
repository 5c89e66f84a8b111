//! Rally CLI
//!
//! `rally analyze` runs the full pipeline on a request file, `rally shot`
//! answers a single-shot query, `rally schema` prints the result schema.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rally")]
#[command(version, about = "Badminton rally analysis and shot recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a full rally
    Analyze {
        /// Request JSON file (sessionId, trajectory, optional context)
        #[arg(long)]
        r#in: PathBuf,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,

        /// Seed for reproducible ids
        #[arg(long)]
        seed: Option<u64>,

        /// Config preset: default, aggressive, conservative
        #[arg(long)]
        profile: Option<String>,

        /// Full engine config JSON; overrides --profile
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pretty-print the result
        #[arg(long, default_value = "false")]
        pretty: bool,

        /// Log every pipeline step at debug level
        #[arg(long, default_value = "false")]
        trace: bool,
    },

    /// Recommendations for one shot of a trajectory
    Shot {
        /// Request JSON file (trajectory, shotIndex, optional opponentPosition)
        #[arg(long)]
        r#in: PathBuf,

        /// Seed for reproducible ids
        #[arg(long)]
        seed: Option<u64>,

        /// Config preset: default, aggressive, conservative
        #[arg(long)]
        profile: Option<String>,

        /// Full engine config JSON; overrides --profile
        #[arg(long)]
        config: Option<PathBuf>,

        /// Log every pipeline step at debug level
        #[arg(long, default_value = "false")]
        trace: bool,
    },

    /// Print the JSON Schema of the analysis result
    Schema,
}

impl Commands {
    fn trace(&self) -> bool {
        match self {
            Commands::Analyze { trace, .. } | Commands::Shot { trace, .. } => *trace,
            Commands::Schema => false,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --trace opens up the engine's debug output.
    let default_filter = if cli.command.trace() { "info,rally_core=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze { r#in, out, seed, profile, config, pretty, trace } => {
            let config = rally_cli::load_config(profile.as_deref(), config.as_deref())?;
            tracing::info!(
                input = %r#in.display(),
                version = %config.engine_version,
                "analyzing rally"
            );
            let json =
                rally_cli::run_analyze(&r#in, out.as_deref(), &config, seed, pretty, trace)?;
            if out.is_none() {
                println!("{json}");
            }
        }

        Commands::Shot { r#in, seed, profile, config, trace } => {
            let config = rally_cli::load_config(profile.as_deref(), config.as_deref())?;
            println!("{}", rally_cli::run_shot(&r#in, &config, seed, trace)?);
        }

        Commands::Schema => {
            println!("{}", rally_cli::run_schema()?);
        }
    }

    Ok(())
}
