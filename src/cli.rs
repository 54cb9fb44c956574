use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::drive::DriveClient;
use crate::load_config::load_config;
use crate::logging;
use crate::pipeline;

/// CLI for drive-retitle: restamp container titles on Drive media.
#[derive(Parser)]
#[clap(
    name = "drive-retitle",
    version,
    about = "Retitle media files in Drive folders and republish them to a destination folder"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process every pending file in the configured source folders
    Run {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run { config } => {
            let app = load_config(config)?;
            logging::init(&app.run.log_file)?;
            tracing::info!("trace_initialised");
            app.run.trace_loaded();

            let store = DriveClient::new(app.access_token)
                .map_err(|e| anyhow::anyhow!("Failed to construct Drive client: {e}"))?;

            println!("Processing starting...");
            match pipeline::run(&app.run, &store).await {
                Ok(report) => {
                    println!("Run complete.\nReport:");
                    println!("{report:#?}");
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, "Run failed");
                    eprintln!("[ERROR] Run failed: {e}");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}
