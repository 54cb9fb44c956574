use anyhow::Result;
use clap::Parser;

use drive_retitle::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    run(cli).await
}
