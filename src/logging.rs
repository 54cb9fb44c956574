//! Process log initialisation.
//!
//! Tracing events go to an append-only log file that accumulates across
//! runs. Console output stays on stdout/stderr: the terminal carries the
//! human-facing progress lines, the log carries the structured history.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Route tracing output to the file at `path`, appending to whatever a
/// previous run left there. `RUST_LOG` overrides the default `info` filter.
pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))?;

    Ok(())
}
