use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::RunConfig;

/// Everything one run needs: static settings plus env-supplied credentials.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub run: RunConfig,
    pub access_token: String,
}

/// Loads a static YAML config file (no secrets) and injects required env vars for secrets.
/// Returns a fully merged AppConfig or an error.
///
/// Runs before logging is up (the log file path is itself a config field),
/// so failures here reach stderr only.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();

    let config_content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read config file {path_ref:?}"))?;

    let run: RunConfig =
        serde_yaml::from_str(&config_content).context("Failed to parse config YAML")?;

    if run.source_folders.is_empty() {
        anyhow::bail!("Config lists no source folders");
    }

    let access_token = std::env::var("DRIVE_ACCESS_TOKEN")
        .context("DRIVE_ACCESS_TOKEN environment variable not set")?;

    Ok(AppConfig { run, access_token })
}
