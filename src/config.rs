use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Static run settings, loaded from the YAML config file. Credentials are
/// never part of this struct; they come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Folder ids whose entries are enumerated and processed, in order.
    pub source_folders: Vec<String>,
    /// Folder id the retitled copies are uploaded into.
    pub dest_folder: String,
    /// Scratch directory raw downloads land in.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    /// Scratch directory retitled copies wait in until uploaded.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Newline-delimited record of file names whose upload has completed.
    #[serde(default = "default_tracking_file")]
    pub tracking_file: PathBuf,
    /// Append-only process log file.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Wall-clock budget for one invocation, in seconds. Checked between
    /// items only; an item in flight always runs to completion.
    #[serde(default = "default_runtime_limit_secs")]
    pub runtime_limit_secs: u64,
    /// Transcoding tool binary. Left as plain `ffmpeg` it resolves via PATH.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("Download")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("MetaUpdate")
}

fn default_tracking_file() -> PathBuf {
    PathBuf::from("uploaded_files.txt")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("app.log")
}

fn default_runtime_limit_secs() -> u64 {
    18_000
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

impl RunConfig {
    pub fn runtime_limit(&self) -> Duration {
        Duration::from_secs(self.runtime_limit_secs)
    }

    pub fn trace_loaded(&self) {
        info!(
            source_folders_count = self.source_folders.len(),
            dest_folder = %self.dest_folder,
            runtime_limit_secs = self.runtime_limit_secs,
            tracking_file = %self.tracking_file.display(),
            "Loaded RunConfig"
        );
        debug!(?self, "RunConfig loaded (full debug)");
    }
}
