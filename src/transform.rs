//! Per-item transformation: pull the raw file down, rewrite its container
//! metadata with the transcoding tool, leave the finished copy in staging.
//!
//! The rewrite is a pure stream copy. No media data is re-encoded; only the
//! container-level and per-stream title fields change.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::fs;
use tokio::process::Command;
use tracing::{error, info};

use crate::contract::{RemoteItem, RemoteStore};
use crate::error::PipelineError;
use crate::workspace::Workspace;

/// Stream slots covered by the fixed title-directive battery. The tool
/// ignores directives addressing slots a given file does not have, so the
/// battery stays fixed instead of probing stream counts per file.
pub const AUDIO_STREAM_SLOTS: u32 = 11;
pub const VIDEO_STREAM_SLOTS: u32 = 1;
pub const SUBTITLE_STREAM_SLOTS: u32 = 41;

/// Runs the external transcoding tool to restamp container titles.
pub struct Retitler {
    tool: PathBuf,
}

impl Retitler {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }

    /// Download `item` into the raw scratch area, retitle it into staging,
    /// and return the path of the finished artifact. The raw download is
    /// removed once the tool has succeeded; on failure everything left
    /// behind is scratch for the caller to purge.
    pub async fn process(
        &self,
        store: &dyn RemoteStore,
        item: &RemoteItem,
        workspace: &Workspace,
    ) -> Result<PathBuf, PipelineError> {
        let raw_path = workspace.download_dir.join(&item.name);
        let staged_path = workspace.staging_dir.join(&item.name);

        store
            .download_to(item, &raw_path)
            .await
            .map_err(|e| PipelineError::Download {
                name: item.name.clone(),
                reason: e.to_string(),
            })?;
        println!("Downloaded: {}", item.name);
        info!(file = %item.name, path = %raw_path.display(), "download complete");

        let title = title_for(&item.name);
        let args = retitle_args(&raw_path, &staged_path, &title);
        let status = Command::new(&self.tool)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| PipelineError::Transform {
                name: item.name.clone(),
                reason: format!("failed to launch {}: {e}", self.tool.display()),
            })?;

        if !status.success() {
            error!(file = %item.name, %status, "metadata rewrite failed");
            return Err(PipelineError::Transform {
                name: item.name.clone(),
                reason: format!("tool exited with {status}"),
            });
        }
        println!("Metadata updated: {}", item.name);
        info!(file = %item.name, title = %title, %status, "metadata rewrite succeeded");

        fs::remove_file(&raw_path)
            .await
            .map_err(|source| PipelineError::Io {
                path: raw_path.clone(),
                source,
            })?;

        Ok(staged_path)
    }
}

/// Title stamped on the container and every stream slot: the file name with
/// its final extension removed.
pub fn title_for(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem.to_owned(),
        _ => file_name.to_owned(),
    }
}

/// Build the full tool argument list: stream-copy every input stream, stamp
/// the container title, then address every slot in the fixed battery. The
/// output path comes last.
pub fn retitle_args(input: &Path, output: &Path, title: &str) -> Vec<OsString> {
    let title_value = format!("title={title}");
    let mut args: Vec<OsString> = vec![
        OsString::from("-i"),
        input.as_os_str().to_owned(),
        OsString::from("-map"),
        OsString::from("0"),
        OsString::from("-c"),
        OsString::from("copy"),
        OsString::from("-metadata"),
        OsString::from(&title_value),
    ];
    for index in 0..AUDIO_STREAM_SLOTS {
        args.push(OsString::from(format!("-metadata:s:a:{index}")));
        args.push(OsString::from(&title_value));
    }
    for index in 0..VIDEO_STREAM_SLOTS {
        args.push(OsString::from(format!("-metadata:s:v:{index}")));
        args.push(OsString::from(&title_value));
    }
    for index in 0..SUBTITLE_STREAM_SLOTS {
        args.push(OsString::from(format!("-metadata:s:s:{index}")));
        args.push(OsString::from(&title_value));
    }
    args.push(output.as_os_str().to_owned());
    args
}
