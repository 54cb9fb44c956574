use std::path::PathBuf;

use thiserror::Error;

/// Failure classes of one pipeline run.
///
/// The stage variants (`Download`, `Transform`, `Upload`) abandon the item
/// they name and let the run continue. `Catalog` aborts the current folder
/// pass. `Io` covers local state the run cannot safely continue without,
/// such as the tracking file, and ends the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("listing folder {folder_id} failed: {reason}")]
    Catalog { folder_id: String, reason: String },
    #[error("download of {name} failed: {reason}")]
    Download { name: String, reason: String },
    #[error("metadata rewrite of {name} failed: {reason}")]
    Transform { name: String, reason: String },
    #[error("upload of {name} failed: {reason}")]
    Upload { name: String, reason: String },
    #[error("io error at {}: {source}", .path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl PipelineError {
    /// True for the per-item stage failures that abandon a single file.
    pub fn abandons_item(&self) -> bool {
        matches!(
            self,
            PipelineError::Download { .. }
                | PipelineError::Transform { .. }
                | PipelineError::Upload { .. }
        )
    }
}
