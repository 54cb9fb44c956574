//! Publishing of finished artifacts and completion tracking.
//!
//! Ordering is the whole point of this module: the tracking record is
//! appended strictly after the service confirms the upload. A crash before
//! confirmation leaves the name untracked and the item retries next run; a
//! crash right after the append leaves at worst an orphan local file for
//! the next purge, never a duplicate upload.

use std::path::Path;

use tracing::{error, info, warn};

use crate::contract::RemoteStore;
use crate::error::PipelineError;
use crate::tracking::TrackingFile;

/// Upload the artifact at `local` into `folder_id`, record its name in the
/// tracking file, then drop the local copy. Returns the recorded name.
///
/// A failed upload leaves the tracking file untouched. A failed append
/// after a confirmed upload is not an item-level failure: the run cannot
/// tell later items apart from duplicates any more, so the error propagates
/// and ends the run.
pub async fn publish(
    store: &dyn RemoteStore,
    folder_id: &str,
    local: &Path,
    tracking: &TrackingFile,
) -> Result<String, PipelineError> {
    let name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if let Err(e) = store.upload(folder_id, local).await {
        error!(file = %name, error = %e, "upload failed");
        return Err(PipelineError::Upload {
            name,
            reason: e.to_string(),
        });
    }

    // Record first, report after: a name is only ever announced as
    // uploaded once the tracking file actually contains it.
    tracking.append(&name)?;
    println!("Uploaded: {name}");
    info!(file = %name, folder_id, "upload confirmed and recorded");

    // Artifact already uploaded and recorded; a leftover file is only
    // scratch for the next purge.
    if let Err(e) = std::fs::remove_file(local) {
        warn!(path = %local.display(), error = %e, "could not remove uploaded artifact");
    }

    Ok(name)
}
