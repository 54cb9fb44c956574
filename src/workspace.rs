//! Scratch directories for the item currently in flight.
//!
//! Raw downloads land in one directory, retitled copies in another. Neither
//! holds anything worth keeping between items: the pipeline purges both
//! before the first item and again after every item, whatever the outcome.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct Workspace {
    pub download_dir: PathBuf,
    pub staging_dir: PathBuf,
}

impl Workspace {
    pub fn new(download_dir: impl Into<PathBuf>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            staging_dir: staging_dir.into(),
        }
    }

    /// Create both scratch directories if absent.
    pub fn ensure(&self) -> Result<(), PipelineError> {
        for dir in [&self.download_dir, &self.staging_dir] {
            fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Recursively delete both scratch directories and everything in them.
    /// Directories that do not exist are already in the desired state.
    pub fn purge(&self) -> Result<(), PipelineError> {
        for dir in [&self.download_dir, &self.staging_dir] {
            match fs::remove_dir_all(dir) {
                Ok(()) => debug!(path = %dir.display(), "removed scratch directory"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(PipelineError::Io {
                        path: dir.clone(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }
}
