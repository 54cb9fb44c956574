//! Durable record of which file names have completed the full pipeline.
//!
//! The record is a plain newline-delimited text file. Membership is what
//! matters; line order carries no meaning. Completed names are appended one
//! at a time so that earlier entries are never rewritten on the hot path.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct TrackingFile {
    path: PathBuf,
}

impl TrackingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every recorded name into a set. A missing file is a valid empty
    /// state, not an error.
    pub fn load(&self) -> Result<HashSet<String>, PipelineError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no tracking file yet, starting empty");
            return Ok(HashSet::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| PipelineError::Io {
            path: self.path.clone(),
            source,
        })?;
        let names: HashSet<String> = contents
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        info!(path = %self.path.display(), count = names.len(), "loaded tracking file");
        Ok(names)
    }

    /// Durably add one name without touching prior entries. Creates the file
    /// on first use.
    pub fn append(&self, name: &str) -> Result<(), PipelineError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| PipelineError::Io {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{name}").map_err(|source| PipelineError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), name, "recorded completed upload");
        Ok(())
    }

    /// Rewrite the whole record from an in-memory set. Bulk recovery path;
    /// normal operation only ever appends.
    pub fn save(&self, names: &HashSet<String>) -> Result<(), PipelineError> {
        let mut file = fs::File::create(&self.path).map_err(|source| PipelineError::Io {
            path: self.path.clone(),
            source,
        })?;
        for name in names {
            writeln!(file, "{name}").map_err(|source| PipelineError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        info!(path = %self.path.display(), count = names.len(), "rewrote tracking file");
        Ok(())
    }
}
