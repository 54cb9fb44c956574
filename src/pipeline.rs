//! High-level pipeline: orchestrates catalog → download → retitle → upload
//! for every configured source folder.
//!
//! This module provides the top-level driver for one invocation. It:
//!   - Purges scratch directories left over from any interrupted run
//!   - Enumerates each source folder through the paginated catalog
//!   - Skips every entry already present in the tracking record
//!   - Pushes each pending item through download, metadata rewrite, upload
//!   - Appends to the tracking record only after a confirmed upload
//!   - Stops cleanly once the wall-clock budget is spent, never mid-item
//!
//! # Major Types
//! - [`RunBudget`]: wall-clock allowance, checked only between items
//! - [`RunReport`]: aggregate counts for audit and tests
//!
//! # Error Handling
//! A listing failure abandons the folder pass and moves to the next folder.
//! A download, rewrite or upload failure abandons that single item. Local
//! state failures (tracking file, scratch cleanup) end the run. In all
//! cases the tracking record only ever grows by confirmed uploads.

use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::catalog;
use crate::config::RunConfig;
use crate::contract::{RemoteItem, RemoteStore};
use crate::error::PipelineError;
use crate::tracking::TrackingFile;
use crate::transform::Retitler;
use crate::upload;
use crate::workspace::Workspace;

/// Wall-clock budget for one invocation. The deadline is fixed at
/// construction; expiry is only ever checked before starting a new item,
/// so an item in flight always runs to completion.
#[derive(Debug, Clone, Copy)]
pub struct RunBudget {
    started: Instant,
    limit: Duration,
}

impl RunBudget {
    pub fn starting_now(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.limit
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

/// Aggregated outcome of one invocation, summed over all folder passes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Entries enumerated across all listed folders.
    pub total: usize,
    /// Entries skipped because their name was already tracked.
    pub skipped: usize,
    /// Items that made it through upload and into the tracking record.
    pub completed: usize,
    /// Items abandoned by a download, rewrite or upload failure.
    pub failed: usize,
    /// True when the run stopped because the budget ran out.
    pub budget_exhausted: bool,
}

/// Run the whole pipeline for `config` against `store`.
pub async fn run(config: &RunConfig, store: &dyn RemoteStore) -> Result<RunReport, PipelineError> {
    Pipeline::new(config, store).run().await
}

struct Pipeline<'a> {
    store: &'a dyn RemoteStore,
    source_folders: Vec<String>,
    dest_folder: String,
    tracking: TrackingFile,
    workspace: Workspace,
    retitler: Retitler,
    budget: RunBudget,
}

impl<'a> Pipeline<'a> {
    fn new(config: &RunConfig, store: &'a dyn RemoteStore) -> Self {
        Self {
            store,
            source_folders: config.source_folders.clone(),
            dest_folder: config.dest_folder.clone(),
            tracking: TrackingFile::new(&config.tracking_file),
            workspace: Workspace::new(&config.download_dir, &config.staging_dir),
            retitler: Retitler::new(&config.ffmpeg),
            budget: RunBudget::starting_now(config.runtime_limit()),
        }
    }

    async fn run(&self) -> Result<RunReport, PipelineError> {
        info!(folders = self.source_folders.len(), "[RUN] Starting pipeline run");

        // Scratch from an interrupted previous run must not survive into
        // this one.
        self.workspace.purge()?;

        let mut report = RunReport::default();
        for folder_id in &self.source_folders {
            match self.process_folder(folder_id, &mut report).await {
                Ok(()) => {}
                Err(PipelineError::Catalog { folder_id, reason }) => {
                    error!(
                        folder_id = %folder_id,
                        reason = %reason,
                        "[RUN][ERROR] Folder listing failed, moving to next folder"
                    );
                    eprintln!("Could not list folder {folder_id}: {reason}");
                }
                Err(other) => return Err(other),
            }
            if report.budget_exhausted {
                break;
            }
        }

        info!(
            total = report.total,
            skipped = report.skipped,
            completed = report.completed,
            failed = report.failed,
            budget_exhausted = report.budget_exhausted,
            "[RUN] Pipeline run finished"
        );
        Ok(report)
    }

    async fn process_folder(
        &self,
        folder_id: &str,
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        let mut tracked = self.tracking.load()?;
        let all_items = catalog::list_folder(self.store, folder_id).await?;
        let folder_total = all_items.len();

        println!("\nTotal files in folder: {folder_total}");
        report.total += folder_total;

        let (skipped, pending): (Vec<RemoteItem>, Vec<RemoteItem>) = all_items
            .into_iter()
            .partition(|item| tracked.contains(&item.name));

        println!("Skipped files ({}):", skipped.len());
        for item in &skipped {
            println!(" - {}", item.name);
        }
        report.skipped += skipped.len();

        println!("\nFiles to process ({}):", pending.len());
        info!(
            folder_id,
            total = folder_total,
            skipped = skipped.len(),
            pending = pending.len(),
            "[RUN] Folder pass planned"
        );

        let pending_count = pending.len();
        for (index, item) in pending.iter().enumerate() {
            if self.budget.expired() {
                println!(
                    "\nRuntime limit of {} reached. Stopping.",
                    describe_limit(self.budget.limit())
                );
                warn!(
                    limit_secs = self.budget.limit().as_secs(),
                    "[RUN] Runtime limit reached, stopping before next item"
                );
                report.budget_exhausted = true;
                return Ok(());
            }

            println!("\nProcessing: {} ({}/{})", item.name, index + 1, pending_count);
            info!(
                file = %item.name,
                position = index + 1,
                pending = pending_count,
                folder_id,
                "[RUN] Processing item"
            );

            self.workspace.ensure()?;
            let outcome = self.process_item(item).await;
            // Purge on every path so nothing in scratch outlives its item.
            self.workspace.purge()?;

            match outcome {
                Ok(()) => {
                    // Keep the in-memory view aligned with the record on disk.
                    tracked.insert(item.name.clone());
                    report.completed += 1;
                }
                Err(e) if e.abandons_item() => {
                    error!(file = %item.name, error = %e, "[RUN][ERROR] Item abandoned");
                    eprintln!("Failed to process {}: {e}", item.name);
                    report.failed += 1;
                }
                Err(fatal) => return Err(fatal),
            }
        }

        println!("\nProcessing complete!");
        Ok(())
    }

    async fn process_item(&self, item: &RemoteItem) -> Result<(), PipelineError> {
        let artifact = self
            .retitler
            .process(self.store, item, &self.workspace)
            .await?;
        upload::publish(self.store, &self.dest_folder, &artifact, &self.tracking).await?;
        Ok(())
    }
}

fn describe_limit(limit: Duration) -> String {
    let secs = limit.as_secs();
    format!("{} hours and {} minutes", secs / 3600, (secs % 3600) / 60)
}
