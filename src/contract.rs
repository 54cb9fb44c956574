//! # contract: Universal interface for the remote media store
//!
//! This module defines a single trait (`RemoteStore`) and the concrete
//! supporting types for enumerating, downloading and uploading media files
//! held in a remote folder-structured storage service.
//!
//! ## Interface & Extensibility
//! - Implement the [`RemoteStore`] trait to create new storage clients (e.g. Drive, test fakes).
//! - All methods are async, returning results and using boxed error types.
//! - Error handling is uniform: all service/transport errors return boxed trait objects.
//! - Meant for both production code and robust mocking in tests.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate deterministic mocks for unit/integration tests.

use std::path::Path;

use async_trait::async_trait;

use mockall::{automock, predicate::*};

/// One entry of a remote folder: an opaque service id plus the display name
/// the pipeline keys everything on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
}

impl RemoteItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One page of a folder listing. `next_page_token` carries the continuation
/// handle, absent on the final page.
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<RemoteItem>,
    pub next_page_token: Option<String>,
}

/// Error type for remote store operations (simple boxed error; provider
/// detail stays opaque to the pipeline).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for the remote storage service the pipeline reads from and writes to.
/// The implementor is responsible for authentication and transport.
///
/// The trait is `Send` + `Sync` and intended for async/await usage. It is
/// implemented by the real Drive client and by test fakes/mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one page of the listing of `folder_id`, continuing from
    /// `page_token` when given.
    ///
    /// Implementations must request name-ascending order from the service,
    /// so that repeated full listings of an unchanged folder yield the same
    /// sequence. The pipeline concatenates pages as-is and never re-sorts.
    async fn list_page(
        &self,
        folder_id: &str,
        page_token: Option<String>,
    ) -> Result<ItemPage, StoreError>;

    /// Stream the full byte content of `item` into a new file at `dest`.
    ///
    /// Either the complete file exists at `dest` on return, or an error is
    /// returned; callers treat anything left behind on error as scratch to
    /// be purged.
    async fn download_to(&self, item: &RemoteItem, dest: &Path) -> Result<(), StoreError>;

    /// Upload the file at `local` into `folder_id`, naming the remote entry
    /// after the local file's base name. Returns only once the service has
    /// confirmed the upload.
    async fn upload(&self, folder_id: &str, local: &Path) -> Result<(), StoreError>;
}
