//! Folder enumeration over the remote store's paginated listing.

use tracing::{debug, info};

use crate::contract::{RemoteItem, RemoteStore};
use crate::error::PipelineError;

/// Collect every entry of `folder_id`, following the continuation token
/// until the final page.
///
/// Pages are concatenated in the order received. The store contract already
/// guarantees name-ascending order within the full listing, so no re-sort
/// happens here and an unchanged folder enumerates identically across runs.
pub async fn list_folder(
    store: &dyn RemoteStore,
    folder_id: &str,
) -> Result<Vec<RemoteItem>, PipelineError> {
    let mut items: Vec<RemoteItem> = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let page = store
            .list_page(folder_id, page_token.take())
            .await
            .map_err(|e| PipelineError::Catalog {
                folder_id: folder_id.to_owned(),
                reason: e.to_string(),
            })?;
        debug!(folder_id, page_items = page.items.len(), "fetched listing page");
        items.extend(page.items);
        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    info!(folder_id, total = items.len(), "folder listing complete");
    Ok(items)
}
