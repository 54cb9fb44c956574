//! Google Drive API v3 implementation of the remote store contract.
//!
//! Three endpoints are spoken: the paginated `files` listing (always
//! requested name-ascending), `alt=media` content download (streamed to
//! disk), and the resumable upload handshake (session start, then one PUT
//! of the whole body).

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, LOCATION};
use reqwest::Client;
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::contract::{ItemPage, RemoteItem, RemoteStore, StoreError};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Google Drive upload base URL (resumable sessions)
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Credential-backed Drive session.
pub struct DriveClient {
    http: Client,
    access_token: String,
}

/// Shape of one `files` resource in listing responses.
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

/// Shape of the `files.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilesListResponse {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

impl DriveClient {
    pub fn new(access_token: impl Into<String>) -> Result<Self, StoreError> {
        // No overall request timeout: media downloads may legitimately take
        // a long time. Connection setup is bounded.
        let http = Client::builder()
            .user_agent(concat!("drive-retitle/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            access_token: access_token.into(),
        })
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    fn convert_file(drive_file: DriveFile) -> RemoteItem {
        RemoteItem {
            id: drive_file.id,
            name: drive_file.name,
        }
    }
}

/// Query string for one listing page. Name-ascending order is requested
/// from the service so the full listing of an unchanged folder is stable
/// across runs.
pub fn list_query(folder_id: &str, page_token: Option<&str>) -> Vec<(String, String)> {
    let mut query = vec![
        ("q".to_owned(), format!("'{folder_id}' in parents")),
        ("orderBy".to_owned(), "name".to_owned()),
        (
            "fields".to_owned(),
            "nextPageToken, files(id, name)".to_owned(),
        ),
        ("pageSize".to_owned(), MAX_PAGE_SIZE.to_string()),
    ];
    if let Some(token) = page_token {
        query.push(("pageToken".to_owned(), token.to_owned()));
    }
    query
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn list_page(
        &self,
        folder_id: &str,
        page_token: Option<String>,
    ) -> Result<ItemPage, StoreError> {
        let response = self
            .http
            .get(format!("{DRIVE_API_BASE}/files"))
            .query(&list_query(folder_id, page_token.as_deref()))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?
            .error_for_status()?;

        let parsed: FilesListResponse = response.json().await?;
        debug!(
            folder_id,
            files = parsed.files.len(),
            has_more = parsed.next_page_token.is_some(),
            "listing page fetched"
        );
        Ok(ItemPage {
            items: parsed.files.into_iter().map(Self::convert_file).collect(),
            next_page_token: parsed.next_page_token,
        })
    }

    async fn download_to(&self, item: &RemoteItem, dest: &Path) -> Result<(), StoreError> {
        let response = self
            .http
            .get(format!("{DRIVE_API_BASE}/files/{}", item.id))
            .query(&[("alt", "media")])
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await?
            .error_for_status()?;

        let mut stream = response.bytes_stream();
        let mut file = File::create(dest).await?;
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        debug!(file = %item.name, path = %dest.display(), "content streamed to disk");
        Ok(())
    }

    async fn upload(&self, folder_id: &str, local: &Path) -> Result<(), StoreError> {
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or("local path has no file name")?;
        let size = tokio::fs::metadata(local).await?.len();

        let metadata = serde_json::json!({
            "name": name,
            "parents": [folder_id],
        });
        let session = self
            .http
            .post(format!("{DRIVE_UPLOAD_BASE}/files"))
            .query(&[("uploadType", "resumable")])
            .header(AUTHORIZATION, self.auth_header())
            .header("X-Upload-Content-Length", size)
            .json(&metadata)
            .send()
            .await?
            .error_for_status()?;
        let session_uri = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or("upload session response carried no location header")?
            .to_owned();
        debug!(file = %name, folder_id, "resumable upload session opened");

        let body = reqwest::Body::wrap_stream(ReaderStream::new(File::open(local).await?));
        let response = self
            .http
            .put(session_uri)
            .header(AUTHORIZATION, self.auth_header())
            .header(CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(format!("upload of {name} rejected with status {}", response.status()).into());
        }
        debug!(file = %name, folder_id, "resumable upload completed");
        Ok(())
    }
}
