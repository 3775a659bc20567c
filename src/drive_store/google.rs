use std::path::Path;

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use reqwest::{header::{CONTENT_LENGTH, CONTENT_TYPE}, Body, Client};
use serde::Deserialize;
use serde_json::json;
use tokio_util::{bytes::Bytes, io::ReaderStream};

use super::{error::*, DriveStore, RemoteEntry, FOLDER_MIME_TYPE};
use crate::http::check_status;

const GOOGLE_APIS: &str = "https://www.googleapis.com";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const PAGE_SIZE: &str = "1000";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteEntry>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

///
/// `DriveStore` backed by the Google Drive v3 REST API, authorized
/// with a bearer token obtained up front.
///
pub struct GoogleDriveStore {
    client: Client,
    access_token: String,
    api_base: String,
    upload_base: String,
}

impl GoogleDriveStore {
    pub fn new(client: Client, access_token: String) -> Self {
        Self::with_base_url(client, access_token, GOOGLE_APIS)
    }

    ///
    /// Same as `new`, but sends every request to `base_url` (no trailing slash)
    /// instead of the public Google endpoint
    ///
    pub fn with_base_url(client: Client, access_token: String, base_url: &str) -> Self {
        Self {
            client,
            access_token,
            api_base: format!("{}/drive/v3", base_url),
            upload_base: format!("{}/upload/drive/v3", base_url),
        }
    }

    ///
    /// Runs a `files.list` query, following page tokens until every match is collected
    ///
    async fn list(&self, query: &str) -> Result<Vec<RemoteEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self.client.get(format!("{}/files", self.api_base))
                .bearer_auth(&self.access_token)
                .query(&[("q", query), ("fields", LIST_FIELDS), ("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = check_status(req.send().await?).await?.json().await?;
            entries.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(query, found = entries.len(), "listed drive entries");
        Ok(entries)
    }
}

#[async_trait]
impl DriveStore for GoogleDriveStore {
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<RemoteEntry>> {
        self.list(&folders_query(parent_id)).await
    }
    async fn find_folders(&self, parent_id: &str, name: &str) -> Result<Vec<RemoteEntry>> {
        let query = format!("{} and name = {}", folders_query(parent_id), quote(name));
        self.list(&query).await
    }
    async fn list_children(&self, parent_id: &str) -> Result<Vec<RemoteEntry>> {
        let query = format!("{} in parents and trashed = false", quote(parent_id));
        self.list(&query).await
    }
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String> {
        let res = self.client.post(format!("{}/files", self.api_base))
            .bearer_auth(&self.access_token)
            .query(&[("fields", "id")])
            .json(&json!({
                "name": name,
                "mimeType": FOLDER_MIME_TYPE,
                "parents": [parent_id],
            }))
            .send().await?;

        let created: CreatedFile = check_status(res).await?.json().await?;
        tracing::debug!(name, parent_id, id = %created.id, "created drive folder");
        Ok(created.id)
    }
    async fn upload_file(&self, path: &Path, name: &str, parent_id: &str) -> Result<String> {
        let file = tokio::fs::File::open(path).await?;
        let file_len = file.metadata().await?.len();

        let media_type = media_type(path);
        let boundary = format!("backup_boundary_{:016x}", rand::random::<u64>());
        let metadata = serde_json::to_string(&json!({ "name": name, "mimeType": media_type, "parents": [parent_id] }))?;
        let (head, tail) = multipart_envelope(&boundary, &metadata, &media_type);
        let (head, tail) = (Bytes::from(head), Bytes::from(tail));
        let content_length = head.len() as u64 + file_len + tail.len() as u64;

        // metadata part, then the file contents streamed from disk, then the closing boundary
        let body = stream::iter([Ok::<_, std::io::Error>(head)])
            .chain(ReaderStream::new(file))
            .chain(stream::iter([Ok(tail)]));

        let res = self.client.post(format!("{}/files", self.upload_base))
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(CONTENT_TYPE, format!("multipart/related; boundary={}", boundary))
            .header(CONTENT_LENGTH, content_length)
            .body(Body::wrap_stream(body))
            .send().await?;

        let created: CreatedFile = check_status(res).await?.json().await?;
        tracing::debug!(name, parent_id, media_type = %media_type, bytes = file_len, "uploaded file");
        Ok(created.id)
    }
    async fn delete(&self, id: &str) -> Result<()> {
        let res = self.client.delete(format!("{}/files/{}", self.api_base, id))
            .bearer_auth(&self.access_token)
            .send().await?;
        check_status(res).await?;
        Ok(())
    }
}

fn folders_query(parent_id: &str) -> String {
    format!(
        "{} in parents and mimeType = {} and trashed = false",
        quote(parent_id), quote(FOLDER_MIME_TYPE)
    )
}

///
/// Wraps `value` as a single-quoted Drive query literal
///
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

///
/// Media type guessed from the file extension, `application/octet-stream` when unknown
///
fn media_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string()
}

///
/// The parts of a `multipart/related` upload body surrounding the file contents
///
fn multipart_envelope(boundary: &str, metadata: &str, media_type: &str) -> (String, String) {
    let head = format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: {t}\r\n\r\n",
        b = boundary, m = metadata, t = media_type
    );
    let tail = format!("\r\n--{}--\r\n", boundary);
    (head, tail)
}
