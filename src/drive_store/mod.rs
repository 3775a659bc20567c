pub mod error;
pub mod google;

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

#[cfg(test)]
use mockall::automock;

use error::*;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

///
/// The remote storage the backups are written to. Every operation
/// is a single (possibly paged) call against the backing store.
///
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DriveStore : Send + Sync {
    ///
    /// Lists every folder directly under the folder with the given `parent_id`
    ///
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<RemoteEntry>>;
    ///
    /// Lists folders directly under `parent_id` whose name is exactly `name`,
    /// in whatever order the store returns them
    ///
    async fn find_folders(&self, parent_id: &str, name: &str) -> Result<Vec<RemoteEntry>>;
    ///
    /// Lists every entry, folder or file, directly under `parent_id`
    ///
    async fn list_children(&self, parent_id: &str) -> Result<Vec<RemoteEntry>>;
    ///
    /// Creates a folder named `name` under `parent_id`, returning its ID
    ///
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String>;
    ///
    /// Uploads the local file at `path` as a new object named `name` under `parent_id`.
    /// Never replaces an existing object of the same name.
    ///
    async fn upload_file(&self, path: &Path, name: &str, parent_id: &str) -> Result<String>;
    ///
    /// Permanently deletes the entry with the given `id`
    ///
    async fn delete(&self, id: &str) -> Result<()>;
}
