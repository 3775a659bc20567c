pub mod error;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use async_recursion::async_recursion;
use serde::Deserialize;

use error::*;

use crate::{drive_store::DriveStore, folder_resolver::resolve_or_create};

///
/// What to do with a directory found inside a backup target
///
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SubdirectoryPolicy {
    /// Leave it out of the backup and log a warning
    #[default]
    Skip,
    /// Mirror it as a same-named remote folder and upload its contents
    Recurse,
}

struct LocalEntry {
    name: OsString,
    path: PathBuf,
}

///
/// Uploads every file directly inside `local_path` to the remote folder `folder_id`,
/// in file name order. Returns the number of files uploaded.
///
/// The first failed upload aborts the rest of the directory. Entries that
/// cannot be uploaded as-is (non-UTF-8 names, broken links, sockets and the
/// like) are skipped with a warning.
///
#[async_recursion]
pub async fn upload_directory(
    store: &dyn DriveStore,
    local_path: &Path,
    folder_id: &str,
    subdirectories: SubdirectoryPolicy,
) -> Result<usize> {
    let mut uploaded = 0;

    for entry in list_entries(local_path).await? {
        let Some(name) = entry.name.to_str() else {
            tracing::warn!(path = %entry.path.display(), "skipping entry whose name is not valid UTF-8");
            continue;
        };

        // follows symlinks, so a linked directory is treated as a directory
        let metadata = match tokio::fs::metadata(&entry.path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %entry.path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if metadata.is_dir() {
            match subdirectories {
                SubdirectoryPolicy::Skip => {
                    tracing::warn!(path = %entry.path.display(), "skipping nested directory");
                }
                SubdirectoryPolicy::Recurse => {
                    let sub_folder_id = resolve_or_create(store, name, folder_id).await?;
                    uploaded += upload_directory(store, &entry.path, &sub_folder_id, subdirectories).await?;
                }
            }
            continue;
        }
        if !metadata.is_file() {
            tracing::warn!(path = %entry.path.display(), "skipping entry that is not a regular file");
            continue;
        }

        store.upload_file(&entry.path, name, folder_id).await?;
        tracing::debug!(file = %entry.path.display(), "uploaded");
        uploaded += 1;
    }

    Ok(uploaded)
}

async fn list_entries(local_path: &Path) -> Result<Vec<LocalEntry>> {
    if !tokio::fs::metadata(local_path).await?.is_dir() {
        return Err(Error::NotADirectory(local_path.to_path_buf()));
    }

    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(local_path).await?;
    while let Some(entry) = dir.next_entry().await? {
        entries.push(LocalEntry { name: entry.file_name(), path: entry.path() });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(entries)
}
