use crate::drive_store::{error::*, DriveStore};

///
/// Returns the ID of the folder named `name` directly under `parent_id`,
/// creating it if no such folder exists. If duplicates exist, the first
/// one the store returns wins.
///
pub async fn resolve_or_create(store: &dyn DriveStore, name: &str, parent_id: &str) -> Result<String> {
    if name.is_empty() { return Err(Error::EmptyArgument("name")); }
    if parent_id.is_empty() { return Err(Error::EmptyArgument("parent_id")); }

    if let Some(folder) = store.find_folders(parent_id, name).await?.into_iter().next() {
        tracing::debug!(name, id = %folder.id, "reusing existing folder");
        return Ok(folder.id);
    }

    let id = store.create_folder(name, parent_id).await?;
    tracing::info!(name, %id, "created folder");
    Ok(id)
}
