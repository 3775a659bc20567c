use std::{path::Path, sync::Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use gdrive_backup::{
    drive_store::{error::{Error, Result}, DriveStore, RemoteEntry, FOLDER_MIME_TYPE},
    time_provider::TimeProvider,
};

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    pub is_folder: bool,
    pub contents: Vec<u8>,
}

///
/// A drive kept in memory, recording how many folders it was asked to create
///
#[derive(Default)]
pub struct MemoryStore {
    nodes: Mutex<Vec<Node>>,
    next_id: Mutex<usize>,
    pub folders_created: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self, parent_id: &str) -> Vec<Node> {
        self.nodes.lock().unwrap().iter()
            .filter(|n| n.parent_id == parent_id)
            .cloned()
            .collect()
    }

    pub fn child_named(&self, parent_id: &str, name: &str) -> Option<Node> {
        self.children(parent_id).into_iter().find(|n| n.name == name)
    }

    pub fn folder_count(&self) -> usize {
        self.nodes.lock().unwrap().iter().filter(|n| n.is_folder).count()
    }

    fn insert(&self, name: &str, parent_id: &str, is_folder: bool, contents: Vec<u8>) -> String {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = format!("node-{}", next_id);
        self.nodes.lock().unwrap().push(Node {
            id: id.clone(),
            name: name.to_string(),
            parent_id: parent_id.to_string(),
            is_folder,
            contents,
        });
        id
    }
}

fn to_entry(node: Node) -> RemoteEntry {
    let mime_type = if node.is_folder { FOLDER_MIME_TYPE.to_string() } else { "application/octet-stream".to_string() };
    RemoteEntry { id: node.id, name: node.name, mime_type: Some(mime_type) }
}

#[async_trait]
impl DriveStore for MemoryStore {
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<RemoteEntry>> {
        Ok(self.children(parent_id).into_iter().filter(|n| n.is_folder).map(to_entry).collect())
    }
    async fn find_folders(&self, parent_id: &str, name: &str) -> Result<Vec<RemoteEntry>> {
        Ok(self.children(parent_id).into_iter()
            .filter(|n| n.is_folder && n.name == name)
            .map(to_entry)
            .collect())
    }
    async fn list_children(&self, parent_id: &str) -> Result<Vec<RemoteEntry>> {
        Ok(self.children(parent_id).into_iter().map(to_entry).collect())
    }
    async fn create_folder(&self, name: &str, parent_id: &str) -> Result<String> {
        *self.folders_created.lock().unwrap() += 1;
        Ok(self.insert(name, parent_id, true, vec![]))
    }
    async fn upload_file(&self, path: &Path, name: &str, parent_id: &str) -> Result<String> {
        let contents = tokio::fs::read(path).await?;
        Ok(self.insert(name, parent_id, false, contents))
    }
    async fn delete(&self, id: &str) -> Result<()> {
        let mut nodes = self.nodes.lock().unwrap();
        if !nodes.iter().any(|n| n.id == id) {
            return Err(Error::ApiError { status: 404, message: format!("File not found: {}", id) });
        }
        // removes the entry and everything beneath it
        let mut doomed = vec![id.to_string()];
        while let Some(next) = doomed.pop() {
            doomed.extend(nodes.iter().filter(|n| n.parent_id == next).map(|n| n.id.clone()));
            nodes.retain(|n| n.id != next);
        }
        Ok(())
    }
}

pub struct FixedTimeProvider(pub NaiveDate);

impl TimeProvider for FixedTimeProvider {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
