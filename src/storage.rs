use crate::error::StorageError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Document-store capability: full-document replace keyed by collection
/// and document key. Assumed safe for concurrent writes to distinct keys.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upsert(&self, collection: &str, key: &str, value: Value) -> Result<(), StorageError>;
}

/// In-memory document store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<(String, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, collection: &str, key: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap()
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn upsert(&self, collection: &str, key: &str, value: Value) -> Result<(), StorageError> {
        self.documents
            .lock()
            .unwrap()
            .insert((collection.to_string(), key.to_string()), value);
        ::log::debug!("stored document {}/{}", collection, key);
        Ok(())
    }
}

/// File-backed document store: one JSON file per document under
/// `<root>/<collection>/<key>.json`.
#[derive(Debug)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Storage for JsonDirStore {
    async fn upsert(&self, collection: &str, key: &str, value: Value) -> Result<(), StorageError> {
        let dir = self.root.join(collection);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("{}.json", sanitize_key(key)));
        let body = serde_json::to_vec_pretty(&value)?;
        tokio::fs::write(&path, body).await?;

        ::log::debug!("wrote document {}", path.display());
        Ok(())
    }
}

/// Document keys become filenames; replace characters that don't belong
/// in one.
fn sanitize_key(key: &str) -> String {
    key.replace(['/', '\\', ':', '?', '&', '=', '#', '%'], "_")
}
