use super::{BlobStore, DocumentStore, ProgressSender, UploadProgress};
use crate::error::{PantryError, Result};
use crate::model::{Document, FieldPatch, ItemFields, PendingUpload};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// One call made against a fake store, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Get(String),
    Set(String),
    Merge(String),
    Delete(String),
    Upload(String),
    DownloadUrl(String),
}

impl StoreOp {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            StoreOp::Set(_) | StoreOp::Merge(_) | StoreOp::Delete(_) | StoreOp::Upload(_)
        )
    }
}

/// In-memory document collection for testing.
///
/// Ordered by id so scans are deterministic.
#[derive(Default)]
pub struct InMemoryDocuments {
    docs: RwLock<BTreeMap<String, ItemFields>>,
    ops: RwLock<Vec<StoreOp>>,
    simulate_write_error: AtomicBool,
}

impl InMemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Seed a document without recording an operation.
    pub async fn insert(&self, id: &str, fields: ItemFields) {
        self.docs.write().await.insert(id.to_string(), fields);
    }

    /// Current fields of a document, bypassing the operation log.
    pub async fn peek(&self, id: &str) -> Option<ItemFields> {
        self.docs.read().await.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn ops(&self) -> Vec<StoreOp> {
        self.ops.read().await.clone()
    }

    pub async fn clear_ops(&self) {
        self.ops.write().await.clear();
    }

    async fn record(&self, op: StoreOp) {
        self.ops.write().await.push(op);
    }

    fn check_write(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(PantryError::Backend {
                status: 503,
                message: "Simulated write error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocuments {
    async fn list(&self) -> Result<Vec<Document>> {
        self.record(StoreOp::List).await;
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ItemFields>> {
        self.record(StoreOp::Get(id.to_string())).await;
        Ok(self.docs.read().await.get(id).cloned())
    }

    async fn set(&self, id: &str, fields: &ItemFields) -> Result<()> {
        self.record(StoreOp::Set(id.to_string())).await;
        self.check_write()?;
        self.docs.write().await.insert(id.to_string(), fields.clone());
        Ok(())
    }

    async fn merge(&self, id: &str, patch: &FieldPatch) -> Result<()> {
        self.record(StoreOp::Merge(id.to_string())).await;
        self.check_write()?;
        let mut docs = self.docs.write().await;
        let merged = patch.apply(docs.get(id).cloned());
        docs.insert(id.to_string(), merged);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.record(StoreOp::Delete(id.to_string())).await;
        self.check_write()?;
        self.docs.write().await.remove(id);
        Ok(())
    }
}

/// In-memory blob store for testing. Download URLs use a `memory://` scheme.
#[derive(Default)]
pub struct InMemoryBlobs {
    blobs: RwLock<BTreeMap<String, Bytes>>,
    ops: RwLock<Vec<StoreOp>>,
    simulate_upload_error: AtomicBool,
}

impl InMemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_simulate_upload_error(&self, simulate: bool) {
        self.simulate_upload_error.store(simulate, Ordering::SeqCst);
    }

    pub async fn paths(&self) -> Vec<String> {
        self.blobs.read().await.keys().cloned().collect()
    }

    pub async fn get(&self, path: &str) -> Option<Bytes> {
        self.blobs.read().await.get(path).cloned()
    }

    pub async fn ops(&self) -> Vec<StoreOp> {
        self.ops.read().await.clone()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobs {
    async fn upload(
        &self,
        path: &str,
        file: &PendingUpload,
        progress: Option<ProgressSender>,
    ) -> Result<()> {
        self.ops.write().await.push(StoreOp::Upload(path.to_string()));
        if self.simulate_upload_error.load(Ordering::SeqCst) {
            return Err(PantryError::Upload("Simulated upload error".to_string()));
        }

        let total = file.len() as u64;
        if let Some(tx) = &progress {
            let _ = tx.send(UploadProgress {
                bytes_transferred: total,
                total_bytes: total,
            });
        }
        self.blobs
            .write()
            .await
            .insert(path.to_string(), file.bytes.clone());
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        self.ops
            .write()
            .await
            .push(StoreOp::DownloadUrl(path.to_string()));
        if !self.blobs.read().await.contains_key(path) {
            return Err(PantryError::Backend {
                status: 404,
                message: format!("No object at {}", path),
            });
        }
        Ok(format!("memory://{}", path))
    }
}
