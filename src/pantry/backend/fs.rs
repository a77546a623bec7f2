//! Local directory backend.
//!
//! ```text
//! <data-dir>/
//! ├── inventory.json        # { "<name>": { "quantity": 3, "imageUrl": "" }, ... }
//! └── blobs/
//!     └── images/<uuid>     # raw photo bytes
//! ```

use super::{BlobStore, DocumentStore, ProgressSender, UploadProgress};
use crate::error::{PantryError, Result};
use crate::model::{Document, FieldPatch, ItemFields, PendingUpload};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const INVENTORY_FILE: &str = "inventory.json";
const BLOB_DIR: &str = "blobs";
const CHUNK_SIZE: usize = 64 * 1024;

pub struct FileDocuments {
    root: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileDocuments {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn data_file(&self) -> PathBuf {
        self.root.join(INVENTORY_FILE)
    }

    async fn load(&self) -> Result<BTreeMap<String, ItemFields>> {
        let path = self.data_file();
        if !fs::try_exists(&path).await? {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&path).await?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, docs: &BTreeMap<String, ItemFields>) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        let content = serde_json::to_string_pretty(docs)?;
        let tmp = self.root.join(format!("{}.tmp", INVENTORY_FILE));
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, self.data_file()).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocuments {
    async fn list(&self) -> Result<Vec<Document>> {
        let docs = self.load().await?;
        Ok(docs
            .into_iter()
            .map(|(id, fields)| Document { id, fields })
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<ItemFields>> {
        Ok(self.load().await?.remove(id))
    }

    async fn set(&self, id: &str, fields: &ItemFields) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load().await?;
        docs.insert(id.to_string(), fields.clone());
        self.save(&docs).await
    }

    async fn merge(&self, id: &str, patch: &FieldPatch) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load().await?;
        let merged = patch.apply(docs.remove(id));
        docs.insert(id.to_string(), merged);
        self.save(&docs).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut docs = self.load().await?;
        if docs.remove(id).is_some() {
            self.save(&docs).await?;
        }
        Ok(())
    }
}

pub struct FileBlobs {
    root: PathBuf,
}

impl FileBlobs {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.join(BLOB_DIR),
        }
    }

    /// Resolve a blob path, refusing anything that would escape the blob
    /// directory.
    fn object_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(PantryError::Upload(format!("Invalid object path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FileBlobs {
    async fn upload(
        &self,
        path: &str,
        file: &PendingUpload,
        progress: Option<ProgressSender>,
    ) -> Result<()> {
        let target = self.object_path(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let total = file.len() as u64;
        let mut out = fs::File::create(&target).await?;
        let mut written = 0u64;
        for chunk in file.bytes.chunks(CHUNK_SIZE) {
            out.write_all(chunk).await?;
            written += chunk.len() as u64;
            if let Some(tx) = &progress {
                let _ = tx.send(UploadProgress {
                    bytes_transferred: written,
                    total_bytes: total,
                });
            }
        }
        out.flush().await?;
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let target = self.object_path(path)?;
        if !fs::try_exists(&target).await? {
            return Err(PantryError::Backend {
                status: 404,
                message: format!("No object at {}", path),
            });
        }
        let absolute = fs::canonicalize(&target).await?;
        Ok(format!("file://{}", absolute.display()))
    }
}
