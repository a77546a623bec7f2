//! # Backend Layer
//!
//! Handles to the two remote services the inventory lives in:
//!
//! - a **document collection** ([`DocumentStore`]) with one document per item,
//!   keyed by the item name, holding `{quantity, imageUrl}`
//! - a **blob store** ([`BlobStore`]) holding item photos under
//!   `images/<uuid>`, readable through generated download URLs
//!
//! Both are traits so the controller can be handed fakes in tests.
//!
//! ## Implementations
//!
//! - [`firebase`]: Firestore and Firebase Storage over their REST endpoints
//! - [`fs`]: a local directory (`inventory.json` + `blobs/`), used when no
//!   Firebase project is configured
//! - [`memory`]: in-memory fakes with failure injection and an operation log
//!
//! ## Lifecycle
//!
//! [`BackendHandles::init`] builds the handles once per process and keeps
//! them in a global cell. Callers take clones of the `Arc`s and pass them
//! into the controller; nothing below the CLI looks the globals up.

use crate::config::{BackendKind, FirebaseConfig, PantryConfig};
use crate::error::{PantryError, Result};
use crate::model::{Document, FieldPatch, ItemFields, PendingUpload};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

pub mod firebase;
pub mod fs;
pub mod memory;

/// Bytes sent so far for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        ((self.bytes_transferred * 100) / self.total_bytes).min(100) as u8
    }
}

/// Receiving end is optional; a dropped receiver is not an error.
pub type ProgressSender = UnboundedSender<UploadProgress>;

/// The `inventory` document collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in whatever order the backend
    /// returns them.
    async fn list(&self) -> Result<Vec<Document>>;

    /// `Ok(None)` when the document does not exist.
    async fn get(&self, id: &str) -> Result<Option<ItemFields>>;

    /// Create or fully replace a document.
    async fn set(&self, id: &str, fields: &ItemFields) -> Result<()>;

    /// Write only the fields present in `patch`, creating the document if
    /// needed.
    async fn merge(&self, id: &str, patch: &FieldPatch) -> Result<()>;

    /// Deleting a document that does not exist succeeds.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Binary object storage addressed by path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `file` under `path`, reporting progress on `progress`. Resolves
    /// once the upload has completed or failed.
    async fn upload(
        &self,
        path: &str,
        file: &PendingUpload,
        progress: Option<ProgressSender>,
    ) -> Result<()>;

    /// Public URL from which the object at `path` can be fetched.
    async fn download_url(&self, path: &str) -> Result<String>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn list(&self) -> Result<Vec<Document>> {
        (**self).list().await
    }

    async fn get(&self, id: &str) -> Result<Option<ItemFields>> {
        (**self).get(id).await
    }

    async fn set(&self, id: &str, fields: &ItemFields) -> Result<()> {
        (**self).set(id, fields).await
    }

    async fn merge(&self, id: &str, patch: &FieldPatch) -> Result<()> {
        (**self).merge(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn upload(
        &self,
        path: &str,
        file: &PendingUpload,
        progress: Option<ProgressSender>,
    ) -> Result<()> {
        (**self).upload(path, file, progress).await
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        (**self).download_url(path).await
    }
}

/// Analytics handle, created in the background on interactive starts.
/// Nothing reads it; it only records that a session began.
#[derive(Debug, Clone)]
pub struct Analytics {
    pub measurement_id: String,
    pub app_id: String,
}

/// Long-lived handles to the configured backend.
pub struct BackendHandles {
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub kind: BackendKind,
    firebase: Option<FirebaseConfig>,
    analytics: Arc<OnceCell<Analytics>>,
}

static HANDLES: OnceCell<BackendHandles> = OnceCell::new();

impl BackendHandles {
    /// Build handles for `config`, rooting local storage at `home`.
    pub fn connect(config: &PantryConfig, home: &Path) -> Result<Self> {
        match config.backend {
            BackendKind::Local => {
                let data_dir = config.data_dir(home);
                Ok(Self {
                    documents: Arc::new(fs::FileDocuments::new(&data_dir)),
                    blobs: Arc::new(fs::FileBlobs::new(&data_dir)),
                    kind: BackendKind::Local,
                    firebase: None,
                    analytics: Arc::new(OnceCell::new()),
                })
            }
            BackendKind::Firebase => {
                let fb = config.firebase.clone().ok_or_else(|| {
                    PantryError::Config(
                        "backend is 'firebase' but no firebase project is configured".into(),
                    )
                })?;
                fb.validate()?;
                let client = firebase::FirebaseClient::new(fb.clone())?;
                Ok(Self {
                    documents: Arc::new(client.firestore()),
                    blobs: Arc::new(client.storage()),
                    kind: BackendKind::Firebase,
                    firebase: Some(fb),
                    analytics: Arc::new(OnceCell::new()),
                })
            }
        }
    }

    /// Process-wide handles; the first call wins and later calls return the
    /// same handles regardless of their arguments.
    pub fn init(config: &PantryConfig, home: &Path) -> Result<&'static BackendHandles> {
        HANDLES.get_or_try_init(|| Self::connect(config, home))
    }

    /// Lazily start analytics when a measurement id is configured and the
    /// session is interactive. Fire-and-forget: must be called from inside a
    /// tokio runtime.
    pub fn start_analytics(&self, interactive: bool) {
        let Some(fb) = &self.firebase else {
            return;
        };
        let Some(measurement_id) = fb.measurement_id.clone() else {
            return;
        };
        if !interactive {
            return;
        }

        let cell = Arc::clone(&self.analytics);
        let app_id = fb.app_id.clone();
        tokio::spawn(async move {
            let handle = cell.get_or_init(|| Analytics {
                measurement_id,
                app_id,
            });
            tracing::debug!(measurement_id = %handle.measurement_id, "analytics initialized");
        });
    }

    pub fn analytics(&self) -> Option<&Analytics> {
        self.analytics.get()
    }
}
