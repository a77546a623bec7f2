use crate::backend::{BlobStore, UploadProgress};
use crate::error::Result;
use crate::model::{PendingUpload, IMAGE_PREFIX};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Fresh blob path for a photo: `images/<uuid>`.
pub fn image_path() -> String {
    format!("{}/{}", IMAGE_PREFIX, Uuid::new_v4())
}

/// Upload `file` under a new random path and resolve its download URL.
///
/// Waits for the upload to finish. Failures are logged and returned; nothing
/// is retried.
pub async fn run<B: BlobStore>(blobs: &B, file: &PendingUpload) -> Result<String> {
    let path = image_path();
    let (tx, rx) = mpsc::unbounded_channel();

    let (uploaded, _) = tokio::join!(blobs.upload(&path, file, Some(tx)), log_progress(rx, &path));
    if let Err(e) = uploaded {
        tracing::error!(path = %path, error = %e, "Error during upload");
        return Err(e);
    }

    let url = blobs.download_url(&path).await.map_err(|e| {
        tracing::error!(path = %path, error = %e, "Error resolving download URL");
        e
    })?;
    tracing::info!(url = %url, "Image uploaded successfully");
    Ok(url)
}

/// Drains progress events until the uploader drops its sender.
async fn log_progress(mut rx: mpsc::UnboundedReceiver<UploadProgress>, path: &str) {
    while let Some(p) = rx.recv().await {
        tracing::debug!(
            path,
            transferred = p.bytes_transferred,
            total = p.total_bytes,
            "upload {}%",
            p.percent()
        );
    }
}
