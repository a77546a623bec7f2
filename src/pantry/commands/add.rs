use crate::backend::{BlobStore, DocumentStore};
use crate::commands::{upload, CmdMessage, CmdResult};
use crate::error::{PantryError, Result};
use crate::model::{capitalize, FieldPatch, InventoryItem, ItemFields, PendingUpload};

/// Add `quantity` of `name`, optionally with a photo.
///
/// The photo goes up first; an upload failure aborts before any document is
/// touched and is returned as an error. After that the existing document is
/// read: if present its quantity is summed with `quantity` and its image URL
/// replaced by the new one (empty when no photo was given), otherwise a new
/// document is created.
///
/// Errors in the document step are logged and swallowed: the result is empty
/// and an already uploaded photo stays in the blob store.
pub async fn run<D: DocumentStore, B: BlobStore>(
    documents: &D,
    blobs: &B,
    name: &str,
    quantity: i64,
    image: Option<&PendingUpload>,
) -> Result<CmdResult> {
    let image_url = match image {
        Some(file) => upload::run(blobs, file).await?,
        None => String::new(),
    };

    tracing::info!(item = name, quantity, image_url = %image_url, "Adding item");

    match write_document(documents, name, quantity, &image_url).await {
        Ok((item, merged)) => {
            tracing::info!(item = name, "Item added/updated successfully");
            let message = if merged {
                format!(
                    "Updated {}: quantity {}",
                    capitalize(&item.name),
                    item.quantity
                )
            } else {
                format!("Added {} (quantity {})", capitalize(&item.name), item.quantity)
            };
            let mut result = CmdResult::default().with_affected_items(vec![item]);
            result.add_message(CmdMessage::success(message));
            Ok(result)
        }
        Err(e) => {
            tracing::error!(item = name, error = %e, "Error adding item to the document store");
            Ok(CmdResult::default())
        }
    }
}

/// Returns the written item and whether it was merged into an existing one.
async fn write_document<D: DocumentStore>(
    documents: &D,
    name: &str,
    quantity: i64,
    image_url: &str,
) -> Result<(InventoryItem, bool)> {
    validate_name(name)?;

    match documents.get(name).await? {
        Some(existing) => {
            let total = existing.quantity.checked_add(quantity).ok_or_else(|| {
                PantryError::Api(format!(
                    "Quantity of {} would overflow: {} + {}",
                    name, existing.quantity, quantity
                ))
            })?;
            let patch = FieldPatch::quantity(total).with_image_url(image_url);
            documents.merge(name, &patch).await?;
            Ok((
                InventoryItem {
                    name: name.to_string(),
                    quantity: total,
                    image_url: image_url.to_string(),
                },
                true,
            ))
        }
        None => {
            documents
                .set(name, &ItemFields::new(quantity, image_url))
                .await?;
            Ok((
                InventoryItem {
                    name: name.to_string(),
                    quantity,
                    image_url: image_url.to_string(),
                },
                false,
            ))
        }
    }
}

/// Names are document ids: they cannot be empty or contain a path separator.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PantryError::Api("Item name cannot be empty".into()));
    }
    if name.contains('/') {
        return Err(PantryError::Api(format!(
            "Item name cannot contain '/': {}",
            name
        )));
    }
    Ok(())
}
