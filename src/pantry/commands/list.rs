use crate::backend::DocumentStore;
use crate::error::Result;
use crate::model::InventoryItem;

/// Every document in the collection as an item, in backend order.
pub async fn run<D: DocumentStore>(documents: &D) -> Result<Vec<InventoryItem>> {
    let docs = documents.list().await?;
    Ok(docs.into_iter().map(InventoryItem::from).collect())
}
