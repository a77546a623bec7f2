use crate::backend::DocumentStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{capitalize, FieldPatch, InventoryItem};

/// Overwrite the quantity of `name` if its document exists.
///
/// A missing document is a silent no-op. Any integer is written as-is,
/// zero and negative values included.
pub async fn run<D: DocumentStore>(documents: &D, name: &str, quantity: i64) -> Result<CmdResult> {
    let Some(existing) = documents.get(name).await? else {
        tracing::debug!(item = name, "adjust on missing item ignored");
        return Ok(CmdResult::default());
    };

    documents.merge(name, &FieldPatch::quantity(quantity)).await?;

    let item = InventoryItem {
        name: name.to_string(),
        quantity,
        image_url: existing.image_url,
    };
    let mut result = CmdResult::default().with_affected_items(vec![item]);
    result.add_message(CmdMessage::success(format!(
        "{}: quantity {}",
        capitalize(name),
        quantity
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{InMemoryDocuments, StoreOp};
    use crate::model::ItemFields;

    #[tokio::test]
    async fn overwrites_quantity_and_keeps_photo() {
        let docs = InMemoryDocuments::new();
        docs.insert("apple", ItemFields::new(5, "memory://a")).await;

        let result = run(&docs, "apple", 4).await.unwrap();

        assert_eq!(docs.peek("apple").await, Some(ItemFields::new(4, "memory://a")));
        assert_eq!(result.affected_items[0].quantity, 4);
    }

    #[tokio::test]
    async fn missing_item_is_a_silent_no_op() {
        let docs = InMemoryDocuments::new();

        let result = run(&docs, "ghost", 3).await.unwrap();

        assert!(!result.wrote());
        assert!(result.messages.is_empty());
        assert_eq!(docs.len().await, 0);
        assert_eq!(docs.ops().await, vec![StoreOp::Get("ghost".into())]);
    }

    #[tokio::test]
    async fn accepts_zero_and_negative_quantities() {
        let docs = InMemoryDocuments::new();
        docs.insert("salt", ItemFields::new(1, "")).await;

        run(&docs, "salt", 0).await.unwrap();
        assert_eq!(docs.peek("salt").await.unwrap().quantity, 0);

        run(&docs, "salt", -2).await.unwrap();
        assert_eq!(docs.peek("salt").await.unwrap().quantity, -2);
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let docs = InMemoryDocuments::new();
        docs.insert("salt", ItemFields::new(1, "")).await;
        docs.set_simulate_write_error(true);

        assert!(run(&docs, "salt", 2).await.is_err());
    }
}
