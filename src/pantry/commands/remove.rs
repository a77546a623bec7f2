use crate::backend::DocumentStore;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::capitalize;

/// Delete the document for `name`. No existence check: removing a missing
/// item succeeds and changes nothing. Photos are left in the blob store.
pub async fn run<D: DocumentStore>(documents: &D, name: &str) -> Result<CmdResult> {
    documents.delete(name).await?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Removed {}", capitalize(name))));
    Ok(result)
}
