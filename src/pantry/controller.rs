//! # Inventory Controller
//!
//! The single owner of the page: it holds the [`ViewState`] and the two
//! backend handles, and exposes one method per user action.
//!
//! ## Reload contract
//!
//! Every mutation is followed by a full [`list`](InventoryController::list)
//! of the collection, which replaces the cached items. Nothing is updated
//! incrementally or optimistically. The one exception is an add whose
//! document step failed: that failure is swallowed, so no reload happens.
//!
//! ## Generic over the stores
//!
//! `InventoryController<D, B>` takes its handles by constructor:
//! - Production: `Arc<dyn DocumentStore>` / `Arc<dyn BlobStore>` from
//!   [`BackendHandles`](crate::backend::BackendHandles)
//! - Testing: `Arc<InMemoryDocuments>` / `Arc<InMemoryBlobs>`
//!
//! ## Concurrency
//!
//! Handlers take `&mut self`, so one controller runs one handler at a time.
//! Nothing guards the backend itself: two processes adjusting the same item
//! race, and the last write wins.

use crate::backend::{BlobStore, DocumentStore};
use crate::commands::{self, CmdMessage, CmdResult};
use crate::error::{PantryError, Result};
use crate::model::{capitalize, InventoryItem, PendingUpload};
use crate::view::{reduce, Action, FormState, ItemCard, ViewState};

pub struct InventoryController<D: DocumentStore, B: BlobStore> {
    documents: D,
    blobs: B,
    state: ViewState,
}

impl<D: DocumentStore, B: BlobStore> InventoryController<D, B> {
    pub fn new(documents: D, blobs: B) -> Self {
        Self {
            documents,
            blobs,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Initial load of the page.
    pub async fn mount(&mut self) -> Result<()> {
        self.list().await
    }

    /// Re-fetch the whole collection and replace the cached items.
    pub async fn list(&mut self) -> Result<()> {
        let items = commands::list::run(&self.documents).await?;
        self.dispatch(Action::Loaded(items));
        Ok(())
    }

    pub async fn add(
        &mut self,
        name: &str,
        quantity: i64,
        image: Option<PendingUpload>,
    ) -> Result<CmdResult> {
        let result =
            commands::add::run(&self.documents, &self.blobs, name, quantity, image.as_ref())
                .await?;
        if result.wrote() {
            self.list().await?;
        }
        Ok(result)
    }

    pub async fn adjust_quantity(&mut self, name: &str, quantity: i64) -> Result<CmdResult> {
        let result = commands::adjust::run(&self.documents, name, quantity).await?;
        self.list().await?;
        Ok(result)
    }

    pub async fn remove(&mut self, name: &str) -> Result<CmdResult> {
        let result = commands::remove::run(&self.documents, name).await?;
        self.list().await?;
        Ok(result)
    }

    // --- Search box ---

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.dispatch(Action::SetSearch(query.into()));
    }

    pub fn visible(&self) -> Vec<&InventoryItem> {
        self.state.visible()
    }

    pub fn cards(&self) -> Vec<ItemCard> {
        self.state.cards()
    }

    // --- Add form ---

    pub fn open_form(&mut self) {
        self.dispatch(Action::OpenForm);
    }

    pub fn set_form_name(&mut self, name: impl Into<String>) {
        self.dispatch(Action::SetName(name.into()));
    }

    pub fn set_form_quantity(&mut self, quantity: i64) {
        self.dispatch(Action::SetQuantity(quantity));
    }

    pub fn select_image(&mut self, image: Option<PendingUpload>) {
        self.dispatch(Action::SelectImage(image));
    }

    /// Close the form without saving anything.
    pub fn cancel_form(&mut self) {
        self.dispatch(Action::CloseForm);
    }

    /// The form's Add button: closes the form, then adds what it held.
    pub async fn submit_form(&mut self) -> Result<CmdResult> {
        let form = match std::mem::take(&mut self.state.form) {
            FormState::Open(form) => form,
            FormState::Closed => {
                return Err(PantryError::Api("The add form is not open".into()));
            }
        };
        self.dispatch(Action::CloseForm);
        self.add(&form.name, form.quantity, form.image).await
    }

    // --- Card controls ---

    pub async fn increment(&mut self, name: &str) -> Result<CmdResult> {
        let Some(card) = self.state.card(name) else {
            return Ok(not_shown(name));
        };
        let quantity = card.quantity.checked_add(1).ok_or_else(|| {
            PantryError::Api(format!("{} is already at the largest quantity", card.title))
        })?;
        self.adjust_quantity(name, quantity).await
    }

    /// No backend call while the decrement control is disabled.
    pub async fn decrement(&mut self, name: &str) -> Result<CmdResult> {
        let Some(card) = self.state.card(name) else {
            return Ok(not_shown(name));
        };
        if !card.can_decrement {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info(format!(
                "{} is already at quantity {}",
                card.title, card.quantity
            )));
            return Ok(result);
        }
        let quantity = card.quantity.checked_sub(1).ok_or_else(|| {
            PantryError::Api(format!("{} is already at the smallest quantity", card.title))
        })?;
        self.adjust_quantity(name, quantity).await
    }
}

fn not_shown(name: &str) -> CmdResult {
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::warning(format!(
        "No item named {}",
        capitalize(name)
    )));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{InMemoryBlobs, InMemoryDocuments, StoreOp};
    use crate::model::ItemFields;
    use std::sync::Arc;

    type TestController = InventoryController<Arc<InMemoryDocuments>, Arc<InMemoryBlobs>>;

    fn setup() -> (TestController, Arc<InMemoryDocuments>, Arc<InMemoryBlobs>) {
        let docs = Arc::new(InMemoryDocuments::new());
        let blobs = Arc::new(InMemoryBlobs::new());
        let controller = InventoryController::new(Arc::clone(&docs), Arc::clone(&blobs));
        (controller, docs, blobs)
    }

    #[tokio::test]
    async fn mount_loads_the_collection() {
        let (mut ctl, docs, _) = setup();
        docs.insert("flour", ItemFields::new(2, "")).await;

        ctl.mount().await.unwrap();

        assert_eq!(ctl.state().inventory.len(), 1);
        assert_eq!(ctl.cards()[0].title, "Flour");
    }

    #[tokio::test]
    async fn apple_scenario() {
        let (mut ctl, docs, _) = setup();

        ctl.add("apple", 3, None).await.unwrap();
        assert_eq!(docs.peek("apple").await, Some(ItemFields::new(3, "")));

        ctl.add("apple", 2, None).await.unwrap();
        assert_eq!(docs.peek("apple").await, Some(ItemFields::new(5, "")));

        ctl.adjust_quantity("apple", 4).await.unwrap();
        assert_eq!(docs.peek("apple").await.unwrap().quantity, 4);

        ctl.remove("apple").await.unwrap();
        assert_eq!(docs.peek("apple").await, None);
        assert!(ctl.state().inventory.is_empty());
    }

    #[tokio::test]
    async fn every_mutation_reloads_the_list() {
        let (mut ctl, docs, _) = setup();
        docs.insert("jam", ItemFields::new(2, "")).await;

        ctl.add("oats", 1, None).await.unwrap();
        assert_eq!(ctl.state().inventory.len(), 2);
        assert_eq!(docs.ops().await.last(), Some(&StoreOp::List));

        // Another client changes the store behind our back.
        docs.insert("tea", ItemFields::new(1, "")).await;
        ctl.adjust_quantity("missing", 1).await.unwrap();
        assert_eq!(ctl.state().inventory.len(), 3);

        ctl.remove("missing").await.unwrap();
        assert_eq!(docs.ops().await.last(), Some(&StoreOp::List));
    }

    #[tokio::test]
    async fn swallowed_write_failure_skips_the_reload() {
        let (mut ctl, docs, _) = setup();
        docs.set_simulate_write_error(true);

        let result = ctl.add("oats", 1, None).await.unwrap();

        assert!(!result.wrote());
        assert!(!docs.ops().await.contains(&StoreOp::List));
    }

    #[tokio::test]
    async fn upload_failure_propagates_from_add() {
        let (mut ctl, docs, blobs) = setup();
        blobs.set_simulate_upload_error(true);

        let err = ctl
            .add("oats", 1, Some(PendingUpload::new("o.jpg", vec![1])))
            .await;

        assert!(err.is_err());
        assert!(docs.ops().await.is_empty());
    }

    #[tokio::test]
    async fn decrement_at_one_issues_no_backend_call() {
        let (mut ctl, docs, _) = setup();
        docs.insert("salt", ItemFields::new(1, "")).await;
        ctl.mount().await.unwrap();
        docs.clear_ops().await;

        let result = ctl.decrement("salt").await.unwrap();

        assert!(docs.ops().await.is_empty());
        assert!(!result.wrote());
        assert_eq!(docs.peek("salt").await.unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn increment_and_decrement_step_by_one() {
        let (mut ctl, docs, _) = setup();
        docs.insert("salt", ItemFields::new(2, "")).await;
        ctl.mount().await.unwrap();

        ctl.increment("salt").await.unwrap();
        assert_eq!(docs.peek("salt").await.unwrap().quantity, 3);

        ctl.decrement("salt").await.unwrap();
        ctl.decrement("salt").await.unwrap();
        assert_eq!(docs.peek("salt").await.unwrap().quantity, 1);

        // Now disabled.
        ctl.decrement("salt").await.unwrap();
        assert_eq!(docs.peek("salt").await.unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn increment_at_largest_quantity_is_an_error() {
        let (mut ctl, docs, _) = setup();
        docs.insert("salt", ItemFields::new(i64::MAX, "")).await;
        ctl.mount().await.unwrap();
        docs.clear_ops().await;

        let err = ctl.increment("salt").await;

        assert!(matches!(err, Err(PantryError::Api(_))));
        assert!(docs.ops().await.is_empty());
        assert_eq!(docs.peek("salt").await.unwrap().quantity, i64::MAX);
    }

    #[tokio::test]
    async fn add_overflow_keeps_stored_quantity() {
        let (mut ctl, docs, _) = setup();
        docs.insert("salt", ItemFields::new(i64::MAX, "")).await;

        let result = ctl.add("salt", 1, None).await.unwrap();

        assert!(!result.wrote());
        assert_eq!(docs.peek("salt").await.unwrap().quantity, i64::MAX);
    }

    #[tokio::test]
    async fn controls_on_hidden_items_do_nothing() {
        let (mut ctl, docs, _) = setup();
        docs.insert("salt", ItemFields::new(5, "")).await;
        ctl.mount().await.unwrap();
        ctl.set_search("pepper");
        docs.clear_ops().await;

        let result = ctl.increment("salt").await.unwrap();

        assert!(docs.ops().await.is_empty());
        assert_eq!(result.messages.len(), 1);
    }

    #[tokio::test]
    async fn submit_adds_form_contents_and_closes() {
        let (mut ctl, docs, blobs) = setup();

        ctl.open_form();
        ctl.set_form_name("coffee");
        ctl.set_form_quantity(2);
        ctl.select_image(Some(PendingUpload::new("c.jpg", vec![3])));
        ctl.submit_form().await.unwrap();

        assert!(!ctl.state().form.is_open());
        let stored = docs.peek("coffee").await.unwrap();
        assert_eq!(stored.quantity, 2);
        assert!(stored.image_url.starts_with("memory://images/"));
        assert_eq!(blobs.paths().await.len(), 1);
    }

    #[tokio::test]
    async fn cancel_discards_everything() {
        let (mut ctl, docs, blobs) = setup();

        ctl.open_form();
        ctl.set_form_name("coffee");
        ctl.select_image(Some(PendingUpload::new("c.jpg", vec![3])));
        ctl.cancel_form();

        assert!(ctl.submit_form().await.is_err());
        assert!(docs.ops().await.is_empty());
        assert!(blobs.ops().await.is_empty());
    }

    #[tokio::test]
    async fn search_does_not_touch_the_backend() {
        let (mut ctl, docs, _) = setup();
        docs.insert("banana", ItemFields::new(1, "")).await;
        docs.insert("apple", ItemFields::new(1, "")).await;
        ctl.mount().await.unwrap();
        docs.clear_ops().await;

        ctl.set_search("AN");

        let names: Vec<_> = ctl.visible().iter().map(|i| i.name.clone()).collect();
        assert_eq!(names, vec!["banana"]);
        assert!(docs.ops().await.is_empty());
    }
}
