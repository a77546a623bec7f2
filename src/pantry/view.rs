//! View state for the inventory page.
//!
//! [`ViewState`] is everything the page shows: the cached item list, the
//! search text and the add form. It only changes through [`reduce`], a pure
//! function, so every state transition can be tested without a backend or a
//! terminal.
//!
//! The add form is a small state machine:
//!
//! ```text
//! Closed --OpenForm--> Open(fields) --SetName/SetQuantity/SelectImage--> Open(fields)
//! Open(fields) --CloseForm--> Closed     (fields and image discarded)
//! ```

use crate::commands::search;
use crate::model::{InventoryItem, PendingUpload};

/// Quantity the form starts with.
pub const DEFAULT_FORM_QUANTITY: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForm {
    pub name: String,
    pub quantity: i64,
    pub image: Option<PendingUpload>,
}

impl Default for AddForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: DEFAULT_FORM_QUANTITY,
            image: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Closed,
    Open(AddForm),
}

impl FormState {
    pub fn is_open(&self) -> bool {
        matches!(self, FormState::Open(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Last full listing of the collection. Replaced, never patched.
    pub inventory: Vec<InventoryItem>,
    pub search: String,
    pub form: FormState,
}

#[derive(Debug, Clone)]
pub enum Action {
    Loaded(Vec<InventoryItem>),
    SetSearch(String),
    OpenForm,
    SetName(String),
    SetQuantity(i64),
    SelectImage(Option<PendingUpload>),
    CloseForm,
}

pub fn reduce(mut state: ViewState, action: Action) -> ViewState {
    match action {
        Action::Loaded(items) => state.inventory = items,
        Action::SetSearch(query) => state.search = query,
        Action::OpenForm => {
            if !state.form.is_open() {
                state.form = FormState::Open(AddForm::default());
            }
        }
        Action::CloseForm => state.form = FormState::Closed,
        // Field edits only apply while the form is open.
        Action::SetName(name) => {
            if let FormState::Open(form) = &mut state.form {
                form.name = name;
            }
        }
        Action::SetQuantity(quantity) => {
            if let FormState::Open(form) = &mut state.form {
                form.quantity = quantity;
            }
        }
        Action::SelectImage(image) => {
            if let FormState::Open(form) = &mut state.form {
                form.image = image;
            }
        }
    }
    state
}

/// One rendered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCard {
    /// Document id, used by the card's controls.
    pub name: String,
    /// Name as displayed, first letter capitalized.
    pub title: String,
    pub quantity: i64,
    pub image_url: Option<String>,
    /// The decrement control is disabled at quantity 1 and below.
    pub can_decrement: bool,
}

impl From<&InventoryItem> for ItemCard {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            title: item.display_name(),
            quantity: item.quantity,
            image_url: item.has_image().then(|| item.image_url.clone()),
            can_decrement: item.quantity > 1,
        }
    }
}

impl ViewState {
    /// Items matching the current search, in listing order.
    pub fn visible(&self) -> Vec<&InventoryItem> {
        search::filter(&self.inventory, &self.search)
    }

    pub fn cards(&self) -> Vec<ItemCard> {
        self.visible().into_iter().map(ItemCard::from).collect()
    }

    /// Card for `name` if it is currently shown.
    pub fn card(&self, name: &str) -> Option<ItemCard> {
        self.visible()
            .into_iter()
            .find(|item| item.name == name)
            .map(ItemCard::from)
    }
}
