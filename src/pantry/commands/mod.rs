//! # Command Layer
//!
//! The operations behind every user action, as plain async functions over the
//! [`DocumentStore`](crate::backend::DocumentStore) and
//! [`BlobStore`](crate::backend::BlobStore) traits.
//!
//! Commands never touch view state and never refresh: the controller decides
//! when to re-list the collection. They return a [`CmdResult`] carrying the
//! items they touched and levelled messages for the UI to show.
//!
//! - [`list`]: scan the collection into `InventoryItem`s
//! - [`upload`]: put a photo in the blob store and resolve its URL
//! - [`add`]: upload, then create or quantity-merge the document
//! - [`adjust`]: overwrite the quantity of an existing document
//! - [`remove`]: delete a document
//! - [`search`]: filter a list by name, no backend involved

use crate::model::InventoryItem;
use serde::Serialize;

pub mod add;
pub mod adjust;
pub mod list;
pub mod remove;
pub mod search;
pub mod upload;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Items as written by the command.
    pub affected_items: Vec<InventoryItem>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_items(mut self, items: Vec<InventoryItem>) -> Self {
        self.affected_items = items;
        self
    }

    /// True when the command wrote something to the document store.
    pub fn wrote(&self) -> bool {
        !self.affected_items.is_empty()
    }
}
