use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Name of the document collection holding one document per item.
pub const INVENTORY_COLLECTION: &str = "inventory";

/// Prefix under which item photos are stored in the blob store.
pub const IMAGE_PREFIX: &str = "images";

/// The stored field map of one inventory document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub quantity: i64,
    #[serde(default)]
    pub image_url: String,
}

impl ItemFields {
    pub fn new(quantity: i64, image_url: impl Into<String>) -> Self {
        Self {
            quantity,
            image_url: image_url.into(),
        }
    }
}

/// A merge-update: fields left as `None` are not touched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
}

impl FieldPatch {
    pub fn quantity(quantity: i64) -> Self {
        Self {
            quantity: Some(quantity),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.image_url.is_none()
    }

    /// Applies the patch on top of existing fields. A document that did not
    /// exist starts from zero quantity and no image.
    pub fn apply(&self, existing: Option<ItemFields>) -> ItemFields {
        let mut fields = existing.unwrap_or_else(|| ItemFields::new(0, ""));
        if let Some(q) = self.quantity {
            fields.quantity = q;
        }
        if let Some(url) = &self.image_url {
            fields.image_url = url.clone();
        }
        fields
    }
}

/// One document as returned by a collection scan: its id plus its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub fields: ItemFields,
}

/// An item as the view sees it. The name doubles as the document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: String,
    pub quantity: i64,
    pub image_url: String,
}

impl From<Document> for InventoryItem {
    fn from(doc: Document) -> Self {
        Self {
            name: doc.id,
            quantity: doc.fields.quantity,
            image_url: doc.fields.image_url,
        }
    }
}

impl InventoryItem {
    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// Name with its first letter uppercased, as shown on item cards.
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A photo selected in the add form, held until the form is submitted or
/// cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl PendingUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_first_letter_only() {
        assert_eq!(capitalize("banana bread"), "Banana bread");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn fields_use_camel_case_on_the_wire() {
        let json = serde_json::to_string(&ItemFields::new(3, "http://x")).unwrap();
        assert_eq!(json, r#"{"quantity":3,"imageUrl":"http://x"}"#);
    }

    #[test]
    fn missing_image_url_defaults_to_empty() {
        let fields: ItemFields = serde_json::from_str(r#"{"quantity":2}"#).unwrap();
        assert_eq!(fields, ItemFields::new(2, ""));
    }

    #[test]
    fn patch_leaves_untouched_fields_alone() {
        let existing = ItemFields::new(5, "http://photo");
        let patched = FieldPatch::quantity(4).apply(Some(existing));
        assert_eq!(patched, ItemFields::new(4, "http://photo"));
    }

    #[test]
    fn pending_upload_guesses_content_type() {
        let upload = PendingUpload::new("shelf.png", vec![1, 2, 3]);
        assert_eq!(upload.content_type, "image/png");
        assert_eq!(upload.len(), 3);

        let unknown = PendingUpload::new("blob", Vec::new());
        assert_eq!(unknown.content_type, "application/octet-stream");
        assert!(unknown.is_empty());
    }
}
