//! Firestore and Firebase Storage over REST.
//!
//! Documents live at
//! `projects/{projectId}/databases/(default)/documents/inventory/{name}` and
//! are addressed with the project's web api key. Photos are uploaded to the
//! project's storage bucket; the download URL embeds the object's download
//! token, the same URL the web SDK's `getDownloadURL` hands out.

use super::{BlobStore, DocumentStore, ProgressSender, UploadProgress};
use crate::config::FirebaseConfig;
use crate::error::{PantryError, Result};
use crate::model::{Document, FieldPatch, ItemFields, PendingUpload, INVENTORY_COLLECTION};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com/v1";
const STORAGE_HOST: &str = "https://firebasestorage.googleapis.com/v0";
const PAGE_SIZE: &str = "300";
const UPLOAD_CHUNK: usize = 256 * 1024;

const QUANTITY_FIELD: &str = "quantity";
const IMAGE_URL_FIELD: &str = "imageUrl";

/// Characters left as-is in a path segment; everything else, `/` included,
/// is percent-encoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_segment(s: &str) -> String {
    utf8_percent_encode(s, SEGMENT).to_string()
}

/// Shared HTTP client and project settings.
#[derive(Clone)]
pub struct FirebaseClient {
    http: Client,
    config: FirebaseConfig,
    firestore_host: String,
    storage_host: String,
}

impl FirebaseClient {
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        Self::with_hosts(config, FIRESTORE_HOST, STORAGE_HOST)
    }

    /// Client talking to other endpoints than Google's, e.g. the emulators.
    pub fn with_hosts(
        config: FirebaseConfig,
        firestore_host: impl Into<String>,
        storage_host: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("pantry/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config,
            firestore_host: firestore_host.into().trim_end_matches('/').to_string(),
            storage_host: storage_host.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn firestore(&self) -> Firestore {
        Firestore {
            client: self.clone(),
            base: format!(
                "{}/projects/{}/databases/(default)/documents/{}",
                self.firestore_host,
                encode_segment(&self.config.project_id),
                INVENTORY_COLLECTION
            ),
        }
    }

    pub fn storage(&self) -> Storage {
        Storage {
            client: self.clone(),
            base: format!(
                "{}/b/{}/o",
                self.storage_host,
                encode_segment(&self.config.storage_bucket)
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Turn a non-2xx response into a backend error carrying Google's message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PantryError::Backend {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Google APIs wrap errors as `{"error": {"message": ...}}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Firestore typed-value map for the given fields.
fn encode_fields(quantity: Option<i64>, image_url: Option<&str>) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(q) = quantity {
        fields.insert(
            QUANTITY_FIELD.to_string(),
            json!({ "integerValue": q.to_string() }),
        );
    }
    if let Some(url) = image_url {
        fields.insert(IMAGE_URL_FIELD.to_string(), json!({ "stringValue": url }));
    }
    fields
}

/// Documents written by other clients may carry numbers as doubles or leave
/// fields out entirely.
fn decode_fields(fields: &Map<String, Value>) -> ItemFields {
    let quantity = fields
        .get(QUANTITY_FIELD)
        .and_then(|v| {
            v.get("integerValue")
                .and_then(|i| match i {
                    Value::String(s) => s.parse::<i64>().ok(),
                    Value::Number(n) => n.as_i64(),
                    _ => None,
                })
                .or_else(|| v.get("doubleValue").and_then(Value::as_f64).map(truncate_double))
        })
        .unwrap_or(0);
    let image_url = fields
        .get(IMAGE_URL_FIELD)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    ItemFields {
        quantity,
        image_url,
    }
}

fn truncate_double(d: f64) -> i64 {
    if d.fract() != 0.0 {
        tracing::warn!(value = d, "fractional quantity truncated to an integer");
    }
    d as i64
}

/// The document id is the last segment of the resource name. Firestore
/// returns names unescaped, so the segment is taken as-is.
fn document_id(resource_name: &str) -> String {
    resource_name
        .rsplit('/')
        .next()
        .unwrap_or(resource_name)
        .to_string()
}

pub struct Firestore {
    client: FirebaseClient,
    base: String,
}

impl Firestore {
    fn doc_url(&self, id: &str) -> String {
        format!("{}/{}", self.base, encode_segment(id))
    }

    fn key(&self) -> (&'static str, &str) {
        ("key", self.client.config.api_key.as_str())
    }

    async fn patch(&self, id: &str, fields: Map<String, Value>, mask: &[&str]) -> Result<()> {
        let mut query: Vec<(&str, &str)> = vec![self.key()];
        for field in mask {
            query.push(("updateMask.fieldPaths", *field));
        }
        let response = self
            .client
            .http
            .patch(self.doc_url(id))
            .query(&query)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for Firestore {
    async fn list(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let response = {
                let mut query: Vec<(&str, &str)> = vec![self.key(), ("pageSize", PAGE_SIZE)];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                self.client
                    .http
                    .get(&self.base)
                    .query(&query)
                    .send()
                    .await?
            };
            let page: ListResponse = check(response).await?.json().await?;

            documents.extend(page.documents.into_iter().map(|raw| Document {
                id: document_id(&raw.name),
                fields: decode_fields(&raw.fields),
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = documents.len(), "fetched inventory collection");
        Ok(documents)
    }

    async fn get(&self, id: &str) -> Result<Option<ItemFields>> {
        let response = self
            .client
            .http
            .get(self.doc_url(id))
            .query(&[self.key()])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: RawDocument = check(response).await?.json().await?;
        Ok(Some(decode_fields(&raw.fields)))
    }

    async fn set(&self, id: &str, fields: &ItemFields) -> Result<()> {
        let encoded = encode_fields(Some(fields.quantity), Some(&fields.image_url));
        self.patch(id, encoded, &[]).await
    }

    async fn merge(&self, id: &str, patch: &FieldPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let mut mask = Vec::new();
        if patch.quantity.is_some() {
            mask.push(QUANTITY_FIELD);
        }
        if patch.image_url.is_some() {
            mask.push(IMAGE_URL_FIELD);
        }
        let encoded = encode_fields(patch.quantity, patch.image_url.as_deref());
        self.patch(id, encoded, &mask).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .http
            .delete(self.doc_url(id))
            .query(&[self.key()])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }
}

pub struct Storage {
    client: FirebaseClient,
    base: String,
}

impl Storage {
    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base, encode_segment(path))
    }

    fn media_url(&self, path: &str, token: &str) -> String {
        format!(
            "{}?alt=media&token={}",
            self.object_url(path),
            encode_segment(token)
        )
    }
}

/// Split the upload into chunks and report each one as the HTTP client
/// pulls it off the stream.
fn progress_body(bytes: &Bytes, progress: Option<ProgressSender>) -> reqwest::Body {
    let total = bytes.len() as u64;
    let chunks: Vec<Bytes> = (0..bytes.len())
        .step_by(UPLOAD_CHUNK)
        .map(|start| bytes.slice(start..(start + UPLOAD_CHUNK).min(bytes.len())))
        .collect();

    let mut sent = 0u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(tx) = &progress {
            let _ = tx.send(UploadProgress {
                bytes_transferred: sent,
                total_bytes: total,
            });
        }
        Ok::<Bytes, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(stream)
}

#[async_trait]
impl BlobStore for Storage {
    async fn upload(
        &self,
        path: &str,
        file: &PendingUpload,
        progress: Option<ProgressSender>,
    ) -> Result<()> {
        let response = self
            .client
            .http
            .post(&self.base)
            .query(&[("uploadType", "media"), ("name", path)])
            .header(reqwest::header::CONTENT_TYPE, file.content_type.as_str())
            .header(reqwest::header::CONTENT_LENGTH, file.len())
            .body(progress_body(&file.bytes, progress))
            .send()
            .await
            .map_err(|e| PantryError::Upload(e.to_string()))?;

        check(response).await.map_err(|e| match e {
            PantryError::Backend { status, message } => {
                PantryError::Upload(format!("{} ({})", message, status))
            }
            other => other,
        })?;
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String> {
        let response = self.client.http.get(self.object_url(path)).send().await?;
        let meta: ObjectMetadata = check(response).await?.json().await?;
        let token = meta
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PantryError::Backend {
                status: 404,
                message: format!("Object {} has no download token", path),
            })?;
        Ok(self.media_url(path, token))
    }
}
