//! Cloud Firestore document store
//!
//! Talks to the Firestore v1 REST API. Documents travel as typed
//! `fields` maps (`stringValue`, `doubleValue`, `mapValue`, ...), so
//! plain JSON is converted on the way in and out.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{Document, DocumentStore, StoreError, StoreResult};
use crate::config::FirestoreConfig;

/// Page size used when listing a collection
const LIST_PAGE_SIZE: u32 = 300;

pub struct FirestoreStore {
    client: Client,
    config: FirestoreConfig,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> StoreResult<Self> {
        if config.project_id.is_empty() {
            return Err(StoreError::Config(
                "Firestore backend needs a project_id".to_string(),
            ));
        }

        if config.access_token.is_none() && config.api_key.is_none() {
            tracing::warn!("No Firestore credentials configured; relying on open security rules");
        }

        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    /// URL of the documents root for the configured project
    fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.project_id)
        )
    }

    /// URL of a collection or document, each path segment escaped
    fn path_url(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .flat_map(|s| s.split('/'))
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.documents_url(), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.config.access_token, &self.config.api_key) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(key)) => request.query(&[("key", key)]),
            (None, None) => request,
        }
    }

    /// Turn a non-success response into an error
    async fn check(response: Response, collection: &str, id: &str) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 404 && !id.is_empty() {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        let message = match response.text().await {
            Ok(text) => text,
            Err(e) => format!("failed to read error body: {}", e),
        };
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    #[tracing::instrument(skip(self, document))]
    async fn add(&self, collection: &str, document: &Value) -> StoreResult<String> {
        let body = json!({ "fields": encode_fields(document)? });

        let request = self.client.post(self.path_url(&[collection])).json(&body);
        let response = self.authorize(request).send().await?;
        let response = Self::check(response, collection, "").await?;

        let created: FirestoreDocument = response.json().await?;
        Ok(document_id(&created.name))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.path_url(&[collection]))
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = self.authorize(request).send().await?;
            let response = Self::check(response, collection, "").await?;
            let page: ListResponse = response.json().await?;

            for doc in page.documents {
                documents.push(Document {
                    id: document_id(&doc.name),
                    data: decode_fields(&doc.fields)?,
                });
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn update(&self, collection: &str, id: &str, fields: &Value) -> StoreResult<()> {
        let object = fields.as_object().ok_or_else(|| {
            StoreError::Serialization("update fields must be a JSON object".to_string())
        })?;

        let mut query: Vec<(&str, String)> = object
            .keys()
            .map(|k| ("updateMask.fieldPaths", field_path(k)))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));

        let body = json!({ "fields": encode_fields(fields)? });
        let request = self
            .client
            .patch(self.path_url(&[collection, id]))
            .query(&query)
            .json(&body);

        let response = self.authorize(request).send().await?;
        Self::check(response, collection, id).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let request = self.client.delete(self.path_url(&[collection, id]));
        let response = self.authorize(request).send().await?;
        Self::check(response, collection, id).await?;
        Ok(())
    }
}

/// Last segment of a full document resource name
fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

/// Quote a field name for an update mask unless it is a plain identifier
fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

/// Encode a JSON object as a Firestore `fields` map
pub(crate) fn encode_fields(document: &Value) -> StoreResult<Map<String, Value>> {
    let object = document.as_object().ok_or_else(|| {
        StoreError::Serialization("Firestore documents must be JSON objects".to_string())
    })?;

    Ok(object
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect())
}

/// Encode one JSON value as a Firestore typed value
pub(crate) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            if items.is_empty() {
                json!({ "arrayValue": {} })
            } else {
                let values: Vec<Value> = items.iter().map(encode_value).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode a Firestore `fields` map into a JSON object
pub(crate) fn decode_fields(fields: &Map<String, Value>) -> StoreResult<Value> {
    let mut object = Map::new();
    for (k, v) in fields {
        object.insert(k.clone(), decode_value(v)?);
    }
    Ok(Value::Object(object))
}

/// Decode one Firestore typed value
pub(crate) fn decode_value(value: &Value) -> StoreResult<Value> {
    let typed = value
        .as_object()
        .and_then(|o| o.iter().next())
        .map(|(kind, inner)| (kind.as_str(), inner))
        .ok_or_else(|| StoreError::Serialization(format!("not a Firestore value: {}", value)))?;

    let decoded = match typed {
        ("nullValue", _) => Value::Null,
        ("booleanValue", b) => b.clone(),
        ("integerValue", i) => {
            let parsed = match i {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| StoreError::Serialization(format!("bad integerValue: {}", i)))?
        }
        // Non-finite doubles arrive as strings and have no JSON form
        ("doubleValue", Value::Number(n)) => Value::Number(n.clone()),
        ("doubleValue", _) => Value::Null,
        ("stringValue", s) | ("timestampValue", s) | ("referenceValue", s) | ("bytesValue", s) => {
            s.clone()
        }
        ("geoPointValue", p) => p.clone(),
        ("arrayValue", a) => {
            let values = a
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect::<StoreResult<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Value::Array(values)
        }
        ("mapValue", m) => match m.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields)?,
            None => Value::Object(Map::new()),
        },
        (kind, _) => {
            return Err(StoreError::Serialization(format!(
                "unsupported Firestore value type: {}",
                kind
            )))
        }
    };

    Ok(decoded)
}
