/// HTTP record source.
///
/// Talks to the club registration REST API with reqwest. Every request is a
/// single attempt with the client's default timeouts; non-2xx responses are
/// returned as `SourceError::Status` with the response body for context.

use crate::entity::EntityKind;
use crate::error::SourceError;
use crate::source::{DeleteTarget, JsonMap, RecordSource};
use crate::table::RecordKey;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpSource { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(request: RequestBuilder) -> Result<Response, SourceError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("request failed with {}: {}", status, body);
        Err(SourceError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_rows(&self, path: &str) -> Result<Vec<JsonValue>, SourceError> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        let response = Self::send(self.client.get(&url)).await?;
        let body = response.bytes().await?;
        let rows: Vec<JsonValue> = serde_json::from_slice(&body)?;
        Ok(rows)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch_all(&self, entity: EntityKind) -> Result<Vec<JsonValue>, SourceError> {
        let endpoints = entity.endpoints();
        self.get_rows(endpoints.list).await
    }

    async fn fetch_member_counts(&self) -> Result<Vec<JsonValue>, SourceError> {
        match EntityKind::Club.endpoints().counts {
            Some(path) => self.get_rows(path).await,
            None => Ok(Vec::new()),
        }
    }

    async fn create(&self, entity: EntityKind, fields: &JsonMap) -> Result<(), SourceError> {
        let url = self.url(entity.endpoints().create);
        log::debug!("POST {}", url);
        Self::send(self.client.post(&url).json(fields)).await?;
        Ok(())
    }

    async fn update(&self, entity: EntityKind, key: &RecordKey, fields: &JsonMap) -> Result<(), SourceError> {
        let url = self.url(&entity.endpoints().update_path(&key.to_string()));
        log::debug!("PUT {}", url);
        Self::send(self.client.put(&url).json(fields)).await?;
        Ok(())
    }

    async fn delete(&self, entity: EntityKind, target: &DeleteTarget) -> Result<(), SourceError> {
        let endpoints = entity.endpoints();
        let request = match target {
            DeleteTarget::One(key) => self.client.delete(self.url(&endpoints.delete_one_path(&key.to_string()))),
            DeleteTarget::Many(keys) => {
                let ids: Vec<JsonValue> = keys.iter().map(RecordKey::to_json).collect();
                let mut body = JsonMap::new();
                body.insert(endpoints.delete_many_field.to_string(), json!(ids));
                self.client.delete(self.url(endpoints.delete_many)).json(&body)
            }
        };
        log::debug!("DELETE {} ({} keys)", entity, target.len());
        Self::send(request).await?;
        Ok(())
    }

    async fn bulk_import(&self, entity: EntityKind, file_name: &str, bytes: Vec<u8>) -> Result<(), SourceError> {
        let Some(path) = entity.endpoints().import else {
            return Err(SourceError::Unsupported {
                operation: "bulk import",
                entity: entity.to_string(),
            });
        };
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let url = self.url(path);
        log::debug!("POST {} (multipart)", url);
        Self::send(self.client.post(&url).multipart(form)).await?;
        Ok(())
    }
}
