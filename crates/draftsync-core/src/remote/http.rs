//! HTTP remote store client.
//!
//! Talks to a draft sync service exposing point read/upsert per draft id and
//! an append-only event endpoint:
//!
//! - `GET  {endpoint}/drafts/{id}` -> 200 with a [`RemoteDraft`], or 404
//! - `PUT  {endpoint}/drafts/{id}` <- [`RemoteDraft`]
//! - `POST {endpoint}/events`      <- [`DraftEvent`]

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{DraftEvent, DraftId};
use crate::remote::{EventSink, RemoteDraft, RemoteStore};
use crate::util::compact_text;

/// Remote store client over HTTP
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    endpoint: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl HttpRemoteStore {
    /// Create a client for the given base endpoint
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            endpoint: normalize_endpoint(endpoint.into())?,
            bearer_token: None,
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Attach a bearer token to every request
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header("Accept", "application/json");
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn draft_url(&self, id: DraftId) -> String {
        format!("{}/drafts/{id}", self.endpoint)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self, id: DraftId) -> Result<Option<RemoteDraft>> {
        let response = self
            .request(self.client.get(self.draft_url(id)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(parse_api_error(status, &body)));
        }

        Ok(Some(response.json::<RemoteDraft>().await?))
    }

    async fn upsert(&self, draft: &RemoteDraft) -> Result<()> {
        let response = self
            .request(self.client.put(self.draft_url(draft.id)).json(draft))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(parse_api_error(status, &body)));
        }
        Ok(())
    }
}

#[async_trait]
impl EventSink for HttpRemoteStore {
    async fn append(&self, event: &DraftEvent) -> Result<()> {
        let url = format!("{}/events", self.endpoint);
        let response = self.request(self.client.post(url).json(event)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote(parse_api_error(status, &body)));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}

fn normalize_endpoint(raw: String) -> Result<String> {
    let endpoint = raw.trim();
    if endpoint.is_empty() {
        return Err(Error::InvalidInput("endpoint must not be empty".to_string()));
    }
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(Error::InvalidInput(
            "endpoint must include http:// or https://".to_string(),
        ))
    }
}
