// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client for the `_cluster/settings` endpoint.
//!
//! Requests are fully built (URL, headers, body) before they are handed to
//! the signer so the signature covers the exact bytes that go on the wire.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Request, Response, Url};
use tracing::debug;

use crate::error::{Error, FetchError, Result, StatusFailure, UpdateError};
use crate::model::{PersistentSettings, SettingsMessage};
use crate::signing::RequestSigner;

const SETTINGS_PATH: &str = "/_cluster/settings";
const FLAT_SETTINGS_QUERY: &str = "flat_settings";
const JSON_CONTENT_TYPE: &str = "application/json";
const USER_AGENT: &str = concat!("cluster-settings/", env!("CARGO_PKG_VERSION"));

/// Read/write access to the persistent settings document.
#[async_trait]
pub trait SettingsApi: Send + Sync {
    async fn fetch(&self) -> Result<PersistentSettings>;

    async fn update(&self, settings: &PersistentSettings) -> Result<()>;
}

/// Builds the HTTP client shared by settings and credential requests.
pub fn create_http_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

/// Immutable connection to one cluster: endpoint, HTTP client and signer.
#[derive(Clone)]
pub struct SettingsClient {
    client: Client,
    settings_url: Url,
    signer: Arc<dyn RequestSigner>,
}

impl SettingsClient {
    pub fn new(endpoint: &str, signer: Arc<dyn RequestSigner>) -> Result<Self> {
        Self::with_http_client(endpoint, signer, create_http_client()?)
    }

    pub fn with_http_client(
        endpoint: &str,
        signer: Arc<dyn RequestSigner>,
        client: Client,
    ) -> Result<Self> {
        let raw = format!("{}{SETTINGS_PATH}", endpoint.trim_end_matches('/'));
        let settings_url = Url::parse(&raw)
            .map_err(|err| Error::Config(format!("invalid endpoint {endpoint:?}: {err}")))?;
        Ok(Self {
            client,
            settings_url,
            signer,
        })
    }

    pub fn settings_url(&self) -> &Url {
        &self.settings_url
    }

    /// Signs and sends a request that is already complete.
    async fn send(&self, mut request: Request, body: Option<&[u8]>) -> Result<Response> {
        self.signer.sign(&mut request, body).await?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(
            method = %method,
            url = %url,
            headers = ?redact_headers(request.headers()),
            body_len = body.map_or(0, <[u8]>::len),
            "cluster settings HTTP request"
        );

        let response = self.client.execute(request).await?;
        debug!(
            method = %method,
            url = %url,
            status = %response.status(),
            "cluster settings HTTP response"
        );
        Ok(response)
    }
}

#[async_trait]
impl SettingsApi for SettingsClient {
    async fn fetch(&self) -> Result<PersistentSettings> {
        let mut url = self.settings_url.clone();
        url.set_query(Some(FLAT_SETTINGS_QUERY));
        let request = self.client.get(url).build()?;

        let response = self.send(request, None).await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(status_failure(response).await).into());
        }

        let bytes = response.bytes().await?;
        let message: SettingsMessage = serde_json::from_slice(&bytes).map_err(Error::Decode)?;
        message
            .persistent
            .ok_or_else(|| FetchError::MissingPersistent.into())
    }

    async fn update(&self, settings: &PersistentSettings) -> Result<()> {
        let message = SettingsMessage {
            persistent: Some(settings.clone()),
        };
        let body = serde_json::to_vec(&message).map_err(Error::Encode)?;
        let request = self
            .client
            .put(self.settings_url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body.clone())
            .build()?;

        let response = self.send(request, Some(&body)).await?;
        if !response.status().is_success() {
            return Err(UpdateError::Status(status_failure(response).await).into());
        }
        Ok(())
    }
}

/// Collects status and body of a non-2xx response. An unreadable or empty
/// body is left out.
async fn status_failure(response: Response) -> StatusFailure {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) if !body.is_empty() => Some(body),
        Ok(_) => None,
        Err(err) => {
            debug!(status = %status, "unable to read error response body: {err}");
            None
        }
    };
    if let Some(body) = &body {
        debug!(
            status = %status,
            body = %truncate_preview_text(Cow::Borrowed(body.as_str())),
            "cluster settings error response"
        );
    }
    StatusFailure { status, body }
}

/// Returns a redacted view of request headers suitable for debug logging.
fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    const SENSITIVE_HEADERS: [&str; 2] = ["authorization", "x-amz-security-token"];

    headers
        .iter()
        .map(|(name, value)| {
            let lower = name.as_str().to_ascii_lowercase();
            let display = if SENSITIVE_HEADERS.contains(&lower.as_str()) {
                "<redacted>".to_string()
            } else {
                value
                    .to_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| "<non-utf8>".to_string())
            };
            (lower, display)
        })
        .collect()
}

fn truncate_preview_text(text: Cow<'_, str>) -> String {
    const MAX_CHARS: usize = 1024;
    let mut chars = text.chars();
    let mut preview = String::new();
    for _ in 0..MAX_CHARS {
        match chars.next() {
            Some(ch) => preview.push(ch),
            None => return preview,
        }
    }
    if chars.next().is_some() {
        preview.push('…');
    }
    preview
}
