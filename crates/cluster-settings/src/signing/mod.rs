// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Request signing strategies.
//!
//! A signer is chosen once when the connection is built and shared read-only
//! by every request issued through that connection.

mod credentials;
mod metadata;
mod sigv4;
mod sts;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Url};

use crate::error::SigningError;

pub use credentials::{Credentials, CredentialsProvider};
pub use sigv4::AwsSigner;

/// Attaches authentication material to an outbound request.
///
/// Implementations only add headers; method, URL and body are left untouched.
/// The body is passed separately as a borrowed slice so it can be hashed
/// without consuming what the transport will send.
#[async_trait]
pub trait RequestSigner: Send + Sync {
    async fn sign(&self, request: &mut Request, body: Option<&[u8]>) -> Result<(), SigningError>;
}

/// Used when no authentication is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSigner;

#[async_trait]
impl RequestSigner for NoOpSigner {
    async fn sign(&self, _request: &mut Request, _body: Option<&[u8]>) -> Result<(), SigningError> {
        Ok(())
    }
}

/// Snapshot of what gets signed, taken fresh for every request.
#[derive(Debug, Clone)]
pub struct SigningContext<'a> {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: &'a [u8],
    pub timestamp: DateTime<Utc>,
}

impl<'a> SigningContext<'a> {
    pub fn new(request: &Request, body: Option<&'a [u8]>, timestamp: DateTime<Utc>) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: body.unwrap_or_default(),
            timestamp,
        }
    }

    /// Path component of the target URL.
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_signer_leaves_request_untouched() {
        let url = Url::parse("http://localhost:9200/_cluster/settings?flat_settings").unwrap();
        let mut request = Request::new(Method::GET, url.clone());
        NoOpSigner.sign(&mut request, None).await.unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url(), &url);
        assert!(request.headers().is_empty());
    }

    #[test]
    fn context_defaults_to_empty_body() {
        let url = Url::parse("https://search.example.com/_cluster/settings").unwrap();
        let request = Request::new(Method::PUT, url);
        let context = SigningContext::new(&request, None, Utc::now());
        assert!(context.body.is_empty());
        assert_eq!(context.path(), "/_cluster/settings");
    }
}
