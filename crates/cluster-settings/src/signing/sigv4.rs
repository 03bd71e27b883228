// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! AWS Signature Version 4 header signing.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Request, Url};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{Credentials, CredentialsProvider, RequestSigner, SigningContext};
use crate::error::SigningError;

/// Service identifier for the managed search domain.
pub const SEARCH_SERVICE: &str = "es";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Request headers excluded from the canonical set. `host` is derived from the URL instead.
const UNSIGNED_HEADERS: [&str; 4] = ["authorization", "user-agent", "x-amzn-trace-id", "host"];

type HmacSha256 = Hmac<Sha256>;

/// Signs requests for one service and region with lazily resolved credentials.
#[derive(Debug, Clone)]
pub struct AwsSigner {
    service: String,
    region: String,
    credentials: Arc<CredentialsProvider>,
}

impl AwsSigner {
    pub fn new(region: impl Into<String>, credentials: CredentialsProvider) -> Self {
        Self {
            service: SEARCH_SERVICE.to_string(),
            region: region.into(),
            credentials: Arc::new(credentials),
        }
    }

    /// Overrides the service identifier the signature is bound to.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Signs as of `timestamp` instead of the wall clock.
    pub async fn sign_at(
        &self,
        request: &mut Request,
        body: Option<&[u8]>,
        timestamp: DateTime<Utc>,
    ) -> Result<(), SigningError> {
        let credentials = self.credentials.credentials().await?;
        sign_request(
            request,
            body,
            credentials,
            &self.region,
            &self.service,
            timestamp,
        )
    }
}

#[async_trait]
impl RequestSigner for AwsSigner {
    async fn sign(&self, request: &mut Request, body: Option<&[u8]>) -> Result<(), SigningError> {
        self.sign_at(request, body, Utc::now()).await
    }
}

/// Adds `x-amz-date`, the session token when present, and `authorization`.
pub(crate) fn sign_request(
    request: &mut Request,
    body: Option<&[u8]>,
    credentials: &Credentials,
    region: &str,
    service: &str,
    timestamp: DateTime<Utc>,
) -> Result<(), SigningError> {
    let date = timestamp.format("%Y%m%d").to_string();
    let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();

    {
        let headers = request.headers_mut();
        headers.remove(AUTHORIZATION);
        headers.remove(X_AMZ_SECURITY_TOKEN);
        headers.insert(
            HeaderName::from_static(X_AMZ_DATE),
            HeaderValue::from_str(&amz_date)?,
        );
        if let Some(token) = &credentials.session_token {
            headers.insert(
                HeaderName::from_static(X_AMZ_SECURITY_TOKEN),
                HeaderValue::from_str(token)?,
            );
        }
    }

    let context = SigningContext::new(request, body, timestamp);
    let (canonical_request, signed_headers) = canonical_request(&context)?;

    let credential_scope = format!("{date}/{region}/{service}/aws4_request");
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{credential_scope}\n{}",
        hex_sha256(canonical_request.as_bytes())
    );
    let signature = calculate_signature(
        &credentials.secret_access_key,
        &date,
        region,
        service,
        &string_to_sign,
    )?;

    let authorization = format!(
        "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
        credentials.access_key_id
    );
    request
        .headers_mut()
        .insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);

    debug!(
        method = %context.method,
        path = context.path(),
        service,
        region,
        signed_headers = %signed_headers,
        "signed request"
    );
    Ok(())
}

/// Returns the canonical request and the `;`-joined signed header list.
fn canonical_request(context: &SigningContext<'_>) -> Result<(String, String), SigningError> {
    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    headers.insert("host".to_string(), vec![host_header(&context.url)?]);
    for (name, value) in &context.headers {
        let name = name.as_str().to_ascii_lowercase();
        if UNSIGNED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(name)
            .or_default()
            .push(value.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    let mut canonical_headers = String::new();
    for (name, values) in &headers {
        let _ = writeln!(canonical_headers, "{name}:{}", values.join(","));
    }
    let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

    let canonical = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        context.method.as_str(),
        uri_encode_path(context.url.path()),
        canonical_query_string(&context.url),
        canonical_headers,
        signed_headers,
        hex_sha256(context.body)
    );
    Ok((canonical, signed_headers))
}

fn host_header(url: &Url) -> Result<String, SigningError> {
    let host = url.host_str().ok_or(SigningError::MissingHost)?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn canonical_query_string(url: &Url) -> String {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode_value(&k), uri_encode_value(&v)))
        .collect();
    params.sort();
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// URI-encodes a path, keeping `/`. Already-escaped input is escaped again.
fn uri_encode_path(path: &str) -> String {
    encode(path, true)
}

fn uri_encode_value(value: &str) -> String {
    encode(value, false)
}

fn encode(input: &str, keep_slash: bool) -> String {
    let mut result = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            b'/' if keep_slash => result.push('/'),
            _ => {
                let _ = write!(result, "%{byte:02X}");
            }
        }
    }
    result
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SigningError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn calculate_signature(
    secret_key: &str,
    date: &str,
    region: &str,
    service: &str,
    string_to_sign: &str,
) -> Result<String, SigningError> {
    let k_date = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
    Ok(hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?))
}
