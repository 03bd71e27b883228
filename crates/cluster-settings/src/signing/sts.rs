// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! STS role exchanges: `AssumeRole` signed with base credentials and the
//! unsigned `AssumeRoleWithWebIdentity` used by service-account tokens.

use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::{Client, Request, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::sigv4::sign_request;
use super::Credentials;
use crate::error::{SigningError, StatusFailure};

const STS_SERVICE: &str = "sts";
const STS_API_VERSION: &str = "2011-06-15";
const GLOBAL_STS_ENDPOINT: &str = "https://sts.amazonaws.com";

/// Regional endpoint when a region is known, the global one otherwise.
pub(crate) fn default_endpoint(region: Option<&str>) -> String {
    match region {
        Some(region) => format!("https://sts.{region}.amazonaws.com"),
        None => GLOBAL_STS_ENDPOINT.to_string(),
    }
}

pub(crate) fn session_name() -> String {
    format!("cluster-settings-{}", Utc::now().timestamp_millis())
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleEnvelope {
    assume_role_response: AssumeRoleResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    assume_role_result: RoleResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WebIdentityEnvelope {
    assume_role_with_web_identity_response: WebIdentityResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WebIdentityResponse {
    assume_role_with_web_identity_result: RoleResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RoleResult {
    credentials: StsCredentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
}

impl From<StsCredentials> for Credentials {
    fn from(credentials: StsCredentials) -> Self {
        Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            Some(credentials.session_token),
        )
    }
}

/// Exchanges `base` for the temporary credentials of `role_arn`.
pub(crate) async fn assume_role(
    http: &Client,
    endpoint: &str,
    region: &str,
    role_arn: &str,
    base: &Credentials,
) -> Result<Credentials, SigningError> {
    let session_name = session_name();
    let url = action_url(
        endpoint,
        &[
            ("Action", "AssumeRole"),
            ("RoleArn", role_arn),
            ("RoleSessionName", &session_name),
        ],
    )?;
    let mut request = build(http, url)?;
    sign_request(&mut request, None, base, region, STS_SERVICE, Utc::now())?;

    debug!(role_arn, endpoint, "assuming role");
    let envelope: AssumeRoleEnvelope = call(http, request, role_arn).await?;
    Ok(envelope.assume_role_response.assume_role_result.credentials.into())
}

/// Exchanges an OIDC token for the temporary credentials of `role_arn`.
/// The call carries no signature; the token is the proof of identity.
pub(crate) async fn assume_role_with_web_identity(
    http: &Client,
    endpoint: &str,
    role_arn: &str,
    session_name: &str,
    token: &str,
) -> Result<Credentials, SigningError> {
    let url = action_url(
        endpoint,
        &[
            ("Action", "AssumeRoleWithWebIdentity"),
            ("RoleArn", role_arn),
            ("RoleSessionName", session_name),
            ("WebIdentityToken", token),
        ],
    )?;
    let request = build(http, url)?;

    debug!(role_arn, endpoint, "assuming role with web identity");
    let envelope: WebIdentityEnvelope = call(http, request, role_arn).await?;
    Ok(envelope
        .assume_role_with_web_identity_response
        .assume_role_with_web_identity_result
        .credentials
        .into())
}

fn action_url(endpoint: &str, params: &[(&str, &str)]) -> Result<Url, SigningError> {
    let mut url = Url::parse(endpoint).map_err(|err| {
        SigningError::Delegation(format!("invalid STS endpoint {endpoint}: {err}"))
    })?;
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key, value);
        }
        query.append_pair("Version", STS_API_VERSION);
    }
    Ok(url)
}

fn build(http: &Client, url: Url) -> Result<Request, SigningError> {
    http.get(url)
        .header(ACCEPT, "application/json")
        .build()
        .map_err(|err| SigningError::Delegation(err.to_string()))
}

async fn call<T: DeserializeOwned>(
    http: &Client,
    request: Request,
    role_arn: &str,
) -> Result<T, SigningError> {
    let response = http
        .execute(request)
        .await
        .map_err(|err| SigningError::Delegation(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| SigningError::Delegation(err.to_string()))?;
    if !status.is_success() {
        let failure = StatusFailure {
            status,
            body: Some(body).filter(|b| !b.is_empty()),
        };
        return Err(SigningError::Delegation(format!("{role_arn}: {failure}")));
    }

    serde_json::from_str(&body)
        .map_err(|err| SigningError::Delegation(format!("unexpected STS response: {err}")))
}
