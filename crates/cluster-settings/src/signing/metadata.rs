// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Credentials served by the compute platform: the container credentials
//! endpoint (ECS, EKS pod identity) and the EC2 instance metadata service.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use tracing::debug;

use super::Credentials;
use crate::error::{SigningError, StatusFailure};

const METADATA_TIMEOUT: Duration = Duration::from_secs(2);
const IMDS_TOKEN_PATH: &str = "/latest/api/token";
const IMDS_CREDENTIALS_PATH: &str = "/latest/meta-data/iam/security-credentials/";
const IMDS_TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const IMDS_TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
const IMDS_TOKEN_TTL_SECONDS: &str = "21600";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetadataCredentials {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
}

impl From<MetadataCredentials> for Credentials {
    fn from(credentials: MetadataCredentials) -> Self {
        Credentials::new(
            credentials.access_key_id,
            credentials.secret_access_key,
            credentials.token.filter(|t| !t.is_empty()),
        )
    }
}

pub(crate) async fn container_credentials(
    http: &Client,
    url: &str,
    authorization: Option<&str>,
) -> Result<Credentials, SigningError> {
    let mut request = http.get(url).timeout(METADATA_TIMEOUT);
    if let Some(authorization) = authorization {
        request = request.header(AUTHORIZATION, authorization);
    }
    debug!(url, "fetching container credentials");
    let body = fetch_text(request)
        .await
        .map_err(|err| SigningError::Credentials(format!("container credentials: {err}")))?;
    parse(&body).map_err(|err| SigningError::Credentials(format!("container credentials: {err}")))
}

/// IMDSv2 session token first; an endpoint refusing tokens is queried
/// without one.
pub(crate) async fn instance_credentials(
    http: &Client,
    endpoint: &str,
) -> Result<Credentials, SigningError> {
    let endpoint = endpoint.trim_end_matches('/');
    let failure = |err: String| SigningError::Credentials(format!("instance metadata: {err}"));

    let token_request = http
        .request(Method::PUT, format!("{endpoint}{IMDS_TOKEN_PATH}"))
        .header(IMDS_TOKEN_TTL_HEADER, IMDS_TOKEN_TTL_SECONDS)
        .timeout(METADATA_TIMEOUT);
    let token = match fetch_text(token_request).await {
        Ok(token) => Some(token.trim().to_string()),
        Err(MetadataError::Status(refused)) => {
            debug!(%refused, "instance metadata token refused, continuing without one");
            None
        }
        Err(err) => return Err(failure(err.to_string())),
    };

    let with_token = |request: RequestBuilder| match &token {
        Some(token) => request
            .header(IMDS_TOKEN_HEADER, token.as_str())
            .timeout(METADATA_TIMEOUT),
        None => request.timeout(METADATA_TIMEOUT),
    };

    let roles = fetch_text(with_token(
        http.get(format!("{endpoint}{IMDS_CREDENTIALS_PATH}")),
    ))
    .await
    .map_err(|err| failure(err.to_string()))?;
    let role = roles
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| failure("no instance profile attached".to_string()))?;

    debug!(role, "fetching instance profile credentials");
    let body = fetch_text(with_token(
        http.get(format!("{endpoint}{IMDS_CREDENTIALS_PATH}{role}")),
    ))
    .await
    .map_err(|err| failure(err.to_string()))?;
    parse(&body).map_err(failure)
}

fn parse(body: &str) -> Result<Credentials, String> {
    serde_json::from_str::<MetadataCredentials>(body)
        .map(Credentials::from)
        .map_err(|err| format!("unexpected response: {err}"))
}

#[derive(Debug, thiserror::Error)]
enum MetadataError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Status(StatusFailure),
}

async fn fetch_text(request: RequestBuilder) -> Result<String, MetadataError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(MetadataError::Status(StatusFailure {
            status,
            body: Some(body).filter(|b| !b.is_empty()),
        }));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const CREDENTIALS_BODY: &str = r#"{"Code":"Success","Type":"AWS-HMAC",
        "AccessKeyId":"ASIAMETA","SecretAccessKey":"meta-secret","Token":"meta-token",
        "Expiration":"2030-01-01T00:00:00Z"}"#;

    #[tokio::test]
    async fn container_endpoint_sends_authorization() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/credentials/task")
            .match_header("authorization", "Bearer pod-token")
            .with_status(200)
            .with_body(CREDENTIALS_BODY)
            .create_async()
            .await;

        let url = format!("{}/v2/credentials/task", server.url());
        let credentials = container_credentials(&Client::new(), &url, Some("Bearer pod-token"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(credentials.access_key_id, "ASIAMETA");
        assert_eq!(credentials.session_token.as_deref(), Some("meta-token"));
    }

    #[tokio::test]
    async fn container_error_status_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/creds")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let url = format!("{}/creds", server.url());
        let err = container_credentials(&Client::new(), &url, None)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("403"), "{message}");
        assert!(message.contains("forbidden"), "{message}");
    }

    #[tokio::test]
    async fn instance_metadata_uses_session_token() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("PUT", IMDS_TOKEN_PATH)
            .match_header(IMDS_TOKEN_TTL_HEADER, IMDS_TOKEN_TTL_SECONDS)
            .with_status(200)
            .with_body("imds-session")
            .create_async()
            .await;
        let roles = server
            .mock("GET", IMDS_CREDENTIALS_PATH)
            .match_header(IMDS_TOKEN_HEADER, "imds-session")
            .with_status(200)
            .with_body("settings-role\n")
            .create_async()
            .await;
        let credentials_mock = server
            .mock("GET", "/latest/meta-data/iam/security-credentials/settings-role")
            .match_header(IMDS_TOKEN_HEADER, "imds-session")
            .with_status(200)
            .with_body(CREDENTIALS_BODY)
            .create_async()
            .await;

        let credentials = instance_credentials(&Client::new(), &server.url())
            .await
            .unwrap();

        token.assert_async().await;
        roles.assert_async().await;
        credentials_mock.assert_async().await;
        assert_eq!(credentials.access_key_id, "ASIAMETA");
        assert_eq!(credentials.secret_access_key, "meta-secret");
    }

    #[tokio::test]
    async fn instance_metadata_falls_back_without_token() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", IMDS_TOKEN_PATH)
            .with_status(405)
            .create_async()
            .await;
        server
            .mock("GET", IMDS_CREDENTIALS_PATH)
            .match_header(IMDS_TOKEN_HEADER, Matcher::Missing)
            .with_status(200)
            .with_body("legacy-role")
            .create_async()
            .await;
        server
            .mock("GET", "/latest/meta-data/iam/security-credentials/legacy-role")
            .match_header(IMDS_TOKEN_HEADER, Matcher::Missing)
            .with_status(200)
            .with_body(CREDENTIALS_BODY)
            .create_async()
            .await;

        let credentials = instance_credentials(&Client::new(), &server.url())
            .await
            .unwrap();
        assert_eq!(credentials.access_key_id, "ASIAMETA");
    }

    #[tokio::test]
    async fn instance_without_profile_is_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", IMDS_TOKEN_PATH)
            .with_status(200)
            .with_body("imds-session")
            .create_async()
            .await;
        server
            .mock("GET", IMDS_CREDENTIALS_PATH)
            .with_status(404)
            .create_async()
            .await;

        let err = instance_credentials(&Client::new(), &server.url())
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::Credentials(_)));
        assert!(err.to_string().contains("404"));
    }
}
