// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Credential resolution for request signing.
//!
//! Credentials are resolved on first use and cached for the life of the
//! provider. The default chain tries, in order: environment variables, a web
//! identity token, the shared credentials file, the container credentials
//! endpoint and the EC2 instance metadata service. An optional role ARN then
//! exchanges the base credentials through STS `AssumeRole`.

use std::collections::HashMap;
use std::env;
use std::fmt::{self, Debug};
use std::path::PathBuf;

use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::debug;

use super::{metadata, sts};
use crate::error::SigningError;

const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const ENV_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const ENV_SECRET_KEY: &str = "AWS_SECRET_KEY";
const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
const ENV_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";
const ENV_PROFILE: &str = "AWS_PROFILE";
const ENV_HOME: &str = "HOME";
const ENV_USER_PROFILE: &str = "USERPROFILE";
const ENV_WEB_IDENTITY_TOKEN_FILE: &str = "AWS_WEB_IDENTITY_TOKEN_FILE";
const ENV_ROLE_ARN: &str = "AWS_ROLE_ARN";
const ENV_ROLE_SESSION_NAME: &str = "AWS_ROLE_SESSION_NAME";
const ENV_REGION: &str = "AWS_REGION";
const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
const ENV_STS_ENDPOINT: &str = "AWS_ENDPOINT_URL_STS";
const ENV_CONTAINER_RELATIVE_URI: &str = "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI";
const ENV_CONTAINER_FULL_URI: &str = "AWS_CONTAINER_CREDENTIALS_FULL_URI";
const ENV_CONTAINER_TOKEN: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN";
const ENV_CONTAINER_TOKEN_FILE: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN_FILE";
const ENV_IMDS_DISABLED: &str = "AWS_EC2_METADATA_DISABLED";
const ENV_IMDS_ENDPOINT: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";

const DEFAULT_PROFILE: &str = "default";
const CONTAINER_CREDENTIALS_HOST: &str = "http://169.254.170.2";
const DEFAULT_IMDS_ENDPOINT: &str = "http://169.254.169.254";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

enum BaseCredentials {
    Static(Credentials),
    /// Snapshot of the process environment taken when the provider was built.
    Chain(HashMap<String, String>),
}

struct RoleDelegation {
    role_arn: String,
    region: String,
    sts_endpoint: String,
}

/// Resolves a credential set once and hands out the cached value afterwards.
pub struct CredentialsProvider {
    base: BaseCredentials,
    role: Option<RoleDelegation>,
    http: Option<Client>,
    resolved: OnceCell<Credentials>,
}

impl CredentialsProvider {
    pub fn new_static(credentials: Credentials) -> Self {
        Self::with_base(BaseCredentials::Static(credentials))
    }

    /// Default chain over the current process environment.
    pub fn from_os_env() -> Self {
        Self::from_env_iter(env::vars())
    }

    /// Default chain over the given key/value pairs (typically for tests).
    pub fn from_env_iter<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::with_base(BaseCredentials::Chain(map))
    }

    fn with_base(base: BaseCredentials) -> Self {
        Self {
            base,
            role: None,
            http: None,
            resolved: OnceCell::new(),
        }
    }

    /// HTTP client used for STS and metadata calls. A bare client is built on
    /// first use when none is given.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Exchanges the base credentials for the given role's temporary credentials.
    ///
    /// `sts_endpoint` defaults to the regional STS endpoint.
    pub fn assume_role(
        mut self,
        role_arn: impl Into<String>,
        region: impl Into<String>,
        sts_endpoint: Option<String>,
    ) -> Self {
        let region = region.into();
        let sts_endpoint = sts_endpoint.unwrap_or_else(|| sts::default_endpoint(Some(&region)));
        self.role = Some(RoleDelegation {
            role_arn: role_arn.into(),
            region,
            sts_endpoint,
        });
        self
    }

    pub async fn credentials(&self) -> Result<&Credentials, SigningError> {
        self.resolved.get_or_try_init(|| self.resolve()).await
    }

    async fn resolve(&self) -> Result<Credentials, SigningError> {
        let http = match &self.http {
            Some(http) => http.clone(),
            None => Client::builder()
                .build()
                .map_err(|err| SigningError::Credentials(err.to_string()))?,
        };
        let base = match &self.base {
            BaseCredentials::Static(credentials) => credentials.clone(),
            BaseCredentials::Chain(env) => resolve_chain(env, &http).await?,
        };
        match &self.role {
            Some(role) => {
                sts::assume_role(
                    &http,
                    &role.sts_endpoint,
                    &role.region,
                    &role.role_arn,
                    &base,
                )
                .await
            }
            None => Ok(base),
        }
    }
}

impl Debug for CredentialsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.base {
            BaseCredentials::Static(_) => "static",
            BaseCredentials::Chain(_) => "default-chain",
        };
        f.debug_struct("CredentialsProvider")
            .field("base", &base)
            .field("role", &self.role.as_ref().map(|r| r.role_arn.as_str()))
            .field("resolved", &self.resolved.initialized())
            .finish()
    }
}

/// Walks the default chain. Links that are not configured are skipped; a
/// configured web identity or container endpoint that fails ends the walk.
async fn resolve_chain(
    env: &HashMap<String, String>,
    http: &Client,
) -> Result<Credentials, SigningError> {
    if let Some(credentials) = credentials_from_env(env) {
        debug!("using credentials from environment");
        return Ok(credentials);
    }

    if let Some(credentials) = web_identity_credentials(env, http).await? {
        return Ok(credentials);
    }

    let mut skipped = vec!["no access key pair in environment".to_string()];
    match shared_file_credentials(env).await {
        Ok(credentials) => return Ok(credentials),
        Err(reason) => skipped.push(reason),
    }

    if let Some(credentials) = container_credentials(env, http).await? {
        return Ok(credentials);
    }

    if non_empty(env.get(ENV_IMDS_DISABLED)).is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        skipped.push("instance metadata disabled".to_string());
    } else {
        let endpoint = non_empty(env.get(ENV_IMDS_ENDPOINT)).unwrap_or(DEFAULT_IMDS_ENDPOINT);
        match metadata::instance_credentials(http, endpoint).await {
            Ok(credentials) => {
                debug!("using instance profile credentials");
                return Ok(credentials);
            }
            Err(SigningError::Credentials(reason)) => skipped.push(reason),
            Err(err) => skipped.push(err.to_string()),
        }
    }

    Err(SigningError::Credentials(skipped.join("; ")))
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn credentials_from_env(env: &HashMap<String, String>) -> Option<Credentials> {
    let access_key_id =
        non_empty(env.get(ENV_ACCESS_KEY_ID)).or_else(|| non_empty(env.get(ENV_ACCESS_KEY)))?;
    let secret_access_key = non_empty(env.get(ENV_SECRET_ACCESS_KEY))
        .or_else(|| non_empty(env.get(ENV_SECRET_KEY)))?;
    Some(Credentials::new(
        access_key_id,
        secret_access_key,
        non_empty(env.get(ENV_SESSION_TOKEN)).map(str::to_string),
    ))
}

async fn web_identity_credentials(
    env: &HashMap<String, String>,
    http: &Client,
) -> Result<Option<Credentials>, SigningError> {
    let (Some(token_file), Some(role_arn)) = (
        non_empty(env.get(ENV_WEB_IDENTITY_TOKEN_FILE)),
        non_empty(env.get(ENV_ROLE_ARN)),
    ) else {
        return Ok(None);
    };

    let token = tokio::fs::read_to_string(token_file).await.map_err(|err| {
        SigningError::Credentials(format!(
            "unable to read web identity token {token_file}: {err}"
        ))
    })?;
    let endpoint = match non_empty(env.get(ENV_STS_ENDPOINT)) {
        Some(endpoint) => endpoint.to_string(),
        None => sts::default_endpoint(
            non_empty(env.get(ENV_REGION)).or_else(|| non_empty(env.get(ENV_DEFAULT_REGION))),
        ),
    };
    let session_name = non_empty(env.get(ENV_ROLE_SESSION_NAME))
        .map(str::to_string)
        .unwrap_or_else(sts::session_name);

    let credentials =
        sts::assume_role_with_web_identity(http, &endpoint, role_arn, &session_name, token.trim())
            .await?;
    debug!(role_arn, "using web identity credentials");
    Ok(Some(credentials))
}

async fn shared_file_credentials(env: &HashMap<String, String>) -> Result<Credentials, String> {
    let path = shared_credentials_path(env)
        .ok_or_else(|| "no home directory for the shared credentials file".to_string())?;
    let profile = non_empty(env.get(ENV_PROFILE)).unwrap_or(DEFAULT_PROFILE);
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|err| format!("unable to read {}: {err}", path.display()))?;
    let credentials = parse_shared_credentials(&contents, profile).ok_or_else(|| {
        format!(
            "profile {profile} in {} has no access key pair",
            path.display()
        )
    })?;
    debug!(profile, path = %path.display(), "using shared credentials file");
    Ok(credentials)
}

fn shared_credentials_path(env: &HashMap<String, String>) -> Option<PathBuf> {
    if let Some(path) = non_empty(env.get(ENV_SHARED_CREDENTIALS_FILE)) {
        return Some(PathBuf::from(path));
    }
    non_empty(env.get(ENV_HOME))
        .or_else(|| non_empty(env.get(ENV_USER_PROFILE)))
        .map(|home| PathBuf::from(home).join(".aws").join("credentials"))
}

/// Reads one profile out of an INI-style shared credentials file.
fn parse_shared_credentials(contents: &str, profile: &str) -> Option<Credentials> {
    let mut in_profile = false;
    let mut values: HashMap<&str, &str> = HashMap::new();
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            continue;
        }
        if !in_profile {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim(), value.trim());
        }
    }

    let access_key_id = values.get("aws_access_key_id").filter(|v| !v.is_empty())?;
    let secret_access_key = values
        .get("aws_secret_access_key")
        .filter(|v| !v.is_empty())?;
    let session_token = values
        .get("aws_session_token")
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string());
    Some(Credentials::new(
        *access_key_id,
        *secret_access_key,
        session_token,
    ))
}

/// Relative URIs are served by the ECS agent's link-local address.
fn container_credentials_url(env: &HashMap<String, String>) -> Option<String> {
    if let Some(relative) = non_empty(env.get(ENV_CONTAINER_RELATIVE_URI)) {
        return Some(format!("{CONTAINER_CREDENTIALS_HOST}{relative}"));
    }
    non_empty(env.get(ENV_CONTAINER_FULL_URI)).map(str::to_string)
}

async fn container_credentials(
    env: &HashMap<String, String>,
    http: &Client,
) -> Result<Option<Credentials>, SigningError> {
    let Some(url) = container_credentials_url(env) else {
        return Ok(None);
    };
    let authorization = match non_empty(env.get(ENV_CONTAINER_TOKEN_FILE)) {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .map(|token| token.trim().to_string())
                .map_err(|err| {
                    SigningError::Credentials(format!(
                        "unable to read container authorization token {path}: {err}"
                    ))
                })?,
        ),
        None => non_empty(env.get(ENV_CONTAINER_TOKEN)).map(str::to_string),
    };

    let credentials =
        metadata::container_credentials(http, &url, authorization.as_deref()).await?;
    debug!(url = %url, "using container credentials");
    Ok(Some(credentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::io::Write;

    #[tokio::test]
    async fn environment_credentials_take_precedence() {
        let provider = CredentialsProvider::from_env_iter([
            ("AWS_ACCESS_KEY_ID", "AKIDENV"),
            ("AWS_SECRET_ACCESS_KEY", "env-secret"),
            ("AWS_SESSION_TOKEN", "env-token"),
            ("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/credentials"),
        ]);
        let credentials = provider.credentials().await.unwrap();
        assert_eq!(credentials.access_key_id, "AKIDENV");
        assert_eq!(credentials.secret_access_key, "env-secret");
        assert_eq!(credentials.session_token.as_deref(), Some("env-token"));
    }

    #[tokio::test]
    async fn legacy_environment_names_are_honoured() {
        let provider = CredentialsProvider::from_env_iter([
            ("AWS_ACCESS_KEY", "AKIDLEGACY"),
            ("AWS_SECRET_KEY", "legacy-secret"),
        ]);
        let credentials = provider.credentials().await.unwrap();
        assert_eq!(credentials.access_key_id, "AKIDLEGACY");
        assert!(credentials.session_token.is_none());
    }

    #[tokio::test]
    async fn falls_back_to_shared_credentials_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[default]\naws_access_key_id = AKIDDEFAULT\naws_secret_access_key = default-secret\n\n\
             # staging\n[staging]\naws_access_key_id=AKIDSTAGING\naws_secret_access_key=staging-secret\n\
             aws_session_token=staging-token"
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let provider = CredentialsProvider::from_env_iter([
            ("AWS_SHARED_CREDENTIALS_FILE", path.clone()),
            ("AWS_PROFILE", "staging".to_string()),
        ]);
        let credentials = provider.credentials().await.unwrap();
        assert_eq!(credentials.access_key_id, "AKIDSTAGING");
        assert_eq!(credentials.session_token.as_deref(), Some("staging-token"));

        let provider =
            CredentialsProvider::from_env_iter([("AWS_SHARED_CREDENTIALS_FILE", path)]);
        let credentials = provider.credentials().await.unwrap();
        assert_eq!(credentials.access_key_id, "AKIDDEFAULT");
    }

    #[tokio::test]
    async fn exhausted_chain_is_an_error() {
        let provider = CredentialsProvider::from_env_iter([
            ("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/credentials"),
            ("AWS_EC2_METADATA_DISABLED", "true"),
        ]);
        let err = provider.credentials().await.unwrap_err();
        assert!(matches!(err, SigningError::Credentials(_)));
        let message = err.to_string();
        assert!(message.starts_with("no credentials found: "), "{message}");
        assert!(message.contains("/nonexistent/credentials"), "{message}");
        assert!(message.contains("instance metadata disabled"), "{message}");
    }

    const WEB_IDENTITY_RESPONSE: &str = r#"{"AssumeRoleWithWebIdentityResponse":
        {"AssumeRoleWithWebIdentityResult":{"Credentials":{"AccessKeyId":"ASIAWEB",
        "SecretAccessKey":"web-secret","SessionToken":"web-token","Expiration":1.7E9}}}}"#;

    const METADATA_RESPONSE: &str = r#"{"AccessKeyId":"ASIAMETA",
        "SecretAccessKey":"meta-secret","Token":"meta-token","Expiration":"2030-01-01T00:00:00Z"}"#;

    fn token_file(token: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{token}").unwrap();
        file
    }

    #[tokio::test]
    async fn web_identity_token_is_exchanged_before_shared_file() {
        let mut sts = Server::new_async().await;
        let mock = sts
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("Action".into(), "AssumeRoleWithWebIdentity".into()),
                Matcher::UrlEncoded("RoleArn".into(), "arn:aws:iam::123456789012:role/pod".into()),
                Matcher::UrlEncoded("RoleSessionName".into(), "settings-pod".into()),
                Matcher::UrlEncoded("WebIdentityToken".into(), "oidc-token".into()),
                Matcher::UrlEncoded("Version".into(), "2011-06-15".into()),
            ]))
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(WEB_IDENTITY_RESPONSE)
            .expect(1)
            .create_async()
            .await;
        let token = token_file("oidc-token");

        let provider = CredentialsProvider::from_env_iter([
            (
                "AWS_WEB_IDENTITY_TOKEN_FILE",
                token.path().to_string_lossy().to_string(),
            ),
            ("AWS_ROLE_ARN", "arn:aws:iam::123456789012:role/pod".to_string()),
            ("AWS_ROLE_SESSION_NAME", "settings-pod".to_string()),
            ("AWS_ENDPOINT_URL_STS", sts.url()),
            ("AWS_CONTAINER_CREDENTIALS_FULL_URI", "http://127.0.0.1:1/unused".to_string()),
            ("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/credentials".to_string()),
        ]);
        let credentials = provider.credentials().await.unwrap();
        provider.credentials().await.unwrap();

        mock.assert_async().await;
        assert_eq!(credentials.access_key_id, "ASIAWEB");
        assert_eq!(credentials.session_token.as_deref(), Some("web-token"));
    }

    #[tokio::test]
    async fn rejected_web_identity_ends_the_chain() {
        let mut sts = Server::new_async().await;
        sts.mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("InvalidIdentityToken")
            .create_async()
            .await;
        let token = token_file("expired");

        let provider = CredentialsProvider::from_env_iter([
            (
                "AWS_WEB_IDENTITY_TOKEN_FILE",
                token.path().to_string_lossy().to_string(),
            ),
            ("AWS_ROLE_ARN", "arn:aws:iam::123456789012:role/pod".to_string()),
            ("AWS_ENDPOINT_URL_STS", sts.url()),
            ("AWS_EC2_METADATA_DISABLED", "true".to_string()),
        ]);
        let err = provider.credentials().await.unwrap_err();
        assert!(matches!(err, SigningError::Delegation(_)));
        assert!(err.to_string().contains("InvalidIdentityToken"));
    }

    #[tokio::test]
    async fn container_endpoint_follows_missing_shared_file() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/credentials/abc")
            .match_header("authorization", "container-secret")
            .with_status(200)
            .with_body(METADATA_RESPONSE)
            .create_async()
            .await;
        let token = token_file("container-secret");

        let provider = CredentialsProvider::from_env_iter([
            (
                "AWS_CONTAINER_CREDENTIALS_FULL_URI",
                format!("{}/v2/credentials/abc", server.url()),
            ),
            (
                "AWS_CONTAINER_AUTHORIZATION_TOKEN_FILE",
                token.path().to_string_lossy().to_string(),
            ),
            ("AWS_CONTAINER_AUTHORIZATION_TOKEN", "ignored".to_string()),
            ("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/credentials".to_string()),
        ]);
        let credentials = provider.credentials().await.unwrap();

        mock.assert_async().await;
        assert_eq!(credentials.access_key_id, "ASIAMETA");
        assert_eq!(credentials.session_token.as_deref(), Some("meta-token"));
    }

    #[tokio::test]
    async fn failing_container_endpoint_skips_instance_metadata() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/creds")
            .with_status(500)
            .create_async()
            .await;
        let imds = server
            .mock("PUT", "/latest/api/token")
            .expect(0)
            .create_async()
            .await;

        let provider = CredentialsProvider::from_env_iter([
            ("AWS_CONTAINER_CREDENTIALS_FULL_URI", format!("{}/creds", server.url())),
            ("AWS_EC2_METADATA_SERVICE_ENDPOINT", server.url()),
            ("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/credentials".to_string()),
        ]);
        let err = provider.credentials().await.unwrap_err();

        imds.assert_async().await;
        assert!(err.to_string().contains("container credentials: 500"));
    }

    #[test]
    fn relative_container_uri_targets_link_local_agent() {
        let env = HashMap::from([(
            ENV_CONTAINER_RELATIVE_URI.to_string(),
            "/v2/credentials/task".to_string(),
        )]);
        assert_eq!(
            container_credentials_url(&env).as_deref(),
            Some("http://169.254.170.2/v2/credentials/task")
        );
        assert!(container_credentials_url(&HashMap::new()).is_none());
    }

    #[tokio::test]
    async fn instance_metadata_is_the_last_link() {
        let mut server = Server::new_async().await;
        server
            .mock("PUT", "/latest/api/token")
            .with_status(200)
            .with_body("imds-session")
            .create_async()
            .await;
        server
            .mock("GET", "/latest/meta-data/iam/security-credentials/")
            .match_header("x-aws-ec2-metadata-token", "imds-session")
            .with_status(200)
            .with_body("instance-role")
            .create_async()
            .await;
        let credentials_mock = server
            .mock("GET", "/latest/meta-data/iam/security-credentials/instance-role")
            .match_header("x-aws-ec2-metadata-token", "imds-session")
            .with_status(200)
            .with_body(METADATA_RESPONSE)
            .expect(1)
            .create_async()
            .await;

        let provider = CredentialsProvider::from_env_iter([
            ("AWS_EC2_METADATA_SERVICE_ENDPOINT", server.url()),
            ("AWS_SHARED_CREDENTIALS_FILE", "/nonexistent/credentials".to_string()),
        ]);
        let credentials = provider.credentials().await.unwrap();
        provider.credentials().await.unwrap();

        credentials_mock.assert_async().await;
        assert_eq!(credentials.access_key_id, "ASIAMETA");
    }

    #[test]
    fn missing_profile_yields_none() {
        let contents = "[default]\naws_access_key_id = AKID\naws_secret_access_key = s\n";
        assert!(parse_shared_credentials(contents, "prod").is_none());
        assert!(parse_shared_credentials("[default]\naws_access_key_id = AKID\n", "default").is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let credentials = Credentials::new("AKID", "very-secret", Some("token".to_string()));
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("AKID"));
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("\"token\""));
    }
}
