// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Connection configuration handed over by the host.
//!
//! The configuration is turned into an immutable [`SettingsClient`] exactly
//! once; the signing strategy is picked here and never switched afterwards.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::client::{create_http_client, SettingsClient};
use crate::error::{Error, Result};
use crate::signing::{AwsSigner, CredentialsProvider, NoOpSigner, RequestSigner};

/// Cluster URL, e.g. `https://search-domain.eu-west-1.es.amazonaws.com`.
const ENV_ENDPOINT: &str = "OPENSEARCH_ENDPOINT";
/// Region enabling request signing when set.
const ENV_AWS_REGION: &str = "OPENSEARCH_AWS_REGION";
/// Optional ARN of the role to assume before signing.
const ENV_AWS_ROLE: &str = "OPENSEARCH_AWS_ROLE";
/// Optional STS endpoint override used for role assumption.
const ENV_AWS_STS_ENDPOINT: &str = "OPENSEARCH_AWS_STS_ENDPOINT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Server's URL.
    pub endpoint: String,
    /// Sign requests according to AWS requirements.
    #[serde(default)]
    pub aws_request_signing: Option<AwsSigningConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AwsSigningConfig {
    pub region: String,
    /// ARN of the role to assume when getting credentials.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub sts_endpoint: Option<String>,
}

impl AwsSigningConfig {
    /// Role ARN, with an empty string meaning "no role".
    pub fn role(&self) -> Option<&str> {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
    }
}

impl ProviderConfig {
    pub fn from_os_env() -> Self {
        Self::from_env_iter(env::vars())
    }

    /// Builds the configuration from key/value pairs (typically for tests).
    ///
    /// Signing is enabled as soon as a region or a role is present.
    pub fn from_env_iter<I, K, V>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let region = get(ENV_AWS_REGION);
        let role = get(ENV_AWS_ROLE);
        let aws_request_signing = if region.is_some() || role.is_some() {
            Some(AwsSigningConfig {
                region: region.unwrap_or_default(),
                role,
                sts_endpoint: get(ENV_AWS_STS_ENDPOINT),
            })
        } else {
            None
        };

        Self {
            endpoint: get(ENV_ENDPOINT).unwrap_or_default(),
            aws_request_signing,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::Config("endpoint must be configured".to_string()));
        }
        let url = Url::parse(&self.endpoint).map_err(|err| {
            Error::Config(format!("endpoint {:?} is not a valid URL: {err}", self.endpoint))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "endpoint {:?} must use http or https",
                self.endpoint
            )));
        }

        if let Some(signing) = &self.aws_request_signing {
            if signing.region.trim().is_empty() {
                return Err(Error::Config("unable to parse config region".to_string()));
            }
        }
        Ok(())
    }

    /// Validates the configuration and builds the connection, resolving
    /// signing credentials through the default chain.
    pub fn connect(&self) -> Result<SettingsClient> {
        self.connect_with_credentials(CredentialsProvider::from_os_env())
    }

    /// Same as [`connect`](Self::connect) with explicit base credentials. The
    /// configured role, if any, is still assumed on top of them.
    pub fn connect_with_credentials(
        &self,
        credentials: CredentialsProvider,
    ) -> Result<SettingsClient> {
        self.validate()?;
        let http = create_http_client()?;

        let signer: Arc<dyn RequestSigner> = match &self.aws_request_signing {
            Some(signing) => {
                let credentials = credentials.with_http_client(http.clone());
                let credentials = match signing.role() {
                    Some(role) => credentials.assume_role(
                        role,
                        signing.region.trim(),
                        signing.sts_endpoint.clone(),
                    ),
                    None => credentials,
                };
                debug!(
                    region = %signing.region,
                    role = ?signing.role(),
                    "signing cluster settings requests"
                );
                Arc::new(AwsSigner::new(signing.region.trim(), credentials))
            }
            None => {
                debug!("no request signing configured");
                Arc::new(NoOpSigner)
            }
        };

        SettingsClient::with_http_client(&self.endpoint, signer, http)
    }
}
