// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use reqwest::StatusCode;

use crate::validation::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure surfaced to the host. Nothing is retried or absorbed locally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unable to sign request: {0}")]
    Signing(#[from] SigningError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error("failed to decode cluster settings: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode cluster settings: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The host handed over a declared state of the wrong shape.
    #[error("{0}")]
    DeclaredState(String),
}

/// Failure reading the settings document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unable to fetch cluster settings: {0}")]
    Status(StatusFailure),

    /// The server answered with success but left out the persistent section.
    #[error("expected object with persistent setting, got nil")]
    MissingPersistent,
}

/// Failure writing the settings document.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("unable to update cluster settings: {0}")]
    Status(StatusFailure),
}

/// A response outside the 2xx range, with its body when it could be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFailure {
    pub status: StatusCode,
    pub body: Option<String>,
}

impl StatusFailure {
    pub fn code(&self) -> u16 {
        self.status.as_u16()
    }
}

impl fmt::Display for StatusFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            Some(body) => write!(f, "{}({}) - {}", self.status.as_u16(), self.status, body),
            None => write!(f, "{}({})", self.status.as_u16(), self.status),
        }
    }
}

/// Credential resolution or signature computation failed.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("no credentials found: {0}")]
    Credentials(String),

    #[error("unable to assume role: {0}")]
    Delegation(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid signing key")]
    InvalidKey,

    #[error("request URL has no host")]
    MissingHost,
}
