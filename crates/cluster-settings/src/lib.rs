// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of a cluster's persistent settings against a declared state.
//!
//! The crate is layered leaves-first: [`signing`] attaches authentication
//! material to outbound requests, [`client`] reads and writes the remote
//! settings document, [`validation`] checks declared values before any
//! network call, and [`controller`] maps create/read/update/delete lifecycle
//! callbacks onto idempotent operations against the document.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod signing;
pub mod validation;

pub use client::{SettingsApi, SettingsClient};
pub use config::{AwsSigningConfig, ProviderConfig};
pub use controller::{DeclaredState, Lifecycle, ReconciliationController, ResourceHandle};
pub use error::{Error, FetchError, Result, SigningError, StatusFailure, UpdateError};
pub use model::PersistentSettings;
pub use signing::{AwsSigner, Credentials, CredentialsProvider, NoOpSigner, RequestSigner};
pub use validation::{validate_auto_create_index, ValidationError};
