// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Applies, reads or resets the managed cluster setting.
//!
//! Usage: `cluster-settings-ctl <apply|read|delete|import>`. The connection
//! comes from `OPENSEARCH_*` variables, the declared value from
//! `CLUSTER_SETTINGS_AUTO_CREATE_INDEX` (unset means "restore default"), and a
//! previously minted handle from `CLUSTER_SETTINGS_HANDLE`.

use std::env::{self, VarError};
use std::process::ExitCode;

use cluster_settings::{
    DeclaredState, ProviderConfig, ReconciliationController, ResourceHandle, SettingsClient,
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const ENV_LOG_LEVEL: &str = "CLUSTER_SETTINGS_LOG_LEVEL";
const ENV_AUTO_CREATE_INDEX: &str = "CLUSTER_SETTINGS_AUTO_CREATE_INDEX";
const ENV_HANDLE: &str = "CLUSTER_SETTINGS_HANDLE";

#[tokio::main]
pub async fn main() -> ExitCode {
    let log_level = env::var(ENV_LOG_LEVEL)
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());
    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    let filter = match EnvFilter::try_new(env_filter) {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("could not parse log level in configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(false)
        .without_time()
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {err}");
        return ExitCode::FAILURE;
    }

    let action = env::args().nth(1).unwrap_or_else(|| "read".to_string());
    let client = match ProviderConfig::from_os_env().connect() {
        Ok(client) => client,
        Err(err) => {
            error!("Unable to configure cluster settings client: {err}");
            return ExitCode::FAILURE;
        }
    };
    let handle = env::var(ENV_HANDLE)
        .ok()
        .filter(|h| !h.is_empty())
        .map(ResourceHandle::from);
    let declared = match declared_value() {
        Ok(value) => DeclaredState::new(value),
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    debug!(action = %action, url = %client.settings_url(), "running cluster settings action");
    match run(&action, &client, handle, &declared).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{action} failed: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    action: &str,
    client: &SettingsClient,
    handle: Option<ResourceHandle>,
    declared: &DeclaredState,
) -> cluster_settings::Result<()> {
    let mut controller = match handle.clone() {
        Some(handle) => ReconciliationController::with_handle(handle),
        None => ReconciliationController::new(),
    };

    match action {
        "apply" => {
            let state = if controller.handle().is_some() {
                let current = controller.read(client).await?;
                controller.update(client, &current, declared).await?
            } else {
                controller.create(client, declared).await?
            };
            report(&controller, &state);
        }
        "read" => {
            let state = controller.read(client).await?;
            report(&controller, &state);
        }
        "delete" => {
            controller.delete(client).await?;
            info!("auto_create_index restored to cluster default");
        }
        "import" => {
            let handle = handle.unwrap_or_else(ResourceHandle::new_unique);
            let state = controller.import(client, handle).await?;
            report(&controller, &state);
        }
        other => {
            return Err(cluster_settings::Error::Config(format!(
                "unknown action {other:?}, expected apply, read, delete or import"
            )));
        }
    }
    Ok(())
}

/// Unset means "restore the default"; a value that is not valid UTF-8 is an
/// error rather than a reset.
fn declared_value() -> cluster_settings::Result<Option<String>> {
    parse_declared_value(env::var(ENV_AUTO_CREATE_INDEX))
}

fn parse_declared_value(
    value: Result<String, VarError>,
) -> cluster_settings::Result<Option<String>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(cluster_settings::Error::Config(format!(
            "{ENV_AUTO_CREATE_INDEX} is not valid unicode"
        ))),
    }
}

fn report(controller: &ReconciliationController, state: &DeclaredState) {
    let handle = controller
        .handle()
        .map(ResourceHandle::as_str)
        .unwrap_or("-");
    match &state.auto_create_index {
        Some(value) => info!(handle, "auto_create_index = {value}"),
        None => info!(handle, "auto_create_index is not set (cluster default)"),
    }
}
