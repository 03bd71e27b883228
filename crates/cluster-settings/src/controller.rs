// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle of one managed cluster-settings resource.
//!
//! The controller holds only the opaque handle and the last observed state.
//! The connection is passed explicitly to every operation, and the server is
//! the source of truth: every write is followed by a read, and nothing is
//! served from a local cache.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use tracing::{debug, warn};

use crate::client::SettingsApi;
use crate::error::{Error, Result};
use crate::model::{PersistentSettings, AUTO_CREATE_INDEX_KEY};
use crate::validation::{validate_auto_create_index, ValidationError};

const HANDLE_PREFIX: &str = "opensearch-";

static HANDLE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Desired value for the managed key. `None` restores the cluster default;
/// `Some("")` is a declared (and, per the grammar, invalid) empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredState {
    pub auto_create_index: Option<String>,
}

impl DeclaredState {
    pub fn new(auto_create_index: Option<String>) -> Self {
        Self { auto_create_index }
    }

    /// Unwraps the host's list-of-one `persistent` block.
    pub fn from_blocks(blocks: Vec<DeclaredState>) -> Result<Self> {
        let mut blocks = blocks.into_iter();
        match (blocks.next(), blocks.next()) {
            (Some(state), None) => Ok(state),
            _ => Err(Error::DeclaredState(
                "unable to parse invalid persistent data, got zero or more than one element"
                    .to_string(),
            )),
        }
    }

    /// Wraps the state in the host's list-of-one `persistent` block.
    pub fn into_blocks(self) -> Vec<DeclaredState> {
        vec![self]
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        match &self.auto_create_index {
            Some(value) => validate_auto_create_index(value),
            None => Ok(()),
        }
    }

    fn to_settings(&self) -> PersistentSettings {
        PersistentSettings {
            auto_create_index: self.auto_create_index.clone(),
        }
    }
}

impl From<PersistentSettings> for DeclaredState {
    fn from(settings: PersistentSettings) -> Self {
        Self {
            auto_create_index: settings.auto_create_index,
        }
    }
}

/// Opaque identifier the host uses to track the resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle(String);

impl ResourceHandle {
    /// Mints `opensearch-<UTC timestamp><counter>`, unique within the process.
    pub fn new_unique() -> Self {
        let counter = HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!(
            "{HANDLE_PREFIX}{}{counter:08x}",
            Utc::now().format("%Y%m%d%H%M%S%6f")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unmanaged,
    Managed,
}

/// Maps host lifecycle callbacks onto reads and writes of the settings document.
#[derive(Debug, Default)]
pub struct ReconciliationController {
    handle: Option<ResourceHandle>,
    observed: Option<DeclaredState>,
}

impl ReconciliationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a resource the host already tracks.
    pub fn with_handle(handle: ResourceHandle) -> Self {
        Self {
            handle: Some(handle),
            observed: None,
        }
    }

    pub fn handle(&self) -> Option<&ResourceHandle> {
        self.handle.as_ref()
    }

    /// Last state read from the server.
    pub fn observed(&self) -> Option<&DeclaredState> {
        self.observed.as_ref()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.handle {
            Some(_) => Lifecycle::Managed,
            None => Lifecycle::Unmanaged,
        }
    }

    /// Validates and writes the declared value, mints a handle, then reads
    /// the server's view back.
    pub async fn create<S>(&mut self, api: &S, declared: &DeclaredState) -> Result<DeclaredState>
    where
        S: SettingsApi + ?Sized,
    {
        declared.validate()?;
        api.update(&declared.to_settings()).await?;

        let handle = ResourceHandle::new_unique();
        debug!(handle = %handle, key = AUTO_CREATE_INDEX_KEY, "cluster settings resource created");
        self.handle = Some(handle);

        self.read(api).await
    }

    /// Fetches the document. Failures leave the handle and last observation alone.
    pub async fn read<S>(&mut self, api: &S) -> Result<DeclaredState>
    where
        S: SettingsApi + ?Sized,
    {
        let state = DeclaredState::from(api.fetch().await?);
        self.observed = Some(state.clone());
        Ok(state)
    }

    /// Writes `new` when it differs from `old`, otherwise only reads.
    ///
    /// An unchanged value is not validated again.
    pub async fn update<S>(
        &mut self,
        api: &S,
        old: &DeclaredState,
        new: &DeclaredState,
    ) -> Result<DeclaredState>
    where
        S: SettingsApi + ?Sized,
    {
        if old == new {
            debug!("declared cluster settings unchanged, refreshing from server");
            return self.read(api).await;
        }

        new.validate()?;
        api.update(&new.to_settings()).await?;
        if self.handle.is_none() {
            warn!("updating a cluster settings resource without a handle, minting one");
            self.handle = Some(ResourceHandle::new_unique());
        }

        self.read(api).await
    }

    /// Resets every managed key to the cluster default. The handle is cleared
    /// only once the server accepted the reset.
    pub async fn delete<S>(&mut self, api: &S) -> Result<()>
    where
        S: SettingsApi + ?Sized,
    {
        api.update(&PersistentSettings::reset()).await?;
        debug!(
            handle = ?self.handle.as_ref().map(ResourceHandle::as_str),
            "cluster settings resource deleted"
        );
        self.handle = None;
        self.observed = None;
        Ok(())
    }

    /// Adopts an existing handle and reads the current server state.
    pub async fn import<S>(&mut self, api: &S, handle: ResourceHandle) -> Result<DeclaredState>
    where
        S: SettingsApi + ?Sized,
    {
        let state = self.read(api).await?;
        self.handle = Some(handle);
        Ok(state)
    }
}
