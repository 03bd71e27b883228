// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Wire shape of the `_cluster/settings` document.

use serde::{Deserialize, Serialize};

/// Setting key controlling automatic index creation.
pub const AUTO_CREATE_INDEX_KEY: &str = "action.auto_create_index";

/// Persistent section of the cluster settings document.
///
/// `None` means the key is not managed and the cluster default applies. It is
/// serialized as an explicit `null`, which the server treats as "reset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentSettings {
    #[serde(rename = "action.auto_create_index", default)]
    pub auto_create_index: Option<String>,
}

impl PersistentSettings {
    /// Document with every key set to "no value".
    pub fn reset() -> Self {
        Self {
            auto_create_index: None,
        }
    }
}

/// Envelope exchanged with the server. Only the persistent scope is modeled.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SettingsMessage {
    #[serde(default)]
    pub persistent: Option<PersistentSettings>,
}
