// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Grammar check for `action.auto_create_index` values.
//!
//! Accepted values are `true`, `false`, or a comma-separated list of index
//! name patterns. Each pattern may be prefixed with `+` (allow) or `-` (block)
//! and may end with a single `*` wildcard.

use std::sync::OnceLock;

use regex::Regex;

const AUTO_CREATE_INDEX_PATTERN: &str =
    r"^(true|false|[-+]?[a-z0-9][a-z0-9_-]*\*?(,[-+]?[a-z0-9][a-z0-9_-]*\*?)*)$";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected to follow value format: true, false or comma-separated list but got {value:?}")]
pub struct ValidationError {
    pub value: String,
}

#[allow(clippy::expect_used)]
fn auto_create_index_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(AUTO_CREATE_INDEX_PATTERN).expect("failed creating auto_create_index regex")
    })
}

/// Checks a candidate value. Pure; never touches remote state.
pub fn validate_auto_create_index(value: &str) -> Result<(), ValidationError> {
    if auto_create_index_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError {
            value: value.to_string(),
        })
    }
}
