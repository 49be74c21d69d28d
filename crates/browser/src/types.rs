//! Storage-state data model
//!
//! These types mirror the JSON the automation backend emits for a
//! context snapshot (`storageState`), so a snapshot taken from one
//! context can seed another without transformation.

use serde::{Deserialize, Serialize};

/// Full storage snapshot of a browser context: cookies plus
/// origin-scoped localStorage entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub origins: Vec<OriginState>,
}

/// A single cookie as captured from a context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Unix timestamp in seconds; -1 for session cookies
    #[serde(default)]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

/// localStorage entries for one origin, as part of [`StorageState`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginState {
    pub origin: String,
    #[serde(default)]
    pub local_storage: Vec<StorageItem>,
}

/// A single name/value storage entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageItem {
    pub name: String,
    pub value: String,
}

/// A sessionStorage/localStorage dump taken from one page, keyed by
/// the page's origin. Unlike [`OriginState`] this is produced by
/// reading the live page, not by the context snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageDump {
    pub origin: String,
    #[serde(default)]
    pub items: Vec<StorageItem>,
}

impl StorageItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
