//! Session record and cache key

use std::collections::HashMap;

use harness_browser::{StorageDump, StorageState};
use serde::{Deserialize, Serialize};

/// A cached authenticated session, the unit of caching.
///
/// Serialized as `sessions/<cacheKey>.session.json`. Immutable once
/// written: records are never partially updated, only created whole
/// and deleted by external cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Logical user identifier the session was created for (e.g. `ADMIN`)
    pub user_key: String,

    /// Cookies + origin storage snapshot understood by the browser
    /// layer; cookie list is empty when the flow disabled cookie
    /// persistence
    pub storage_state: StorageState,

    /// Arbitrary values saved during login (e.g. bearer tokens).
    /// Last write per key wins.
    #[serde(default)]
    pub meta: HashMap<String, String>,

    /// sessionStorage dump from the first page of the login context,
    /// if enabled by the flow config
    #[serde(default)]
    pub session_storage: Vec<StorageDump>,

    /// localStorage dump from the first page of the login context,
    /// if enabled by the flow config
    #[serde(default)]
    pub local_storage: Vec<StorageDump>,
}

/// Build the cache key shared by the session and lock files.
///
/// The login key is included when present so that different
/// authentication procedures for the same logical user never collide:
/// `cache_key("TOM", Some("dummyjson"))` is `dummyjson__TOM`, distinct
/// from `default__TOM`.
pub fn cache_key(user_key: &str, login_key: Option<&str>) -> String {
    match login_key {
        Some(login_key) => format!("{login_key}__{user_key}"),
        None => user_key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_disambiguates_login_flows() {
        assert_eq!(cache_key("TOM", None), "TOM");
        assert_eq!(cache_key("TOM", Some("default")), "default__TOM");
        assert_eq!(cache_key("TOM", Some("dummyjson")), "dummyjson__TOM");
    }

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = SessionRecord {
            user_key: "ADMIN".into(),
            storage_state: StorageState::default(),
            meta: HashMap::new(),
            session_storage: vec![],
            local_storage: vec![],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"userKey\":\"ADMIN\""));
        assert!(json.contains("\"storageState\""));
        assert!(json.contains("\"sessionStorage\""));
    }

    #[test]
    fn optional_collections_default_on_read() {
        let record: SessionRecord =
            serde_json::from_str(r#"{"userKey":"TOM","storageState":{}}"#).unwrap();
        assert!(record.meta.is_empty());
        assert!(record.session_storage.is_empty());
        assert!(record.local_storage.is_empty());
    }
}
