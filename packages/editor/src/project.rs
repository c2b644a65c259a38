//! Whole-project snapshots.
//!
//! The store is plain data, so a project serializes to a single JSON
//! document. Where it is kept is up to the host.

use crate::errors::LoadError;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    pub name: String,

    #[serde(flatten)]
    pub store: EntityStore,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl ProjectSnapshot {
    pub fn new(name: impl Into<String>, store: EntityStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            name: name.into(),
            store,
        }
    }

    /// Parse and verify a snapshot
    ///
    /// The id generator is moved past every id already in the project, so a
    /// hand-edited or stale counter cannot reissue a live id.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let mut snapshot: ProjectSnapshot = serde_json::from_str(json)?;
        snapshot.store.check_integrity()?;
        snapshot.store.sync_ids();
        Ok(snapshot)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responsive::Props;

    #[test]
    fn test_snapshot_round_trip() {
        let mut store = EntityStore::new("site");
        let page = store.add_page("Home");
        store.add_node("Container", Props::new(), true, None, &page).unwrap();

        let snapshot = ProjectSnapshot::new("site", store);
        let json = snapshot.to_json().unwrap();

        assert!(json.contains("\"name\": \"site\""));
        assert_eq!(ProjectSnapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_stale_id_counter_is_advanced_on_load() {
        let json = r#"{
            "name": "stale",
            "ids": { "seed": "x", "count": 1 },
            "pages": [{ "id": "page-x-1", "name": "Home" }],
            "roots": { "page-x-1": ["x-7"] },
            "nodes": {
                "x-7": {
                    "id": "x-7",
                    "pageId": "page-x-1",
                    "parentId": null,
                    "type": "Heading",
                    "allowChildren": false
                }
            }
        }"#;

        let mut snapshot = ProjectSnapshot::from_json(json).unwrap();

        assert_eq!(snapshot.store.next_node_id().as_str(), "x-8");
    }

    #[test]
    fn test_inconsistent_snapshot_is_rejected() {
        let json = r#"{
            "name": "broken",
            "ids": { "seed": "x", "count": 1 },
            "pages": [{ "id": "home", "name": "Home" }],
            "roots": { "home": [] },
            "nodes": {
                "x-1": {
                    "id": "x-1",
                    "pageId": "home",
                    "parentId": null,
                    "type": "Heading",
                    "allowChildren": false
                }
            }
        }"#;

        assert!(matches!(
            ProjectSnapshot::from_json(json),
            Err(LoadError::Inconsistent(_))
        ));
    }
}
