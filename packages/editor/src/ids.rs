use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in the component tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

/// Identifier of a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(NodeId);
string_id!(PageId);

/// Generate a project seed from its name using CRC32
pub fn project_seed(name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator shared by pages and nodes of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(project_name: &str) -> Self {
        Self {
            seed: project_seed(project_name),
            count: 0,
        }
    }

    fn next_raw(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn next_node_id(&mut self) -> NodeId {
        NodeId(self.next_raw())
    }

    pub fn next_page_id(&mut self) -> PageId {
        PageId(format!("page-{}", self.next_raw()))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Move the counter past every `<seed>-N` among `ids` (page ids included)
    pub fn advance_past<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let prefix = format!("{}-", self.seed);
        for id in ids {
            let id = id.strip_prefix("page-").unwrap_or(id);
            let issued = id
                .strip_prefix(&prefix)
                .and_then(|n| n.parse::<u64>().ok());
            if let Some(n) = issued {
                self.count = self.count.max(n);
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_seed_is_stable() {
        assert_eq!(project_seed("landing"), project_seed("landing"));
        assert_ne!(project_seed("landing"), project_seed("blog"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = IdGenerator::new("landing");

        let a = ids.next_node_id();
        let b = ids.next_node_id();
        let page = ids.next_page_id();

        assert!(a.as_str().ends_with("-1"));
        assert!(b.as_str().ends_with("-2"));
        assert!(page.as_str().starts_with("page-"));
        assert!(page.as_str().ends_with("-3"));
        assert!(a.as_str().starts_with(ids.seed()));
    }

    #[test]
    fn test_advance_past_issued_ids() {
        let mut ids = IdGenerator::new("landing");
        let seed = ids.seed().to_string();
        let taken = [
            format!("{}-4", seed),
            format!("page-{}-9", seed),
            "custom-12".to_string(),
            format!("{}-x", seed),
        ];

        ids.advance_past(taken.iter().map(String::as_str));

        assert_eq!(ids.next_node_id().as_str(), format!("{}-10", seed));
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = NodeId::new("abc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-1\"");
    }
}
