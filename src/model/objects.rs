//! Configuration objects.

use serde::{Deserialize, Serialize};

/// A monitored host and its position in the parent/child topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    /// Names of the immediate parent hosts, in configuration order.
    #[serde(default)]
    pub parents: Vec<String>,
}

impl Host {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parents: Vec::new(),
        }
    }

    /// Build a host with the given parents.
    pub fn with_parents(name: &str, parents: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn has_parents(&self) -> bool {
        !self.parents.is_empty()
    }
}
