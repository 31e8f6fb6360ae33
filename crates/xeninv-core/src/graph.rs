//! Inventory graph: groups, entries and their variables

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A named collection of inventory entries with optional child groups
#[derive(Debug, Clone, Default, Serialize)]
pub struct Group {
    /// Entry keys that are members of this group
    pub hosts: Vec<String>,
    /// Names of child groups
    pub children: Vec<String>,
}

/// One addressable managed node (host or VM) in the produced graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct Entry {
    /// Variables attached to this entry
    pub vars: BTreeMap<String, Value>,
}

/// The produced inventory artifact
///
/// Groups form a one-level parent/child membership graph over entries.
/// Ordered maps keep JSON emission and collision behavior deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryGraph {
    /// Groups by name
    pub groups: BTreeMap<String, Group>,
    /// Entries by key
    pub entries: BTreeMap<String, Entry>,
}

impl InventoryGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group if it does not exist yet
    pub fn add_group(&mut self, name: impl Into<String>) {
        self.groups.entry(name.into()).or_default();
    }

    /// Create an entry if it does not exist yet
    pub fn add_host(&mut self, key: impl Into<String>) {
        self.entries.entry(key.into()).or_default();
    }

    /// Add an entry as a member of a group, creating both as needed
    pub fn add_child(&mut self, group: &str, key: &str) {
        self.add_host(key);
        let group = self.groups.entry(group.to_string()).or_default();
        if !group.hosts.iter().any(|h| h == key) {
            group.hosts.push(key.to_string());
        }
    }

    /// Link a child group under a parent group, creating both as needed
    pub fn add_child_group(&mut self, parent: &str, child: &str) {
        self.add_group(child);
        let parent = self.groups.entry(parent.to_string()).or_default();
        if !parent.children.iter().any(|c| c == child) {
            parent.children.push(child.to_string());
        }
    }

    /// Set a variable on an entry; last write wins
    pub fn set_variable(&mut self, key: &str, name: &str, value: Value) {
        self.entries
            .entry(key.to_string())
            .or_default()
            .vars
            .insert(name.to_string(), value);
    }

    /// Look up a group by name
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Look up an entry by key
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Check whether an entry is a member of a group
    #[must_use]
    pub fn is_member(&self, group: &str, key: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|g| g.hosts.iter().any(|h| h == key))
    }
}
