// src/topology.rs

//! Parent/child grouping of matched resources.
//!
//! Every alias that matched something becomes a parent; its children are
//! the source addresses found under it. Parents are kept in key order and
//! children in first-seen order, so anything derived from the index
//! (scheduling, removal order, reports) is reproducible.

use std::collections::BTreeMap;

use crate::matcher::MatchedResource;

/// Children of each top-level key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyIndex {
    groups: BTreeMap<String, Vec<String>>,
}

impl TopologyIndex {
    /// Group matched resources by their top-level key
    pub fn build(matches: &[MatchedResource]) -> Self {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for matched in matches {
            let children = groups.entry(matched.top_level_key.clone()).or_default();
            if !children.contains(&matched.source_address) {
                children.push(matched.source_address.clone());
            }
        }

        Self { groups }
    }

    /// Children of a parent, or an empty slice for an unknown parent
    pub fn children(&self, top_level_key: &str) -> &[String] {
        self.groups
            .get(top_level_key)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Parents in key order
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|k| k.as_str())
    }

    /// `(parent, children)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(k, c)| (k.as_str(), c.as_slice()))
    }

    /// Find which parent a source address belongs to
    pub fn parent_of(&self, source_address: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, children)| children.iter().any(|c| c == source_address))
            .map(|(parent, _)| parent.as_str())
    }

    /// Number of parents
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of children across all parents
    pub fn child_count(&self) -> usize {
        self.groups.values().map(|c| c.len()).sum()
    }
}
