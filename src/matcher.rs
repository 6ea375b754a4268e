// src/matcher.rs

//! Matching state records against aliases.

use tracing::{debug, warn};

use crate::alias::AliasMap;
use crate::state::{Identifier, ResourceRecord};

/// A state record that falls under one of the run's aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedResource {
    /// Address in the source state
    pub source_address: String,
    /// Address the resource will have in the target state
    pub target_address: String,
    /// Source prefix of the alias this resource was matched under
    pub top_level_key: String,
    /// Import identifiers, highest priority first
    pub identifiers: Vec<Identifier>,
}

impl MatchedResource {
    /// Check if the resource keeps its address in the target state
    pub fn is_renamed(&self) -> bool {
        self.source_address != self.target_address
    }
}

/// Resolves record addresses against an alias map
#[derive(Debug, Clone, Copy)]
pub struct AddressMatcher<'a> {
    aliases: &'a AliasMap,
}

impl<'a> AddressMatcher<'a> {
    pub fn new(aliases: &'a AliasMap) -> Self {
        Self { aliases }
    }

    /// Find the alias an address falls under.
    ///
    /// Returns `(source_prefix, target_address)`. When several source
    /// prefixes match, the longest one wins. Two distinct prefixes of equal
    /// length cannot both prefix the same address, so the winner is unique.
    pub fn match_address(&self, address: &str) -> Option<(&'a str, String)> {
        let (source, target) = self
            .aliases
            .iter()
            .filter(|(source, _)| address.starts_with(source))
            .max_by_key(|(source, _)| source.len())?;

        let rewritten = format!("{}{}", target, &address[source.len()..]);
        Some((source, rewritten))
    }

    /// Match a single record
    pub fn match_record(&self, record: &ResourceRecord) -> Option<MatchedResource> {
        let (top_level_key, target_address) = self.match_address(&record.address)?;
        Some(MatchedResource {
            source_address: record.address.clone(),
            target_address,
            top_level_key: top_level_key.to_string(),
            identifiers: record.identifiers.clone(),
        })
    }

    /// Match every record, dropping the ones no alias covers
    pub fn match_all(&self, records: &[ResourceRecord]) -> Vec<MatchedResource> {
        let matches: Vec<MatchedResource> = records
            .iter()
            .filter_map(|record| {
                let matched = self.match_record(record);
                if matched.is_none() {
                    debug!("{} is not covered by any alias", record.address);
                }
                matched
            })
            .collect();

        debug!(
            "Matched {} of {} state records against {} aliases",
            matches.len(),
            records.len(),
            self.aliases.len()
        );
        matches
    }

    /// Aliases that matched none of the given resources
    pub fn unmatched_aliases(&self, matches: &[MatchedResource]) -> Vec<&'a str> {
        let unmatched: Vec<&str> = self
            .aliases
            .sources()
            .filter(|source| !matches.iter().any(|m| m.top_level_key == *source))
            .collect();

        for source in &unmatched {
            warn!("Alias '{}' does not match any resource in the source state", source);
        }
        unmatched
    }
}
