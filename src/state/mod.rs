// src/state/mod.rs

//! Terraform state records
//!
//! A pulled state document is flattened into one [`ResourceRecord`] per
//! managed resource instance. Each record carries its full address, e.g.
//!
//! ```text
//! aws_s3_bucket.logs
//! aws_instance.web[0]
//! module.network.aws_subnet.private["eu-west-1a"]
//! ```
//!
//! and the attribute values that can be handed to `terraform import` to
//! identify the real resource.

mod parser;

pub use parser::parse_state;

/// Attribute fields checked for an import identifier, highest priority first
pub const IMPORT_IDENTIFIER_FIELDS: &[&str] = &["id", "name"];

/// One candidate import identifier taken from an instance's attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// Attribute name (one of [`IMPORT_IDENTIFIER_FIELDS`])
    pub field: &'static str,
    /// Attribute value
    pub value: String,
}

impl Identifier {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// A single resource instance recorded in a state document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Full resource address, unique within one state
    pub address: String,
    /// Import identifiers in priority order; only fields found are present
    pub identifiers: Vec<Identifier>,
}

impl ResourceRecord {
    pub fn new(address: impl Into<String>, identifiers: Vec<Identifier>) -> Self {
        Self {
            address: address.into(),
            identifiers,
        }
    }

    /// Look up the identifier captured for a given field
    pub fn identifier(&self, field: &str) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|i| i.field == field)
            .map(|i| i.value.as_str())
    }
}

/// The parsed contents of a state document
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    /// Managed resource instances, in document order
    pub records: Vec<ResourceRecord>,

    /// Problems found while parsing (skipped entries, undecodable input)
    pub diagnostics: Vec<String>,
}

impl StateSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no resources were found
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get count of parsed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Find a record by its address
    pub fn get(&self, address: &str) -> Option<&ResourceRecord> {
        self.records.iter().find(|r| r.address == address)
    }
}
