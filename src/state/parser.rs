// src/state/parser.rs

//! Parser for Terraform JSON state documents (`terraform state pull`).

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::{Identifier, ResourceRecord, StateSnapshot, IMPORT_IDENTIFIER_FIELDS};
use crate::error::{Error, Result};

/// Management mode of resources that can be transferred
const MANAGED_MODE: &str = "managed";

/// A `resources[]` entry. Every field is optional so that unexpected
/// documents degrade entry by entry instead of failing as a whole.
#[derive(Debug, Deserialize)]
struct RawResource {
    mode: Option<String>,
    #[serde(rename = "type")]
    resource_type: Option<String>,
    name: Option<String>,
    module: Option<String>,
    #[serde(default)]
    instances: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    index_key: Option<Value>,
    attributes: Option<Map<String, Value>>,
}

/// Parse a raw state document into a snapshot of managed resource instances.
///
/// A document that is not JSON, or that has no `resources` list, yields an
/// empty snapshot with a diagnostic rather than an error.
pub fn parse_state(document: &str) -> StateSnapshot {
    let mut snapshot = StateSnapshot::new();

    let resources = match decode_resources(document) {
        Ok(resources) => resources,
        Err(e) => {
            warn!("{}; treating state as empty", e);
            snapshot.diagnostics.push(e.to_string());
            return snapshot;
        }
    };

    let mut seen: HashSet<String> = HashSet::new();

    for (position, entry) in resources.into_iter().enumerate() {
        let resource: RawResource = match serde_json::from_value(entry) {
            Ok(r) => r,
            Err(e) => {
                note(&mut snapshot, format!("Skipping resource entry {}: {}", position, e));
                continue;
            }
        };

        if resource.mode.as_deref() != Some(MANAGED_MODE) {
            continue;
        }

        let (resource_type, name) = match (&resource.resource_type, &resource.name) {
            (Some(t), Some(n)) => (t.as_str(), n.as_str()),
            _ => {
                note(
                    &mut snapshot,
                    format!("Skipping resource entry {}: missing type or name", position),
                );
                continue;
            }
        };

        for instance in resource.instances {
            let instance: RawInstance = match serde_json::from_value(instance) {
                Ok(i) => i,
                Err(e) => {
                    note(
                        &mut snapshot,
                        format!("Skipping instance of {}.{}: {}", resource_type, name, e),
                    );
                    continue;
                }
            };

            let Some(attributes) = instance.attributes else {
                debug!("Instance of {}.{} has no attributes", resource_type, name);
                continue;
            };

            let address = resource_address(
                resource.module.as_deref(),
                resource_type,
                name,
                instance.index_key.as_ref(),
            );

            if !seen.insert(address.clone()) {
                note(&mut snapshot, format!("Duplicate address {} ignored", address));
                continue;
            }

            snapshot
                .records
                .push(ResourceRecord::new(address, extract_identifiers(&attributes)));
        }
    }

    debug!("Parsed {} managed resource instances", snapshot.records.len());
    snapshot
}

fn decode_resources(document: &str) -> Result<Vec<Value>> {
    let parsed: Value =
        serde_json::from_str(document).map_err(|e| Error::ParseError(e.to_string()))?;

    let resources = match parsed {
        Value::Object(mut document) => document.remove("resources"),
        _ => None,
    };

    match resources {
        Some(Value::Array(resources)) => Ok(resources),
        Some(_) => Err(Error::ParseError("`resources` is not a list".to_string())),
        None => Err(Error::ParseError("no `resources` list found".to_string())),
    }
}

fn note(snapshot: &mut StateSnapshot, message: String) {
    warn!("{}", message);
    snapshot.diagnostics.push(message);
}

/// Build `[<module>.]<type>.<name>[<index>]`
fn resource_address(
    module: Option<&str>,
    resource_type: &str,
    name: &str,
    index_key: Option<&Value>,
) -> String {
    let mut address = String::new();
    if let Some(module) = module {
        address.push_str(module);
        address.push('.');
    }
    address.push_str(resource_type);
    address.push('.');
    address.push_str(name);

    match index_key {
        None | Some(Value::Null) => {}
        Some(Value::String(key)) => address.push_str(&format!("[\"{}\"]", key)),
        Some(other) => address.push_str(&format!("[{}]", other)),
    }

    address
}

fn extract_identifiers(attributes: &Map<String, Value>) -> Vec<Identifier> {
    IMPORT_IDENTIFIER_FIELDS
        .iter()
        .filter_map(|field| match attributes.get(*field) {
            Some(Value::String(value)) => Some(Identifier::new(*field, value.clone())),
            _ => None,
        })
        .collect()
}
