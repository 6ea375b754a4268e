// src/alias.rs

//! Source-to-target address aliases
//!
//! An alias says "everything under this source address prefix moves to this
//! target address prefix". On the command line an alias is written as
//!
//! ```text
//! module.db:module.database     # rename while moving
//! aws_s3_bucket.logs            # keep the same address
//! ```
//!
//! The source half is the alias key. It also becomes the top-level key that
//! groups every resource found under it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A single source-prefix to target-prefix mapping
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alias {
    /// Address prefix in the source state
    pub source: String,
    /// Address prefix the resources get in the target state
    pub target: String,
}

impl Alias {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Parse a command-line token of the form `source[:target]`.
    ///
    /// The token is split on the first `:` only. A token without `:` maps to
    /// itself.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::ConfigError("empty resource alias".to_string()));
        }

        match token.split_once(':') {
            Some((source, target)) => {
                let (source, target) = (source.trim(), target.trim());
                if source.is_empty() {
                    return Err(Error::ConfigError(format!(
                        "missing source address in alias '{}'",
                        token
                    )));
                }
                if target.is_empty() {
                    return Err(Error::ConfigError(format!(
                        "missing target address in alias '{}'",
                        token
                    )));
                }
                Ok(Self::new(source, target))
            }
            None => Ok(Self::new(token, token)),
        }
    }

    /// Check whether the alias keeps the address unchanged
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{}:{}", self.source, self.target)
        }
    }
}

impl FromStr for Alias {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Alias::parse(s)
    }
}

/// The full set of aliases for one run, keyed by source prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    aliases: BTreeMap<String, String>,
}

impl AliasMap {
    /// Create an empty alias map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an alias map from command-line tokens
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut map = Self::new();
        for token in tokens {
            map.insert(Alias::parse(token.as_ref())?)?;
        }
        Ok(map)
    }

    /// Build an alias map from already-split aliases
    pub fn from_aliases(aliases: impl IntoIterator<Item = Alias>) -> Result<Self> {
        let mut map = Self::new();
        for alias in aliases {
            map.insert(alias)?;
        }
        Ok(map)
    }

    /// Add an alias.
    ///
    /// Declaring the same source twice is accepted only if both declarations
    /// agree on the target.
    pub fn insert(&mut self, alias: Alias) -> Result<()> {
        if let Some(existing) = self.aliases.get(&alias.source) {
            if *existing != alias.target {
                return Err(Error::ConfigError(format!(
                    "'{}' is mapped to both '{}' and '{}'",
                    alias.source, existing, alias.target
                )));
            }
            return Ok(());
        }
        self.aliases.insert(alias.source, alias.target);
        Ok(())
    }

    /// Get the target prefix for a source prefix
    pub fn get(&self, source: &str) -> Option<&str> {
        self.aliases.get(source).map(|s| s.as_str())
    }

    /// Iterate over `(source, target)` pairs in source order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Iterate over source prefixes in order
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl fmt::Display for AliasMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .iter()
            .map(|(s, t)| Alias::new(s, t).to_string())
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}
