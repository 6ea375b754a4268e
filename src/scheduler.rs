// src/scheduler.rs

//! Work list of resources waiting to be transferred.

use thiserror::Error;

use crate::matcher::MatchedResource;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("There are no more resources to transfer")]
    Empty,
}

/// LIFO work list over an arena of matched resources.
///
/// Resources are seeded in descending source-address order, so they are
/// handed out in ascending order and every run over the same state
/// processes them identically.
#[derive(Debug, Clone, Default)]
pub struct TransferScheduler {
    arena: Vec<MatchedResource>,
    pending: Vec<usize>,
}

impl TransferScheduler {
    pub fn new(mut matches: Vec<MatchedResource>) -> Self {
        matches.sort_by(|a, b| b.source_address.cmp(&a.source_address));
        matches.dedup_by(|a, b| a.source_address == b.source_address);

        let pending = (0..matches.len()).collect();
        Self {
            arena: matches,
            pending,
        }
    }

    pub fn has_next(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Take the next resource off the work list
    pub fn next(&mut self) -> Result<MatchedResource, SchedulerError> {
        let index = self.pending.pop().ok_or(SchedulerError::Empty)?;
        Ok(self.arena[index].clone())
    }

    /// Number of resources still waiting
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Number of resources the scheduler was seeded with
    pub fn total(&self) -> usize {
        self.arena.len()
    }
}
