//! Coupled forward/backward operation lists
//!
//! Pairs are collected in forward order. When the builder is finished the
//! backward list is the mirror image: the undo of the last forward operation
//! runs first.

use crate::diff::operations::{Operation, OperationPair};
use serde::{Deserialize, Serialize};

/// The three user-facing strings shown while a migration runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMessages {
    pub pending: String,
    pub success: String,
    pub failure: String,
}

impl MigrationMessages {
    pub fn new(
        pending: impl Into<String>,
        success: impl Into<String>,
        failure: impl Into<String>,
    ) -> Self {
        Self {
            pending: pending.into(),
            success: success.into(),
            failure: failure.into(),
        }
    }
}

/// A named, ordered, reversible bundle ready for an executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledMigration {
    pub name: String,
    pub messages: MigrationMessages,
    pub forward: Vec<Operation>,
    pub backward: Vec<Operation>,
}

impl CompiledMigration {
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }

    pub fn is_balanced(&self) -> bool {
        self.forward.len() == self.backward.len()
    }
}

/// Accumulates operation pairs for one migration. Single use: finishing
/// consumes the builder.
#[derive(Debug, Default)]
pub struct MigrationBuilder {
    pairs: Vec<OperationPair>,
    leading: usize,
}

impl MigrationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pair: OperationPair) {
        self.pairs.push(pair);
    }

    pub fn extend(&mut self, pairs: impl IntoIterator<Item = OperationPair>) {
        for pair in pairs {
            self.add(pair);
        }
    }

    /// Insert ahead of every pair added with [`add`](Self::add). Leading pairs
    /// keep the order they were added in.
    pub fn add_leading(&mut self, pair: OperationPair) {
        self.pairs.insert(self.leading, pair);
        self.leading += 1;
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Split into `(forward, backward)`; backward is forward's reverse.
    pub fn into_operation_lists(self) -> (Vec<Operation>, Vec<Operation>) {
        let mut forward = Vec::with_capacity(self.pairs.len());
        let mut backward = Vec::with_capacity(self.pairs.len());
        for pair in self.pairs {
            forward.push(pair.forward);
            backward.push(pair.backward);
        }
        backward.reverse();
        (forward, backward)
    }

    pub fn finish(self, name: impl Into<String>, messages: MigrationMessages) -> CompiledMigration {
        let (forward, backward) = self.into_operation_lists();
        CompiledMigration {
            name: name.into(),
            messages,
            forward,
            backward,
        }
    }
}
