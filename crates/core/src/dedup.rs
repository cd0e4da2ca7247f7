//! Run-scoped dedup cache.
//!
//! Records creations confirmed this run so an identical intent is never
//! sent twice. This is an at-most-once guarantee per process, not a check
//! against remote state. Nothing here is persisted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::intent::{ObjectIntent, ObjectKind};

/// How much of an intent participates in its dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupGranularity {
    /// (operation, type, row, column, attribute)
    #[default]
    Full,
    /// (row, column) only, for every kind of object. Any two objects on one
    /// cell collide: a red and a blue Soloon, but also a Polyanet and a
    /// Cometh. This is wider than a Polyanet-only coordinate cache.
    Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Coordinates {
        row: usize,
        column: usize,
    },
    Intent {
        operation: Operation,
        kind: ObjectKind,
        row: usize,
        column: usize,
        attribute: Option<&'static str>,
    },
}

impl DedupKey {
    pub fn for_create(intent: &ObjectIntent, granularity: DedupGranularity) -> Self {
        match granularity {
            DedupGranularity::Coordinates => Self::Coordinates {
                row: intent.row,
                column: intent.column,
            },
            DedupGranularity::Full => Self::Intent {
                operation: Operation::Create,
                kind: intent.kind(),
                row: intent.row,
                column: intent.column,
                attribute: intent.object.attribute(),
            },
        }
    }
}

/// Grows monotonically; keys are only added after a confirmed success.
#[derive(Debug, Default)]
pub struct DedupCache {
    granularity: DedupGranularity,
    seen: HashSet<DedupKey>,
}

impl DedupCache {
    pub fn new(granularity: DedupGranularity) -> Self {
        Self { granularity, seen: HashSet::new() }
    }

    pub fn granularity(&self) -> DedupGranularity {
        self.granularity
    }

    pub fn key_for(&self, intent: &ObjectIntent) -> DedupKey {
        DedupKey::for_create(intent, self.granularity)
    }

    pub fn contains(&self, intent: &ObjectIntent) -> bool {
        self.seen.contains(&self.key_for(intent))
    }

    /// Returns `false` if the key was already present.
    pub fn mark(&mut self, intent: &ObjectIntent) -> bool {
        let key = self.key_for(intent);
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
