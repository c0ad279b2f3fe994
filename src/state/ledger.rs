/// Backward-side proximity ledger
///
/// The backward crawler records every title it sees as the target of an
/// outbound link before confirming the edge is reversible, then resolves each
/// entry once the reversibility check returns. Forward crawlers only read it,
/// through the ranking heuristic.
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Distance of a title confirmed to link back to its candidate parent
pub const DISTANCE_REVERSIBLE: u8 = 1;

/// Distance of a title that was checked but does not link back
pub const DISTANCE_NEAR: u8 = 2;

/// State of a title in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntry {
    /// Seen as a link target, reversibility not yet known
    Unresolved { parent: String },

    /// Reversibility checked; 1 = links back, 2 = near but one-way
    Resolved { distance: u8 },
}

impl LedgerEntry {
    /// Returns the resolved distance, if any
    pub fn distance(&self) -> Option<u8> {
        match self {
            Self::Resolved { distance } => Some(*distance),
            Self::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Shared ledger handle (single writer, many readers)
#[derive(Debug, Clone, Default)]
pub struct BackwardLedger {
    inner: Arc<RwLock<HashMap<String, LedgerEntry>>>,
}

impl BackwardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a title as observed but not yet checked
    ///
    /// Titles already resolved keep their resolution.
    pub fn mark_unresolved(&self, title: &str, parent: &str) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match map.get(title) {
            Some(LedgerEntry::Resolved { .. }) => {}
            _ => {
                map.insert(
                    title.to_string(),
                    LedgerEntry::Unresolved {
                        parent: parent.to_string(),
                    },
                );
            }
        }
    }

    /// Resolves a title to the given distance
    ///
    /// A title that already resolved to a shorter distance keeps it.
    pub fn resolve(&self, title: &str, distance: u8) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let entry = map
            .entry(title.to_string())
            .or_insert(LedgerEntry::Resolved { distance });
        match entry.distance() {
            Some(existing) if existing <= distance => {}
            _ => *entry = LedgerEntry::Resolved { distance },
        }
    }

    /// Returns the resolved distance for a title
    ///
    /// Unresolved and unknown titles both return `None`.
    pub fn distance(&self, title: &str) -> Option<u8> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(title)
            .and_then(LedgerEntry::distance)
    }

    pub fn get(&self, title: &str) -> Option<LedgerEntry> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(title)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries still waiting for a reversibility answer
    pub fn unresolved_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| !entry.is_resolved())
            .count()
    }
}
