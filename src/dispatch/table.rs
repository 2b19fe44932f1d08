//! Ordered (kind, strategy) table with most-specific-match lookup.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rowan::SyntaxKind;

use super::hierarchy::KindHierarchy;
use crate::base::{Result, TreeError};

struct Entry<T: ?Sized> {
    kind: SyntaxKind,
    strategy: Arc<T>,
}

impl<T: ?Sized> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            strategy: Arc::clone(&self.strategy),
        }
    }
}

/// Append-mostly registry of strategies keyed by node kind.
///
/// Registration swaps in a fresh copy of the entry list, so a concurrent
/// lookup observes either the table before or after the registration,
/// never a half-written entry.
pub struct KindTable<T: ?Sized> {
    capability: &'static str,
    hierarchy: Arc<KindHierarchy>,
    entries: RwLock<Arc<Vec<Entry<T>>>>,
}

impl<T: ?Sized> fmt::Debug for KindTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<SyntaxKind> = self.entries.read().iter().map(|e| e.kind).collect();
        f.debug_struct("KindTable")
            .field("capability", &self.capability)
            .field("kinds", &kinds)
            .finish()
    }
}

impl<T: ?Sized + Send + Sync> KindTable<T> {
    /// Create an empty table. `capability` names the strategy in
    /// missing-capability errors.
    pub fn new(capability: &'static str, hierarchy: Arc<KindHierarchy>) -> Self {
        Self {
            capability,
            hierarchy,
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn capability(&self) -> &'static str {
        self.capability
    }

    /// Register `strategy` for `kind` and all its subtypes.
    pub fn register(&self, kind: SyntaxKind, strategy: Arc<T>) {
        let mut entries = self.entries.write();
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push(Entry { kind, strategy });
        *entries = Arc::new(next);
        tracing::trace!("[DISPATCH] registered {} for {:?}", self.capability, kind);
    }

    fn snapshot(&self) -> Arc<Vec<Entry<T>>> {
        Arc::clone(&self.entries.read())
    }

    /// The strategy registered for the nearest supertype of `kind`.
    ///
    /// Exact registrations beat supertype registrations; among equally
    /// specific registrations the last one registered wins.
    pub fn lookup(&self, kind: SyntaxKind) -> Option<Arc<T>> {
        let entries = self.snapshot();
        let chain = self.hierarchy.chain(kind);
        let mut best: Option<(usize, &Entry<T>)> = None;
        for entry in entries.iter() {
            let Some(distance) = chain.iter().position(|k| *k == entry.kind) else {
                continue;
            };
            if best.is_none_or(|(d, _)| distance <= d) {
                best = Some((distance, entry));
            }
        }
        best.map(|(_, entry)| Arc::clone(&entry.strategy))
    }

    /// Like [`lookup`](Self::lookup) but a missing registration is a
    /// [`TreeError::MissingCapability`].
    pub fn require(&self, kind: SyntaxKind) -> Result<Arc<T>> {
        self.lookup(kind)
            .ok_or_else(|| TreeError::missing_capability(self.capability, Some(kind)))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
