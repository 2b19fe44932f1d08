//! Supertype relation between node kinds.

use parking_lot::RwLock;
use rowan::SyntaxKind;
use rustc_hash::FxHashMap;

use crate::base::{Result, TreeError, UnsupportedOperation};

/// The universal supertype every kind descends from.
pub const ANY_KIND: SyntaxKind = SyntaxKind(u16::MAX);

/// Single-inheritance kind hierarchy.
///
/// Kinds without a declared supertype descend directly from [`ANY_KIND`].
#[derive(Debug, Default)]
pub struct KindHierarchy {
    parents: RwLock<FxHashMap<SyntaxKind, SyntaxKind>>,
}

impl KindHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `supertype` as the direct supertype of `kind`.
    ///
    /// Redeclaring replaces the previous supertype. Declarations that would
    /// introduce a cycle are refused.
    pub fn declare(&self, kind: SyntaxKind, supertype: SyntaxKind) -> Result<()> {
        if kind == ANY_KIND || self.is_subtype(supertype, kind) {
            return Err(TreeError::unsupported(UnsupportedOperation::Other(format!(
                "declaring {supertype:?} as supertype of {kind:?} creates a cycle"
            ))));
        }
        self.parents.write().insert(kind, supertype);
        Ok(())
    }

    /// Direct supertype of `kind`; `None` only for [`ANY_KIND`].
    pub fn supertype(&self, kind: SyntaxKind) -> Option<SyntaxKind> {
        if kind == ANY_KIND {
            return None;
        }
        Some(self.parents.read().get(&kind).copied().unwrap_or(ANY_KIND))
    }

    /// `kind`, its supertype, and so on up to [`ANY_KIND`].
    pub fn chain(&self, kind: SyntaxKind) -> Vec<SyntaxKind> {
        let parents = self.parents.read();
        let mut chain = vec![kind];
        let mut current = kind;
        while current != ANY_KIND {
            current = parents.get(&current).copied().unwrap_or(ANY_KIND);
            chain.push(current);
        }
        chain
    }

    /// Number of supertype hops from `kind` to `ancestor`.
    pub fn distance(&self, kind: SyntaxKind, ancestor: SyntaxKind) -> Option<usize> {
        self.chain(kind).iter().position(|k| *k == ancestor)
    }

    pub fn is_subtype(&self, kind: SyntaxKind, ancestor: SyntaxKind) -> bool {
        self.distance(kind, ancestor).is_some()
    }
}
