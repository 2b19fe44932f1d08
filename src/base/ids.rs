//! Identifier types.

use std::fmt;

use smol_str::SmolStr;

/// Interned identifier of a logical document.
///
/// Stable for the lifetime of the document, independent of any tree
/// snapshot built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u32);

impl DocumentId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Name of a language (`"toy"`, `"regexp"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LanguageId(SmolStr);

impl LanguageId {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Handle to a node in a [`SyntaxTree`](crate::tree::SyntaxTree) arena.
///
/// A handle is `(epoch, slot, generation)`. It stays cheap to copy and to
/// store anywhere; whether it still denotes a live node is decided by the
/// tree it is presented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) epoch: u32,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) const fn new(epoch: u32, index: u32, generation: u32) -> Self {
        Self {
            epoch,
            index,
            generation,
        }
    }

    /// The tree epoch this node was created in.
    pub fn epoch(self) -> u32 {
        self.epoch
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}@{}", self.index, self.generation, self.epoch)
    }
}
