//! The pointer handle.

use std::fmt;
use std::sync::{Arc, Weak};

use rowan::SyntaxKind;
use text_size::TextRange;

use super::anchor::Anchor;
use crate::base::{CoreConfig, DocumentId, NodeId};
use crate::document::Document;
use crate::tree::SyntaxTree;

/// Identity-preserving handle to a node that survives tree rebuilds.
///
/// Holds the document weakly; a pointer never keeps a document alive.
/// Clones share the same anchor.
#[derive(Clone)]
pub struct ElementPointer {
    document: Weak<Document>,
    anchor: Arc<Anchor>,
}

impl fmt::Debug for ElementPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementPointer")
            .field("document", &self.anchor.document)
            .field("kind", &self.anchor.kind)
            .field("range", &self.anchor.range())
            .finish()
    }
}

impl ElementPointer {
    pub(crate) fn new(document: Weak<Document>, anchor: Arc<Anchor>) -> Self {
        Self { document, anchor }
    }

    pub(crate) fn anchor(&self) -> &Arc<Anchor> {
        &self.anchor
    }

    /// The node this pointer currently denotes, or `None` once the
    /// construct is gone.
    pub fn get(&self) -> Option<NodeId> {
        let document = self.document.upgrade()?;
        let threshold = document.services().config().pointer_overlap_threshold;
        let tree = document.read();
        self.anchor.resolve(&tree, threshold)
    }

    /// Dereference against a tree the caller already holds (e.g. inside a
    /// change listener or a [`TreeWriter`](crate::TreeWriter)).
    pub fn get_in(&self, tree: &SyntaxTree) -> Option<NodeId> {
        if tree.document() != self.anchor.document {
            return None;
        }
        let threshold = self
            .document
            .upgrade()
            .map_or(CoreConfig::default().pointer_overlap_threshold, |d| {
                d.services().config().pointer_overlap_threshold
            });
        self.anchor.resolve(tree, threshold)
    }

    pub fn document(&self) -> Option<Arc<Document>> {
        self.document.upgrade()
    }

    pub fn document_id(&self) -> DocumentId {
        self.anchor.document
    }

    /// Kind of the node the pointer was created on.
    pub fn kind(&self) -> SyntaxKind {
        self.anchor.kind
    }

    /// Best known range of the pointed-to construct.
    pub fn range(&self) -> TextRange {
        self.anchor.range()
    }

    pub fn original_range(&self) -> TextRange {
        self.anchor.original_range
    }
}

impl PartialEq for ElementPointer {
    /// Equal when both denote the same node, or both denote nothing and
    /// were created at the same range of the same document.
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.anchor, &other.anchor) {
            return true;
        }
        if self.anchor.document != other.anchor.document {
            return false;
        }
        let (this, that) = match self.document.upgrade() {
            Some(document) => {
                let threshold = document.services().config().pointer_overlap_threshold;
                let tree = document.read();
                (
                    self.anchor.resolve(&tree, threshold),
                    other.anchor.resolve(&tree, threshold),
                )
            }
            None => (None, None),
        };
        match (this, that) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.anchor.original_range == other.anchor.original_range,
            _ => false,
        }
    }
}

impl Eq for ElementPointer {}
