//! Per-workspace pointer bookkeeping.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::anchor::Anchor;
use super::element_pointer::ElementPointer;
use crate::base::{DocumentId, NodeId, Result, TextEdit};
use crate::document::Document;

/// Tracks the anchors of live pointers so document edits can carry them
/// along. Entries are weak: dropping every clone of a pointer is enough to
/// forget it.
#[derive(Debug, Default)]
pub struct PointerManager {
    anchors: Mutex<FxHashMap<DocumentId, Vec<Weak<Anchor>>>>,
}

impl PointerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pointer to `node`, or return an existing live pointer that
    /// currently caches the same node.
    pub fn create_pointer(&self, document: &Arc<Document>, node: NodeId) -> Result<ElementPointer> {
        let tree = document.read();
        let range = tree.text_range(node)?;
        let kind = tree.kind(node)?;
        let id = document.id();

        let mut anchors = self.anchors.lock();
        let list = anchors.entry(id).or_default();
        list.retain(|a| a.strong_count() > 0);
        let existing = list
            .iter()
            .filter_map(Weak::upgrade)
            .find(|a| a.cached() == Some(node));
        let anchor = match existing {
            Some(anchor) => anchor,
            None => {
                let anchor = Arc::new(Anchor::new(id, kind, range, node));
                list.push(Arc::downgrade(&anchor));
                tracing::trace!("[POINTER] created pointer to {} at {:?} in {}", node, range, id);
                anchor
            }
        };
        Ok(ElementPointer::new(Arc::downgrade(document), anchor))
    }

    /// Stop tracking `pointer`. Advisory: a forgotten pointer still
    /// dereferences through its cached node, but no longer follows edits.
    pub fn remove_pointer(&self, pointer: &ElementPointer) {
        let mut anchors = self.anchors.lock();
        if let Some(list) = anchors.get_mut(&pointer.document_id()) {
            list.retain(|a| {
                a.upgrade()
                    .is_some_and(|a| !Arc::ptr_eq(&a, pointer.anchor()))
            });
        }
    }

    /// Number of live pointers into `document`.
    pub fn pointer_count(&self, document: DocumentId) -> usize {
        self.anchors
            .lock()
            .get(&document)
            .map_or(0, |list| list.iter().filter(|a| a.strong_count() > 0).count())
    }

    /// Carry the anchors of `document` through `edits`. `reparse` marks
    /// edits made by rebuilding the tree from text, where reused handles
    /// are checked against the tracked range on the next dereference.
    pub(crate) fn apply_edits(&self, document: DocumentId, edits: &[TextEdit], reparse: bool) {
        let mut anchors = self.anchors.lock();
        let Some(list) = anchors.get_mut(&document) else {
            return;
        };
        list.retain(|a| a.strong_count() > 0);
        for anchor in list.iter().filter_map(Weak::upgrade) {
            for edit in edits {
                anchor.apply_edit(edit, reparse);
            }
        }
    }

    pub(crate) fn forget_document(&self, document: DocumentId) {
        self.anchors.lock().remove(&document);
    }
}
