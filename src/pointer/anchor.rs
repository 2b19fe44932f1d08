//! Edit-tracked anchor shared by clones of one pointer.

use parking_lot::Mutex;
use rowan::SyntaxKind;
use text_size::TextRange;

use super::relocate::{overlap_ratio, relocate};
use crate::base::{DocumentId, NodeId, TextEdit};
use crate::tree::SyntaxTree;

#[derive(Debug)]
struct AnchorState {
    range: TextRange,
    cached: Option<NodeId>,
    /// The anchored text was wholly replaced; only the cached node can
    /// still be returned.
    dead: bool,
    /// A reparse ran since the last dereference. Reused nodes must still
    /// cover the tracked range before the cached handle is trusted.
    reparsed: bool,
}

#[derive(Debug)]
pub(crate) struct Anchor {
    pub(crate) document: DocumentId,
    pub(crate) kind: SyntaxKind,
    pub(crate) original_range: TextRange,
    state: Mutex<AnchorState>,
}

impl Anchor {
    pub(crate) fn new(document: DocumentId, kind: SyntaxKind, range: TextRange, node: NodeId) -> Self {
        Self {
            document,
            kind,
            original_range: range,
            state: Mutex::new(AnchorState {
                range,
                cached: Some(node),
                dead: false,
                reparsed: false,
            }),
        }
    }

    pub(crate) fn cached(&self) -> Option<NodeId> {
        self.state.lock().cached
    }

    pub(crate) fn range(&self) -> TextRange {
        self.state.lock().range
    }

    /// Carry the anchor range through one edit of the document text. A
    /// reparse that swallows the anchored text also forgets the cached node.
    pub(crate) fn apply_edit(&self, edit: &TextEdit, reparse: bool) {
        let mut state = self.state.lock();
        match edit.apply_to_range(state.range) {
            Some(range) => state.range = range,
            None => {
                state.dead = true;
                if reparse {
                    state.cached = None;
                }
            }
        }
        state.reparsed |= reparse;
    }

    /// Dereference against `tree`. Repeated calls against the same tree
    /// return the same answer.
    pub(crate) fn resolve(&self, tree: &SyntaxTree, threshold: f32) -> Option<NodeId> {
        let mut state = self.state.lock();
        let reparsed = std::mem::take(&mut state.reparsed);
        if let Some(node) = state.cached {
            match tree.text_range(node) {
                Ok(range) if !reparsed || overlap_ratio(state.range, range) > threshold => {
                    state.range = range;
                    state.dead = false;
                    return Some(node);
                }
                Ok(range) => tracing::debug!(
                    "[POINTER] {} moved to {:?}, away from {:?}",
                    node,
                    range,
                    state.range
                ),
                Err(_) => {}
            }
            state.cached = None;
        }
        if state.dead {
            return None;
        }
        match relocate(tree, self.kind, state.range, threshold) {
            Some((node, range)) => {
                tracing::trace!(
                    "[POINTER] re-anchored {:?}@{:?} on {} at {:?}",
                    self.kind,
                    state.range,
                    node,
                    range
                );
                state.cached = Some(node);
                state.range = range;
                Some(node)
            }
            None => {
                tracing::debug!(
                    "[POINTER] no {:?} left near {:?} in {}",
                    self.kind,
                    state.range,
                    self.document
                );
                state.dead = true;
                None
            }
        }
    }
}
