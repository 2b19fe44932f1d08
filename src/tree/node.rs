//! Arena slots.

use rowan::SyntaxKind;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::base::InvalidationReason;

/// Payload of a live node.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) parent: Option<u32>,
    pub(crate) children: Vec<u32>,
    /// `Some` for leaves (tokens), `None` for composite nodes.
    pub(crate) text: Option<SmolStr>,
    /// Cached text length of the whole subtree.
    pub(crate) len: TextSize,
    pub(crate) read_only: bool,
}

impl NodeData {
    pub(crate) fn leaf(kind: SyntaxKind, text: &str, parent: Option<u32>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            text: Some(SmolStr::new(text)),
            len: TextSize::of(text),
            read_only: false,
        }
    }

    pub(crate) fn composite(kind: SyntaxKind, parent: Option<u32>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            text: None,
            len: TextSize::from(0),
            read_only: false,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.text.is_some()
    }
}

/// One arena cell. Vacated slots keep their last payload (with links
/// cleared) so indexing never has to deal with a hole.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) alive: bool,
    pub(crate) data: NodeData,
    /// Why the previous generation of this slot died.
    pub(crate) last_reason: InvalidationReason,
}
