//! Event payloads.

use crate::base::{DocumentId, NodeId};

/// Non-structural attributes whose change is broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    ReadOnly,
    Language,
    Name,
}

/// One notification. Node handles in "after" events that name removed or
/// replaced nodes are already invalid when delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    BeforeChildAddition {
        parent: NodeId,
    },
    ChildAdded {
        parent: NodeId,
        child: NodeId,
    },
    BeforeChildRemoval {
        parent: NodeId,
        child: NodeId,
    },
    ChildRemoved {
        parent: NodeId,
        child: NodeId,
    },
    /// `parent` is `None` when the root itself is replaced.
    BeforeChildReplacement {
        parent: Option<NodeId>,
        old: NodeId,
    },
    ChildReplaced {
        parent: Option<NodeId>,
        old: NodeId,
        new: NodeId,
    },
    BeforeChildMove {
        child: NodeId,
        old_parent: NodeId,
        new_parent: NodeId,
    },
    ChildMoved {
        child: NodeId,
        old_parent: NodeId,
        new_parent: NodeId,
    },
    /// Bulk change below `parent` (leaf text edits, commits).
    BeforeChildrenChange {
        parent: NodeId,
    },
    ChildrenChanged {
        parent: NodeId,
    },
    /// `node` is `None` for document-level properties.
    BeforePropertyChange {
        node: Option<NodeId>,
        property: Property,
    },
    PropertyChanged {
        node: Option<NodeId>,
        property: Property,
    },
}

impl TreeChange {
    pub fn is_before(&self) -> bool {
        matches!(
            self,
            Self::BeforeChildAddition { .. }
                | Self::BeforeChildRemoval { .. }
                | Self::BeforeChildReplacement { .. }
                | Self::BeforeChildMove { .. }
                | Self::BeforeChildrenChange { .. }
                | Self::BeforePropertyChange { .. }
        )
    }

    /// The node under which the change happens, when there is one.
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Self::BeforeChildAddition { parent }
            | Self::ChildAdded { parent, .. }
            | Self::BeforeChildRemoval { parent, .. }
            | Self::ChildRemoved { parent, .. }
            | Self::BeforeChildrenChange { parent }
            | Self::ChildrenChanged { parent } => Some(*parent),
            Self::BeforeChildReplacement { parent, .. } | Self::ChildReplaced { parent, .. } => {
                *parent
            }
            Self::BeforeChildMove { new_parent, .. } | Self::ChildMoved { new_parent, .. } => {
                Some(*new_parent)
            }
            Self::BeforePropertyChange { node, .. } | Self::PropertyChanged { node, .. } => *node,
        }
    }
}

/// A change together with the document it happened in and the document
/// modification stamp it produced (for "before" events, the stamp prior to
/// the change).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChangeEvent {
    pub document: DocumentId,
    pub change: TreeChange,
    pub stamp: u64,
}

impl TreeChangeEvent {
    pub fn new(document: DocumentId, change: TreeChange, stamp: u64) -> Self {
        Self {
            document,
            change,
            stamp,
        }
    }
}
