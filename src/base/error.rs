//! Error types shared by every service of the core.
//!
//! Only genuine failures live here. A reference that resolves to nothing is
//! an ordinary `None`/empty value, never a [`TreeError`].

use std::fmt;

use rowan::SyntaxKind;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::ids::{DocumentId, NodeId};

pub type Result<T, E = TreeError> = std::result::Result<T, E>;

/// Why a node stopped being valid.
///
/// Advisory only: carried by [`TreeError::InvalidAccess`] to help explain
/// stale handles, never used for control flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InvalidationReason {
    /// The document was committed and the node's text did not survive.
    Reparsed { stamp: u64 },
    /// The whole tree was rebuilt from scratch.
    Reloaded { stamp: u64 },
    /// The node (or an ancestor) was structurally removed.
    Deleted { operation: &'static str, stamp: u64 },
    /// The owning document was discarded.
    DocumentDiscarded,
    /// The workspace holding the document was torn down.
    WorkspaceDisposed,
    #[default]
    Unknown,
}

impl fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reparsed { stamp } => write!(f, "text edited and reparsed at stamp {stamp}"),
            Self::Reloaded { stamp } => write!(f, "tree rebuilt from scratch at stamp {stamp}"),
            Self::Deleted { operation, stamp } => {
                write!(f, "removed by `{operation}` at stamp {stamp}")
            }
            Self::DocumentDiscarded => f.write_str("document discarded"),
            Self::WorkspaceDisposed => f.write_str("workspace disposed"),
            Self::Unknown => f.write_str("unknown cause"),
        }
    }
}

/// Structural mutations a node kind or tree state refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedOperation {
    #[error("subtree is read-only")]
    ReadOnly,
    #[error("node is not listed among its parent's children")]
    NotAChild,
    #[error("the root node cannot be removed or replaced by a sibling edit")]
    RootRemoval,
    #[error("cannot move a node into its own subtree")]
    CyclicMove,
    #[error("'{0}' is not a legal name")]
    IllegalName(String),
    #[error("reference cannot be rebound to an arbitrary target")]
    RebindUnsupported,
    #[error("operation requires a leaf node")]
    NotALeaf,
    #[error("operation requires a composite node")]
    NotAComposite,
    #[error("child index {index} is out of bounds for {len} children")]
    ChildIndexOutOfBounds { index: usize, len: usize },
    #[error("range {range:?} is outside of a node of length {len:?}")]
    RangeOutOfBounds { range: TextRange, len: TextSize },
    #[error("nodes belong to different documents")]
    CrossDocument,
    #[error("edit rejected: {0}")]
    EditRejected(String),
    #[error("document text has changes not yet committed to the tree")]
    Uncommitted,
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by tree, pointer, resolve, manipulator and injection
/// services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A node handle whose validity has lapsed was used.
    #[error("access to invalid node {node}: {diagnostic}")]
    InvalidAccess {
        node: NodeId,
        diagnostic: InvalidationReason,
    },

    /// The mutation is refused by the node kind or the tree state.
    #[error("unsupported operation: {0}")]
    Unsupported(UnsupportedOperation),

    /// No strategy/provider registered for a required kind.
    #[error("no {capability} registered for {kind:?}")]
    MissingCapability {
        capability: &'static str,
        kind: Option<SyntaxKind>,
    },

    /// The document is not known to the workspace or its text source.
    #[error("unknown document {0}")]
    UnknownDocument(DocumentId),

    /// The in-flight query was cancelled by its caller.
    #[error("operation cancelled")]
    Cancelled,
}

impl TreeError {
    /// Create an invalid-access error, logging it.
    pub fn invalid_access(node: NodeId, diagnostic: InvalidationReason) -> Self {
        tracing::warn!("[TREE] access to invalid node {}: {}", node, diagnostic);
        Self::InvalidAccess { node, diagnostic }
    }

    /// Create an unsupported-operation error, logging it.
    pub fn unsupported(operation: UnsupportedOperation) -> Self {
        tracing::warn!("[TREE] unsupported operation: {}", operation);
        Self::Unsupported(operation)
    }

    /// Create a missing-capability error, logging it.
    pub fn missing_capability(capability: &'static str, kind: Option<SyntaxKind>) -> Self {
        tracing::warn!("[TREE] no {} registered for {:?}", capability, kind);
        Self::MissingCapability { capability, kind }
    }

    /// Create an unknown-document error, logging it.
    pub fn unknown_document(document: DocumentId) -> Self {
        tracing::warn!("[TREE] unknown document {}", document);
        Self::UnknownDocument(document)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_invalid_access(&self) -> bool {
        matches!(self, Self::InvalidAccess { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn is_missing_capability(&self) -> bool {
        matches!(self, Self::MissingCapability { .. })
    }
}

impl From<UnsupportedOperation> for TreeError {
    fn from(operation: UnsupportedOperation) -> Self {
        Self::unsupported(operation)
    }
}
