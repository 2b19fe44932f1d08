//! The reference abstraction.

use std::any::TypeId;
use std::fmt;

use text_size::TextRange;

use crate::base::{
    Cancellation, DocumentId, NodeId, Result, TextRangeExt, TreeError, UnsupportedOperation,
};
use crate::document::TreeWriter;
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// A node in some document of the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementRef {
    pub document: DocumentId,
    pub node: NodeId,
}

impl ElementRef {
    pub fn new(document: DocumentId, node: NodeId) -> Self {
        Self { document, node }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.document, self.node)
    }
}

/// One candidate of a multi-candidate resolution. `valid` is false for
/// candidates reported only because incomplete results were allowed (for
/// example shadowed declarations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolveResult {
    pub element: Option<ElementRef>,
    pub valid: bool,
}

impl ResolveResult {
    pub fn valid(element: ElementRef) -> Self {
        Self {
            element: Some(element),
            valid: true,
        }
    }

    pub fn invalid(element: Option<ElementRef>) -> Self {
        Self {
            element,
            valid: false,
        }
    }
}

/// A relationship from a sub-range of one node (the anchor element) to
/// zero or more target nodes.
///
/// References are computed on demand and never owned by the tree. Failing
/// to resolve is an ordinary empty result; errors are reserved for invalid
/// handles and cancellation, which must be propagated untouched.
pub trait Reference: Send + Sync + fmt::Debug + 'static {
    /// The anchor element.
    fn element(&self) -> ElementRef;

    /// Distinguishes reference implementations sharing an anchor and range.
    fn reference_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// The reference text, relative to the anchor element. Always
    /// contained in the element's own range.
    fn range_in_element(&self) -> TextRange;

    /// Every candidate target.
    fn resolve_all(
        &self,
        services: &Services,
        incomplete: bool,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolveResult>>;

    /// The unique valid candidate, if there is exactly one candidate.
    fn resolve(&self, services: &Services, cancel: &Cancellation) -> Result<Option<ElementRef>> {
        Ok(unique_target(&self.resolve_all(services, false, cancel)?))
    }

    /// Whether `target` is among the valid candidates. Implementations may
    /// use a cheaper test, but must agree with [`resolve_all`](Self::resolve_all).
    fn is_reference_to(
        &self,
        services: &Services,
        target: ElementRef,
        cancel: &Cancellation,
    ) -> Result<bool> {
        Ok(self
            .resolve_all(services, false, cancel)?
            .iter()
            .any(|r| r.valid && r.element == Some(target)))
    }

    /// The reference text as written.
    fn canonical_text(&self, tree: &SyntaxTree) -> Result<String> {
        let text = tree.text(self.element().node)?;
        let range = self.range_in_element();
        range.substring(&text).map(str::to_string).ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::RangeOutOfBounds {
                range,
                len: text_size::TextSize::of(text.as_str()),
            })
        })
    }

    /// The target was renamed: rewrite this reference's own text (never
    /// the target). Returns the node now holding the reference.
    fn handle_element_rename(&self, writer: &mut TreeWriter<'_>, new_name: &str) -> Result<NodeId>;

    /// Rewrite the reference so it resolves to `target`. References whose
    /// text cannot express arbitrary targets refuse with
    /// [`UnsupportedOperation::RebindUnsupported`].
    fn bind_to_element(&self, writer: &mut TreeWriter<'_>, target: ElementRef) -> Result<NodeId> {
        let _ = (writer, target);
        Err(TreeError::unsupported(UnsupportedOperation::RebindUnsupported))
    }
}

/// Single-candidate view of a multi-candidate result.
pub fn unique_target(results: &[ResolveResult]) -> Option<ElementRef> {
    match results {
        [ResolveResult {
            element: Some(element),
            valid: true,
        }] => Some(*element),
        _ => None,
    }
}

/// Fails unless `reference`'s range lies within its element.
pub fn check_reference_range(tree: &SyntaxTree, reference: &dyn Reference) -> Result<()> {
    let len = tree.text_len(reference.element().node)?;
    let range = reference.range_in_element();
    if range.end() > len {
        return Err(TreeError::unsupported(
            UnsupportedOperation::RangeOutOfBounds { range, len },
        ));
    }
    Ok(())
}
