//! Value-range manipulators dispatched by node kind.
//!
//! A manipulator knows which part of a node is its "value" (the body of a
//! string literal, the text of an identifier) and how to replace it. They
//! are registered per kind in a [`KindTable`](crate::dispatch::KindTable);
//! the most specific registration wins and ties go to the last one
//! registered.

mod builtin;

use std::sync::Arc;

use text_size::TextRange;

pub use builtin::{LeafManipulator, QuotedLiteralManipulator, ReparsingManipulator};

use crate::base::{NodeId, Result, TextRangeExt, TreeError, UnsupportedOperation};
use crate::document::TreeWriter;
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// Capability name used in missing-capability errors.
pub const MANIPULATOR: &str = "manipulator";

/// Reads and replaces the value sub-range of a node.
///
/// Ranges are relative to the start of the node.
pub trait Manipulator: Send + Sync {
    /// The value part of `node`; the whole node unless overridden.
    fn value_range(&self, tree: &SyntaxTree, node: NodeId) -> Result<TextRange> {
        Ok(TextRange::up_to(tree.text_len(node)?))
    }

    /// Replace `range` of `node` with `text`. Returns the node that now
    /// represents the edited construct, which differs from `node` when the
    /// edit forced the node to be rebuilt.
    fn set_content(
        &self,
        writer: &mut TreeWriter<'_>,
        node: NodeId,
        range: TextRange,
        text: &str,
    ) -> Result<NodeId>;

    /// Replace the whole value of `node`.
    fn handle_content_change(
        &self,
        writer: &mut TreeWriter<'_>,
        node: NodeId,
        text: &str,
    ) -> Result<NodeId> {
        let range = self.value_range(writer.tree(), node)?;
        self.set_content(writer, node, range, text)
    }

    fn value_text(&self, tree: &SyntaxTree, node: NodeId) -> Result<String> {
        let range = self.value_range(tree, node)?;
        let text = tree.text(node)?;
        range
            .substring(&text)
            .map(str::to_string)
            .ok_or_else(|| {
                TreeError::unsupported(UnsupportedOperation::RangeOutOfBounds {
                    range,
                    len: tree.text_len(node).unwrap_or_default(),
                })
            })
    }
}

/// The manipulator registered for `node`'s kind, if any.
pub fn lookup_for(
    services: &Services,
    tree: &SyntaxTree,
    node: NodeId,
) -> Result<Option<Arc<dyn Manipulator>>> {
    Ok(services.manipulators().lookup(tree.kind(node)?))
}

/// Like [`lookup_for`] but a missing registration is a
/// [`TreeError::MissingCapability`].
pub fn require_for(
    services: &Services,
    tree: &SyntaxTree,
    node: NodeId,
) -> Result<Arc<dyn Manipulator>> {
    services.manipulators().require(tree.kind(node)?)
}

/// Checks that `range` lies within `node` before handing it to a strategy.
pub(crate) fn check_range(tree: &SyntaxTree, node: NodeId, range: TextRange) -> Result<()> {
    let len = tree.text_len(node)?;
    if range.end() > len {
        return Err(TreeError::unsupported(
            UnsupportedOperation::RangeOutOfBounds { range, len },
        ));
    }
    Ok(())
}
