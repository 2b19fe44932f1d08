//! Stock manipulators.

use text_size::{TextRange, TextSize};

use super::{Manipulator, check_range};
use crate::base::text_utils::has_closing_quote;
use crate::base::{NodeId, Result, TextRangeExt, TreeError, UnsupportedOperation};
use crate::document::TreeWriter;
use crate::tree::SyntaxTree;

/// Whole-node value; edits go straight into the covered leaf.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeafManipulator;

impl Manipulator for LeafManipulator {
    fn set_content(
        &self,
        writer: &mut TreeWriter<'_>,
        node: NodeId,
        range: TextRange,
        text: &str,
    ) -> Result<NodeId> {
        check_range(writer.tree(), node, range)?;
        writer.replace_text(node, range, text)?;
        tracing::trace!("[MANIPULATE] set {:?} of {} to {:?}", range, node, text);
        Ok(node)
    }
}

/// Value is the text between matching `"` or `'` delimiters. An
/// unterminated literal's value runs to the end of the node.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuotedLiteralManipulator;

impl Manipulator for QuotedLiteralManipulator {
    fn value_range(&self, tree: &SyntaxTree, node: NodeId) -> Result<TextRange> {
        let text = tree.text(node)?;
        let len = TextSize::of(text.as_str());
        let Some(open) = text.chars().next().filter(|c| matches!(c, '"' | '\'')) else {
            return Ok(TextRange::up_to(len));
        };
        let one = TextSize::from(1);
        if has_closing_quote(&text, open) {
            Ok(TextRange::new(one, len - one))
        } else {
            Ok(TextRange::new(one, len))
        }
    }

    fn set_content(
        &self,
        writer: &mut TreeWriter<'_>,
        node: NodeId,
        range: TextRange,
        text: &str,
    ) -> Result<NodeId> {
        check_range(writer.tree(), node, range)?;
        writer.replace_text(node, range, text)?;
        tracing::trace!("[MANIPULATE] set literal {:?} of {}", range, node);
        Ok(node)
    }
}

/// Rebuilds the node from its edited text through the document language's
/// fragment parser. The returned node replaces the original one.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReparsingManipulator;

impl Manipulator for ReparsingManipulator {
    fn set_content(
        &self,
        writer: &mut TreeWriter<'_>,
        node: NodeId,
        range: TextRange,
        text: &str,
    ) -> Result<NodeId> {
        check_range(writer.tree(), node, range)?;
        let kind = writer.tree().kind(node)?;
        let current = writer.tree().text(node)?;
        let edited = range.replace_in(&current, text).ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::EditRejected(format!(
                "range {range:?} is not on a character boundary"
            )))
        })?;
        let language = writer.document().language();
        let parser = writer.document().services().parser_for(&language)?;
        let green = parser.parse_fragment(kind, &edited).ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::EditRejected(format!(
                "{edited:?} does not parse as {kind:?}"
            )))
        })?;
        let replacement = writer.replace(node, &green)?;
        tracing::debug!("[MANIPULATE] rebuilt {} as {}", node, replacement);
        Ok(replacement)
    }
}
