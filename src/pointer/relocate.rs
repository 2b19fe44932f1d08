//! Re-anchoring search.

use rowan::SyntaxKind;
use text_size::TextRange;

use crate::base::{NodeId, TextRangeExt};
use crate::tree::SyntaxTree;

/// Relative overlap of two ranges: intersection length over the larger of
/// the two lengths. Two empty ranges overlap fully iff they coincide.
pub(crate) fn overlap_ratio(anchor: TextRange, candidate: TextRange) -> f32 {
    let longest = anchor.len().max(candidate.len());
    if longest == 0.into() {
        return if anchor.start() == candidate.start() { 1.0 } else { 0.0 };
    }
    u32::from(anchor.overlap_len(candidate)) as f32 / u32::from(longest) as f32
}

/// Find the narrowest node of `kind` overlapping `range` by more than
/// `threshold`.
///
/// Candidates are the ancestors of the leaf at the range start, the
/// ancestors of the node covering the range, and those descendants of the
/// covering node that intersect the range.
pub(crate) fn relocate(
    tree: &SyntaxTree,
    kind: SyntaxKind,
    range: TextRange,
    threshold: f32,
) -> Option<(NodeId, TextRange)> {
    let mut best: Option<(NodeId, TextRange, f32)> = None;
    let mut consider = |node: NodeId| {
        if tree.kind(node).ok() != Some(kind) {
            return;
        }
        let Ok(candidate) = tree.text_range(node) else {
            return;
        };
        let score = overlap_ratio(range, candidate);
        if score <= threshold {
            return;
        }
        let better = match best {
            None => true,
            Some((_, current, current_score)) => {
                candidate.len() < current.len()
                    || (candidate.len() == current.len() && score > current_score)
            }
        };
        if better {
            best = Some((node, candidate, score));
        }
    };

    if let Some(leaf) = tree.leaf_at_offset(range.start()) {
        tree.ancestors(leaf).into_iter().flatten().for_each(&mut consider);
    }
    if let Some(cover) = tree.covering_node(range) {
        tree.ancestors(cover).into_iter().flatten().for_each(&mut consider);
        let mut stack = vec![cover];
        while let Some(node) = stack.pop() {
            consider(node);
            for child in tree.children(node).unwrap_or_default() {
                let intersects = tree
                    .text_range(child)
                    .is_ok_and(|r| r.intersect(range).is_some());
                if intersects {
                    stack.push(child);
                }
            }
        }
    }
    best.map(|(node, range, _)| (node, range))
}
