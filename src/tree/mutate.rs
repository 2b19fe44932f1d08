//! Write side of the arena tree.
//!
//! Every mutation runs its `check_*` validation first and only then touches
//! the arena, so a refused mutation leaves the tree exactly as it was. The
//! checks are exposed to the document layer, which validates before firing
//! the "before" notification.

use rowan::{GreenNode, GreenNodeData, NodeOrToken};
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::build::{GreenElement, GreenRef, as_green_ref, green_kind};
use super::syntax_tree::{RETIRED_EPOCH_HISTORY, SyntaxTree};
use super::walk::Preorder;
use crate::base::{
    InvalidationReason, NodeId, Result, TextEdit, TextRangeExt, TreeError, UnsupportedOperation,
};

/// Outcome of an incremental rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Nodes whose handle survived.
    pub reused: usize,
    /// Nodes allocated from the new green tree.
    pub created: usize,
    /// Nodes invalidated.
    pub invalidated: usize,
}

/// A validated leaf text edit.
#[derive(Debug, Clone)]
pub(crate) struct LeafEdit {
    pub(crate) leaf: u32,
    pub(crate) range: TextRange,
    pub(crate) new_text: String,
}

impl SyntaxTree {
    // ========================================================================
    // GUARDS
    // ========================================================================

    /// Refuses when the document, `index` or one of its ancestors is
    /// read-only.
    fn guard_path_writable(&self, index: u32) -> Result<()> {
        if self.read_only {
            return Err(TreeError::unsupported(UnsupportedOperation::ReadOnly));
        }
        let mut current = Some(index);
        while let Some(i) = current {
            if self.raw(i).read_only {
                return Err(TreeError::unsupported(UnsupportedOperation::ReadOnly));
            }
            current = self.raw(i).parent;
        }
        Ok(())
    }

    /// Like [`guard_path_writable`](Self::guard_path_writable), and the
    /// subtree below `index` must not contain a read-only node either.
    fn guard_subtree_writable(&self, index: u32) -> Result<()> {
        if self.touches_read_only(index) {
            return Err(TreeError::unsupported(UnsupportedOperation::ReadOnly));
        }
        Ok(())
    }

    /// Fails unless `id` is valid and nothing in or above its subtree is
    /// read-only.
    pub fn check_subtree_writable(&self, id: NodeId) -> Result<()> {
        let index = self.index(id)?;
        self.guard_subtree_writable(index)
    }

    fn parent_position(&self, index: u32) -> Result<(u32, usize)> {
        if self.raw(index).parent.is_none() {
            return Err(TreeError::unsupported(UnsupportedOperation::RootRemoval));
        }
        self.position_in_parent(index)
            .ok_or_else(|| TreeError::unsupported(UnsupportedOperation::NotAChild))
    }

    // ========================================================================
    // VALIDATION
    // ========================================================================

    pub(crate) fn check_insert(&self, parent: NodeId, position: usize) -> Result<u32> {
        let index = self.index(parent)?;
        let data = self.raw(index);
        if data.is_leaf() {
            return Err(TreeError::unsupported(UnsupportedOperation::NotAComposite));
        }
        if position > data.children.len() {
            return Err(TreeError::unsupported(
                UnsupportedOperation::ChildIndexOutOfBounds {
                    index: position,
                    len: data.children.len(),
                },
            ));
        }
        self.guard_path_writable(index)?;
        Ok(index)
    }

    /// Returns the parent and the position `anchor`'s next sibling gets.
    pub(crate) fn check_add_after(&self, anchor: NodeId) -> Result<(NodeId, usize)> {
        let index = self.index(anchor)?;
        let (parent, position) = self.parent_position(index)?;
        self.guard_path_writable(parent)?;
        Ok((self.id_of(parent), position + 1))
    }

    pub(crate) fn check_remove(&self, node: NodeId) -> Result<(u32, u32, usize)> {
        let index = self.index(node)?;
        let (parent, position) = self.parent_position(index)?;
        self.guard_subtree_writable(index)?;
        Ok((index, parent, position))
    }

    pub(crate) fn check_replace(&self, node: NodeId) -> Result<u32> {
        let index = self.index(node)?;
        if self.raw(index).parent.is_some() {
            self.parent_position(index)?;
        }
        self.guard_subtree_writable(index)?;
        Ok(index)
    }

    pub(crate) fn check_move(
        &self,
        node: NodeId,
        new_parent: NodeId,
        position: usize,
    ) -> Result<(u32, u32)> {
        let index = self.index(node)?;
        let target = self.index(new_parent)?;
        let (old_parent, _) = self.parent_position(index)?;
        if self.is_ancestor_of(node, new_parent)? {
            return Err(TreeError::unsupported(UnsupportedOperation::CyclicMove));
        }
        let target_data = self.raw(target);
        if target_data.is_leaf() {
            return Err(TreeError::unsupported(UnsupportedOperation::NotAComposite));
        }
        let len = target_data.children.len() - usize::from(target == old_parent);
        if position > len {
            return Err(TreeError::unsupported(
                UnsupportedOperation::ChildIndexOutOfBounds {
                    index: position,
                    len,
                },
            ));
        }
        self.guard_subtree_writable(index)?;
        self.guard_path_writable(target)?;
        Ok((index, target))
    }

    pub(crate) fn check_leaf_text(&self, leaf: NodeId, text: &str) -> Result<LeafEdit> {
        let index = self.index(leaf)?;
        if !self.raw(index).is_leaf() {
            return Err(TreeError::unsupported(UnsupportedOperation::NotALeaf));
        }
        self.guard_path_writable(index)?;
        Ok(LeafEdit {
            leaf: index,
            range: self.range_of(index),
            new_text: text.to_string(),
        })
    }

    /// Resolves a range edit inside `node` to the single leaf it touches.
    ///
    /// An empty range on a leaf boundary belongs to the left leaf.
    pub(crate) fn check_replace_text(
        &self,
        node: NodeId,
        range_in_node: TextRange,
        text: &str,
    ) -> Result<LeafEdit> {
        let mut index = self.index(node)?;
        let len = self.raw(index).len;
        if range_in_node.end() > len {
            return Err(TreeError::unsupported(
                UnsupportedOperation::RangeOutOfBounds {
                    range: range_in_node,
                    len,
                },
            ));
        }
        let mut start = self.offset_of(index);
        let absolute = range_in_node.shift_right(start);
        'descend: while !self.raw(index).is_leaf() {
            let mut child_start = start;
            for child in &self.raw(index).children {
                let child_range = TextRange::at(child_start, self.raw(*child).len);
                if child_range.contains_range(absolute) {
                    index = *child;
                    start = child_start;
                    continue 'descend;
                }
                child_start = child_range.end();
            }
            return Err(TreeError::unsupported(UnsupportedOperation::EditRejected(
                format!("range {absolute:?} spans several leaves"),
            )));
        }
        self.guard_path_writable(index)?;
        let leaf_range = self.range_of(index);
        let current = self.raw(index).text.as_deref().unwrap_or_default();
        let local = absolute - leaf_range.start();
        let new_text = local.replace_in(current, text).ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::EditRejected(format!(
                "range {local:?} is not on a character boundary"
            )))
        })?;
        Ok(LeafEdit {
            leaf: index,
            range: leaf_range,
            new_text,
        })
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    fn adjust_len(&mut self, mut current: Option<u32>, old: TextSize, new: TextSize) {
        while let Some(index) = current {
            let data = self.raw_mut(index);
            data.len = data.len + new - old;
            current = data.parent;
        }
    }

    /// Vacate every slot of the subtree, bumping generations.
    fn free_subtree(&mut self, index: u32, reason: &InvalidationReason) -> usize {
        let doomed: Vec<u32> = Preorder::new(self, index).indices().collect();
        for slot_index in &doomed {
            let slot = &mut self.slots[*slot_index as usize];
            slot.alive = false;
            slot.generation = slot.generation.wrapping_add(1);
            slot.last_reason = reason.clone();
            slot.data.parent = None;
            slot.data.children.clear();
            self.free.push(*slot_index);
        }
        doomed.len()
    }

    fn subtree_size(&self, index: u32) -> usize {
        Preorder::new(self, index).indices().count()
    }

    fn child_offset(&self, parent: u32, position: usize) -> TextSize {
        let before: TextSize = self.raw(parent).children[..position]
            .iter()
            .map(|c| self.raw(*c).len)
            .sum();
        self.offset_of(parent) + before
    }

    /// Insert `green` as child number `position` of `parent`.
    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        position: usize,
        green: &GreenElement,
        stamp: u64,
    ) -> Result<(NodeId, TextEdit)> {
        let parent = self.check_insert(parent, position)?;
        let offset = self.child_offset(parent, position);
        let child = self.alloc_green(Some(parent), as_green_ref(green));
        self.raw_mut(parent).children.insert(position, child);
        let len = self.raw(child).len;
        self.adjust_len(Some(parent), TextSize::from(0), len);
        self.stamp = stamp;
        Ok((self.id_of(child), TextEdit::new(TextRange::empty(offset), len)))
    }

    pub(crate) fn remove(
        &mut self,
        node: NodeId,
        operation: &'static str,
        stamp: u64,
    ) -> Result<TextEdit> {
        let (index, parent, position) = self.check_remove(node)?;
        let range = self.range_of(index);
        self.raw_mut(parent).children.remove(position);
        self.adjust_len(Some(parent), range.len(), TextSize::from(0));
        self.free_subtree(index, &InvalidationReason::Deleted { operation, stamp });
        self.stamp = stamp;
        Ok(TextEdit::new(range, TextSize::from(0)))
    }

    /// Replace the subtree at `node` (the root included) with `green`.
    pub(crate) fn replace_with_green(
        &mut self,
        node: NodeId,
        green: &GreenElement,
        stamp: u64,
    ) -> Result<(NodeId, TextEdit)> {
        let index = self.check_replace(node)?;
        let range = self.range_of(index);
        let parent = self.raw(index).parent;
        let position = self.position_in_parent(index).map(|(_, p)| p);
        self.free_subtree(
            index,
            &InvalidationReason::Deleted {
                operation: "replace",
                stamp,
            },
        );
        let replacement = self.alloc_green(parent, as_green_ref(green));
        let new_len = self.raw(replacement).len;
        match (parent, position) {
            (Some(parent), Some(position)) => {
                self.raw_mut(parent).children[position] = replacement;
                self.adjust_len(Some(parent), range.len(), new_len);
            }
            _ => self.root = replacement,
        }
        self.stamp = stamp;
        Ok((self.id_of(replacement), TextEdit::new(range, new_len)))
    }

    /// Detach `node` and insert it as child number `position` of
    /// `new_parent`. Handles inside the moved subtree stay valid.
    ///
    /// Returns the removal and insertion edits, to be applied in order.
    pub(crate) fn move_node(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        position: usize,
        stamp: u64,
    ) -> Result<[TextEdit; 2]> {
        let (index, target) = self.check_move(node, new_parent, position)?;
        let (old_parent, old_position) = self.parent_position(index)?;
        let range = self.range_of(index);
        self.raw_mut(old_parent).children.remove(old_position);
        self.adjust_len(Some(old_parent), range.len(), TextSize::from(0));

        let offset = self.child_offset(target, position);
        self.raw_mut(target).children.insert(position, index);
        self.raw_mut(index).parent = Some(target);
        self.adjust_len(Some(target), TextSize::from(0), range.len());
        self.stamp = stamp;
        Ok([
            TextEdit::new(range, TextSize::from(0)),
            TextEdit::new(TextRange::empty(offset), range.len()),
        ])
    }

    /// Apply a validated leaf edit.
    pub(crate) fn apply_leaf_edit(&mut self, edit: LeafEdit, stamp: u64) -> (NodeId, TextEdit) {
        let new_len = TextSize::of(edit.new_text.as_str());
        self.raw_mut(edit.leaf).text = Some(SmolStr::new(&edit.new_text));
        self.adjust_len(Some(edit.leaf), edit.range.len(), new_len);
        self.stamp = stamp;
        (self.id_of(edit.leaf), TextEdit::new(edit.range, new_len))
    }

    pub(crate) fn set_leaf_text(&mut self, leaf: NodeId, text: &str, stamp: u64) -> Result<TextEdit> {
        let edit = self.check_leaf_text(leaf, text)?;
        Ok(self.apply_leaf_edit(edit, stamp).1)
    }

    /// Replace `range_in_node` (relative to `node`) with `text`. The range
    /// must fall inside a single leaf; returns that leaf.
    pub(crate) fn replace_text(
        &mut self,
        node: NodeId,
        range_in_node: TextRange,
        text: &str,
        stamp: u64,
    ) -> Result<(NodeId, TextEdit)> {
        let edit = self.check_replace_text(node, range_in_node, text)?;
        Ok(self.apply_leaf_edit(edit, stamp))
    }

    /// Returns the previous flag.
    pub(crate) fn set_read_only(&mut self, node: NodeId, read_only: bool) -> Result<bool> {
        let index = self.index(node)?;
        Ok(std::mem::replace(&mut self.raw_mut(index).read_only, read_only))
    }

    pub(crate) fn set_document_read_only(&mut self, read_only: bool) -> bool {
        std::mem::replace(&mut self.read_only, read_only)
    }

    // ========================================================================
    // REBUILD
    // ========================================================================

    /// Rebuild against a freshly parsed green tree, keeping the handles of
    /// every structurally identical subtree.
    ///
    /// Children are matched by common prefix and suffix; the differing
    /// middle is matched pairwise when kinds line up one to one (recursing
    /// into composites, updating leaf text in place) and rebuilt otherwise.
    pub(crate) fn rebuild_with_reuse(&mut self, green: &GreenNode, stamp: u64) -> RebuildSummary {
        let reason = InvalidationReason::Reparsed { stamp };
        let mut summary = RebuildSummary::default();
        let root = self.root;
        if self.raw(root).is_leaf() || self.raw(root).kind != green.kind() {
            summary.invalidated += self.free_subtree(root, &reason);
            self.root = self.alloc_green(None, NodeOrToken::Node(&**green));
            summary.created += self.subtree_size(self.root);
        } else {
            self.reconcile(root, green, &reason, &mut summary);
        }
        self.stamp = stamp;
        tracing::debug!(
            "[TREE] rebuilt {}: {} reused, {} created, {} invalidated",
            self.document,
            summary.reused,
            summary.created,
            summary.invalidated
        );
        summary
    }

    fn reconcile(
        &mut self,
        index: u32,
        green: &GreenNodeData,
        reason: &InvalidationReason,
        summary: &mut RebuildSummary,
    ) {
        summary.reused += 1;
        let old: Vec<u32> = self.raw(index).children.clone();
        let new: Vec<GreenRef<'_>> = green.children().collect();
        let limit = old.len().min(new.len());
        let prefix = (0..limit)
            .take_while(|&i| self.same_as_green(old[i], new[i]))
            .count();
        let suffix = (0..limit - prefix)
            .take_while(|&i| self.same_as_green(old[old.len() - 1 - i], new[new.len() - 1 - i]))
            .count();
        for kept in old[..prefix].iter().chain(&old[old.len() - suffix..]) {
            summary.reused += self.subtree_size(*kept);
        }

        let old_middle = &old[prefix..old.len() - suffix];
        let new_middle = &new[prefix..new.len() - suffix];
        let pairwise = old_middle.len() == new_middle.len()
            && old_middle.iter().zip(new_middle).all(|(o, n)| {
                let data = self.raw(*o);
                data.kind == green_kind(*n) && data.is_leaf() == matches!(n, NodeOrToken::Token(_))
            })
            && !self.siblings_shifted(old_middle, new_middle);

        let mut children = Vec::with_capacity(new.len());
        children.extend_from_slice(&old[..prefix]);
        if pairwise {
            for (o, n) in old_middle.iter().zip(new_middle) {
                match n {
                    NodeOrToken::Node(node) => self.reconcile(*o, node, reason, summary),
                    NodeOrToken::Token(token) if self.raw(*o).text.as_deref() == Some(token.text()) => {
                        summary.reused += 1;
                    }
                    NodeOrToken::Token(_) => {
                        summary.invalidated += self.free_subtree(*o, reason);
                        let child = self.alloc_green(Some(index), *n);
                        summary.created += 1;
                        children.push(child);
                        continue;
                    }
                }
                children.push(*o);
            }
        } else {
            for o in old_middle {
                summary.invalidated += self.free_subtree(*o, reason);
            }
            for n in new_middle {
                let child = self.alloc_green(Some(index), *n);
                summary.created += self.subtree_size(child);
                children.push(child);
            }
        }
        children.extend_from_slice(&old[old.len() - suffix..]);

        let len: TextSize = children.iter().map(|c| self.raw(*c).len).sum();
        let data = self.raw_mut(index);
        data.children = children;
        data.len = len;
    }

    /// A middle child reappearing unchanged at another position means the
    /// siblings moved; pairing them by position would hand one construct's
    /// handle to another.
    fn siblings_shifted(&self, old: &[u32], new: &[GreenRef<'_>]) -> bool {
        old.iter().enumerate().any(|(i, o)| {
            new.iter()
                .enumerate()
                .any(|(j, n)| i != j && self.same_as_green(*o, *n))
        })
    }

    /// Throw away every node and rebuild under a new epoch. Returns the
    /// number of invalidated nodes.
    pub(crate) fn reload(&mut self, green: &GreenNode, stamp: u64) -> usize {
        let invalidated = self.node_count();
        self.retired_epochs
            .push((self.epoch, InvalidationReason::Reloaded { stamp }));
        if self.retired_epochs.len() > RETIRED_EPOCH_HISTORY {
            self.retired_epochs.remove(0);
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.slots.clear();
        self.free.clear();
        self.root = self.alloc_green(None, NodeOrToken::Node(&**green));
        self.stamp = stamp;
        tracing::debug!(
            "[TREE] reloaded {} at epoch {}, {} nodes invalidated",
            self.document,
            self.epoch,
            invalidated
        );
        invalidated
    }

    /// Invalidate the whole tree for good.
    pub(crate) fn dispose(&mut self, reason: InvalidationReason) {
        tracing::debug!("[TREE] disposing {}: {}", self.document, reason);
        self.disposed = Some(reason);
    }
}
