//! Read side of the arena tree: navigation, ranges and validity.

use rowan::SyntaxKind;
use text_size::{TextRange, TextSize};

use super::node::{NodeData, Slot};
use super::walk::{Ancestors, Preorder};
use crate::base::{Cancellation, DocumentId, InvalidationReason, NodeId, Result, TreeError};

/// How many retired epochs keep their invalidation diagnostic.
pub(crate) const RETIRED_EPOCH_HISTORY: usize = 16;

/// The node graph of one document.
///
/// Nodes never own their parent: parent/child links are arena indices owned
/// by the tree. Text ranges are not stored; they are derived from cached
/// subtree lengths by walking ancestors (O(depth)).
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) document: DocumentId,
    pub(crate) epoch: u32,
    pub(crate) slots: Vec<Slot>,
    pub(crate) free: Vec<u32>,
    pub(crate) root: u32,
    pub(crate) stamp: u64,
    pub(crate) read_only: bool,
    pub(crate) disposed: Option<InvalidationReason>,
    pub(crate) retired_epochs: Vec<(u32, InvalidationReason)>,
}

impl SyntaxTree {
    // ========================================================================
    // IDENTITY
    // ========================================================================

    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Current validity epoch. Advances only on a full reload.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Modification stamp of the text this tree represents.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn root(&self) -> NodeId {
        self.id_of(self.root)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.alive).count()
    }

    pub(crate) fn id_of(&self, index: u32) -> NodeId {
        NodeId::new(self.epoch, index, self.slots[index as usize].generation)
    }

    pub(crate) fn raw(&self, index: u32) -> &NodeData {
        &self.slots[index as usize].data
    }

    pub(crate) fn raw_mut(&mut self, index: u32) -> &mut NodeData {
        &mut self.slots[index as usize].data
    }

    // ========================================================================
    // VALIDITY
    // ========================================================================

    /// Locate the slot of a current handle, walking ancestors up to the
    /// root. Failures carry the advisory reason but are not logged.
    fn locate(&self, id: NodeId) -> std::result::Result<u32, InvalidationReason> {
        if let Some(reason) = &self.disposed {
            return Err(reason.clone());
        }
        if id.epoch != self.epoch {
            return Err(self
                .retired_epochs
                .iter()
                .find(|(epoch, _)| *epoch == id.epoch)
                .map(|(_, reason)| reason.clone())
                .unwrap_or_default());
        }
        let Some(slot) = self.slots.get(id.index as usize) else {
            return Err(InvalidationReason::Unknown);
        };
        if !slot.alive || slot.generation != id.generation {
            return Err(if slot.generation == id.generation.wrapping_add(1) {
                slot.last_reason.clone()
            } else {
                InvalidationReason::Unknown
            });
        }
        let mut current = id.index;
        while let Some(parent) = self.raw(current).parent {
            let slot = &self.slots[parent as usize];
            if !slot.alive || !slot.data.children.contains(&current) {
                return Err(slot.last_reason.clone());
            }
            current = parent;
        }
        if current != self.root {
            return Err(InvalidationReason::Unknown);
        }
        Ok(id.index)
    }

    /// Validate `id` and return its slot index.
    pub(crate) fn index(&self, id: NodeId) -> Result<u32> {
        self.locate(id)
            .map_err(|reason| TreeError::invalid_access(id, reason))
    }

    /// Fails with [`TreeError::InvalidAccess`] unless `id` is valid.
    pub fn check_valid(&self, id: NodeId) -> Result<()> {
        self.index(id).map(|_| ())
    }

    pub fn is_valid(&self, id: NodeId) -> bool {
        self.locate(id).is_ok()
    }

    /// Why `id` is invalid, or `None` if it is valid.
    pub fn invalidation_reason(&self, id: NodeId) -> Option<InvalidationReason> {
        self.locate(id).err()
    }

    pub(crate) fn data(&self, id: NodeId) -> Result<&NodeData> {
        let index = self.index(id)?;
        Ok(self.raw(index))
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn kind(&self, id: NodeId) -> Result<SyntaxKind> {
        Ok(self.data(id)?.kind)
    }

    pub fn is_leaf(&self, id: NodeId) -> Result<bool> {
        Ok(self.data(id)?.is_leaf())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.data(id)?.parent.map(|p| self.id_of(p)))
    }

    pub fn children(&self, id: NodeId) -> Result<Vec<NodeId>> {
        Ok(self
            .data(id)?
            .children
            .iter()
            .map(|c| self.id_of(*c))
            .collect())
    }

    pub fn first_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.data(id)?.children.first().map(|c| self.id_of(*c)))
    }

    pub fn last_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.data(id)?.children.last().map(|c| self.id_of(*c)))
    }

    /// Position of `index` among its parent's children.
    pub(crate) fn position_in_parent(&self, index: u32) -> Option<(u32, usize)> {
        let parent = self.raw(index).parent?;
        let position = self.raw(parent).children.iter().position(|c| *c == index)?;
        Some((parent, position))
    }

    pub fn next_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        let index = self.index(id)?;
        Ok(self.position_in_parent(index).and_then(|(parent, pos)| {
            self.raw(parent)
                .children
                .get(pos + 1)
                .map(|c| self.id_of(*c))
        }))
    }

    pub fn prev_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        let index = self.index(id)?;
        Ok(self.position_in_parent(index).and_then(|(parent, pos)| {
            pos.checked_sub(1)
                .map(|p| self.id_of(self.raw(parent).children[p]))
        }))
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Result<Ancestors<'_>> {
        let index = self.index(id)?;
        Ok(Ancestors::new(self, index))
    }

    /// Preorder traversal of the subtree rooted at `id` (inclusive).
    pub fn descendants(&self, id: NodeId) -> Result<Preorder<'_>> {
        let index = self.index(id)?;
        Ok(Preorder::new(self, index))
    }

    /// Preorder traversal that checks `cancel` before every step.
    pub fn try_for_each_descendant(
        &self,
        id: NodeId,
        cancel: &Cancellation,
        mut f: impl FnMut(NodeId) -> Result<()>,
    ) -> Result<()> {
        for node in self.descendants(id)? {
            cancel.check()?;
            f(node)?;
        }
        Ok(())
    }

    pub fn depth(&self, id: NodeId) -> Result<usize> {
        Ok(self.ancestors(id)?.count() - 1)
    }

    /// True when `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> Result<bool> {
        let ancestor = self.index(ancestor)?;
        let mut current = Some(self.index(node)?);
        while let Some(index) = current {
            if index == ancestor {
                return Ok(true);
            }
            current = self.raw(index).parent;
        }
        Ok(false)
    }

    // ========================================================================
    // TEXT
    // ========================================================================

    pub fn text_len(&self, id: NodeId) -> Result<TextSize> {
        Ok(self.data(id)?.len)
    }

    /// Start offset of a (live) slot, summing preceding-sibling lengths on
    /// every ancestor level.
    pub(crate) fn offset_of(&self, index: u32) -> TextSize {
        let mut offset = TextSize::from(0);
        let mut current = index;
        while let Some((parent, pos)) = self.position_in_parent(current) {
            for sibling in &self.raw(parent).children[..pos] {
                offset += self.raw(*sibling).len;
            }
            current = parent;
        }
        offset
    }

    pub(crate) fn range_of(&self, index: u32) -> TextRange {
        TextRange::at(self.offset_of(index), self.raw(index).len)
    }

    /// Absolute range of `id` in the document text. O(depth).
    pub fn text_range(&self, id: NodeId) -> Result<TextRange> {
        let index = self.index(id)?;
        Ok(self.range_of(index))
    }

    /// Text of a leaf, `None` for composite nodes.
    pub fn leaf_text(&self, id: NodeId) -> Result<Option<&str>> {
        Ok(self.data(id)?.text.as_deref())
    }

    /// Concatenated leaf text of the subtree.
    pub fn text(&self, id: NodeId) -> Result<String> {
        let index = self.index(id)?;
        let mut out = String::with_capacity(u32::from(self.raw(index).len) as usize);
        self.collect_text(index, &mut out);
        Ok(out)
    }

    pub(crate) fn collect_text(&self, index: u32, out: &mut String) {
        for node in Preorder::new(self, index).indices() {
            if let Some(text) = &self.raw(node).text {
                out.push_str(text);
            }
        }
    }

    /// Text of the whole document as represented by this tree.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(self.root, &mut out);
        out
    }

    pub fn len(&self) -> TextSize {
        self.raw(self.root).len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == TextSize::from(0)
    }

    // ========================================================================
    // LOOKUP BY OFFSET
    // ========================================================================

    /// The leaf covering `offset`. At a boundary between two leaves the
    /// right one wins; at the end of the text the last leaf is returned.
    pub fn leaf_at_offset(&self, offset: TextSize) -> Option<NodeId> {
        if self.disposed.is_some() || offset > self.len() {
            return None;
        }
        let mut current = self.root;
        let mut start = TextSize::from(0);
        loop {
            let data = self.raw(current);
            if data.is_leaf() || data.children.is_empty() {
                return Some(self.id_of(current));
            }
            let mut chosen = None;
            let mut child_start = start;
            for child in &data.children {
                let child_end = child_start + self.raw(*child).len;
                if offset < child_end {
                    chosen = Some((*child, child_start));
                    break;
                }
                child_start = child_end;
            }
            let (child, child_start) = match chosen {
                Some(found) => found,
                None => {
                    // Offset at the very end of this node: descend into the
                    // last child.
                    let last = *data.children.last()?;
                    (last, start + data.len - self.raw(last).len)
                }
            };
            current = child;
            start = child_start;
        }
    }

    /// The deepest node whose range contains `range`.
    pub fn covering_node(&self, range: TextRange) -> Option<NodeId> {
        if self.disposed.is_some() || range.end() > self.len() {
            return None;
        }
        let mut current = self.root;
        let mut start = TextSize::from(0);
        'descend: loop {
            let mut child_start = start;
            for child in &self.raw(current).children {
                let child_range = TextRange::at(child_start, self.raw(*child).len);
                if child_range.contains_range(range) && !child_range.is_empty() {
                    current = *child;
                    start = child_start;
                    continue 'descend;
                }
                child_start = child_range.end();
            }
            return Some(self.id_of(current));
        }
    }

    // ========================================================================
    // READ-ONLY STATE
    // ========================================================================

    /// True when the document or any node on the path to the root is
    /// marked read-only.
    pub fn is_read_only(&self, id: NodeId) -> Result<bool> {
        if self.read_only {
            return Ok(true);
        }
        Ok(self.ancestors(id)?.any(|a| self.raw(a.index).read_only))
    }

    /// True when the subtree rooted at `index` contains a read-only node,
    /// or the document or an ancestor is read-only.
    pub(crate) fn touches_read_only(&self, index: u32) -> bool {
        if self.read_only {
            return true;
        }
        let mut current = Some(index);
        while let Some(i) = current {
            if self.raw(i).read_only {
                return true;
            }
            current = self.raw(i).parent;
        }
        Preorder::new(self, index)
            .indices()
            .any(|i| self.raw(i).read_only)
    }
}
