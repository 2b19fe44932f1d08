//! The serialized mutation path.

use parking_lot::RwLockWriteGuard;
use rowan::GreenNode;
use smol_str::SmolStr;
use text_size::TextRange;

use super::document::Document;
use super::parser::Parser;
use crate::base::{InvalidationReason, LanguageId, NodeId, Result, TextEdit};
use crate::events::{Property, TreeChange, TreeChangeEvent};
use crate::tree::{GreenElement, LeafEdit, RebuildSummary, SyntaxTree};

/// Exclusive write access to a document's tree.
///
/// Each mutation validates first (text changes are refused while the text
/// collaborator is ahead of the tree, see [`Document::check_committed`]),
/// then fires the "before" event, mutates,
/// propagates the text change (document stamp, text collaborator, pointer
/// anchors, workspace modification count) and fires the "after" event. A
/// refused mutation fires nothing and changes nothing.
pub struct TreeWriter<'a> {
    document: &'a Document,
    tree: RwLockWriteGuard<'a, SyntaxTree>,
}

impl<'a> TreeWriter<'a> {
    pub(crate) fn new(document: &'a Document, tree: RwLockWriteGuard<'a, SyntaxTree>) -> Self {
        Self { document, tree }
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    /// The tree in its current state.
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    // ========================================================================
    // PLUMBING
    // ========================================================================

    fn next_stamp(&self) -> u64 {
        let source = self
            .document
            .services()
            .text_source()
            .modification_stamp(self.document.id())
            .unwrap_or(0);
        self.document.stamp().max(source) + 1
    }

    fn publish(&self, change: TreeChange, stamp: u64) {
        let event = TreeChangeEvent::new(self.document.id(), change, stamp);
        self.document.services().events().publish(&event, &self.tree);
    }

    fn publish_before(&self, change: TreeChange) {
        self.publish(change, self.document.stamp());
    }

    fn text_changed(&self, edits: &[TextEdit], stamp: u64) {
        let services = self.document.services();
        let id = self.document.id();
        self.document.set_stamp(stamp);
        services
            .text_source()
            .tree_text_changed(id, &self.tree.full_text(), stamp);
        services.pointers().apply_edits(id, edits, false);
        services.tracker().increment();
    }

    // ========================================================================
    // STRUCTURAL MUTATIONS
    // ========================================================================

    /// Insert `green` as child number `position` of `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        position: usize,
        green: &GreenElement,
    ) -> Result<NodeId> {
        self.document.check_committed()?;
        self.tree.check_insert(parent, position)?;
        self.publish_before(TreeChange::BeforeChildAddition { parent });
        let stamp = self.next_stamp();
        let (child, edit) = self.tree.insert_child(parent, position, green, stamp)?;
        self.text_changed(&[edit], stamp);
        self.publish(TreeChange::ChildAdded { parent, child }, stamp);
        tracing::debug!("[TREE] added {} under {} in {}", child, parent, self.document.id());
        Ok(child)
    }

    /// Insert `green` right after `anchor`.
    pub fn add_after(&mut self, anchor: NodeId, green: &GreenElement) -> Result<NodeId> {
        let (parent, position) = self.tree.check_add_after(anchor)?;
        self.add_child(parent, position, green)
    }

    /// Remove `node` and its subtree. Every removed handle becomes invalid.
    pub fn delete(&mut self, node: NodeId) -> Result<()> {
        self.document.check_committed()?;
        let (_, parent, _) = self.tree.check_remove(node)?;
        let parent = self.tree.id_of(parent);
        self.publish_before(TreeChange::BeforeChildRemoval {
            parent,
            child: node,
        });
        let stamp = self.next_stamp();
        let edit = self.tree.remove(node, "delete", stamp)?;
        self.text_changed(&[edit], stamp);
        self.publish(
            TreeChange::ChildRemoved {
                parent,
                child: node,
            },
            stamp,
        );
        tracing::debug!("[TREE] deleted {} from {}", node, self.document.id());
        Ok(())
    }

    /// Replace the subtree at `node` (the root included) with `green`.
    /// Returns the node now standing in its place.
    pub fn replace(&mut self, node: NodeId, green: &GreenElement) -> Result<NodeId> {
        self.document.check_committed()?;
        let index = self.tree.check_replace(node)?;
        let parent = self.tree.raw(index).parent.map(|p| self.tree.id_of(p));
        self.publish_before(TreeChange::BeforeChildReplacement { parent, old: node });
        let stamp = self.next_stamp();
        let (new, edit) = self.tree.replace_with_green(node, green, stamp)?;
        self.text_changed(&[edit], stamp);
        self.publish(
            TreeChange::ChildReplaced {
                parent,
                old: node,
                new,
            },
            stamp,
        );
        tracing::debug!("[TREE] replaced {} by {} in {}", node, new, self.document.id());
        Ok(new)
    }

    /// Move `node` to child number `position` of `new_parent` (counted
    /// after `node` has been detached). Handles in the moved subtree stay
    /// valid.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId, position: usize) -> Result<()> {
        self.document.check_committed()?;
        self.tree.check_move(node, new_parent, position)?;
        let old_parent = self
            .tree
            .parent(node)?
            .unwrap_or_else(|| self.tree.root());
        self.publish_before(TreeChange::BeforeChildMove {
            child: node,
            old_parent,
            new_parent,
        });
        let stamp = self.next_stamp();
        let edits = self.tree.move_node(node, new_parent, position, stamp)?;
        self.text_changed(&edits, stamp);
        self.publish(
            TreeChange::ChildMoved {
                child: node,
                old_parent,
                new_parent,
            },
            stamp,
        );
        Ok(())
    }

    // ========================================================================
    // TEXT EDITS
    // ========================================================================

    /// Replace the whole text of a leaf. The leaf keeps its handle.
    pub fn set_leaf_text(&mut self, leaf: NodeId, text: &str) -> Result<()> {
        self.document.check_committed()?;
        let edit = self.tree.check_leaf_text(leaf, text)?;
        self.apply_leaf_edit(leaf, edit);
        Ok(())
    }

    /// Replace `range_in_node` (relative to `node`) with `text`. The range
    /// must fall inside a single leaf, which is returned.
    pub fn replace_text(
        &mut self,
        node: NodeId,
        range_in_node: TextRange,
        text: &str,
    ) -> Result<NodeId> {
        self.document.check_committed()?;
        let edit = self.tree.check_replace_text(node, range_in_node, text)?;
        let leaf = self.tree.id_of(edit.leaf);
        self.apply_leaf_edit(leaf, edit);
        Ok(leaf)
    }

    fn apply_leaf_edit(&mut self, leaf: NodeId, edit: LeafEdit) {
        self.publish_before(TreeChange::BeforeChildrenChange { parent: leaf });
        let stamp = self.next_stamp();
        let (_, text_edit) = self.tree.apply_leaf_edit(edit, stamp);
        self.text_changed(&[text_edit], stamp);
        self.publish(TreeChange::ChildrenChanged { parent: leaf }, stamp);
        tracing::trace!("[TREE] edited leaf {} in {}", leaf, self.document.id());
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    /// Mark a subtree read-only (or writable again).
    pub fn set_read_only(&mut self, node: NodeId, read_only: bool) -> Result<()> {
        self.tree.check_valid(node)?;
        let property = Property::ReadOnly;
        self.publish_before(TreeChange::BeforePropertyChange {
            node: Some(node),
            property,
        });
        self.tree.set_read_only(node, read_only)?;
        self.publish(
            TreeChange::PropertyChanged {
                node: Some(node),
                property,
            },
            self.document.stamp(),
        );
        Ok(())
    }

    /// Mark the whole document read-only (or writable again).
    pub fn set_document_read_only(&mut self, read_only: bool) {
        let property = Property::ReadOnly;
        self.publish_before(TreeChange::BeforePropertyChange {
            node: None,
            property,
        });
        self.tree.set_document_read_only(read_only);
        self.publish(
            TreeChange::PropertyChanged {
                node: None,
                property,
            },
            self.document.stamp(),
        );
    }

    pub fn rename_document(&mut self, name: &str) {
        let property = Property::Name;
        self.publish_before(TreeChange::BeforePropertyChange {
            node: None,
            property,
        });
        let old = self.document.replace_name(SmolStr::new(name));
        self.publish(
            TreeChange::PropertyChanged {
                node: None,
                property,
            },
            self.document.stamp(),
        );
        tracing::debug!("[TREE] renamed {} from {} to {}", self.document.id(), old, name);
    }

    // ========================================================================
    // REBUILDS
    // ========================================================================

    /// Rebuild from `text` at `stamp`, coalescing all notifications into one
    /// children-changed pair on the root.
    pub(crate) fn rebuild(
        &mut self,
        parser: &dyn Parser,
        text: &str,
        stamp: u64,
        full: bool,
    ) -> RebuildSummary {
        let green = parser.parse(text);
        let old_text = self.tree.full_text();
        self.publish_before(TreeChange::BeforeChildrenChange {
            parent: self.tree.root(),
        });
        let summary = self.rebuild_tree(&green, stamp, full);
        let services = self.document.services();
        self.document.set_stamp(stamp);
        if let Some(edit) = TextEdit::between(&old_text, &self.tree.full_text()) {
            services.pointers().apply_edits(self.document.id(), &[edit], true);
        }
        services.tracker().increment();
        self.publish(
            TreeChange::ChildrenChanged {
                parent: self.tree.root(),
            },
            stamp,
        );
        summary
    }

    fn rebuild_tree(&mut self, green: &GreenNode, stamp: u64, full: bool) -> RebuildSummary {
        let reuse = self.document.services().config().reuse_identical_subtrees;
        if full || !reuse {
            let invalidated = self.tree.reload(green, stamp);
            RebuildSummary {
                reused: 0,
                created: self.tree.node_count(),
                invalidated,
            }
        } else {
            self.tree.rebuild_with_reuse(green, stamp)
        }
    }

    /// Switch the document's language and rebuild under the new parser.
    pub(crate) fn change_language(
        &mut self,
        language: LanguageId,
        parser: &dyn Parser,
        text: &str,
        stamp: u64,
    ) -> RebuildSummary {
        let property = Property::Language;
        self.publish_before(TreeChange::BeforePropertyChange {
            node: None,
            property,
        });
        self.document.replace_language(language);
        let summary = self.rebuild(parser, text, stamp, true);
        self.publish(
            TreeChange::PropertyChanged {
                node: None,
                property,
            },
            stamp,
        );
        summary
    }

    pub(crate) fn dispose(&mut self, reason: InvalidationReason) {
        self.tree.dispose(reason);
    }
}
