//! Conversion between `rowan` green trees and the arena.

use rowan::{GreenNode, GreenNodeData, GreenToken, GreenTokenData, NodeOrToken};
use text_size::TextSize;

use super::node::{NodeData, Slot};
use super::syntax_tree::SyntaxTree;
use crate::base::{DocumentId, InvalidationReason, NodeId, Result};

/// Owned green element as produced by an external parser.
pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Borrowed green element.
pub(crate) type GreenRef<'a> = NodeOrToken<&'a GreenNodeData, &'a GreenTokenData>;

pub(crate) fn as_green_ref(element: &GreenElement) -> GreenRef<'_> {
    match element {
        NodeOrToken::Node(node) => NodeOrToken::Node(&**node),
        NodeOrToken::Token(token) => NodeOrToken::Token(&**token),
    }
}

impl SyntaxTree {
    /// Build a tree for `document` from the parser's green root.
    pub fn from_green(document: DocumentId, root: &GreenNode) -> Self {
        let mut tree = Self {
            document,
            epoch: 0,
            slots: Vec::new(),
            free: Vec::new(),
            root: 0,
            stamp: 0,
            read_only: false,
            disposed: None,
            retired_epochs: Vec::new(),
        };
        tree.root = tree.alloc_green(None, NodeOrToken::Node(&**root));
        tracing::debug!(
            "[TREE] built {} with {} nodes",
            document,
            tree.node_count()
        );
        tree
    }

    /// Record the modification stamp of the text the tree was built from.
    pub(crate) fn with_stamp(mut self, stamp: u64) -> Self {
        self.stamp = stamp;
        self
    }

    /// Take a free slot (bumping nothing: the generation was bumped when the
    /// slot was vacated) or grow the arena.
    fn alloc(&mut self, data: NodeData) -> u32 {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            slot.data = data;
            return index;
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            alive: true,
            data,
            last_reason: InvalidationReason::Unknown,
        });
        index
    }

    /// Recursively allocate the green element under `parent`, returning
    /// its slot. The caller links it into the parent's children.
    pub(crate) fn alloc_green(&mut self, parent: Option<u32>, element: GreenRef<'_>) -> u32 {
        match element {
            NodeOrToken::Token(token) => {
                self.alloc(NodeData::leaf(token.kind(), token.text(), parent))
            }
            NodeOrToken::Node(node) => {
                let index = self.alloc(NodeData::composite(node.kind(), parent));
                let mut children = Vec::with_capacity(node.children().len());
                let mut len = TextSize::from(0);
                for child in node.children() {
                    let child_index = self.alloc_green(Some(index), child);
                    len += self.raw(child_index).len;
                    children.push(child_index);
                }
                let data = self.raw_mut(index);
                data.children = children;
                data.len = len;
                index
            }
        }
    }

    /// Export a valid subtree as an owned green element.
    pub fn to_green(&self, id: NodeId) -> Result<GreenElement> {
        let index = self.index(id)?;
        Ok(self.green_of(index))
    }

    pub(crate) fn green_of(&self, index: u32) -> GreenElement {
        let data = self.raw(index);
        match &data.text {
            Some(text) => NodeOrToken::Token(GreenToken::new(data.kind, text)),
            None => {
                let children: Vec<GreenElement> =
                    data.children.iter().map(|c| self.green_of(*c)).collect();
                NodeOrToken::Node(GreenNode::new(data.kind, children))
            }
        }
    }

    /// Structural equality between an arena subtree and a green element.
    pub(crate) fn same_as_green(&self, index: u32, green: GreenRef<'_>) -> bool {
        let data = self.raw(index);
        match (green, &data.text) {
            (NodeOrToken::Token(token), Some(text)) => {
                token.kind() == data.kind && token.text() == text.as_str()
            }
            (NodeOrToken::Node(node), None) => {
                node.kind() == data.kind
                    && node.text_len() == data.len
                    && node.children().len() == data.children.len()
                    && node
                        .children()
                        .zip(&data.children)
                        .all(|(g, c)| self.same_as_green(*c, g))
            }
            _ => false,
        }
    }
}

pub(crate) fn green_kind(green: GreenRef<'_>) -> rowan::SyntaxKind {
    match green {
        NodeOrToken::Node(node) => node.kind(),
        NodeOrToken::Token(token) => token.kind(),
    }
}
