//! Tree iterators.

use super::syntax_tree::SyntaxTree;
use crate::base::NodeId;

/// Iterator over a node and its ancestors, innermost first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<u32>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a SyntaxTree, start: u32) -> Self {
        Self {
            tree,
            next: Some(start),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.raw(current).parent;
        Some(self.tree.id_of(current))
    }
}

/// Preorder (parent before children, children in order) iterator.
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<u32>,
}

impl<'a> Preorder<'a> {
    pub(crate) fn new(tree: &'a SyntaxTree, start: u32) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }

    /// Same traversal yielding raw slot indices.
    pub(crate) fn indices(self) -> impl Iterator<Item = u32> + 'a {
        let tree = self.tree;
        let mut stack = self.stack;
        std::iter::from_fn(move || {
            let current = stack.pop()?;
            stack.extend(tree.raw(current).children.iter().rev().copied());
            Some(current)
        })
    }
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.raw(current).children.iter().rev().copied());
        Some(self.tree.id_of(current))
    }
}
