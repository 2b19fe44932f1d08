//! Per-kind injection host strategies.

use std::sync::Arc;

use super::escaper::{Escaper, StringLiteralEscaper, VerbatimEscaper};
use crate::base::{NodeId, Result};
use crate::tree::SyntaxTree;

/// Capability name used in missing-capability errors.
pub const INJECTION_HOST: &str = "injection host";

/// A node kind that can carry injected text.
pub trait InjectionHost: Send + Sync {
    /// Whether this particular node can currently host an injection (a
    /// literal with illegal escapes might not).
    fn is_valid_host(&self, tree: &SyntaxTree, node: NodeId) -> Result<bool> {
        tree.check_valid(node)?;
        Ok(true)
    }

    /// An escaper over the node's current text.
    fn create_escaper(&self, tree: &SyntaxTree, node: NodeId) -> Result<Arc<dyn Escaper>>;
}

/// Hosts quoted string literals with backslash escapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringLiteralHost;

impl InjectionHost for StringLiteralHost {
    fn is_valid_host(&self, tree: &SyntaxTree, node: NodeId) -> Result<bool> {
        let text = tree.text(node)?;
        Ok(text.starts_with(['"', '\'']))
    }

    fn create_escaper(&self, tree: &SyntaxTree, node: NodeId) -> Result<Arc<dyn Escaper>> {
        Ok(Arc::new(StringLiteralEscaper::new(&tree.text(node)?)))
    }
}

/// Hosts whose text is the injected text, such as comments.
#[derive(Debug, Default, Clone, Copy)]
pub struct VerbatimHost {
    pub one_line: bool,
}

impl InjectionHost for VerbatimHost {
    fn create_escaper(&self, tree: &SyntaxTree, node: NodeId) -> Result<Arc<dyn Escaper>> {
        let text = tree.text(node)?;
        Ok(if self.one_line {
            Arc::new(VerbatimEscaper::one_line(&text))
        } else {
            Arc::new(VerbatimEscaper::new(&text))
        })
    }
}
