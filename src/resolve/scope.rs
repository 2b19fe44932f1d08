//! Declaration scopes, named elements and the external index protocol.

use smol_str::SmolStr;

use super::context::ResolveContext;
use super::reference::ElementRef;
use crate::base::text_utils::is_identifier;
use crate::base::{Cancellation, NodeId, Result, TreeError, UnsupportedOperation};
use crate::document::TreeWriter;
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// A declaration offered to a [`ScopeProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub element: ElementRef,
    pub name: SmolStr,
}

/// Receives declarations during a scope walk.
pub trait ScopeProcessor {
    /// Offer one declaration. Returning `false` stops the walk.
    fn execute(&mut self, declaration: &Declaration, context: &ResolveContext) -> bool;

    /// The name being looked for, if any; scopes may use it to skip
    /// declarations cheaply.
    fn name_hint(&self) -> Option<&str> {
        None
    }

    /// A scope finished offering its declarations. Returning `false`
    /// stops the walk before outer scopes are visited.
    fn leave_scope(&mut self, scope: ElementRef) -> bool {
        let _ = scope;
        true
    }
}

/// Offers the declarations a node makes visible, registered per node kind.
pub trait DeclarationScope: Send + Sync {
    /// Offer the declarations of `node` visible to a walk coming up from
    /// `last_parent` (the child of `node` the walk came from, `None` when
    /// the walk starts at `node`). Returns `false` to stop the walk.
    fn process_declarations(
        &self,
        tree: &SyntaxTree,
        node: NodeId,
        processor: &mut dyn ScopeProcessor,
        context: &ResolveContext,
        last_parent: Option<NodeId>,
        origin: ElementRef,
    ) -> Result<bool>;

    /// Entries this scope adds for the outer levels of the walk. Merged
    /// under the accumulated context, so inner values win.
    fn scope_context(&self, tree: &SyntaxTree, node: NodeId) -> Result<ResolveContext> {
        let _ = (tree, node);
        Ok(ResolveContext::empty())
    }
}

/// Name access for declaring nodes, registered per node kind.
pub trait NamedElement: Send + Sync {
    /// The leaf holding the name.
    fn name_identifier(&self, tree: &SyntaxTree, node: NodeId) -> Result<Option<NodeId>>;

    fn name(&self, tree: &SyntaxTree, node: NodeId) -> Result<Option<SmolStr>> {
        match self.name_identifier(tree, node)? {
            Some(identifier) => Ok(Some(SmolStr::new(tree.text(identifier)?))),
            None => Ok(None),
        }
    }

    /// The declaration's own rename path. Returns the node now
    /// representing the declaration.
    fn set_name(&self, writer: &mut TreeWriter<'_>, node: NodeId, name: &str) -> Result<NodeId> {
        if !is_identifier(name) {
            return Err(TreeError::unsupported(UnsupportedOperation::IllegalName(
                name.to_string(),
            )));
        }
        let identifier = self.name_identifier(writer.tree(), node)?.ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::Other(format!(
                "{node} has no name identifier"
            )))
        })?;
        writer.set_leaf_text(identifier, name)?;
        Ok(node)
    }
}

/// External index consulted once a scope walk reached the root.
///
/// Runs while the origin document is locked for reading (or writing, when
/// a reference is rebound), so it must not lock the origin document again.
pub trait DeclarationIndex: Send + Sync {
    fn process_declarations(
        &self,
        services: &Services,
        processor: &mut dyn ScopeProcessor,
        context: &ResolveContext,
        origin: ElementRef,
        cancel: &Cancellation,
    ) -> Result<bool>;
}
