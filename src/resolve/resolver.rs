//! The upward scope walk.

use super::context::ResolveContext;
use super::reference::ElementRef;
use super::scope::ScopeProcessor;
use crate::base::{Cancellation, Result, TreeError, UnsupportedOperation};
use crate::extension::DECLARATION_INDEXES;
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// Drives [`DeclarationScope`](super::DeclarationScope) strategies from a
/// reference's anchor up to the root, then consults the registered
/// declaration indexes.
pub struct Resolver<'a> {
    services: &'a Services,
    cancel: &'a Cancellation,
}

impl<'a> Resolver<'a> {
    pub fn new(services: &'a Services, cancel: &'a Cancellation) -> Self {
        Self { services, cancel }
    }

    /// Walk from `origin` upward, offering every visible declaration to
    /// `processor`. Returns `false` when the processor stopped the walk.
    ///
    /// `context` is the caller's initial context; each scope's own
    /// entries are merged under it, so inner values win. Cancellation is
    /// checked before every scope and every index.
    pub fn tree_walk_up(
        &self,
        tree: &SyntaxTree,
        origin: ElementRef,
        processor: &mut dyn ScopeProcessor,
        context: &ResolveContext,
    ) -> Result<bool> {
        if tree.document() != origin.document {
            return Err(TreeError::unsupported(UnsupportedOperation::CrossDocument));
        }
        let max_depth = self.services.config().max_scope_depth;
        let mut context = context.clone();
        let mut node = origin.node;
        let mut last_parent = None;
        let mut depth = 0usize;

        loop {
            self.cancel.check()?;
            depth += 1;
            if depth > max_depth {
                return Err(TreeError::unsupported(UnsupportedOperation::Other(format!(
                    "scope walk from {origin} exceeded {max_depth} levels"
                ))));
            }

            if let Some(scope) = self.services.scopes().lookup(tree.kind(node)?) {
                context = context.merge(&scope.scope_context(tree, node)?);
                let keep_going = scope.process_declarations(
                    tree,
                    node,
                    processor,
                    &context,
                    last_parent,
                    origin,
                )?;
                if !keep_going {
                    tracing::trace!("[RESOLVE] walk from {} stopped in {}", origin, node);
                    return Ok(false);
                }
                if !processor.leave_scope(ElementRef::new(origin.document, node)) {
                    tracing::trace!("[RESOLVE] walk from {} left at {}", origin, node);
                    return Ok(false);
                }
            }

            match tree.parent(node)? {
                Some(parent) => {
                    last_parent = Some(node);
                    node = parent;
                }
                None => break,
            }
        }

        for index in self.services.extensions().providers_for(&DECLARATION_INDEXES) {
            self.cancel.check()?;
            if !index.process_declarations(self.services, processor, &context, origin, self.cancel)?
            {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
