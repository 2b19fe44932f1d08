use std::cmp::Reverse;
use std::sync::Arc;

use text_size::TextSize;

use super::core::Workspace;
use crate::base::text_utils::is_identifier;
use crate::base::{
    Cancellation, DocumentId, NodeId, Result, TreeError, UnsupportedOperation,
};
use crate::injection::{self, InjectedDocument};
use crate::pointer::ElementPointer;
use crate::resolve::{self, ElementRef, Reference, ResolveResult, unique_target};

impl Workspace {
    // ========================================================================
    // POINTERS
    // ========================================================================

    /// Create a pointer to `node` of document `id`
    pub fn create_pointer(&self, id: DocumentId, node: NodeId) -> Result<ElementPointer> {
        let document = self.services.document(id)?;
        self.services.pointers().create_pointer(&document, node)
    }

    // ========================================================================
    // RESOLUTION
    // ========================================================================

    /// Every candidate of `reference`, memoised until the next change
    pub fn resolve_all(
        &self,
        reference: &dyn Reference,
        incomplete: bool,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolveResult>> {
        self.services
            .resolve_cache()
            .resolve_all(&self.services, reference, incomplete, cancel)
    }

    /// The unique target of `reference`, if there is exactly one candidate
    pub fn resolve(
        &self,
        reference: &dyn Reference,
        cancel: &Cancellation,
    ) -> Result<Option<ElementRef>> {
        Ok(unique_target(&self.resolve_all(reference, false, cancel)?))
    }

    pub fn references_of(&self, id: DocumentId, node: NodeId) -> Result<Vec<Arc<dyn Reference>>> {
        let document = self.services.document(id)?;
        let tree = document.read();
        resolve::references_of(&self.services, &tree, node)
    }

    /// References covering `offset`, innermost first
    pub fn references_at(
        &self,
        id: DocumentId,
        offset: TextSize,
    ) -> Result<Vec<Arc<dyn Reference>>> {
        let document = self.services.document(id)?;
        let tree = document.read();
        resolve::references_at(&self.services, &tree, offset)
    }

    /// Every reference in the workspace resolving to `target`
    pub fn find_usages(
        &self,
        target: ElementRef,
        cancel: &Cancellation,
    ) -> Result<Vec<Arc<dyn Reference>>> {
        resolve::find_usages(&self.services, target, cancel)
    }

    /// Rename the declaration `target` and every reference to it.
    ///
    /// Usages are collected and every affected node is checked (valid,
    /// writable, document committed) before anything changes, so a refusal
    /// leaves the workspace untouched. The declaration is renamed through
    /// its named-element strategy, then each usage through
    /// [`Reference::handle_element_rename`], last usage first within a
    /// document. Returns the number of usages rewritten.
    pub fn rename_declaration(
        &self,
        target: ElementRef,
        new_name: &str,
        cancel: &Cancellation,
    ) -> Result<usize> {
        if !is_identifier(new_name) {
            return Err(TreeError::unsupported(UnsupportedOperation::IllegalName(
                new_name.to_string(),
            )));
        }
        let named = {
            let document = self.services.document(target.document)?;
            let kind = document.read().kind(target.node)?;
            self.services.named_elements().require(kind)?
        };
        let usages = self.find_usages(target, cancel)?;
        let mut ordered = Vec::with_capacity(usages.len());
        for usage in usages {
            let element = usage.element();
            let document = self.services.document(element.document)?;
            let start = document.read().text_range(element.node)?.start()
                + usage.range_in_element().start();
            ordered.push((element.document, start, usage));
        }
        ordered.sort_by_key(|(document, start, _)| (*document, Reverse(*start)));

        let touched = std::iter::once(target).chain(ordered.iter().map(|(_, _, u)| u.element()));
        for element in touched {
            let document = self.services.document(element.document)?;
            document.check_committed()?;
            document.read().check_subtree_writable(element.node)?;
        }

        {
            let document = self.services.document(target.document)?;
            let mut writer = document.write();
            named.set_name(&mut writer, target.node, new_name)?;
        }

        let count = ordered.len();
        for (id, _, usage) in ordered {
            let document = self.services.document(id)?;
            let mut writer = document.write();
            usage.handle_element_rename(&mut writer, new_name)?;
        }
        tracing::debug!("[WORKSPACE] renamed {} to '{}' and {} usage(s)", target, new_name, count);
        Ok(count)
    }

    // ========================================================================
    // INJECTION
    // ========================================================================

    /// Documents injected into `host`
    pub fn injected_documents(
        &self,
        id: DocumentId,
        host: NodeId,
    ) -> Result<Vec<Arc<InjectedDocument>>> {
        let document = self.services.document(id)?;
        let tree = document.read();
        injection::injected_documents(&self.services, &tree, host)
    }

    /// The injected document covering host `offset`, if any
    pub fn injected_at(
        &self,
        id: DocumentId,
        offset: TextSize,
    ) -> Result<Option<Arc<InjectedDocument>>> {
        let document = self.services.document(id)?;
        let tree = document.read();
        injection::injected_at(&self.services, &tree, offset)
    }
}
