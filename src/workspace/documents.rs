use std::sync::Arc;

use smol_str::SmolStr;

use super::core::Workspace;
use crate::base::{DocumentId, InvalidationReason, LanguageId, Result, TreeError};
use crate::document::Document;
use crate::tree::{RebuildSummary, SyntaxTree};

impl Workspace {
    /// Open `id` (known to the text source) as a document of `language`.
    /// Opening an already open document returns it unchanged.
    pub fn open(
        &self,
        id: DocumentId,
        name: &str,
        language: impl Into<LanguageId>,
    ) -> Result<Arc<Document>> {
        if let Ok(document) = self.services.document(id) {
            return Ok(document);
        }
        let language = language.into();
        let source = self.services.text_source();
        let text = source
            .current_text(id)
            .ok_or_else(|| TreeError::unknown_document(id))?;
        let stamp = source.modification_stamp(id).unwrap_or_default();
        let parser = self.services.parser_for(&language)?;

        let tree = SyntaxTree::from_green(id, &parser.parse(&text)).with_stamp(stamp);
        let document = Arc::new(Document::new(
            id,
            SmolStr::new(name),
            language,
            tree,
            Arc::clone(&self.services),
        ));
        let document = self.services.insert_document(document);
        tracing::debug!("[WORKSPACE] opened {} ({}) at stamp {}", name, id, stamp);
        Ok(document)
    }

    pub fn document(&self, id: DocumentId) -> Result<Arc<Document>> {
        self.services.document(id)
    }

    /// Open documents, in opening order.
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.services.documents()
    }

    /// Bring the tree of `id` up to date with the text source.
    ///
    /// A no-op returning `None` when the source stamp is not newer than the
    /// document's. Otherwise the new text is parsed and the tree rebuilt
    /// incrementally: unchanged subtrees keep their handles, the others
    /// are invalidated, and listeners see one children-changed pair on the
    /// root.
    pub fn commit(&self, id: DocumentId) -> Result<Option<RebuildSummary>> {
        let document = self.services.document(id)?;
        let source = self.services.text_source();
        let stamp = source
            .modification_stamp(id)
            .ok_or_else(|| TreeError::unknown_document(id))?;
        if stamp <= document.stamp() {
            tracing::trace!("[WORKSPACE] {} already committed at stamp {}", id, stamp);
            return Ok(None);
        }
        let text = document.text()?;
        let parser = self.services.parser_for(&document.language())?;

        let mut writer = document.write();
        if stamp <= document.stamp() {
            return Ok(None);
        }
        let summary = writer.rebuild(parser.as_ref(), &text, stamp, false);
        tracing::debug!(
            "[WORKSPACE] committed {} at stamp {}: {} reused, {} created, {} invalidated",
            id,
            stamp,
            summary.reused,
            summary.created,
            summary.invalidated
        );
        Ok(Some(summary))
    }

    /// Rebuild the tree of `id` from scratch. Every old handle becomes
    /// invalid.
    pub fn reload(&self, id: DocumentId) -> Result<RebuildSummary> {
        let document = self.services.document(id)?;
        let text = document.text()?;
        let parser = self.services.parser_for(&document.language())?;
        let source_stamp = self
            .services
            .text_source()
            .modification_stamp(id)
            .unwrap_or_default();

        let mut writer = document.write();
        let stamp = source_stamp.max(document.stamp());
        let summary = writer.rebuild(parser.as_ref(), &text, stamp, true);
        tracing::debug!("[WORKSPACE] reloaded {} at stamp {}", id, stamp);
        Ok(summary)
    }

    /// Close `id`. Its nodes become invalid and its pointers dereference to
    /// nothing.
    pub fn discard(&self, id: DocumentId) -> Result<()> {
        let document = self
            .services
            .remove_document(id)
            .ok_or_else(|| TreeError::unknown_document(id))?;
        document.write().dispose(InvalidationReason::DocumentDiscarded);
        self.services.pointers().forget_document(id);
        self.services.tracker().increment();
        tracing::debug!("[WORKSPACE] discarded {}", id);
        Ok(())
    }

    /// Switch `id` to `language`, rebuilding its tree with that language's
    /// parser.
    pub fn set_language(
        &self,
        id: DocumentId,
        language: impl Into<LanguageId>,
    ) -> Result<RebuildSummary> {
        let language = language.into();
        let document = self.services.document(id)?;
        let parser = self.services.parser_for(&language)?;
        let text = document.text()?;
        let source_stamp = self
            .services
            .text_source()
            .modification_stamp(id)
            .unwrap_or_default();

        let mut writer = document.write();
        let stamp = source_stamp.max(document.stamp());
        Ok(writer.change_language(language, parser.as_ref(), &text, stamp))
    }
}
