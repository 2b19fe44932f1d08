//! Document identity.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{RwLock, RwLockReadGuard};
use smol_str::SmolStr;

use super::writer::TreeWriter;
use crate::base::{DocumentId, LanguageId, Result, TreeError, UnsupportedOperation};
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// Stable handle to one logical file.
///
/// Trees come and go; the document stays. It carries the modification
/// stamp of the text its current tree was built from or edited into, and
/// guards the tree with a single-writer/multi-reader lock.
pub struct Document {
    id: DocumentId,
    name: RwLock<SmolStr>,
    language: RwLock<LanguageId>,
    stamp: AtomicU64,
    tree: RwLock<SyntaxTree>,
    services: Arc<Services>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("name", &*self.name.read())
            .field("language", &*self.language.read())
            .field("stamp", &self.stamp())
            .finish()
    }
}

impl Document {
    pub(crate) fn new(
        id: DocumentId,
        name: SmolStr,
        language: LanguageId,
        tree: SyntaxTree,
        services: Arc<Services>,
    ) -> Self {
        Self {
            id,
            name: RwLock::new(name),
            language: RwLock::new(language),
            stamp: AtomicU64::new(tree.stamp()),
            tree: RwLock::new(tree),
            services,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> SmolStr {
        self.name.read().clone()
    }

    pub fn language(&self) -> LanguageId {
        self.language.read().clone()
    }

    /// Monotonically increasing modification stamp.
    pub fn stamp(&self) -> u64 {
        self.stamp.load(Ordering::Acquire)
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Shared access to the current tree. Blocks while a writer is active,
    /// so a reader never sees a half-applied mutation.
    pub fn read(&self) -> RwLockReadGuard<'_, SyntaxTree> {
        self.tree.read()
    }

    /// Exclusive access for mutations.
    pub fn write(&self) -> TreeWriter<'_> {
        TreeWriter::new(self, self.tree.write())
    }

    /// Live text as reported by the text collaborator. May be ahead of the
    /// tree until the next commit.
    pub fn text(&self) -> Result<Arc<str>> {
        self.services
            .text_source()
            .current_text(self.id)
            .ok_or_else(|| TreeError::unknown_document(self.id))
    }

    /// True when the collaborator holds no changes the tree has not seen.
    pub fn is_committed(&self) -> bool {
        self.services
            .text_source()
            .modification_stamp(self.id)
            .is_some_and(|stamp| stamp <= self.stamp())
    }

    /// Fails while the collaborator holds text the tree has not seen; tree
    /// edits would overwrite it.
    pub fn check_committed(&self) -> Result<()> {
        match self.services.text_source().modification_stamp(self.id) {
            Some(stamp) if stamp > self.stamp() => {
                Err(TreeError::unsupported(UnsupportedOperation::Uncommitted))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn set_stamp(&self, stamp: u64) {
        self.stamp.fetch_max(stamp, Ordering::AcqRel);
    }

    pub(crate) fn replace_name(&self, name: SmolStr) -> SmolStr {
        std::mem::replace(&mut *self.name.write(), name)
    }

    pub(crate) fn replace_language(&self, language: LanguageId) -> LanguageId {
        std::mem::replace(&mut *self.language.write(), language)
    }
}
