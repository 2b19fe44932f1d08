//! The editing collaborator: "current text" and "modification stamp".

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::DocumentId;

/// Live text of documents, owned outside the core.
pub trait TextSource: Send + Sync {
    fn current_text(&self, document: DocumentId) -> Option<Arc<str>>;

    fn modification_stamp(&self, document: DocumentId) -> Option<u64>;

    /// A tree mutation rewrote the text of `document`; `stamp` is the
    /// document's new modification stamp. Collaborators that mirror tree
    /// edits adopt both, so the next commit is a no-op.
    fn tree_text_changed(&self, document: DocumentId, text: &str, stamp: u64) {
        let _ = (document, text, stamp);
    }
}

#[derive(Debug)]
struct Entry {
    text: Arc<str>,
    stamp: u64,
}

/// In-memory [`TextSource`] that also mirrors tree edits.
#[derive(Debug, Default)]
pub struct MemoryTextSource {
    next_id: AtomicU32,
    entries: RwLock<FxHashMap<DocumentId, Entry>>,
}

impl MemoryTextSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new text and return its document id (stamp 1).
    pub fn create(&self, text: &str) -> DocumentId {
        let id = DocumentId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().insert(
            id,
            Entry {
                text: Arc::from(text),
                stamp: 1,
            },
        );
        id
    }

    /// Replace the text, bumping the stamp. Returns the new stamp, or
    /// `None` for an unknown document.
    pub fn set_text(&self, document: DocumentId, text: &str) -> Option<u64> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(&document)?;
        entry.text = Arc::from(text);
        entry.stamp += 1;
        Some(entry.stamp)
    }

    pub fn remove(&self, document: DocumentId) -> bool {
        self.entries.write().remove(&document).is_some()
    }
}

impl TextSource for MemoryTextSource {
    fn current_text(&self, document: DocumentId) -> Option<Arc<str>> {
        self.entries
            .read()
            .get(&document)
            .map(|e| Arc::clone(&e.text))
    }

    fn modification_stamp(&self, document: DocumentId) -> Option<u64> {
        self.entries.read().get(&document).map(|e| e.stamp)
    }

    fn tree_text_changed(&self, document: DocumentId, text: &str, stamp: u64) {
        if let Some(entry) = self.entries.write().get_mut(&document) {
            entry.text = Arc::from(text);
            entry.stamp = entry.stamp.max(stamp);
        }
    }
}
