//! Shared services behind a workspace.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::{CoreConfig, DocumentId, LanguageId, Result, TreeError};
use crate::dispatch::{KindHierarchy, KindTable};
use crate::document::{Document, Parser, TextSource};
use crate::events::EventBus;
use crate::extension::{ExtensionRegistry, PARSERS};
use crate::injection::{INJECTION_HOST, InjectionHost};
use crate::manipulator::{MANIPULATOR, Manipulator};
use crate::pointer::PointerManager;
use crate::resolve::{DECLARATION_SCOPE, DeclarationScope, NAMED_ELEMENT, NamedElement, ResolveCache};

/// Counts every committed change across the workspace.
#[derive(Debug, Default)]
pub struct ModificationTracker {
    count: AtomicU64,
}

impl ModificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    /// Record one change and return the new count.
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Everything documents, references and strategies share: configuration,
/// collaborators, registries and the open documents.
pub struct Services {
    config: CoreConfig,
    text_source: Arc<dyn TextSource>,
    hierarchy: Arc<KindHierarchy>,
    events: EventBus,
    pointers: PointerManager,
    tracker: ModificationTracker,
    manipulators: KindTable<dyn Manipulator>,
    scopes: KindTable<dyn DeclarationScope>,
    named_elements: KindTable<dyn NamedElement>,
    injection_hosts: KindTable<dyn InjectionHost>,
    extensions: ExtensionRegistry,
    resolve_cache: ResolveCache,
    documents: RwLock<IndexMap<DocumentId, Arc<Document>>>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .field("documents", &self.documents.read().len())
            .field("modifications", &self.tracker.count())
            .field("listeners", &self.events.listener_count())
            .finish()
    }
}

impl Services {
    pub fn new(text_source: Arc<dyn TextSource>, config: CoreConfig) -> Self {
        let hierarchy = Arc::new(KindHierarchy::new());
        Self {
            config,
            text_source,
            events: EventBus::new(),
            pointers: PointerManager::new(),
            tracker: ModificationTracker::new(),
            manipulators: KindTable::new(MANIPULATOR, Arc::clone(&hierarchy)),
            scopes: KindTable::new(DECLARATION_SCOPE, Arc::clone(&hierarchy)),
            named_elements: KindTable::new(NAMED_ELEMENT, Arc::clone(&hierarchy)),
            injection_hosts: KindTable::new(INJECTION_HOST, Arc::clone(&hierarchy)),
            hierarchy,
            extensions: ExtensionRegistry::new(),
            resolve_cache: ResolveCache::new(),
            documents: RwLock::new(IndexMap::new()),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn text_source(&self) -> &dyn TextSource {
        self.text_source.as_ref()
    }

    pub fn hierarchy(&self) -> &Arc<KindHierarchy> {
        &self.hierarchy
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn pointers(&self) -> &PointerManager {
        &self.pointers
    }

    pub fn tracker(&self) -> &ModificationTracker {
        &self.tracker
    }

    pub fn manipulators(&self) -> &KindTable<dyn Manipulator> {
        &self.manipulators
    }

    pub fn scopes(&self) -> &KindTable<dyn DeclarationScope> {
        &self.scopes
    }

    pub fn named_elements(&self) -> &KindTable<dyn NamedElement> {
        &self.named_elements
    }

    pub fn injection_hosts(&self) -> &KindTable<dyn InjectionHost> {
        &self.injection_hosts
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub fn resolve_cache(&self) -> &ResolveCache {
        &self.resolve_cache
    }

    /// The parser for `language`; the last one registered wins.
    pub fn parser_for(&self, language: &LanguageId) -> Result<Arc<dyn Parser>> {
        self.extensions
            .providers_for(&PARSERS)
            .into_iter()
            .rev()
            .find(|parser| parser.language() == *language)
            .ok_or_else(|| TreeError::missing_capability("parser", None))
    }

    // ========================================================================
    // DOCUMENTS
    // ========================================================================

    pub fn document(&self, id: DocumentId) -> Result<Arc<Document>> {
        self.documents
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| TreeError::unknown_document(id))
    }

    /// Open documents, in opening order.
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.documents.read().values().cloned().collect()
    }

    /// Insert `document` unless one with the same id is open already; the
    /// document that ends up registered is returned.
    pub(crate) fn insert_document(&self, document: Arc<Document>) -> Arc<Document> {
        let mut documents = self.documents.write();
        Arc::clone(documents.entry(document.id()).or_insert(document))
    }

    pub(crate) fn remove_document(&self, id: DocumentId) -> Option<Arc<Document>> {
        self.documents.write().shift_remove(&id)
    }

    pub(crate) fn take_documents(&self) -> Vec<Arc<Document>> {
        let mut documents = self.documents.write();
        documents.drain(..).map(|(_, document)| document).collect()
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Arc<Self> {
        Arc::new(Self::new(
            Arc::new(crate::document::MemoryTextSource::new()),
            CoreConfig::default(),
        ))
    }
}
