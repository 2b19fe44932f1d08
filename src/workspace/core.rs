use std::sync::Arc;

use super::services::Services;
use crate::base::{CoreConfig, InvalidationReason};
use crate::document::{Parser, TextSource};
use crate::events::{Subscription, TreeChangeListener};
use crate::extension::PARSERS;

/// Owns the documents of one project and the services they share.
///
/// Dropping the workspace disposes it: every tree is torn down with
/// [`InvalidationReason::WorkspaceDisposed`] and the documents are
/// released.
#[derive(Debug)]
pub struct Workspace {
    pub(super) services: Arc<Services>,
}

impl Workspace {
    /// Creates a workspace with default configuration
    pub fn new(text_source: Arc<dyn TextSource>) -> Self {
        Self::with_config(text_source, CoreConfig::default())
    }

    pub fn with_config(text_source: Arc<dyn TextSource>, config: CoreConfig) -> Self {
        tracing::debug!("[WORKSPACE] created with {:?}", config);
        Self {
            services: Arc::new(Services::new(text_source, config)),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Registers a parser; it replaces earlier parsers for the same language
    pub fn register_parser(&self, parser: Arc<dyn Parser>) {
        tracing::debug!("[WORKSPACE] registered parser for {}", parser.language());
        self.services.extensions().register(&PARSERS, parser);
    }

    /// Subscribes to tree changes of every document
    pub fn subscribe(&self, listener: impl TreeChangeListener + 'static) -> Subscription {
        self.services.events().subscribe(listener)
    }

    /// Tear down every document. Idempotent.
    pub fn dispose(&self) {
        let documents = self.services.take_documents();
        if documents.is_empty() {
            return;
        }
        tracing::debug!("[WORKSPACE] disposing {} document(s)", documents.len());
        for document in documents {
            document.write().dispose(InvalidationReason::WorkspaceDisposed);
            self.services.pointers().forget_document(document.id());
        }
        self.services.tracker().increment();
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.dispose();
    }
}
