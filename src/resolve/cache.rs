//! Memoised multi-candidate resolution.

use std::any::TypeId;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::TextRange;

use super::reference::{ElementRef, Reference, ResolveResult};
use crate::base::{Cancellation, Result};
use crate::workspace::Services;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    reference: TypeId,
    element: ElementRef,
    range: TextRange,
    text: SmolStr,
    incomplete: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    modification: u64,
    entries: FxHashMap<CacheKey, Arc<[ResolveResult]>>,
}

/// Caches `resolve_all` per reference type, anchor element, reference
/// range, reference text and mode. Off unless
/// [`CoreConfig::resolve_cache`](crate::base::CoreConfig::resolve_cache) is set.
///
/// Every entry is dropped as soon as the workspace modification count
/// moves. Failed resolutions (including cancellations) are never stored.
#[derive(Debug, Default)]
pub struct ResolveCache {
    state: Mutex<CacheState>,
}

impl ResolveCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve_all(
        &self,
        services: &Services,
        reference: &dyn Reference,
        incomplete: bool,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolveResult>> {
        if !services.config().resolve_cache {
            return reference.resolve_all(services, incomplete, cancel);
        }
        let modification = services.tracker().count();
        let element = reference.element();
        let text = {
            let document = services.document(element.document)?;
            let tree = document.read();
            reference.canonical_text(&tree)?
        };
        let key = CacheKey {
            reference: reference.reference_type(),
            element,
            range: reference.range_in_element(),
            text: SmolStr::new(text),
            incomplete,
        };
        {
            let mut state = self.state.lock();
            if state.modification != modification {
                state.entries.clear();
                state.modification = modification;
            }
            if let Some(hit) = state.entries.get(&key) {
                tracing::trace!("[RESOLVE] cache hit for {}", key.element);
                return Ok(hit.to_vec());
            }
        }

        let results = reference.resolve_all(services, incomplete, cancel)?;

        let mut state = self.state.lock();
        if state.modification == modification && services.tracker().count() == modification {
            state.entries.insert(key, Arc::from(results.as_slice()));
        }
        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }
}
