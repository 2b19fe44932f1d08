//! Extension registry collaborator.
//!
//! The core never loads plugins itself. It only asks "give me every
//! provider registered for capability X", in registration order.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::document::Parser;
use crate::injection::MultiHostInjector;
use crate::resolve::{DeclarationIndex, ReferenceContributor};

/// Typed name of a capability.
pub struct ExtensionPoint<T: ?Sized> {
    name: &'static str,
    _marker: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized> ExtensionPoint<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized> fmt::Debug for ExtensionPoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtensionPoint({})", self.name)
    }
}

/// Parsers, one per language; the last one registered for a language wins.
pub const PARSERS: ExtensionPoint<dyn Parser> = ExtensionPoint::new("arbor.parser");

/// Injectors that place foreign-language documents inside host nodes.
pub const MULTI_HOST_INJECTORS: ExtensionPoint<dyn MultiHostInjector> =
    ExtensionPoint::new("arbor.multiHostInjector");

/// Producers of references for nodes.
pub const REFERENCE_CONTRIBUTORS: ExtensionPoint<dyn ReferenceContributor> =
    ExtensionPoint::new("arbor.referenceContributor");

/// External declaration indexes consulted after a scope walk reaches the
/// root.
pub const DECLARATION_INDEXES: ExtensionPoint<dyn DeclarationIndex> =
    ExtensionPoint::new("arbor.declarationIndex");

type PointKey = (&'static str, TypeId);

/// In-memory registry of providers per extension point.
#[derive(Default)]
pub struct ExtensionRegistry {
    points: RwLock<IndexMap<PointKey, Box<dyn Any + Send + Sync>>>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let points = self.points.read();
        f.debug_list()
            .entries(points.keys().map(|(name, _)| *name))
            .finish()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&self, point: &ExtensionPoint<T>, provider: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = (point.name, TypeId::of::<Vec<Arc<T>>>());
        let mut points = self.points.write();
        let entry = points
            .entry(key)
            .or_insert_with(|| Box::new(Vec::<Arc<T>>::new()));
        if let Some(providers) = entry.downcast_mut::<Vec<Arc<T>>>() {
            providers.push(provider);
            tracing::trace!(
                "[EXTENSIONS] registered provider #{} for {}",
                providers.len(),
                point.name
            );
        }
    }

    /// Every provider registered for `point`, in registration order.
    pub fn providers_for<T>(&self, point: &ExtensionPoint<T>) -> Vec<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = (point.name, TypeId::of::<Vec<Arc<T>>>());
        self.points
            .read()
            .get(&key)
            .and_then(|entry| entry.downcast_ref::<Vec<Arc<T>>>())
            .cloned()
            .unwrap_or_default()
    }
}
