//! Reference resolution protocol.
//!
//! References are computed relationships from a text sub-range of an
//! anchor node to zero or more targets. Resolution walks the declaration
//! scopes above the anchor, threading an immutable [`ResolveContext`],
//! and finally consults the registered declaration indexes. Nothing in
//! here knows about a particular grammar: scopes, named elements and
//! reference producers are strategies registered per node kind or
//! extension point.

mod cache;
mod context;
mod name_ref;
mod reference;
mod resolver;
mod scope;
mod search;

pub use cache::ResolveCache;
pub use context::{Key, ResolveContext};
pub use name_ref::{NameReference, NameResolveProcessor};
pub use reference::{
    ElementRef, Reference, ResolveResult, check_reference_range, unique_target,
};
pub use resolver::Resolver;
pub use scope::{Declaration, DeclarationIndex, DeclarationScope, NamedElement, ScopeProcessor};
pub use search::{
    ReferenceContributor, collect_references, find_usages, references_at, references_of,
};

/// Capability names used in missing-capability errors.
pub const DECLARATION_SCOPE: &str = "declaration scope";
pub const NAMED_ELEMENT: &str = "named element";
