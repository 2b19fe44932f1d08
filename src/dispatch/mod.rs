//! Runtime-kind dispatch.
//!
//! Node kinds form a small single-inheritance hierarchy ([`KindHierarchy`])
//! rooted at [`ANY_KIND`]. Strategies (manipulators, injection hosts,
//! declaration scopes, ...) are registered against a kind in a
//! [`KindTable`]; a lookup picks the registration whose kind is the nearest
//! supertype of the queried kind, the most recent registration winning ties.

mod hierarchy;
mod table;

pub use hierarchy::{ANY_KIND, KindHierarchy};
pub use table::KindTable;
