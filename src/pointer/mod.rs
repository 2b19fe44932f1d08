//! Element pointers: identity-preserving node handles.
//!
//! A pointer remembers the document (weakly), the node kind and a text
//! range that is carried along by every edit of the document. Dereferencing
//! prefers the cached node handle while it is valid and otherwise
//! re-anchors on the narrowest node of the same kind that overlaps the
//! remembered range by more than the configured threshold. Once no such
//! node exists the pointer is dead for good.

mod anchor;
mod element_pointer;
mod manager;
mod relocate;

pub use element_pointer::ElementPointer;
pub use manager::PointerManager;
