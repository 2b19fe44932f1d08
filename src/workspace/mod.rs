//! # Workspace
//!
//! Owns the open documents and wires the shared services together:
//! configuration, the text collaborator, change notification, pointers,
//! per-kind strategy tables and the extension registry.
//!
//! Documents are opened from the text collaborator, committed when its
//! text moves ahead of the tree, and discarded when closed.

mod core;
mod documents;
mod queries;
mod services;

pub use self::core::Workspace;
pub use services::{ModificationTracker, Services};
