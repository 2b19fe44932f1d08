//! Arena-backed syntax tree with validity tracking.
//!
//! The external parser hands over an immutable `rowan` green tree; this
//! module turns it into a mutable arena where every node is addressed by a
//! [`NodeId`] handle. A handle is valid iff its epoch matches the tree's
//! current epoch, its slot still holds the same generation, and every
//! ancestor up to the root is valid.
//!
//! ## Architecture
//!
//! ```text
//! GreenNode (parser output)
//!     ↓ from_green
//! SyntaxTree arena (slots, epochs, cached lengths)
//!     ↓ mutations (insert / remove / replace / move / leaf text)
//! rebuild_with_reuse (rehome identical subtrees) | reload (new epoch)
//! ```

mod build;
mod mutate;
mod node;
mod syntax_tree;
mod walk;

#[cfg(test)]
pub(crate) mod fixtures;

pub use build::GreenElement;
pub use mutate::RebuildSummary;
pub(crate) use mutate::LeafEdit;
pub use syntax_tree::SyntaxTree;
pub use walk::{Ancestors, Preorder};

pub use crate::base::NodeId;
pub use crate::dispatch::ANY_KIND;
pub use rowan::SyntaxKind;
