//! # arbor-base
//!
//! Structural document core: mutable, incrementally rebuilt syntax trees and
//! the services built on their identity model.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! workspace  → Documents, commit/reload/discard, service wiring
//!   ↓
//! injection  → Embedded documents, escapers, offset translation
//!   ↓
//! resolve    → References, scope walk, ResolveContext, usage search
//!   ↓
//! manipulator→ Per-kind value range read/replace strategies
//!   ↓
//! pointer    → Identity-preserving handles that survive rebuilds
//!   ↓
//! document   → Document identity, TreeWriter, text source collaborator
//!   ↓
//! events     → Before/after tree change notification
//!   ↓
//! tree       → Arena syntax tree, validity epochs, mutations
//!   ↓
//! dispatch   → Kind hierarchy and most-specific-match tables
//!   ↓
//! base       → Primitives (TextRange, TextEdit, ids, errors, cancellation)
//! ```

// ============================================================================
// MODULES (dependency order: base → dispatch → tree → ... → workspace)
// ============================================================================

/// Foundation types: ids, TextRange/TextEdit, errors, cancellation
pub mod base;

/// Kind hierarchy and the ordered (type-predicate, strategy) tables
pub mod dispatch;

/// Arena-backed syntax tree with validity tracking
pub mod tree;

/// Tree change notification
pub mod events;

/// Document identity and the serialized mutation path
pub mod document;

/// Element pointers that re-anchor across rebuilds
pub mod pointer;

/// Value-range manipulators dispatched by node kind
pub mod manipulator;

/// Reference resolution protocol
pub mod resolve;

/// Multi-language text injection
pub mod injection;

/// Extension registry collaborator
pub mod extension;

/// Workspace: owns documents and services
pub mod workspace;

// Re-export foundation types
pub use base::{
    Cancellation, CoreConfig, DocumentId, InvalidationReason, LanguageId, Result, TextEdit,
    TextRange, TextRangeExt, TextSize, TreeError, UnsupportedOperation,
};
pub use document::{Document, MemoryTextSource, Parser, TextSource, TreeWriter};
pub use pointer::{ElementPointer, PointerManager};
pub use tree::{ANY_KIND, GreenElement, NodeId, SyntaxKind, SyntaxTree};
pub use workspace::{Services, Workspace};
