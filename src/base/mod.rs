//! Foundation types for the structural document core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`DocumentId`], [`LanguageId`], [`NodeId`] - Identifiers
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`TextEdit`] - A single contiguous text replacement
//! - [`TreeError`] - The error taxonomy shared by every service
//! - [`Cancellation`] - Cooperative cancellation for long queries
//! - [`CoreConfig`] - Tunables for the workspace
//!
//! This module has NO dependencies on other arbor modules.

mod cancel;
mod config;
mod error;
mod ids;
mod range;
pub mod text_utils;

pub use cancel::Cancellation;
pub use config::CoreConfig;
pub use error::{InvalidationReason, Result, TreeError, UnsupportedOperation};
pub use ids::{DocumentId, LanguageId, NodeId};
pub use range::{TextEdit, TextRangeExt};

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
