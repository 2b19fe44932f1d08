//! Document identity and the serialized mutation path.
//!
//! A [`Document`] is the stable handle for one logical file: it outlives
//! every tree built for it. Readers take [`Document::read`]; all structural
//! changes go through the single [`TreeWriter`] obtained from
//! [`Document::write`], which fires change notifications, keeps the text
//! collaborator in sync and moves pointer anchors along with the text.

mod document;
mod parser;
mod source;
mod writer;

pub use document::Document;
pub use parser::Parser;
pub use source::{MemoryTextSource, TextSource};
pub use writer::TreeWriter;
