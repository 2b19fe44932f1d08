//! External parser contract.

use rowan::{GreenNode, SyntaxKind};

use crate::base::LanguageId;
use crate::tree::GreenElement;

/// Produces green trees for one language. Parsing must be lossless: the
/// text of the returned tree equals the input.
pub trait Parser: Send + Sync {
    fn language(&self) -> LanguageId;

    fn parse(&self, text: &str) -> GreenNode;

    /// Parse `text` as a single element of `kind`, for reconstructing one
    /// node after a value edit. `None` when the language cannot parse that
    /// kind in isolation, or the text does not form one.
    fn parse_fragment(&self, kind: SyntaxKind, text: &str) -> Option<GreenElement> {
        let _ = (kind, text);
        None
    }
}
