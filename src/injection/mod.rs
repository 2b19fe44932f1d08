//! Multi-language text injection.
//!
//! A host document can carry documents in other languages inside some of
//! its nodes (a regular expression in a string literal, SQL spread over
//! several concatenated literals). Injectors registered under
//! [`MULTI_HOST_INJECTORS`] decide what is injected where; per-kind
//! [`InjectionHost`] strategies supply the [`Escaper`] translating between
//! host and injected coordinates.

mod escaper;
mod host;
mod injected;
mod registrar;

use std::sync::Arc;

use text_size::TextSize;

pub use escaper::{Escaper, StringLiteralEscaper, VerbatimEscaper};
pub use host::{INJECTION_HOST, InjectionHost, StringLiteralHost, VerbatimHost};
pub use injected::{InjectedDocument, Shred};
pub use registrar::{InjectionRegistrar, MultiHostInjector};

use crate::base::{NodeId, Result};
use crate::extension::MULTI_HOST_INJECTORS;
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// Run every injector interested in `context`'s kind.
pub fn injected_documents(
    services: &Services,
    tree: &SyntaxTree,
    context: NodeId,
) -> Result<Vec<Arc<InjectedDocument>>> {
    let kind = tree.kind(context)?;
    let hierarchy = services.hierarchy();
    let mut registrar = InjectionRegistrar::new(services, tree);
    for injector in services.extensions().providers_for(&MULTI_HOST_INJECTORS) {
        let interested = injector
            .elements_to_inject_in()
            .iter()
            .any(|k| hierarchy.is_subtype(kind, *k));
        if interested {
            injector.get_languages_to_inject(&mut registrar, context)?;
        }
    }
    Ok(registrar.finish()?.into_iter().map(Arc::new).collect())
}

/// The injected document covering host `offset`, searching from the
/// innermost node outward.
pub fn injected_at(
    services: &Services,
    tree: &SyntaxTree,
    offset: TextSize,
) -> Result<Option<Arc<InjectedDocument>>> {
    let Some(leaf) = tree.leaf_at_offset(offset) else {
        return Ok(None);
    };
    for node in tree.ancestors(leaf)? {
        for document in injected_documents(services, tree, node)? {
            if document.host_to_injected(offset).is_some() {
                return Ok(Some(document));
            }
        }
    }
    Ok(None)
}
