//! Reference discovery and usage search.

use std::sync::Arc;

use rayon::prelude::*;
use text_size::TextSize;

use super::reference::{ElementRef, Reference, check_reference_range};
use crate::base::{Cancellation, NodeId, Result, TreeError, UnsupportedOperation};
use crate::extension::REFERENCE_CONTRIBUTORS;
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// Produces the references anchored at a node.
pub trait ReferenceContributor: Send + Sync {
    /// References whose element is `node`. Most nodes have none.
    fn references(&self, tree: &SyntaxTree, node: NodeId) -> Result<Vec<Arc<dyn Reference>>>;
}

/// Every contributed reference anchored at `node`, in contributor order.
pub fn references_of(
    services: &Services,
    tree: &SyntaxTree,
    node: NodeId,
) -> Result<Vec<Arc<dyn Reference>>> {
    tree.check_valid(node)?;
    let anchor = ElementRef::new(tree.document(), node);
    let mut references = Vec::new();
    for contributor in services.extensions().providers_for(&REFERENCE_CONTRIBUTORS) {
        for reference in contributor.references(tree, node)? {
            if reference.element() != anchor {
                return Err(TreeError::unsupported(UnsupportedOperation::Other(format!(
                    "reference contributed for {anchor} is anchored at {}",
                    reference.element()
                ))));
            }
            check_reference_range(tree, reference.as_ref())?;
            references.push(reference);
        }
    }
    Ok(references)
}

/// References whose text covers `offset`, innermost element first.
pub fn references_at(
    services: &Services,
    tree: &SyntaxTree,
    offset: TextSize,
) -> Result<Vec<Arc<dyn Reference>>> {
    let Some(leaf) = tree.leaf_at_offset(offset) else {
        return Ok(Vec::new());
    };
    let mut found = Vec::new();
    for node in tree.ancestors(leaf)? {
        let start = tree.text_range(node)?.start();
        for reference in references_of(services, tree, node)? {
            let range = reference.range_in_element() + start;
            if range.contains_inclusive(offset) {
                found.push(reference);
            }
        }
    }
    Ok(found)
}

/// Every reference of `tree`, in document order.
pub fn collect_references(
    services: &Services,
    tree: &SyntaxTree,
    cancel: &Cancellation,
) -> Result<Vec<Arc<dyn Reference>>> {
    let mut references = Vec::new();
    for node in tree.descendants(tree.root())? {
        cancel.check()?;
        references.extend(references_of(services, tree, node)?);
    }
    Ok(references)
}

/// Every reference in the workspace that resolves to `target`.
///
/// Documents are searched in parallel. Each document's references are
/// collected under its read lock, which is released before they are
/// resolved.
pub fn find_usages(
    services: &Services,
    target: ElementRef,
    cancel: &Cancellation,
) -> Result<Vec<Arc<dyn Reference>>> {
    let documents = services.documents();
    let per_document: Vec<Vec<Arc<dyn Reference>>> = documents
        .par_iter()
        .map(|document| -> Result<Vec<Arc<dyn Reference>>> {
            let candidates = {
                let tree = document.read();
                collect_references(services, &tree, cancel)?
            };
            let mut usages = Vec::new();
            for reference in candidates {
                cancel.check()?;
                if reference.is_reference_to(services, target, cancel)? {
                    usages.push(reference);
                }
            }
            Ok(usages)
        })
        .collect::<Result<_>>()?;

    let usages: Vec<_> = per_document.into_iter().flatten().collect();
    tracing::debug!("[RESOLVE] {} usage(s) of {}", usages.len(), target);
    Ok(usages)
}
