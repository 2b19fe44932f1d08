//! Grammar-independent references by simple name.

use smol_str::SmolStr;
use text_size::TextRange;

use super::context::ResolveContext;
use super::reference::{ElementRef, Reference, ResolveResult, unique_target};
use super::resolver::Resolver;
use super::scope::{Declaration, ScopeProcessor};
use crate::base::text_utils::is_identifier;
use crate::base::{
    Cancellation, NodeId, Result, TextRangeExt, TreeError, UnsupportedOperation,
};
use crate::document::TreeWriter;
use crate::tree::SyntaxTree;
use crate::workspace::Services;

/// Collects declarations whose name matches.
///
/// In complete mode the walk stops after the first scope that declared a
/// match. In incomplete mode it continues outward, and matches found in
/// outer scopes are reported as invalid (shadowed).
#[derive(Debug)]
pub struct NameResolveProcessor {
    name: SmolStr,
    incomplete: bool,
    shadowed: bool,
    matched_in_scope: bool,
    results: Vec<ResolveResult>,
}

impl NameResolveProcessor {
    pub fn new(name: impl Into<SmolStr>, incomplete: bool) -> Self {
        Self {
            name: name.into(),
            incomplete,
            shadowed: false,
            matched_in_scope: false,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[ResolveResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ResolveResult> {
        self.results
    }
}

impl ScopeProcessor for NameResolveProcessor {
    fn execute(&mut self, declaration: &Declaration, _context: &ResolveContext) -> bool {
        if declaration.name != self.name {
            return true;
        }
        self.matched_in_scope = true;
        let result = if self.shadowed {
            ResolveResult::invalid(Some(declaration.element))
        } else {
            ResolveResult::valid(declaration.element)
        };
        if !self.results.contains(&result) {
            self.results.push(result);
        }
        true
    }

    fn name_hint(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn leave_scope(&mut self, _scope: ElementRef) -> bool {
        if !self.matched_in_scope {
            return true;
        }
        self.matched_in_scope = false;
        self.shadowed = true;
        self.incomplete
    }
}

/// A reference whose text is a simple identifier, resolved by walking the
/// declaration scopes above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameReference {
    element: ElementRef,
    range: TextRange,
    name: SmolStr,
}

impl NameReference {
    /// A reference spanning the whole text of `node`.
    pub fn new(tree: &SyntaxTree, node: NodeId) -> Result<Self> {
        let len = tree.text_len(node)?;
        Self::with_range(tree, node, TextRange::up_to(len))
    }

    /// A reference spanning `range` (relative to `node`).
    pub fn with_range(tree: &SyntaxTree, node: NodeId, range: TextRange) -> Result<Self> {
        let text = tree.text(node)?;
        let name = range.substring(&text).ok_or_else(|| {
            TreeError::unsupported(UnsupportedOperation::RangeOutOfBounds {
                range,
                len: text_size::TextSize::of(text.as_str()),
            })
        })?;
        Ok(Self {
            element: ElementRef::new(tree.document(), node),
            range,
            name: SmolStr::new(name),
        })
    }

    /// The name as it was written when the reference was created.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve against an already locked tree of the anchor's document.
    pub fn resolve_in(
        &self,
        services: &Services,
        tree: &SyntaxTree,
        incomplete: bool,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolveResult>> {
        self.resolve_name_in(services, tree, &self.name, incomplete, cancel)
    }

    fn resolve_name_in(
        &self,
        services: &Services,
        tree: &SyntaxTree,
        name: &str,
        incomplete: bool,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolveResult>> {
        let mut processor = NameResolveProcessor::new(name, incomplete);
        Resolver::new(services, cancel).tree_walk_up(
            tree,
            self.element,
            &mut processor,
            &ResolveContext::empty(),
        )?;
        let results = processor.into_results();
        tracing::trace!(
            "[RESOLVE] '{}' at {} -> {} candidate(s)",
            name,
            self.element,
            results.len()
        );
        Ok(results)
    }

    fn target_name(
        &self,
        services: &Services,
        tree: &SyntaxTree,
        target: ElementRef,
    ) -> Result<SmolStr> {
        let rebind = || TreeError::unsupported(UnsupportedOperation::RebindUnsupported);
        let named = |tree: &SyntaxTree| -> Result<Option<SmolStr>> {
            match services.named_elements().lookup(tree.kind(target.node)?) {
                Some(named) => named.name(tree, target.node),
                None => Ok(None),
            }
        };
        let name = if target.document == tree.document() {
            named(tree)?
        } else {
            let document = services.document(target.document)?;
            let other = document.read();
            named(&other)?
        };
        name.ok_or_else(rebind)
    }
}

impl Reference for NameReference {
    fn element(&self) -> ElementRef {
        self.element
    }

    fn range_in_element(&self) -> TextRange {
        self.range
    }

    fn resolve_all(
        &self,
        services: &Services,
        incomplete: bool,
        cancel: &Cancellation,
    ) -> Result<Vec<ResolveResult>> {
        let document = services.document(self.element.document)?;
        let tree = document.read();
        self.resolve_in(services, &tree, incomplete, cancel)
    }

    fn handle_element_rename(&self, writer: &mut TreeWriter<'_>, new_name: &str) -> Result<NodeId> {
        if !is_identifier(new_name) {
            return Err(TreeError::unsupported(UnsupportedOperation::IllegalName(
                new_name.to_string(),
            )));
        }
        writer.tree().check_valid(self.element.node)?;
        writer.replace_text(self.element.node, self.range, new_name)?;
        Ok(self.element.node)
    }

    /// Rewrites the reference to the target's name, provided that name
    /// resolves to exactly the target from here.
    fn bind_to_element(&self, writer: &mut TreeWriter<'_>, target: ElementRef) -> Result<NodeId> {
        let services = std::sync::Arc::clone(writer.document().services());
        let name = self.target_name(&services, writer.tree(), target)?;
        let results =
            self.resolve_name_in(&services, writer.tree(), &name, false, &Cancellation::none())?;
        if unique_target(&results) != Some(target) {
            return Err(TreeError::unsupported(UnsupportedOperation::RebindUnsupported));
        }
        self.handle_element_rename(writer, &name)
    }
}
