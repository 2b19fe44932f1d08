use std::sync::Arc;

use arbor::extension::DECLARATION_INDEXES;
use arbor::resolve::{DeclarationIndex, ElementRef, NameReference, Reference, ResolveResult};
use arbor::{
    Cancellation, CoreConfig, Document, DocumentId, NodeId, Services, TextRange, TextSize,
    TreeError, TreeWriter, UnsupportedOperation,
};
use rstest::rstest;

use crate::helpers::mini::{LET, NAME_REF, PreludeIndex};
use crate::helpers::{fixture, fixture_with_config, node_at, nodes_of_kind};

/// Outer `a` and `c`, then a block redeclaring `a`.
const NESTED: &str = "let a = b;\nlet c = a;\n{ let a = c; let d = a; }";

fn reference_at(document: &Document, offset: u32) -> NameReference {
    let tree = document.read();
    NameReference::new(&tree, node_at(&tree, offset, NAME_REF)).unwrap()
}

fn lets(document: &Document) -> Vec<ElementRef> {
    let tree = document.read();
    nodes_of_kind(&tree, LET)
        .into_iter()
        .map(|node| ElementRef::new(document.id(), node))
        .collect()
}

#[rstest]
#[case::outer_use_of_outer_a(19, 0)]
#[case::block_use_of_outer_c(32, 1)]
#[case::block_use_of_inner_a(43, 2)]
fn test_resolves_to_nearest_visible_declaration(#[case] offset: u32, #[case] expected: usize) {
    let fx = fixture();
    let document = fx.open(NESTED);
    let reference = reference_at(&document, offset);
    let cancel = Cancellation::none();

    let target = fx.workspace.resolve(&reference, &cancel).unwrap();

    assert_eq!(target, Some(lets(&document)[expected]));
}

#[test]
fn test_unresolved_name_yields_no_candidates() {
    let fx = fixture();
    let document = fx.open(NESTED);
    let reference = reference_at(&document, 8);
    let cancel = Cancellation::none();

    let results = fx.workspace.resolve_all(&reference, false, &cancel).unwrap();

    assert!(results.is_empty());
    assert_eq!(fx.workspace.resolve(&reference, &cancel).unwrap(), None);
}

#[test]
fn test_declaration_is_not_visible_in_its_own_initializer() {
    let fx = fixture();
    let document = fx.open("let a = b;\n{ let a = a; }");
    let reference = reference_at(&document, 21);

    let target = fx.workspace.resolve(&reference, &Cancellation::none()).unwrap();

    assert_eq!(target, Some(lets(&document)[0]));
}

#[test]
fn test_incomplete_mode_reports_shadowed_candidates() {
    let fx = fixture();
    let document = fx.open(NESTED);
    let reference = reference_at(&document, 43);
    let lets = lets(&document);
    let cancel = Cancellation::none();

    let complete = fx.workspace.resolve_all(&reference, false, &cancel).unwrap();
    let incomplete = fx.workspace.resolve_all(&reference, true, &cancel).unwrap();

    assert_eq!(complete, vec![ResolveResult::valid(lets[2])]);
    assert_eq!(
        incomplete,
        vec![
            ResolveResult::valid(lets[2]),
            ResolveResult::invalid(Some(lets[0]))
        ]
    );
}

#[test]
fn test_is_reference_to_agrees_with_resolve_all() {
    let fx = fixture();
    let document = fx.open(NESTED);
    let services = fx.workspace.services();
    let cancel = Cancellation::none();
    let lets = lets(&document);

    for offset in [19, 32, 43] {
        let reference = reference_at(&document, offset);
        let results = reference.resolve_all(services, false, &cancel).unwrap();
        for target in &lets {
            let expected = results
                .iter()
                .any(|r| r.valid && r.element == Some(*target));
            assert_eq!(
                reference.is_reference_to(services, *target, &cancel).unwrap(),
                expected,
                "reference at {offset} against {target}"
            );
        }
    }
}

#[test]
fn test_cancellation_is_propagated() {
    let fx = fixture();
    let document = fx.open(NESTED);
    let reference = reference_at(&document, 43);
    let cancel = Cancellation::new();
    cancel.cancel();

    let error = fx.workspace.resolve_all(&reference, false, &cancel).unwrap_err();

    assert!(error.is_cancelled());
    assert!(fx.workspace.services().resolve_cache().is_empty());
    let error = fx.workspace.find_usages(lets(&document)[0], &cancel).unwrap_err();
    assert!(error.is_cancelled());
}

#[test]
fn test_scope_depth_limit_fails_cleanly() {
    let fx = fixture_with_config(CoreConfig::default().with_max_scope_depth(2));
    let document = fx.open("let a = b;\n{ { let c = a; } }");
    let reference = reference_at(&document, 23);

    let error = reference
        .resolve_all(fx.workspace.services(), false, &Cancellation::none())
        .unwrap_err();

    assert!(error.is_unsupported());
}

#[test]
fn test_declaration_index_offers_other_documents() {
    let fx = fixture();
    let prelude = fx.open("let p = q;");
    let document = fx.open("let z = p;\nlet y = z;");
    fx.workspace.services().extensions().register(
        &DECLARATION_INDEXES,
        Arc::new(PreludeIndex {
            prelude: prelude.id(),
        }) as Arc<dyn DeclarationIndex>,
    );
    let cancel = Cancellation::none();

    let from_prelude = reference_at(&document, 8);
    let local = reference_at(&document, 19);

    assert_eq!(
        fx.workspace.resolve(&from_prelude, &cancel).unwrap(),
        Some(lets(&prelude)[0])
    );
    assert_eq!(
        fx.workspace.resolve(&local, &cancel).unwrap(),
        Some(lets(&document)[0])
    );
}

#[test]
fn test_references_at_offset() {
    let fx = fixture();
    let document = fx.open(NESTED);

    let found = fx
        .workspace
        .references_at(document.id(), TextSize::from(19))
        .unwrap();
    let outside = fx
        .workspace
        .references_at(document.id(), TextSize::from(2))
        .unwrap();

    assert_eq!(found.len(), 1);
    let tree = document.read();
    assert_eq!(found[0].canonical_text(&tree).unwrap(), "a");
    assert_eq!(found[0].element().node, node_at(&tree, 19, NAME_REF));
    assert!(outside.is_empty());
}

#[test]
fn test_references_of_non_reference_node_is_empty() {
    let fx = fixture();
    let document = fx.open(NESTED);
    let first = lets(&document)[0].node;

    assert!(fx.workspace.references_of(document.id(), first).unwrap().is_empty());
}

#[test]
fn test_find_usages_collects_every_document() {
    let fx = fixture();
    let prelude = fx.open("let p = q;\nlet r = p;");
    let document = fx.open("let z = p;\n{ let p = z; let w = p; }");
    fx.workspace.services().extensions().register(
        &DECLARATION_INDEXES,
        Arc::new(PreludeIndex {
            prelude: prelude.id(),
        }) as Arc<dyn DeclarationIndex>,
    );
    let target = lets(&prelude)[0];

    let usages = fx.workspace.find_usages(target, &Cancellation::none()).unwrap();

    let mut found: Vec<(DocumentId, String)> = usages
        .iter()
        .map(|usage| {
            let owner = fx.workspace.document(usage.element().document).unwrap();
            let tree = owner.read();
            let start = tree.text_range(usage.element().node).unwrap().start();
            (owner.id(), format!("{}@{}", usage.canonical_text(&tree).unwrap(), u32::from(start)))
        })
        .collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            (prelude.id(), "p@19".to_string()),
            (document.id(), "p@8".to_string())
        ]
    );
}

#[test]
fn test_cache_serves_until_next_modification() {
    let fx = fixture_with_config(CoreConfig::default().with_resolve_cache(true));
    let document = fx.open(NESTED);
    let reference = reference_at(&document, 19);
    let cache = fx.workspace.services().resolve_cache();
    let cancel = Cancellation::none();

    let first = fx.workspace.resolve_all(&reference, false, &cancel).unwrap();
    fx.workspace.resolve_all(&reference, true, &cancel).unwrap();
    assert_eq!(cache.len(), 2);
    assert_eq!(fx.workspace.resolve_all(&reference, false, &cancel).unwrap(), first);
    assert_eq!(cache.len(), 2);

    fx.edit(&document, "let a = b;\nlet c = a;\n{ let a = c; let d = a; }\n");
    let again = fx.workspace.resolve_all(&reference, false, &cancel).unwrap();
    assert_eq!(again, first);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_is_off_by_default() {
    let fx = fixture();
    let document = fx.open(NESTED);
    let reference = reference_at(&document, 19);

    fx.workspace
        .resolve_all(&reference, false, &Cancellation::none())
        .unwrap();

    assert!(fx.workspace.services().resolve_cache().is_empty());
}

/// Shares its anchor with a name reference but never resolves.
#[derive(Debug)]
struct OpaqueReference {
    element: ElementRef,
    range: TextRange,
}

impl Reference for OpaqueReference {
    fn element(&self) -> ElementRef {
        self.element
    }

    fn range_in_element(&self) -> TextRange {
        self.range
    }

    fn resolve_all(
        &self,
        _services: &Services,
        _incomplete: bool,
        _cancel: &Cancellation,
    ) -> arbor::Result<Vec<ResolveResult>> {
        Ok(Vec::new())
    }

    fn handle_element_rename(
        &self,
        _writer: &mut TreeWriter<'_>,
        _new_name: &str,
    ) -> arbor::Result<NodeId> {
        Err(TreeError::unsupported(UnsupportedOperation::RebindUnsupported))
    }
}

#[test]
fn test_cache_keeps_reference_types_apart() {
    let fx = fixture_with_config(CoreConfig::default().with_resolve_cache(true));
    let document = fx.open(NESTED);
    let named = reference_at(&document, 19);
    let opaque = OpaqueReference {
        element: named.element(),
        range: named.range_in_element(),
    };
    let cancel = Cancellation::none();

    assert_eq!(fx.workspace.resolve_all(&named, false, &cancel).unwrap().len(), 1);
    assert!(fx.workspace.resolve_all(&opaque, false, &cancel).unwrap().is_empty());
    assert_eq!(fx.workspace.services().resolve_cache().len(), 2);
    assert_eq!(fx.workspace.resolve(&opaque, &cancel).unwrap(), None);
}

#[test]
fn test_reference_into_removed_text_reports_invalid_access() {
    let fx = fixture();
    let document = fx.open(NESTED);
    let reference = reference_at(&document, 19);

    fx.edit(&document, "let a = b;");

    let error = reference
        .resolve_all(fx.workspace.services(), false, &Cancellation::none())
        .unwrap_err();
    assert!(error.is_invalid_access());
}
