use arbor::manipulator::{self, Manipulator};
use arbor::{TextRange, TreeError, UnsupportedOperation};

use crate::helpers::mini::{IDENT, LET, NAME_REF, STRING};
use crate::helpers::{fixture, node_at, nodes_of_kind};

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn test_literal_dispatches_through_kind_hierarchy() {
    let fx = fixture();
    let document = fx.open(r#"let s = "x\ny";"#);
    let tree = document.read();
    let literal = node_at(&tree, 9, STRING);

    let found = manipulator::require_for(fx.workspace.services(), &tree, literal).unwrap();

    assert_eq!(found.value_range(&tree, literal).unwrap(), range(1, 5));
    assert_eq!(found.value_text(&tree, literal).unwrap(), r"x\ny");
}

#[test]
fn test_missing_manipulator_is_reported() {
    let fx = fixture();
    let document = fx.open("let a = b;");
    let tree = document.read();
    let statement = nodes_of_kind(&tree, LET)[0];

    assert!(
        manipulator::lookup_for(fx.workspace.services(), &tree, statement)
            .unwrap()
            .is_none()
    );
    let error = manipulator::require_for(fx.workspace.services(), &tree, statement)
        .err()
        .unwrap();
    assert!(error.is_missing_capability());
}

#[test]
fn test_leaf_edit_keeps_the_node() {
    let fx = fixture();
    let document = fx.open("let a = b;");
    let ident = node_at(&document.read(), 4, IDENT);
    let leaf = manipulator::require_for(fx.workspace.services(), &document.read(), ident).unwrap();

    let result = leaf
        .handle_content_change(&mut document.write(), ident, "alpha")
        .unwrap();

    assert_eq!(result, ident);
    assert_eq!(document.read().full_text(), "let alpha = b;");
}

#[test]
fn test_reparsing_edit_replaces_the_node() {
    let fx = fixture();
    let document = fx.open("let a = b;");
    let reference = node_at(&document.read(), 8, NAME_REF);
    let reparse = manipulator::require_for(fx.workspace.services(), &document.read(), reference)
        .unwrap();

    let result = reparse
        .set_content(&mut document.write(), reference, range(0, 1), "bee")
        .unwrap();

    let tree = document.read();
    assert_ne!(result, reference);
    assert!(!tree.is_valid(reference));
    assert_eq!(tree.kind(result).unwrap(), NAME_REF);
    assert_eq!(tree.full_text(), "let a = bee;");
}

#[test]
fn test_reparsing_edit_must_stay_parseable() {
    let fx = fixture();
    let document = fx.open("let a = b;");
    let reference = node_at(&document.read(), 8, NAME_REF);
    let reparse = manipulator::require_for(fx.workspace.services(), &document.read(), reference)
        .unwrap();

    let error = reparse
        .set_content(&mut document.write(), reference, range(0, 1), "b c")
        .unwrap_err();

    assert!(matches!(
        error,
        TreeError::Unsupported(UnsupportedOperation::EditRejected(_))
    ));
    assert!(document.read().is_valid(reference));
    assert_eq!(document.read().full_text(), "let a = b;");
}

#[test]
fn test_range_outside_node_is_refused() {
    let fx = fixture();
    let document = fx.open("let a = b;");
    let ident = node_at(&document.read(), 4, IDENT);
    let leaf = manipulator::require_for(fx.workspace.services(), &document.read(), ident).unwrap();

    let error = leaf
        .set_content(&mut document.write(), ident, range(0, 4), "x")
        .unwrap_err();

    assert!(matches!(
        error,
        TreeError::Unsupported(UnsupportedOperation::RangeOutOfBounds { .. })
    ));
}
