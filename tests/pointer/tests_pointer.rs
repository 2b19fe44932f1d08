use arbor::{NodeId, TextRange};

use crate::helpers::mini::{LET, NAME, NAME_REF, declared_name};
use crate::helpers::{fixture, node_at, nodes_of_kind};

const TWO_LETS: &str = "let a = b;\nlet c = d;";

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn test_pointer_follows_reused_node_through_commit() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let second = nodes_of_kind(&document.read(), LET)[1];
    let pointer = fx.workspace.create_pointer(document.id(), second).unwrap();

    fx.edit(&document, "let z = q;\nlet a = b;\nlet c = d;");

    assert_eq!(pointer.get(), Some(second));
    assert_eq!(pointer.range(), range(22, 32));
    assert_eq!(pointer.original_range(), range(11, 21));
    let tree = document.read();
    assert_eq!(tree.text(second).unwrap(), "let c = d;");
}

#[test]
fn test_pointer_reanchors_after_reload() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let second = nodes_of_kind(&document.read(), LET)[1];
    let pointer = fx.workspace.create_pointer(document.id(), second).unwrap();

    fx.workspace.reload(document.id()).unwrap();

    let found: NodeId = pointer.get().expect("construct still present");
    assert_ne!(found, second);
    let tree = document.read();
    assert_eq!(tree.kind(found).unwrap(), LET);
    assert_eq!(declared_name(&tree, found).as_deref(), Some("c"));
    // Dereferencing twice against the same tree gives the same node.
    assert_eq!(pointer.get_in(&tree), Some(found));
}

#[test]
fn test_pointer_to_removed_construct_never_jumps() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let second = nodes_of_kind(&document.read(), LET)[1];
    let pointer = fx.workspace.create_pointer(document.id(), second).unwrap();

    fx.edit(&document, "let a = b;");
    assert_eq!(pointer.get(), None);

    // A new construct of the same kind at the old place is not adopted.
    fx.edit(&document, TWO_LETS);
    assert_eq!(pointer.get(), None);
    assert_eq!(nodes_of_kind(&document.read(), LET).len(), 2);
}

#[test]
fn test_pointer_never_adopts_a_shifted_sibling() {
    let fx = fixture();
    let document = fx.open("let a = x;\nlet b = y;");
    let first = nodes_of_kind(&document.read(), LET)[0];
    let pointer = fx.workspace.create_pointer(document.id(), first).unwrap();

    fx.edit(&document, "let b = y;\nlet c = z;");

    assert_eq!(pointer.get(), None);
    let tree = document.read();
    assert!(!tree.is_valid(first));
    assert_eq!(pointer.get_in(&tree), None);
}

#[test]
fn test_pointer_survives_removal_of_a_leading_sibling() {
    let fx = fixture();
    let document = fx.open("let a = x;\nlet b = y;\nlet c = z;");
    let (first, second) = {
        let tree = document.read();
        let lets = nodes_of_kind(&tree, LET);
        (lets[0], lets[1])
    };
    let removed = fx.workspace.create_pointer(document.id(), first).unwrap();
    let kept = fx.workspace.create_pointer(document.id(), second).unwrap();

    fx.edit(&document, "let b = y;\nlet c = z;");

    assert_eq!(removed.get(), None);
    assert_eq!(kept.get(), Some(second));
    assert_eq!(kept.range(), range(0, 10));
    assert_eq!(declared_name(&document.read(), second).as_deref(), Some("b"));
}

#[test]
fn test_dead_pointers_compare_by_original_range() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let (name, ident, value) = {
        let tree = document.read();
        let name = node_at(&tree, 15, NAME);
        (name, tree.first_child(name).unwrap().unwrap(), node_at(&tree, 19, NAME_REF))
    };
    let by_name = fx.workspace.create_pointer(document.id(), name).unwrap();
    let by_ident = fx.workspace.create_pointer(document.id(), ident).unwrap();
    let by_value = fx.workspace.create_pointer(document.id(), value).unwrap();
    assert_ne!(by_name, by_ident);

    fx.edit(&document, "let a = b;");

    assert_eq!(by_name.get(), None);
    assert_eq!(by_ident.get(), None);
    assert_eq!(by_name.original_range(), by_ident.original_range());
    assert_eq!(by_name, by_ident);
    assert_ne!(by_name, by_value);
}

#[test]
fn test_pointer_shifts_with_structural_edits() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let (first, second) = {
        let tree = document.read();
        let lets = nodes_of_kind(&tree, LET);
        (lets[0], lets[1])
    };
    let pointer = fx.workspace.create_pointer(document.id(), second).unwrap();

    document.write().delete(first).unwrap();

    assert_eq!(pointer.get(), Some(second));
    assert_eq!(pointer.range(), range(1, 11));
}

#[test]
fn test_pointers_to_same_node_share_an_anchor() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let (first, reference) = {
        let tree = document.read();
        (nodes_of_kind(&tree, LET)[0], node_at(&tree, 8, NAME_REF))
    };
    let pointers = fx.workspace.services().pointers();

    let one = fx.workspace.create_pointer(document.id(), first).unwrap();
    let two = fx.workspace.create_pointer(document.id(), first).unwrap();
    assert_eq!(one, two);
    assert_eq!(pointers.pointer_count(document.id()), 1);

    let other = fx.workspace.create_pointer(document.id(), reference).unwrap();
    assert_ne!(one, other);
    assert_eq!(pointers.pointer_count(document.id()), 2);

    drop(other);
    assert_eq!(pointers.pointer_count(document.id()), 1);
    drop((one, two));
    assert_eq!(pointers.pointer_count(document.id()), 0);
}

#[test]
fn test_pointer_to_invalid_node_is_refused() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let second = nodes_of_kind(&document.read(), LET)[1];
    fx.edit(&document, "let a = b;");

    let error = fx.workspace.create_pointer(document.id(), second).unwrap_err();
    assert!(error.is_invalid_access());
}

#[test]
fn test_pointer_does_not_keep_document_alive() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let first = nodes_of_kind(&document.read(), LET)[0];
    let pointer = fx.workspace.create_pointer(document.id(), first).unwrap();

    fx.workspace.discard(document.id()).unwrap();
    drop(document);

    assert!(pointer.document().is_none());
    assert_eq!(pointer.get(), None);
}

#[test]
fn test_removed_pointer_keeps_its_cached_node() {
    let fx = fixture();
    let document = fx.open(TWO_LETS);
    let first = nodes_of_kind(&document.read(), LET)[0];
    let pointers = fx.workspace.services().pointers();
    let pointer = fx.workspace.create_pointer(document.id(), first).unwrap();

    pointers.remove_pointer(&pointer);

    assert_eq!(pointers.pointer_count(document.id()), 0);
    assert_eq!(pointer.get(), Some(first));
}
