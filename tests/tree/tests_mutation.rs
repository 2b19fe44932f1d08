//! The serialized mutation path.

use std::sync::Arc;

use arbor::events::{TreeChange, TreeChangeEvent};
use arbor::{
    InvalidationReason, Parser, SyntaxTree, TextRange, TextSource, TreeError,
    UnsupportedOperation,
};
use parking_lot::Mutex;

use crate::helpers::mini::{BLOCK, IDENT, L_BRACE, LET, MiniParser, NAME_REF, STRING};
use crate::helpers::{assert_lengths_consistent, fixture, node_at, nodes_of_kind};

type Recorded = Arc<Mutex<Vec<(TreeChange, String)>>>;

fn record(fx: &crate::helpers::Fixture) -> (Recorded, arbor::events::Subscription) {
    let events: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let subscription = fx
        .workspace
        .subscribe(move |event: &TreeChangeEvent, tree: &SyntaxTree| {
            sink.lock().push((event.change.clone(), tree.full_text()));
        });
    (events, subscription)
}

#[test]
fn test_delete_fires_before_then_after_and_invalidates() {
    let fx = fixture();
    let text = "let a = b;\nlet c = a;";
    let document = fx.open(text);
    let (events, subscription) = record(&fx);
    let (root, first) = {
        let tree = document.read();
        (tree.root(), nodes_of_kind(&tree, LET)[0])
    };

    document.write().delete(first).unwrap();

    {
        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            (
                TreeChange::BeforeChildRemoval {
                    parent: root,
                    child: first
                },
                text.to_string()
            )
        );
        assert_eq!(
            events[1],
            (
                TreeChange::ChildRemoved {
                    parent: root,
                    child: first
                },
                "\nlet c = a;".to_string()
            )
        );
    }

    let tree = document.read();
    assert!(!tree.children(root).unwrap().contains(&first));
    assert!(!tree.is_valid(first));
    assert!(matches!(
        tree.invalidation_reason(first),
        Some(InvalidationReason::Deleted {
            operation: "delete",
            ..
        })
    ));
    assert!(matches!(
        tree.text(first),
        Err(TreeError::InvalidAccess { node, .. }) if node == first
    ));
    assert_eq!(
        fx.source.current_text(document.id()).as_deref(),
        Some("\nlet c = a;")
    );
    subscription.dispose();
}

#[test]
fn test_mutation_is_mirrored_and_commit_is_noop() {
    let fx = fixture();
    let document = fx.open("let a = b;");
    let ident = node_at(&document.read(), 4, IDENT);

    document.write().set_leaf_text(ident, "alpha").unwrap();

    assert_eq!(document.read().full_text(), "let alpha = b;");
    assert_eq!(document.stamp(), 2);
    assert!(document.is_committed());
    assert!(fx.workspace.commit(document.id()).unwrap().is_none());
    assert!(document.read().is_valid(ident));
}

#[test]
fn test_uncommitted_text_refuses_tree_edits() {
    let fx = fixture();
    let document = fx.open("let a = x;");
    let (events, subscription) = record(&fx);
    let (first, ident) = {
        let tree = document.read();
        (nodes_of_kind(&tree, LET)[0], node_at(&tree, 4, IDENT))
    };
    let typed = "let a = x;\nlet typed = y;";
    fx.source.set_text(document.id(), typed).unwrap();

    let mut writer = document.write();
    let error = writer.set_leaf_text(ident, "q").unwrap_err();
    assert_eq!(error, TreeError::Unsupported(UnsupportedOperation::Uncommitted));
    assert!(writer.delete(first).unwrap_err().is_unsupported());
    drop(writer);

    assert!(events.lock().is_empty());
    assert_eq!(fx.source.current_text(document.id()).as_deref(), Some(typed));
    assert_eq!(document.read().full_text(), "let a = x;");

    fx.workspace.commit(document.id()).unwrap();
    let ident = node_at(&document.read(), 4, IDENT);
    document.write().set_leaf_text(ident, "q").unwrap();
    assert_eq!(
        fx.source.current_text(document.id()).as_deref(),
        Some("let q = x;\nlet typed = y;")
    );
    subscription.dispose();
}

#[test]
fn test_add_child_and_add_after() {
    let fx = fixture();
    let document = fx.open("let a = b;{}");
    let (first, block) = {
        let tree = document.read();
        (nodes_of_kind(&tree, LET)[0], nodes_of_kind(&tree, BLOCK)[0])
    };
    let fragment = MiniParser.parse_fragment(LET, "let z = a;").unwrap();

    let mut writer = document.write();
    let inner = writer.add_child(block, 1, &fragment).unwrap();
    let after = writer.add_after(first, &fragment).unwrap();
    drop(writer);

    let tree = document.read();
    assert_eq!(tree.full_text(), "let a = b;let z = a;{let z = a;}");
    assert_eq!(tree.parent(inner).unwrap(), Some(block));
    assert_eq!(tree.next_sibling(first).unwrap(), Some(after));
    assert!(tree.is_valid(first));
    assert_lengths_consistent(&tree);
}

#[test]
fn test_structural_violations_are_refused() {
    let fx = fixture();
    let document = fx.open("let a = b;{}");
    let (root, first, block, ident, brace) = {
        let tree = document.read();
        (
            tree.root(),
            nodes_of_kind(&tree, LET)[0],
            nodes_of_kind(&tree, BLOCK)[0],
            node_at(&tree, 4, IDENT),
            node_at(&tree, 10, L_BRACE),
        )
    };
    let fragment = MiniParser.parse_fragment(LET, "let z = a;").unwrap();
    let (events, _subscription) = record(&fx);
    let mut writer = document.write();

    assert_eq!(
        writer.delete(root),
        Err(TreeError::Unsupported(UnsupportedOperation::RootRemoval))
    );
    assert_eq!(
        writer.add_child(ident, 0, &fragment),
        Err(TreeError::Unsupported(UnsupportedOperation::NotAComposite))
    );
    assert_eq!(
        writer.add_child(block, 7, &fragment),
        Err(TreeError::Unsupported(
            UnsupportedOperation::ChildIndexOutOfBounds { index: 7, len: 2 }
        ))
    );
    assert_eq!(
        writer.move_node(root, first, 0),
        Err(TreeError::Unsupported(UnsupportedOperation::RootRemoval))
    );
    assert_eq!(
        writer.move_node(first, brace, 0),
        Err(TreeError::Unsupported(UnsupportedOperation::NotAComposite))
    );
    drop(writer);

    assert!(events.lock().is_empty());
    assert_eq!(document.read().full_text(), "let a = b;{}");
}

#[test]
fn test_read_only_subtree_refuses_edits() {
    let fx = fixture();
    let document = fx.open("let a = b;\nlet c = a;");
    let (first, second, ident) = {
        let tree = document.read();
        let lets = nodes_of_kind(&tree, LET);
        (lets[0], lets[1], node_at(&tree, 4, IDENT))
    };

    let mut writer = document.write();
    writer.set_read_only(first, true).unwrap();
    let read_only = Err(TreeError::Unsupported(UnsupportedOperation::ReadOnly));
    assert_eq!(writer.set_leaf_text(ident, "z"), read_only);
    assert_eq!(writer.delete(first), read_only);
    assert!(writer.tree().is_read_only(ident).unwrap());
    writer.set_leaf_text(node_at(writer.tree(), 15, IDENT), "d").unwrap();

    writer.set_document_read_only(true);
    assert_eq!(writer.delete(second), read_only);
    writer.set_document_read_only(false);
    writer.set_read_only(first, false).unwrap();
    writer.set_leaf_text(ident, "z").unwrap();
    drop(writer);

    assert_eq!(document.read().full_text(), "let z = b;\nlet d = a;");
}

#[test]
fn test_move_keeps_handles_valid() {
    let fx = fixture();
    let document = fx.open("let a = b;{}");
    let (first, block, name_ref) = {
        let tree = document.read();
        (
            nodes_of_kind(&tree, LET)[0],
            nodes_of_kind(&tree, BLOCK)[0],
            node_at(&tree, 8, NAME_REF),
        )
    };

    document.write().move_node(first, block, 1).unwrap();

    {
        let tree = document.read();
        assert_eq!(tree.full_text(), "{let a = b;}");
        assert_eq!(tree.parent(first).unwrap(), Some(block));
        assert!(tree.is_valid(name_ref));
        assert_eq!(tree.text_range(name_ref).unwrap(), TextRange::new(9.into(), 10.into()));
    }
    assert_eq!(
        document.write().move_node(block, first, 0),
        Err(TreeError::Unsupported(UnsupportedOperation::CyclicMove))
    );
}

#[test]
fn test_replace_text_within_a_leaf() {
    let fx = fixture();
    let document = fx.open("let s = \"abc\";");
    let literal = {
        let tree = document.read();
        node_at(&tree, 9, STRING)
    };

    let mut writer = document.write();
    let leaf = writer
        .replace_text(literal, TextRange::new(2.into(), 3.into()), "XY")
        .unwrap();
    assert_eq!(leaf, literal);
    let spanning = writer.replace_text(
        writer.tree().root(),
        TextRange::new(2.into(), 6.into()),
        "",
    );
    assert!(matches!(
        spanning,
        Err(TreeError::Unsupported(UnsupportedOperation::EditRejected(_)))
    ));
    drop(writer);

    assert_eq!(document.read().full_text(), "let s = \"aXYc\";");
}

#[test]
fn test_replace_root_returns_new_root() {
    let fx = fixture();
    let document = fx.open("let a = b;");
    let old_root = document.read().root();
    let green = rowan::NodeOrToken::Node(MiniParser.parse("let q = r;"));

    let new_root = document.write().replace(old_root, &green).unwrap();

    let tree = document.read();
    assert_ne!(new_root, old_root);
    assert_eq!(tree.root(), new_root);
    assert!(!tree.is_valid(old_root));
    assert_eq!(tree.full_text(), "let q = r;");
}
