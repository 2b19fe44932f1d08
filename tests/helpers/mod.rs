//! Shared setup for integration tests.

#![allow(dead_code)]


use std::sync::Arc;

use arbor::document::{Document, MemoryTextSource};
use arbor::extension::{MULTI_HOST_INJECTORS, REFERENCE_CONTRIBUTORS};
use arbor::injection::{MultiHostInjector, StringLiteralHost};
use arbor::manipulator::{LeafManipulator, QuotedLiteralManipulator, ReparsingManipulator};
use arbor::resolve::ReferenceContributor;
use arbor::{CoreConfig, NodeId, SyntaxKind, SyntaxTree, TextSize, Workspace};

use mini::{
    BLOCK, BlockScope, IDENT, JoinedInjector, LET, LITERAL, LetName, MiniParser, NAME_REF,
    NameRefContributor, PlainTextInjector, ROOT, STRING,
};

/// A workspace wired for `mini`, plus the text source behind it.
pub struct Fixture {
    pub source: Arc<MemoryTextSource>,
    pub workspace: Workspace,
}

pub fn fixture() -> Fixture {
    fixture_with_config(CoreConfig::default())
}

pub fn fixture_with_config(config: CoreConfig) -> Fixture {
    let source = Arc::new(MemoryTextSource::new());
    let workspace = Workspace::with_config(source.clone(), config);
    workspace.register_parser(Arc::new(MiniParser));

    let services = workspace.services();
    services
        .hierarchy()
        .declare(STRING, LITERAL)
        .expect("literal hierarchy");
    services.scopes().register(ROOT, Arc::new(BlockScope));
    services.scopes().register(BLOCK, Arc::new(BlockScope));
    services.named_elements().register(LET, Arc::new(LetName));
    services.manipulators().register(IDENT, Arc::new(LeafManipulator));
    services.manipulators().register(LITERAL, Arc::new(QuotedLiteralManipulator));
    services.manipulators().register(NAME_REF, Arc::new(ReparsingManipulator));
    services.injection_hosts().register(STRING, Arc::new(StringLiteralHost));
    services.extensions().register(
        &REFERENCE_CONTRIBUTORS,
        Arc::new(NameRefContributor) as Arc<dyn ReferenceContributor>,
    );
    services.extensions().register(
        &MULTI_HOST_INJECTORS,
        Arc::new(PlainTextInjector) as Arc<dyn MultiHostInjector>,
    );
    services.extensions().register(
        &MULTI_HOST_INJECTORS,
        Arc::new(JoinedInjector) as Arc<dyn MultiHostInjector>,
    );

    Fixture { source, workspace }
}

impl Fixture {
    /// Create `text` in the source and open it as a `mini` document.
    pub fn open(&self, text: &str) -> Arc<Document> {
        let id = self.source.create(text);
        self.workspace
            .open(id, &format!("doc{}.mini", id.raw()), mini::LANGUAGE)
            .expect("open document")
    }

    /// Replace the source text of `document` and commit it.
    pub fn edit(&self, document: &Document, text: &str) {
        self.source
            .set_text(document.id(), text)
            .expect("known document");
        self.workspace.commit(document.id()).expect("commit");
    }
}

/// Every node of `kind`, in document order.
pub fn nodes_of_kind(tree: &SyntaxTree, kind: SyntaxKind) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .expect("valid root")
        .filter(|node| tree.kind(*node).ok() == Some(kind))
        .collect()
}

/// The innermost node of `kind` covering `offset`.
pub fn node_at(tree: &SyntaxTree, offset: u32, kind: SyntaxKind) -> NodeId {
    let leaf = tree
        .leaf_at_offset(TextSize::from(offset))
        .expect("offset inside the text");
    tree.ancestors(leaf)
        .expect("valid leaf")
        .find(|node| tree.kind(*node).ok() == Some(kind))
        .unwrap_or_else(|| panic!("no {kind:?} at {offset}"))
}

/// Offset of the `n`th occurrence (0-based) of `needle` in `text`.
pub fn offset_of(text: &str, needle: &str, n: usize) -> u32 {
    text.match_indices(needle)
        .nth(n)
        .map(|(i, _)| i as u32)
        .unwrap_or_else(|| panic!("{needle:?} #{n} not in {text:?}"))
}

/// Checks that every composite node is exactly as long as its children.
pub fn assert_lengths_consistent(tree: &SyntaxTree) {
    for node in tree.descendants(tree.root()).expect("valid root") {
        let children = tree.children(node).expect("valid node");
        if children.is_empty() {
            continue;
        }
        let range = tree.text_range(node).expect("valid node");
        let total: TextSize = children
            .iter()
            .map(|c| tree.text_len(*c).expect("valid child"))
            .sum();
        assert_eq!(range.len(), total, "length mismatch at {node}");
        let first = tree.text_range(children[0]).expect("valid child");
        assert_eq!(range.start(), first.start(), "start mismatch at {node}");
    }
}
