//! Hand-built green trees for unit tests.

use rowan::{GreenNode, GreenToken, NodeOrToken, SyntaxKind};

use super::build::GreenElement;
use super::syntax_tree::SyntaxTree;
use crate::base::DocumentId;

pub(crate) const ROOT: SyntaxKind = SyntaxKind(1);
pub(crate) const LET: SyntaxKind = SyntaxKind(2);
pub(crate) const NAME: SyntaxKind = SyntaxKind(3);
pub(crate) const IDENT: SyntaxKind = SyntaxKind(4);
pub(crate) const KW: SyntaxKind = SyntaxKind(5);
pub(crate) const WS: SyntaxKind = SyntaxKind(6);
pub(crate) const EQ: SyntaxKind = SyntaxKind(7);
pub(crate) const NAME_REF: SyntaxKind = SyntaxKind(8);
pub(crate) const STRING: SyntaxKind = SyntaxKind(9);
pub(crate) const SEMI: SyntaxKind = SyntaxKind(10);

pub(crate) const SAMPLE_DOC: DocumentId = DocumentId::new(1);
pub(crate) const SAMPLE_TEXT: &str = "let a = b;\nlet c = \"x\\ny\";";

pub(crate) fn token(kind: SyntaxKind, text: &str) -> GreenElement {
    NodeOrToken::Token(GreenToken::new(kind, text))
}

pub(crate) fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> GreenElement {
    NodeOrToken::Node(GreenNode::new(kind, children))
}

fn binding(name: &str, value: GreenElement) -> GreenNode {
    GreenNode::new(
        LET,
        vec![
            token(KW, "let"),
            token(WS, " "),
            node(NAME, vec![token(IDENT, name)]),
            token(WS, " "),
            token(EQ, "="),
            token(WS, " "),
            value,
            token(SEMI, ";"),
        ],
    )
}

/// `let NAME = VALUE;` where the value is a name reference.
pub(crate) fn let_green(name: &str, value: &str) -> GreenNode {
    binding(name, node(NAME_REF, vec![token(IDENT, value)]))
}

/// `let NAME = LITERAL;` where the literal is a quoted string token.
pub(crate) fn let_string_green(name: &str, literal: &str) -> GreenNode {
    binding(name, token(STRING, literal))
}

pub(crate) fn root_green(items: Vec<GreenElement>) -> GreenNode {
    GreenNode::new(ROOT, items)
}

pub(crate) fn sample_green() -> GreenNode {
    root_green(vec![
        NodeOrToken::Node(let_green("a", "b")),
        token(WS, "\n"),
        NodeOrToken::Node(let_string_green("c", "\"x\\ny\"")),
    ])
}

pub(crate) fn sample_tree() -> SyntaxTree {
    SyntaxTree::from_green(SAMPLE_DOC, &sample_green())
}
