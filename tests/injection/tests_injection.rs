use std::sync::Arc;

use arbor::injection::{InjectedDocument, InjectionRegistrar};
use arbor::{
    Document, LanguageId, SyntaxKind, TextRange, TextSize, TreeError, UnsupportedOperation,
};
use rstest::rstest;

use crate::helpers::mini::{BLOCK, STRING};
use crate::helpers::{Fixture, fixture, node_at, nodes_of_kind};

/// `"a\nb"` with an escaped newline; the literal spans 8..14.
const ESCAPED: &str = r#"let s = "a\nb";"#;

/// Two literals in one block, at 10..14 and 24..28.
const JOINED: &str = r#"{ let x = "ab"; let y = "cd"; }"#;

fn offset(value: u32) -> TextSize {
    TextSize::from(value)
}

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

fn injected_into(fx: &Fixture, document: &Document, kind: SyntaxKind) -> Vec<Arc<InjectedDocument>> {
    let host = nodes_of_kind(&document.read(), kind)[0];
    fx.workspace.injected_documents(document.id(), host).unwrap()
}

fn is_rejected(error: &TreeError) -> bool {
    matches!(
        error,
        TreeError::Unsupported(UnsupportedOperation::EditRejected(_))
    )
}

#[test]
fn test_string_literal_is_decoded() {
    let fx = fixture();
    let document = fx.open(ESCAPED);

    let injected = injected_into(&fx, &document, STRING);

    assert_eq!(injected.len(), 1);
    let plain = &injected[0];
    assert_eq!(plain.language(), &LanguageId::new("plain"));
    assert_eq!(plain.text(), "a\nb");
    assert_eq!(plain.host_document(), document.id());
    assert_eq!(plain.shreds().len(), 1);
    assert_eq!(plain.shreds()[0].host_range(), range(9, 13));
    assert!(plain.shreds()[0].is_fully_decoded());
}

#[rstest]
#[case(0, Some(9))]
#[case(1, Some(10))]
#[case(2, Some(12))]
#[case(3, Some(13))]
#[case(4, None)]
fn test_injected_to_host_offsets(#[case] injected: u32, #[case] host: Option<u32>) {
    let fx = fixture();
    let document = fx.open(ESCAPED);
    let plain = &injected_into(&fx, &document, STRING)[0];

    assert_eq!(plain.injected_to_host(offset(injected)), host.map(offset));
}

#[rstest]
#[case(9, Some(0))]
#[case(10, Some(1))]
#[case::inside_escape(11, None)]
#[case(12, Some(2))]
#[case(13, Some(3))]
#[case::closing_quote(14, None)]
fn test_host_to_injected_offsets(#[case] host: u32, #[case] injected: Option<u32>) {
    let fx = fixture();
    let document = fx.open(ESCAPED);
    let plain = &injected_into(&fx, &document, STRING)[0];

    assert_eq!(plain.host_to_injected(offset(host)), injected.map(offset));
}

#[test]
fn test_injected_at_host_offset() {
    let fx = fixture();
    let document = fx.open(ESCAPED);

    let inside = fx.workspace.injected_at(document.id(), offset(12)).unwrap();
    let outside = fx.workspace.injected_at(document.id(), offset(2)).unwrap();

    assert_eq!(inside.map(|d| d.text().to_string()).as_deref(), Some("a\nb"));
    assert!(outside.is_none());
}

#[test]
fn test_rewriting_identical_text_leaves_host_untouched() {
    let fx = fixture();
    let document = fx.open(ESCAPED);
    let plain = &injected_into(&fx, &document, STRING)[0];
    let host = plain.shreds()[0].host();

    let returned = plain
        .replace(&mut document.write(), range(0, 3), "a\nb")
        .unwrap();

    assert_eq!(returned, host);
    assert_eq!(document.read().full_text(), ESCAPED);
    assert_eq!(document.stamp(), 1);
}

#[test]
fn test_edit_is_encoded_into_the_host() {
    let fx = fixture();
    let document = fx.open(ESCAPED);
    let plain = &injected_into(&fx, &document, STRING)[0];

    plain
        .replace(&mut document.write(), range(2, 3), "c\nd")
        .unwrap();

    assert_eq!(document.read().full_text(), r#"let s = "a\nc\nd";"#);
    let again = &injected_into(&fx, &document, STRING)[0];
    assert_eq!(again.text(), "a\nc\nd");
}

#[test]
fn test_joined_injection_spans_every_literal() {
    let fx = fixture();
    let document = fx.open(JOINED);

    let injected = injected_into(&fx, &document, BLOCK);

    assert_eq!(injected.len(), 1);
    let joined = &injected[0];
    assert_eq!(joined.language(), &LanguageId::new("joined"));
    assert_eq!(joined.text(), "(ab)(cd)");
    assert_eq!(joined.shreds().len(), 2);
    assert_eq!(joined.shreds()[1].range(), range(4, 8));
    assert_eq!(joined.shreds()[1].value_range(), range(5, 7));
    assert_eq!(joined.injected_to_host(offset(1)), Some(offset(11)));
    assert_eq!(joined.injected_to_host(offset(5)), Some(offset(25)));
    assert_eq!(joined.injected_to_host(offset(0)), None);
    assert_eq!(joined.injected_to_host(offset(4)), None);
    assert_eq!(joined.host_to_injected(offset(26)), Some(offset(6)));
    assert_eq!(
        joined.shred_at(offset(8)).map(|s| s.host()),
        Some(joined.shreds()[1].host())
    );
}

#[test]
fn test_joined_edit_lands_in_its_own_literal() {
    let fx = fixture();
    let document = fx.open(JOINED);
    let joined = &injected_into(&fx, &document, BLOCK)[0];
    let second = {
        let tree = document.read();
        node_at(&tree, 25, STRING)
    };

    let host = joined
        .replace(&mut document.write(), range(5, 7), "zz")
        .unwrap();

    assert_eq!(host, second);
    assert_eq!(
        document.read().full_text(),
        r#"{ let x = "ab"; let y = "zz"; }"#
    );
}

#[rstest]
#[case::spans_shreds(range(2, 6))]
#[case::touches_prefix(range(0, 2))]
#[case::touches_suffix(range(6, 8))]
fn test_edit_outside_one_value_is_rejected(#[case] edit: TextRange) {
    let fx = fixture();
    let document = fx.open(JOINED);
    let joined = &injected_into(&fx, &document, BLOCK)[0];

    let error = joined.replace(&mut document.write(), edit, "q").unwrap_err();

    assert!(is_rejected(&error));
    assert_eq!(document.read().full_text(), JOINED);
}

#[test]
fn test_stale_injection_refuses_edits() {
    let fx = fixture();
    let document = fx.open(ESCAPED);
    let plain = injected_into(&fx, &document, STRING)[0].clone();

    fx.edit(&document, r#"let s = "a\nb"; let t = u;"#);

    let error = plain
        .replace(&mut document.write(), range(0, 1), "z")
        .unwrap_err();
    assert!(is_rejected(&error));
}

#[test]
fn test_undecodable_literal_refuses_edits() {
    let fx = fixture();
    let document = fx.open(r#"let s = "a\qb";"#);
    let plain = &injected_into(&fx, &document, STRING)[0];

    assert!(!plain.shreds()[0].is_fully_decoded());
    let error = plain
        .replace(&mut document.write(), range(0, 1), "z")
        .unwrap_err();
    assert!(is_rejected(&error));
}

#[test]
fn test_edit_through_another_document_is_refused() {
    let fx = fixture();
    let document = fx.open(ESCAPED);
    let other = fx.open(ESCAPED);
    let plain = &injected_into(&fx, &document, STRING)[0];

    let error = plain
        .replace(&mut other.write(), range(0, 1), "z")
        .unwrap_err();

    assert_eq!(
        error,
        TreeError::Unsupported(UnsupportedOperation::CrossDocument)
    );
}

#[test]
fn test_places_must_follow_host_order() {
    let fx = fixture();
    let document = fx.open(JOINED);
    let tree = document.read();
    let literals = nodes_of_kind(&tree, STRING);
    let inside = range(1, 3);

    let mut registrar = InjectionRegistrar::new(fx.workspace.services(), &tree);
    registrar
        .start_injecting(LanguageId::new("joined"))
        .unwrap()
        .add_place("", "", literals[1], inside)
        .unwrap();
    let error = registrar
        .add_place("", "", literals[0], inside)
        .err()
        .unwrap();
    assert!(error.is_unsupported());
    let error = registrar
        .add_place("", "", literals[1], range(0, 2))
        .err()
        .unwrap();
    assert!(error.is_unsupported());

    registrar.done_injecting().unwrap();
    let documents = registrar.finish().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].text(), "cd");
}
