//! Text utilities for names and identifiers.

/// Check if a character is considered part of a word (identifier).
///
/// Uses Unicode Standard Annex #31 rules for identifier characters.
#[inline]
pub fn is_word_character(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

/// Check if a character may start an identifier (`_` included).
#[inline]
pub fn is_identifier_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Check whether `name` is a legal identifier.
///
/// # Example
/// ```
/// use arbor::base::text_utils::is_identifier;
///
/// assert!(is_identifier("café"));
/// assert!(!is_identifier("1abc"));
/// assert!(!is_identifier("a b"));
/// ```
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_word_character),
        _ => false,
    }
}

/// Whether the quoted literal `text`, opened by `quote`, also ends with a
/// closing `quote` that is not itself escaped by a backslash.
pub fn has_closing_quote(text: &str, quote: char) -> bool {
    let Some(body) = text
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
    else {
        return false;
    };
    body.chars().rev().take_while(|c| *c == '\\').count() % 2 == 0
}
