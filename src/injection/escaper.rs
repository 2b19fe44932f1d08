//! Host-text escaping.

use text_size::{TextRange, TextSize};

use crate::base::text_utils::has_closing_quote;

/// Translates between a host node's (escaped) text and the decoded text of
/// an injected document.
///
/// Every range and offset on the host side is relative to the host node.
/// An escaper is a snapshot of the host text it was created from.
pub trait Escaper: Send + Sync {
    /// The part of the host that holds injectable content, e.g. the
    /// inside of a string literal.
    fn relevant_range(&self) -> TextRange;

    /// Append the decoded text of `range_in_host` to `out`. Returns `false`
    /// when the range cuts through an escape sequence, holds an illegal
    /// sequence or leaves the relevant range; in that case only the longest
    /// safely decoded prefix has been appended.
    fn decode(&self, range_in_host: TextRange, out: &mut String) -> bool;

    /// Host offset of the character starting at decoded offset `offset`,
    /// decoding from the start of `range_in_host`. `None` for offsets at or
    /// past the end of the decoded text, and for offsets inside a
    /// character.
    fn host_offset_for(&self, offset: TextSize, range_in_host: TextRange) -> Option<TextSize>;

    /// Host text representing `decoded`, or `None` when the host cannot
    /// express it.
    fn encode(&self, decoded: &str) -> Option<String>;

    /// Whether the host can only hold a single line.
    fn is_one_line(&self) -> bool {
        false
    }
}

/// One decoded character and the host text it came from.
#[derive(Debug, Clone, Copy)]
struct Unit {
    host: TextRange,
    /// `None` for an illegal escape sequence.
    decoded: Option<char>,
}

/// Escaper for quoted string literals with backslash escapes:
/// `\n \t \r \b \f \0 \\ \" \'` and `\uXXXX`.
#[derive(Debug, Clone)]
pub struct StringLiteralEscaper {
    quote: Option<char>,
    relevant: TextRange,
    units: Vec<Unit>,
}

impl StringLiteralEscaper {
    /// Snapshot `host_text`. A leading `"` or `'` and the matching closing
    /// quote are excluded from the relevant range.
    pub fn new(host_text: &str) -> Self {
        let len = TextSize::of(host_text);
        let quote = host_text.chars().next().filter(|c| matches!(c, '"' | '\''));
        let relevant = match quote {
            Some(q) if has_closing_quote(host_text, q) => {
                TextRange::new(1.into(), len - TextSize::from(1))
            }
            Some(_) => TextRange::new(1.into(), len),
            None => TextRange::up_to(len),
        };
        let body = &host_text[relevant];
        Self {
            quote,
            relevant,
            units: scan(body, relevant.start()),
        }
    }

    fn units_in(&self, range: TextRange) -> impl Iterator<Item = &Unit> {
        self.units
            .iter()
            .skip_while(move |u| u.host.end() <= range.start())
            .take_while(move |u| u.host.start() < range.end())
    }
}

fn scan(body: &str, base: TextSize) -> Vec<Unit> {
    let mut units = Vec::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let decoded = if c != '\\' {
            Some(c)
        } else {
            match chars.next().map(|(_, e)| e) {
                Some('n') => Some('\n'),
                Some('t') => Some('\t'),
                Some('r') => Some('\r'),
                Some('b') => Some('\u{8}'),
                Some('f') => Some('\u{c}'),
                Some('0') => Some('\0'),
                Some(e @ ('\\' | '"' | '\'')) => Some(e),
                Some('u') => {
                    let mut code = 0u32;
                    let mut digits = 0;
                    while digits < 4 {
                        match chars.peek().and_then(|(_, h)| h.to_digit(16)) {
                            Some(d) => {
                                code = code * 16 + d;
                                digits += 1;
                                chars.next();
                            }
                            None => break,
                        }
                    }
                    if digits == 4 { char::from_u32(code) } else { None }
                }
                _ => None,
            }
        };
        let end = chars.peek().map_or(body.len(), |(i, _)| *i);
        let host = TextRange::new(
            base + TextSize::from(start as u32),
            base + TextSize::from(end as u32),
        );
        units.push(Unit { host, decoded });
    }
    units
}

impl Escaper for StringLiteralEscaper {
    fn relevant_range(&self) -> TextRange {
        self.relevant
    }

    fn decode(&self, range_in_host: TextRange, out: &mut String) -> bool {
        let range = match range_in_host.intersect(self.relevant) {
            Some(range) if range.start() == range_in_host.start() => range,
            _ => return false,
        };
        for unit in self.units_in(range) {
            if unit.host.start() < range.start() || unit.host.end() > range.end() {
                return false;
            }
            match unit.decoded {
                Some(c) => out.push(c),
                None => return false,
            }
        }
        range == range_in_host
    }

    fn host_offset_for(&self, offset: TextSize, range_in_host: TextRange) -> Option<TextSize> {
        let mut decoded = TextSize::from(0);
        for unit in self.units_in(range_in_host) {
            if unit.host.start() < range_in_host.start() || unit.host.end() > range_in_host.end() {
                return None;
            }
            if decoded == offset {
                return Some(unit.host.start());
            }
            let c = unit.decoded?;
            decoded += TextSize::of(c);
            if decoded > offset {
                return None;
            }
        }
        None
    }

    fn encode(&self, decoded: &str) -> Option<String> {
        let mut out = String::with_capacity(decoded.len());
        for c in decoded.chars() {
            match c {
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                '\0' => out.push_str("\\0"),
                '\\' => out.push_str("\\\\"),
                c if Some(c) == self.quote => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_control() => {
                    let code = u32::from(c);
                    if code > 0xFFFF {
                        return None;
                    }
                    out.push_str(&format!("\\u{code:04X}"));
                }
                c => out.push(c),
            }
        }
        Some(out)
    }

    fn is_one_line(&self) -> bool {
        true
    }
}

/// Identity escaper: the host text is the injected text.
#[derive(Debug, Clone)]
pub struct VerbatimEscaper {
    text: String,
    relevant: TextRange,
    one_line: bool,
}

impl VerbatimEscaper {
    pub fn new(host_text: &str) -> Self {
        Self {
            text: host_text.to_string(),
            relevant: TextRange::up_to(TextSize::of(host_text)),
            one_line: false,
        }
    }

    /// Like [`new`](Self::new) but refuses to encode line breaks.
    pub fn one_line(host_text: &str) -> Self {
        Self {
            one_line: true,
            ..Self::new(host_text)
        }
    }
}

impl Escaper for VerbatimEscaper {
    fn relevant_range(&self) -> TextRange {
        self.relevant
    }

    fn decode(&self, range_in_host: TextRange, out: &mut String) -> bool {
        let Some(range) = range_in_host.intersect(TextRange::up_to(TextSize::of(self.text.as_str())))
        else {
            return false;
        };
        if range.start() != range_in_host.start() {
            return false;
        }
        match self.text.get(std::ops::Range::<usize>::from(range)) {
            Some(text) => {
                out.push_str(text);
                range == range_in_host
            }
            None => false,
        }
    }

    fn host_offset_for(&self, offset: TextSize, range_in_host: TextRange) -> Option<TextSize> {
        let host = range_in_host.start() + offset;
        (host < range_in_host.end() && self.text.is_char_boundary(host.into())).then_some(host)
    }

    fn encode(&self, decoded: &str) -> Option<String> {
        if self.one_line && decoded.contains(['\n', '\r']) {
            return None;
        }
        Some(decoded.to_string())
    }

    fn is_one_line(&self) -> bool {
        self.one_line
    }
}
