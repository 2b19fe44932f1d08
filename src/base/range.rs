//! Text range arithmetic and single-edit transforms.

use text_size::{TextRange, TextSize};

/// Extra range operations on top of [`TextRange`].
pub trait TextRangeExt: Sized {
    /// Moves the range `by` towards the end of the text.
    fn shift_right(self, by: TextSize) -> Self;
    /// Length of the intersection with `other`, zero when disjoint.
    fn overlap_len(self, other: Self) -> TextSize;
    /// The slice of `text` covered by this range, if in bounds.
    fn substring(self, text: &str) -> Option<&str>;
    /// Copy of `text` with this range replaced by `replacement`.
    fn replace_in(self, text: &str, replacement: &str) -> Option<String>;
}

impl TextRangeExt for TextRange {
    fn shift_right(self, by: TextSize) -> Self {
        self + by
    }

    fn overlap_len(self, other: Self) -> TextSize {
        self.intersect(other).map(|r| r.len()).unwrap_or_default()
    }

    fn substring(self, text: &str) -> Option<&str> {
        text.get(std::ops::Range::<usize>::from(self))
    }

    fn replace_in(self, text: &str, replacement: &str) -> Option<String> {
        let range = std::ops::Range::<usize>::from(self);
        if range.end > text.len() || !text.is_char_boundary(range.start) || !text.is_char_boundary(range.end) {
            return None;
        }
        let mut out = String::with_capacity(text.len() - range.len() + replacement.len());
        out.push_str(&text[..range.start]);
        out.push_str(replacement);
        out.push_str(&text[range.end..]);
        Some(out)
    }
}

/// One contiguous text replacement: `range` (old coordinates) is replaced by
/// `new_len` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub new_len: TextSize,
}

impl TextEdit {
    pub fn new(range: TextRange, new_len: TextSize) -> Self {
        Self { range, new_len }
    }

    /// The minimal single edit turning `old` into `new`, computed from the
    /// common prefix and suffix. `None` when the texts are identical.
    pub fn between(old: &str, new: &str) -> Option<Self> {
        if old == new {
            return None;
        }
        let (old_b, new_b) = (old.as_bytes(), new.as_bytes());
        let mut prefix = old_b
            .iter()
            .zip(new_b)
            .take_while(|(a, b)| a == b)
            .count();
        while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
            prefix -= 1;
        }
        let max_suffix = old_b.len().min(new_b.len()) - prefix;
        let mut suffix = old_b
            .iter()
            .rev()
            .zip(new_b.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();
        while !old.is_char_boundary(old_b.len() - suffix) || !new.is_char_boundary(new_b.len() - suffix) {
            suffix -= 1;
        }
        let range = TextRange::new(
            TextSize::from(prefix as u32),
            TextSize::from((old_b.len() - suffix) as u32),
        );
        Some(Self::new(range, TextSize::from((new_b.len() - suffix - prefix) as u32)))
    }

    /// Signed length difference introduced by the edit.
    pub fn delta(&self) -> i64 {
        i64::from(u32::from(self.new_len)) - i64::from(u32::from(self.range.len()))
    }

    /// The range the replacement occupies in the new text.
    pub fn new_range(&self) -> TextRange {
        TextRange::at(self.range.start(), self.new_len)
    }

    /// Maps a range of the old text into the new text.
    ///
    /// Returns `None` when the edit replaces the whole (non-empty) range:
    /// the text the range covered no longer exists.
    pub fn apply_to_range(&self, range: TextRange) -> Option<TextRange> {
        let edit = self.range;
        if range.end() <= edit.start() && !(range.is_empty() && edit.is_empty() && range.start() == edit.start()) {
            return Some(range);
        }
        if range.start() >= edit.end() {
            return Some(TextRange::new(
                shift(range.start(), self.delta()),
                shift(range.end(), self.delta()),
            ));
        }
        if !range.is_empty() && edit.start() <= range.start() && range.end() <= edit.end() {
            return None;
        }
        if edit.start() >= range.start() && edit.end() <= range.end() {
            return Some(TextRange::new(range.start(), shift(range.end(), self.delta())));
        }
        if edit.start() < range.start() {
            // Edit eats the head of the range.
            let start = self.new_range().end();
            return Some(TextRange::new(start, shift(range.end(), self.delta()).max(start)));
        }
        // Edit eats the tail of the range.
        Some(TextRange::new(range.start(), edit.start()))
    }
}

fn shift(offset: TextSize, delta: i64) -> TextSize {
    let value = (i64::from(u32::from(offset)) + delta).max(0);
    TextSize::from(value as u32)
}
